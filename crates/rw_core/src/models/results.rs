//! Session result sets and the external results-file store.
//!
//! A result set is the SOURCE of every statistic the progression engine
//! consumes: classified driver rows, per-lap records and collision events.
//! Detail queries are keyed by (driver guid, car model) because a driver can
//! appear in more than one car over a weekend.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FilterError, Result};

/// One classified driver row in a session result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverResult {
    pub driver_guid: String,
    pub driver_name: String,
    pub car_model: String,
    /// Best lap in milliseconds. 0 = no timed lap.
    pub best_lap: i64,
    /// Total time in milliseconds. 0 = unclassified.
    pub total_time: i64,
    /// Penalty time in milliseconds, added on top of the total time.
    #[serde(default)]
    pub penalty_time: i64,
    pub class_id: Uuid,
}

/// One completed lap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLap {
    pub driver_guid: String,
    pub car_model: String,
    /// Lap time in milliseconds.
    pub lap_time: i64,
    #[serde(default)]
    pub cuts: i32,
    /// Tyre short-name the lap was set on.
    #[serde(default)]
    pub tyre: String,
}

/// One car-to-car or car-to-environment contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub driver_guid: String,
    pub car_model: String,
}

/// Full result set for one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionResults {
    #[serde(default)]
    pub results: Vec<DriverResult>,
    #[serde(default)]
    pub laps: Vec<SessionLap>,
    #[serde(default)]
    pub events: Vec<CollisionEvent>,
}

impl SessionResults {
    /// Number of laps completed by a driver in a given car.
    pub fn num_laps(&self, driver_guid: &str, car_model: &str) -> usize {
        self.laps
            .iter()
            .filter(|lap| lap.driver_guid == driver_guid && lap.car_model == car_model)
            .count()
    }

    /// Number of collisions involving a driver in a given car.
    pub fn crashes(&self, driver_guid: &str, car_model: &str) -> usize {
        self.events
            .iter()
            .filter(|event| event.driver_guid == driver_guid && event.car_model == car_model)
            .count()
    }

    /// Total cuts across all of a driver's laps in a given car.
    pub fn cuts(&self, driver_guid: &str, car_model: &str) -> i32 {
        self.laps
            .iter()
            .filter(|lap| lap.driver_guid == driver_guid && lap.car_model == car_model)
            .map(|lap| lap.cuts)
            .sum()
    }

    /// The driver's fastest timed lap in a given car, if they set one.
    pub fn fastest_lap(&self, driver_guid: &str, car_model: &str) -> Option<&SessionLap> {
        self.laps
            .iter()
            .filter(|lap| {
                lap.driver_guid == driver_guid && lap.car_model == car_model && lap.lap_time > 0
            })
            .min_by_key(|lap| lap.lap_time)
    }

    /// Total time including any penalty recorded on the driver's result row.
    pub fn time_with_penalties(&self, total_time: i64, driver_guid: &str, car_model: &str) -> i64 {
        let penalty = self
            .results
            .iter()
            .find(|row| row.driver_guid == driver_guid && row.car_model == car_model)
            .map(|row| row.penalty_time)
            .unwrap_or(0);

        total_time + penalty
    }
}

/// Directory-backed store of external results files, addressable by string id.
///
/// A results file is JSON at `<results_dir>/<id>.json`. Load failures are
/// fatal to the filter invocation that requested them.
#[derive(Debug, Clone)]
pub struct ResultsStore {
    results_dir: PathBuf,
}

impl ResultsStore {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self { results_dir: results_dir.into() }
    }

    pub fn load(&self, id: &str) -> Result<SessionResults> {
        let path = self.results_dir.join(format!("{}.json", id));

        if !path.exists() {
            return Err(FilterError::ResultsFileNotFound { path });
        }

        let file = File::open(&path)?;

        serde_json::from_reader(BufReader::new(file))
            .map_err(|source| FilterError::ResultsParse { id: id.to_string(), source })
    }
}
