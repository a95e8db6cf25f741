//! Session entrants: one per (driver, session), created when a parent
//! session's results materialize.

use std::sync::Arc;

use uuid::Uuid;

use super::results::{DriverResult, SessionLap, SessionResults};

/// Driver and car identity for one entrant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrantCar {
    pub driver_guid: String,
    pub driver_name: String,
    pub model: String,
}

/// Result snapshot carried by an entrant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrantResult {
    /// Best lap in milliseconds. 0 = no timed lap.
    pub best_lap: i64,
    /// Total time in milliseconds. 0 = unclassified.
    pub total_time: i64,
    pub class_id: Uuid,
}

/// One entrant in a session, formed from a parent session's result row.
///
/// Keeps a shared reference to the full result set it came from so that
/// detail queries (laps, crashes, cuts, fastest lap) stay available after
/// the entrant has been split away from the result slice.
#[derive(Debug, Clone)]
pub struct SessionEntrant {
    /// Session whose results produced this entrant. Rewritten to the parent
    /// session id when the entrant is placed into a child entry list.
    pub session_id: Uuid,
    pub car: EntrantCar,
    pub result: EntrantResult,
    pub session_results: Arc<SessionResults>,
    /// Pit box assigned by the filter. Meaningful only once placed.
    pub pit_box: i32,
    /// Relative path of a generated setup override, e.g. a locked-tyre setup.
    pub override_setup_file: Option<String>,
}

impl SessionEntrant {
    pub fn from_result(
        session_id: Uuid,
        row: &DriverResult,
        session_results: Arc<SessionResults>,
    ) -> Self {
        Self {
            session_id,
            car: EntrantCar {
                driver_guid: row.driver_guid.clone(),
                driver_name: row.driver_name.clone(),
                model: row.car_model.clone(),
            },
            result: EntrantResult {
                best_lap: row.best_lap,
                total_time: row.total_time,
                class_id: row.class_id,
            },
            session_results,
            pit_box: 0,
            override_setup_file: None,
        }
    }

    pub fn num_laps(&self) -> usize {
        self.session_results.num_laps(&self.car.driver_guid, &self.car.model)
    }

    pub fn crashes(&self) -> usize {
        self.session_results.crashes(&self.car.driver_guid, &self.car.model)
    }

    pub fn cuts(&self) -> i32 {
        self.session_results.cuts(&self.car.driver_guid, &self.car.model)
    }

    pub fn fastest_lap(&self) -> Option<&SessionLap> {
        self.session_results.fastest_lap(&self.car.driver_guid, &self.car.model)
    }

    /// Total time including penalties, for race-time ordering.
    pub fn total_time_with_penalties(&self) -> i64 {
        self.session_results.time_with_penalties(
            self.result.total_time,
            &self.car.driver_guid,
            &self.car.model,
        )
    }
}

/// Builds the entrants for a session from a finalized result set, one per
/// classified row, in result order.
pub fn entrants_from_results(
    session_id: Uuid,
    results: &Arc<SessionResults>,
) -> Vec<SessionEntrant> {
    results
        .results
        .iter()
        .map(|row| SessionEntrant::from_result(session_id, row, Arc::clone(results)))
        .collect()
}
