//! Locked-tyre setup artifacts.
//!
//! When a filter requests tyre locking, each placed entrant gets a setup
//! artifact pinning the tyre compound of their fastest parent-session lap.
//! The artifact path is deterministic so the server-launch stage can find
//! it from the entrant's setup override alone.

use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{RaceWeekend, Session, SessionEntrant, SessionLap};

const LOCKED_TYRE_SETUP_DIR: &str = "race_weekend_locked_tyres";

/// Setup artifact locking an entrant to one tyre compound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedTyreSetup {
    pub car_model: String,
    pub driver_guid: String,
    /// Compound index within the session's legal tyres for this car.
    pub tyre_index: usize,
    pub race_weekend_id: Uuid,
    pub session_id: Uuid,
    /// Values merged from the entrant's fixed setup, when one is configured
    /// on the weekend entry list.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub base_setup: serde_json::Map<String, Value>,
}

/// Directory-backed store for setup documents.
#[derive(Debug, Clone)]
pub struct SetupStore {
    setups_dir: PathBuf,
}

impl SetupStore {
    pub fn new(setups_dir: impl Into<PathBuf>) -> Self {
        Self { setups_dir: setups_dir.into() }
    }

    pub fn setups_dir(&self) -> &Path {
        &self.setups_dir
    }

    /// Reads a fixed setup document for merging.
    fn load_fixed_setup(&self, name: &str) -> Result<serde_json::Map<String, Value>> {
        let file = File::open(self.setups_dir.join(name))?;

        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Atomically writes `setup` at `relative_path` under the setups dir.
    fn write(&self, relative_path: &Path, setup: &LockedTyreSetup) -> Result<()> {
        let full_path = self.setups_dir.join(relative_path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_vec_pretty(setup)?;

        // write to a temp file, then rename
        let temp_path = full_path.with_extension("tmp");

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.flush()?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &full_path)?;

        log::debug!("wrote locked tyre setup ({} bytes) to {:?}", data.len(), full_path);

        Ok(())
    }
}

/// Builds and persists the locked-tyre setup for one placed entrant,
/// returning the relative path recorded as the entrant's setup override.
///
/// The compound index comes from the child session's race configuration; the
/// artifact references the race weekend and the child session it applies to.
pub fn build_locked_tyre_setup(
    weekend: &RaceWeekend,
    session: &Session,
    entrant: &SessionEntrant,
    fastest_lap: &SessionLap,
    store: &SetupStore,
) -> Result<String> {
    let tyre_index = session.race_config.tyre_index(&entrant.car.model, &fastest_lap.tyre)?;

    let mut base_setup = serde_json::Map::new();

    if let Some(weekend_entrant) = weekend.entrant(&entrant.car.driver_guid) {
        if let Some(fixed_setup) = &weekend_entrant.fixed_setup {
            base_setup = store.load_fixed_setup(fixed_setup)?;
        }
    }

    let setup = LockedTyreSetup {
        car_model: entrant.car.model.clone(),
        driver_guid: entrant.car.driver_guid.clone(),
        tyre_index,
        race_weekend_id: weekend.id,
        session_id: session.id,
        base_setup,
    };

    let relative_path = PathBuf::from(&entrant.car.model).join(LOCKED_TYRE_SETUP_DIR).join(
        format!("race_weekend_session_{}_{}.json", entrant.car.driver_guid, session.id),
    );

    store.write(&relative_path, &setup)?;

    Ok(relative_path.to_string_lossy().into_owned())
}
