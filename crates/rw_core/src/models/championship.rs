//! Read-only championship collaborator: standings and attendance queries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One class's championship standings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChampionshipClass {
    pub id: Uuid,
    pub name: String,
    /// Driver guids ordered by standings position, leader first.
    #[serde(default)]
    pub standings: Vec<String>,
}

/// A championship linked to a race weekend. The engine only reads from it;
/// points computation happens elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Championship {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub classes: Vec<ChampionshipClass>,
    /// Championship rounds attended per driver guid.
    #[serde(default)]
    pub attendance: HashMap<String, u32>,
}

impl Championship {
    pub fn class(&self, id: Uuid) -> Option<&ChampionshipClass> {
        self.classes.iter().find(|class| class.id == id)
    }

    pub fn standings_for_class(&self, class_id: Uuid) -> Option<&[String]> {
        self.class(class_id).map(|class| class.standings.as_slice())
    }

    /// Number of championship rounds the driver has attended. Unknown
    /// drivers have attended none.
    pub fn entrant_attendance(&self, driver_guid: &str) -> u32 {
        self.attendance.get(driver_guid).copied().unwrap_or(0)
    }
}
