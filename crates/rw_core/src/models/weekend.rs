//! Race weekends: a tree of sessions sharing one entrant pool.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::championship::Championship;
use super::session::Session;

/// One externally authored entry in the weekend's base entry list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekendEntrant {
    pub guid: String,
    pub name: String,
    pub car_model: String,
    pub class_id: Uuid,
    /// Setup file merged into generated locked-tyre setups, when present.
    #[serde(default)]
    pub fixed_setup: Option<String>,
}

/// Event composed of a session tree. Each session has at most one parent;
/// exactly one root session has none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceWeekend {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub sessions: Vec<Session>,
    /// Externally supplied entry list of the base session.
    #[serde(default)]
    pub entry_list: Vec<WeekendEntrant>,
    /// Shared, read-only. Present when the weekend is run as part of a
    /// championship.
    #[serde(default)]
    pub championship: Option<Championship>,
}

impl RaceWeekend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sessions: Vec::new(),
            entry_list: Vec::new(),
            championship: None,
        }
    }

    pub fn session(&self, id: Uuid) -> Option<&Session> {
        self.sessions.iter().find(|session| session.id == id)
    }

    pub fn session_mut(&mut self, id: Uuid) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|session| session.id == id)
    }

    pub fn has_linked_championship(&self) -> bool {
        self.championship.is_some()
    }

    pub fn entrant(&self, guid: &str) -> Option<&WeekendEntrant> {
        self.entry_list.iter().find(|entrant| entrant.guid == guid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::SessionType;

    #[test]
    fn session_and_entrant_lookup() {
        let mut weekend = RaceWeekend::new("Test Weekend");
        let session = Session::new("Heat 1", SessionType::Race);
        let session_id = session.id;
        weekend.sessions.push(session);
        weekend.entry_list.push(WeekendEntrant {
            guid: "77".to_string(),
            name: "Niki".to_string(),
            car_model: "gt3_a".to_string(),
            class_id: Uuid::nil(),
            fixed_setup: None,
        });

        assert!(weekend.session(session_id).is_some());
        assert!(weekend.session(Uuid::new_v4()).is_none());
        assert_eq!(weekend.entrant("77").unwrap().name, "Niki");
        assert!(!weekend.has_linked_championship());
    }
}
