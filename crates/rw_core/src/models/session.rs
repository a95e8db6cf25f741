//! Sessions and their per-parent-edge filter configuration.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FilterError, Result};
use crate::filter::SessionFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Practice,
    Qualifying,
    Race,
}

/// Legal tyre compounds per car model for one session's race configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Car model -> ordered legal tyre short-names. The compound index
    /// consumed by setup artifacts is the position in this list.
    #[serde(default)]
    pub legal_tyres: HashMap<String, Vec<String>>,
}

impl RaceConfig {
    pub fn tyre_index(&self, car_model: &str, tyre: &str) -> Result<usize> {
        let tyres = self
            .legal_tyres
            .get(car_model)
            .ok_or_else(|| FilterError::UnknownCarModel { car_model: car_model.to_string() })?;

        tyres.iter().position(|t| t == tyre).ok_or_else(|| FilterError::TyreNotFound {
            car_model: car_model.to_string(),
            tyre: tyre.to_string(),
        })
    }
}

/// One timed activity in a race weekend.
///
/// A session with no parents is the weekend's "base" session; its entry list
/// is authored externally rather than derived from results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub name: String,
    pub session_type: SessionType,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Parent sessions whose results feed this session.
    #[serde(default)]
    pub parent_ids: Vec<Uuid>,
    /// Filter configuration per parent edge.
    #[serde(default)]
    pub filters: HashMap<Uuid, SessionFilter>,
    #[serde(default)]
    pub race_config: RaceConfig,
}

impl Session {
    pub fn new(name: impl Into<String>, session_type: SessionType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            session_type,
            started_at: None,
            completed_at: None,
            parent_ids: Vec::new(),
            filters: HashMap::new(),
            race_config: RaceConfig::default(),
        }
    }

    /// A session's results are immutable once it is completed.
    pub fn completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn is_base(&self) -> bool {
        self.parent_ids.is_empty()
    }

    pub fn start(&mut self) {
        self.started_at = Some(Utc::now());
    }

    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    pub fn filter_for_parent(&self, parent_id: Uuid) -> Option<&SessionFilter> {
        self.filters.get(&parent_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_session_has_no_parents() {
        let mut session = Session::new("Qualifying", SessionType::Qualifying);
        assert!(session.is_base());
        assert!(!session.completed());

        session.parent_ids.push(Uuid::new_v4());
        assert!(!session.is_base());

        session.complete();
        assert!(session.completed());
    }

    #[test]
    fn tyre_index_is_position_in_legal_tyres() {
        let mut config = RaceConfig::default();
        config
            .legal_tyres
            .insert("gt3_a".to_string(), vec!["H".to_string(), "M".to_string(), "S".to_string()]);

        assert_eq!(config.tyre_index("gt3_a", "M").unwrap(), 1);
        assert!(matches!(
            config.tyre_index("gt3_a", "X"),
            Err(FilterError::TyreNotFound { .. })
        ));
        assert!(matches!(
            config.tyre_index("unknown", "M"),
            Err(FilterError::UnknownCarModel { .. })
        ));
    }
}
