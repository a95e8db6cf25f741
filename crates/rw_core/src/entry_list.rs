//! Pit-box assignment of entrants for one session.

use std::collections::BTreeMap;

use crate::models::SessionEntrant;

/// Maps pit boxes to entrants. Boxes are unique; gaps are allowed so that
/// splits from different parent sessions can land side by side.
#[derive(Debug, Clone, Default)]
pub struct EntryList {
    slots: BTreeMap<i32, SessionEntrant>,
}

impl EntryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places an entrant in a specific pit box, replacing any previous
    /// occupant of that box.
    pub fn add_in_pit_box(&mut self, mut entrant: SessionEntrant, pit_box: i32) {
        entrant.pit_box = pit_box;
        self.slots.insert(pit_box, entrant);
    }

    pub fn get(&self, pit_box: i32) -> Option<&SessionEntrant> {
        self.slots.get(&pit_box)
    }

    /// Entrants in pit-box order.
    pub fn entrants(&self) -> impl Iterator<Item = &SessionEntrant> {
        self.slots.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &SessionEntrant)> {
        self.slots.iter().map(|(pit_box, entrant)| (*pit_box, entrant))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
