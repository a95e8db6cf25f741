//! # rw_core - Race Weekend Entrant Progression Engine
//!
//! This library derives the starting grid of a child session from the
//! finalized (or previewed) results of its parent session within a race
//! weekend: a tree of practice, qualifying and heat-race sessions sharing
//! one entrant pool.
//!
//! ## Features
//! - Fixed catalog of named sort strategies with stable configuration keys
//! - Per-class grid assembly with deterministic class ordering
//! - Preview ("parent not yet run") and final derivation modes
//! - Best-effort tyre-locked setup artifacts from fastest-lap tyre records

pub mod entry_list;
pub mod error;
pub mod filter;
pub mod models;
pub mod setup;
pub mod sort;

pub use entry_list::EntryList;
pub use error::{FilterError, Result};
pub use filter::{reverse_entrants, FilterContext, SessionFilter};
pub use models::{
    entrants_from_results, Championship, ChampionshipClass, CollisionEvent, DriverResult,
    EntrantCar, EntrantResult, RaceConfig, RaceWeekend, ResultsStore, Session, SessionEntrant,
    SessionLap, SessionResults, SessionType, WeekendEntrant,
};
pub use setup::{build_locked_tyre_setup, LockedTyreSetup, SetupStore};
pub use sort::{per_class_sort, sorter_for_key, SortStrategy, SorterDescription, SORTERS};
