//! Entrant ordering strategies.
//!
//! Strategies form a fixed catalog keyed by stable strings that live in
//! persisted filter configuration; the keys must never change across
//! versions. Unknown keys degrade to [`SortStrategy::Unchanged`].

mod per_class;

pub use per_class::{
    move_zero_attendance_to_back, move_zero_time_to_back, per_class_sort,
};

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::Result;
use crate::filter::{FilterContext, SessionFilter};
use crate::models::{Session, SessionEntrant, SessionType};

/// A named entrant-ordering strategy.
///
/// Strategies that need championship data or parent results are ordinary
/// variants; those requirements are capability flags on the descriptor, not
/// separate types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortStrategy {
    Unchanged,
    FastestLap,
    TotalRaceTime,
    FastestAcrossResults,
    LapsAcrossResults,
    FewestCollisions,
    FewestCuts,
    Safety,
    ChampionshipStandings,
    ChampionshipClass,
    Random,
    Alphabetical,
}

/// Catalog entry for one strategy.
#[derive(Debug, Clone, Copy)]
pub struct SorterDescription {
    pub name: &'static str,
    pub key: &'static str,
    pub strategy: SortStrategy,
    pub needs_parent_session: bool,
    pub needs_championship: bool,
    pub show_in_manage_entry_list: bool,
}

pub const SORTERS: &[SorterDescription] = &[
    SorterDescription {
        name: "No Sort (Use Finishing Grid)",
        key: "", // key intentionally left blank
        strategy: SortStrategy::Unchanged,
        needs_parent_session: false,
        needs_championship: false,
        show_in_manage_entry_list: true,
    },
    SorterDescription {
        name: "Fastest Lap",
        key: "fastest_lap",
        strategy: SortStrategy::FastestLap,
        needs_parent_session: true,
        needs_championship: false,
        show_in_manage_entry_list: true,
    },
    SorterDescription {
        name: "Total Race Time",
        key: "total_race_time",
        strategy: SortStrategy::TotalRaceTime,
        needs_parent_session: true,
        needs_championship: false,
        show_in_manage_entry_list: true,
    },
    SorterDescription {
        name: "Fastest Lap Across Multiple Results Files",
        key: "fastest_multi_results_lap",
        strategy: SortStrategy::FastestAcrossResults,
        needs_parent_session: false,
        needs_championship: false,
        show_in_manage_entry_list: false,
    },
    SorterDescription {
        name: "Number of Laps Across Multiple Results Files",
        key: "number_multi_results_lap",
        strategy: SortStrategy::LapsAcrossResults,
        needs_parent_session: false,
        needs_championship: false,
        show_in_manage_entry_list: false,
    },
    SorterDescription {
        name: "Fewest Collisions",
        key: "fewest_collisions",
        strategy: SortStrategy::FewestCollisions,
        needs_parent_session: true,
        needs_championship: false,
        show_in_manage_entry_list: true,
    },
    SorterDescription {
        name: "Fewest Cuts",
        key: "fewest_cuts",
        strategy: SortStrategy::FewestCuts,
        needs_parent_session: true,
        needs_championship: false,
        show_in_manage_entry_list: true,
    },
    SorterDescription {
        name: "Safety (Collisions then Cuts)",
        key: "safety",
        strategy: SortStrategy::Safety,
        needs_parent_session: true,
        needs_championship: false,
        show_in_manage_entry_list: true,
    },
    SorterDescription {
        name: "Championship Standings Order",
        key: "championship_standings_order",
        strategy: SortStrategy::ChampionshipStandings,
        needs_parent_session: false,
        needs_championship: true,
        show_in_manage_entry_list: true,
    },
    SorterDescription {
        name: "Championship Class",
        key: "championship_class",
        strategy: SortStrategy::ChampionshipClass,
        needs_parent_session: false,
        needs_championship: true,
        show_in_manage_entry_list: false,
    },
    SorterDescription {
        name: "Random",
        key: "random",
        strategy: SortStrategy::Random,
        needs_parent_session: false,
        needs_championship: false,
        show_in_manage_entry_list: true,
    },
    SorterDescription {
        name: "Alphabetical (Using Driver Name)",
        key: "alphabetical",
        strategy: SortStrategy::Alphabetical,
        needs_parent_session: false,
        needs_championship: false,
        show_in_manage_entry_list: true,
    },
];

/// Looks up a strategy by its stable configuration key. Unknown keys degrade
/// to the unchanged sort rather than failing.
pub fn sorter_for_key(key: &str) -> SortStrategy {
    SORTERS
        .iter()
        .find(|description| description.key == key)
        .map(|description| description.strategy)
        .unwrap_or(SortStrategy::Unchanged)
}

impl SortStrategy {
    /// Sorts `entrants` in place.
    ///
    /// `filter` carries the multi-file context for the across-results
    /// strategies; when it is absent those strategies do nothing.
    pub fn sort(
        self,
        ctx: &FilterContext<'_>,
        session: &Session,
        entrants: &mut [SessionEntrant],
        filter: Option<&SessionFilter>,
    ) -> Result<()> {
        match self {
            SortStrategy::Unchanged => Ok(()),
            SortStrategy::FastestLap => {
                entrants.sort_by(cmp_best_lap);
                Ok(())
            }
            SortStrategy::TotalRaceTime => {
                entrants.sort_by(cmp_total_race_time);
                Ok(())
            }
            SortStrategy::FastestAcrossResults => fastest_across_results(ctx, entrants, filter),
            SortStrategy::LapsAcrossResults => laps_across_results(ctx, entrants, filter),
            SortStrategy::FewestCollisions => {
                entrants.sort_by(|a, b| {
                    a.crashes()
                        .cmp(&b.crashes())
                        .then_with(|| cmp_by_session_type(session, a, b))
                });
                Ok(())
            }
            SortStrategy::FewestCuts => {
                entrants.sort_by(|a, b| {
                    a.cuts().cmp(&b.cuts()).then_with(|| cmp_by_session_type(session, a, b))
                });
                Ok(())
            }
            SortStrategy::Safety => {
                entrants.sort_by(|a, b| {
                    a.crashes()
                        .cmp(&b.crashes())
                        .then_with(|| a.cuts().cmp(&b.cuts()))
                        .then_with(|| cmp_by_session_type(session, a, b))
                });
                Ok(())
            }
            SortStrategy::ChampionshipStandings => {
                championship_standings_sort(ctx, entrants);
                Ok(())
            }
            SortStrategy::ChampionshipClass => {
                championship_class_sort(ctx, entrants);
                Ok(())
            }
            SortStrategy::Random => {
                // not reproducible across runs by design
                let seed = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_nanos() as u64)
                    .unwrap_or_default();
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                entrants.shuffle(&mut rng);
                Ok(())
            }
            SortStrategy::Alphabetical => {
                entrants.sort_by(|a, b| a.car.driver_name.cmp(&b.car.driver_name));
                Ok(())
            }
        }
    }
}

/// Ascending best lap. A zero best lap sorts last unconditionally; equal
/// nonzero laps break the tie by fewer crashes, then fewer cuts.
pub(crate) fn cmp_best_lap(a: &SessionEntrant, b: &SessionEntrant) -> Ordering {
    match (a.result.best_lap, b.result.best_lap) {
        (0, 0) => Ordering::Equal,
        (0, _) => Ordering::Greater,
        (_, 0) => Ordering::Less,
        (lap_a, lap_b) if lap_a == lap_b => {
            a.crashes().cmp(&b.crashes()).then_with(|| a.cuts().cmp(&b.cuts()))
        }
        (lap_a, lap_b) => lap_a.cmp(&lap_b),
    }
}

/// More completed laps ranks ahead regardless of time; equal lap counts
/// compare penalty-inclusive total time ascending.
pub(crate) fn cmp_total_race_time(a: &SessionEntrant, b: &SessionEntrant) -> Ordering {
    let (laps_a, laps_b) = (a.num_laps(), b.num_laps());

    if laps_a == laps_b {
        a.total_time_with_penalties().cmp(&b.total_time_with_penalties())
    } else {
        laps_b.cmp(&laps_a)
    }
}

/// Secondary tie-break: race sessions compare by total race time, everything
/// else by best lap.
fn cmp_by_session_type(session: &Session, a: &SessionEntrant, b: &SessionEntrant) -> Ordering {
    if session.session_type == SessionType::Race {
        cmp_total_race_time(a, b)
    } else {
        cmp_best_lap(a, b)
    }
}

fn cmp_best_lap_in(
    best_laps: &HashMap<String, i64>,
    a: &SessionEntrant,
    b: &SessionEntrant,
) -> Ordering {
    let lap_a = best_laps.get(&a.car.driver_guid).copied().unwrap_or(0);
    let lap_b = best_laps.get(&b.car.driver_guid).copied().unwrap_or(0);

    match (lap_a, lap_b) {
        (0, 0) => Ordering::Equal,
        (0, _) => Ordering::Greater,
        (_, 0) => Ordering::Less,
        _ => lap_a.cmp(&lap_b),
    }
}

/// Aggregate best lap per driver across the configured external results
/// files, then order as FastestLap.
fn fastest_across_results(
    ctx: &FilterContext<'_>,
    entrants: &mut [SessionEntrant],
    filter: Option<&SessionFilter>,
) -> Result<()> {
    let Some(filter) = filter else {
        return Ok(());
    };

    let mut best_laps: HashMap<String, i64> = HashMap::new();

    for result_file in &filter.available_results_for_sorting {
        let result = ctx.results.load(result_file)?;

        for row in &result.results {
            if row.best_lap == 0 {
                continue;
            }

            let best = best_laps.entry(row.driver_guid.clone()).or_insert(0);
            if *best == 0 || row.best_lap < *best {
                *best = row.best_lap;
            }
        }
    }

    entrants.sort_by(|a, b| cmp_best_lap_in(&best_laps, a, b));

    Ok(())
}

/// Aggregate lap count per driver across the configured external results
/// files, then order by descending lap count.
fn laps_across_results(
    ctx: &FilterContext<'_>,
    entrants: &mut [SessionEntrant],
    filter: Option<&SessionFilter>,
) -> Result<()> {
    let Some(filter) = filter else {
        return Ok(());
    };

    let mut lap_counts: HashMap<String, usize> = HashMap::new();

    for result_file in &filter.available_results_for_sorting {
        let result = ctx.results.load(result_file)?;

        for row in &result.results {
            *lap_counts.entry(row.driver_guid.clone()).or_default() +=
                result.num_laps(&row.driver_guid, &row.car_model);
        }
    }

    entrants.sort_by(|a, b| {
        let laps_a = lap_counts.get(&a.car.driver_guid).copied().unwrap_or(0);
        let laps_b = lap_counts.get(&b.car.driver_guid).copied().unwrap_or(0);
        laps_b.cmp(&laps_a)
    });

    Ok(())
}

/// Orders a class's entrants by championship standings position. Entrants
/// absent from the standings keep their relative order behind everyone
/// placed.
fn championship_standings_sort(ctx: &FilterContext<'_>, entrants: &mut [SessionEntrant]) {
    let Some(championship) = ctx.weekend.championship.as_ref() else {
        return;
    };

    let Some(first) = entrants.first() else {
        return;
    };

    let Some(standings) = championship.standings_for_class(first.result.class_id) else {
        return;
    };

    entrants.sort_by_key(|entrant| {
        standings
            .iter()
            .position(|guid| *guid == entrant.car.driver_guid)
            .unwrap_or(standings.len())
    });
}

/// Groups entrants by championship class id, in lexical class-id order.
/// Performs no ordering within a class.
fn championship_class_sort(ctx: &FilterContext<'_>, entrants: &mut [SessionEntrant]) {
    if !ctx.weekend.has_linked_championship() {
        return;
    }

    entrants.sort_by_key(|entrant| entrant.result.class_id);
}
