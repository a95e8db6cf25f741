//! Session-to-session filtering: turns a parent session's results into a
//! child session's entry list.

use serde::{Deserialize, Serialize};

use crate::entry_list::EntryList;
use crate::error::Result;
use crate::models::{RaceWeekend, ResultsStore, Session, SessionEntrant};
use crate::setup::{self, SetupStore};
use crate::sort;

/// Configuration for one parent -> child session edge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFilter {
    /// Preview runs never produce side effects such as tyre-locked setups.
    #[serde(default)]
    pub is_preview: bool,

    /// 1-based start of the split taken from the parent session's result.
    pub result_start: i32,
    /// 1-based exclusive end of the split.
    pub result_end: i32,

    /// How many entrants to reverse: -1 all, 0 none, or the first N.
    #[serde(default)]
    pub num_entrants_to_reverse: i32,

    /// 1-based pit box at which entrants are placed in the child session.
    pub entry_list_start: i32,

    /// Stable key of the sort strategy. Unknown keys degrade to unchanged.
    #[serde(default)]
    pub sort_type: String,

    /// Start every placed entrant on the tyre compound of their fastest lap
    /// in the parent session.
    #[serde(default)]
    pub force_use_tyre_from_fastest_lap: bool,

    /// External results-file ids consumed by the multi-file strategies.
    #[serde(default)]
    pub available_results_for_sorting: Vec<String>,

    /// Pick drivers by guid instead of by result range.
    #[serde(default)]
    pub manual_driver_selection: bool,
    #[serde(default)]
    pub selected_driver_guids: Vec<String>,
}

/// Borrowed environment for one filter invocation.
///
/// A derivation is synchronous and owns its working slices; the surrounding
/// system must not run two derivations for the same race weekend at once.
pub struct FilterContext<'a> {
    pub weekend: &'a RaceWeekend,
    pub results: &'a ResultsStore,
    pub setups: &'a SetupStore,
}

/// Reverses the first `num_to_reverse` entrants in place. -1 reverses all,
/// 0 is a no-op, and counts beyond the slice length clamp to it.
pub fn reverse_entrants(num_to_reverse: i32, entrants: &mut [SessionEntrant]) {
    if num_to_reverse == 0 {
        return;
    }

    let len = entrants.len();
    let count = if num_to_reverse < 0 { len } else { (num_to_reverse as usize).min(len) };

    entrants[..count].reverse();
}

impl SessionFilter {
    /// Filters entrants formed from the parent session's results into the
    /// child session's entry list.
    ///
    /// When the parent has completed, results are sorted (per class, with
    /// the reversal applied inside that pass) before the split is taken.
    /// For previews of an unfinished parent the reversal is applied here
    /// instead; the two paths are mutually exclusive so a split is never
    /// reversed twice.
    pub fn filter(
        &self,
        ctx: &FilterContext<'_>,
        parent: &Session,
        child: &Session,
        parent_results: &mut [SessionEntrant],
        child_entry_list: &mut EntryList,
    ) -> Result<()> {
        if parent.completed() && !child.is_base() {
            let strategy = sort::sorter_for_key(&self.sort_type);

            sort::per_class_sort(
                strategy,
                ctx,
                parent,
                parent_results,
                Some(self),
                self.num_entrants_to_reverse,
            )?;
        }

        let entry_list_start = self.entry_list_start - 1;

        let mut split: Vec<SessionEntrant> = if self.manual_driver_selection {
            // first identity match per configured guid; unmatched guids are
            // silently skipped
            self.selected_driver_guids
                .iter()
                .filter_map(|guid| {
                    parent_results.iter().find(|entrant| entrant.car.driver_guid == *guid)
                })
                .cloned()
                .collect()
        } else {
            let result_start = (self.result_start - 1).max(0) as usize;

            if result_start > parent_results.len() {
                // a range beyond the population is an intentionally empty
                // split, not an error
                return Ok(());
            }

            let result_end =
                (self.result_end.max(0) as usize).min(parent_results.len()).max(result_start);

            parent_results[result_start..result_end].to_vec()
        };

        if !parent.completed() {
            reverse_entrants(self.num_entrants_to_reverse, &mut split);
        }

        for (offset, mut entrant) in split.into_iter().enumerate() {
            let pit_box = entry_list_start + offset as i32;
            entrant.session_id = parent.id;

            if !self.is_preview && parent.completed() && self.force_use_tyre_from_fastest_lap {
                self.lock_tyre_from_fastest_lap(ctx, child, &mut entrant);
            }

            child_entry_list.add_in_pit_box(entrant, pit_box);
        }

        Ok(())
    }

    /// Best-effort: derives and persists a locked-tyre setup for one placed
    /// entrant. Failure is logged and skipped, never propagated.
    fn lock_tyre_from_fastest_lap(
        &self,
        ctx: &FilterContext<'_>,
        child: &Session,
        entrant: &mut SessionEntrant,
    ) {
        let fastest_lap = entrant.fastest_lap().cloned();

        let Some(fastest_lap) = fastest_lap else {
            log::warn!(
                "could not find fastest lap for entrant {} ({}). will not lock their tyre choice.",
                entrant.car.driver_name,
                entrant.car.driver_guid
            );
            return;
        };

        match setup::build_locked_tyre_setup(ctx.weekend, child, entrant, &fastest_lap, ctx.setups)
        {
            Ok(path) => entrant.override_setup_file = Some(path),
            Err(err) => {
                log::error!(
                    "could not build locked tyre setup for entrant {} ({}): {}",
                    entrant.car.driver_name,
                    entrant.car.driver_guid,
                    err
                );
            }
        }
    }
}
