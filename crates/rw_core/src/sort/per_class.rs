//! Class-aware grid assembly.
//!
//! Every strategy runs wrapped per class: entrants are partitioned by class
//! id, classes are ordered, and each class's block is sorted, reversed and
//! stabilized independently before being written back contiguously.

use std::collections::HashMap;

use uuid::Uuid;

use super::SortStrategy;
use crate::error::Result;
use crate::filter::{reverse_entrants, FilterContext, SessionFilter};
use crate::models::{Championship, Session, SessionEntrant};

/// Runs `strategy` independently for each class and reassembles the grid as
/// contiguous class blocks.
///
/// Class order: ascending minimum nonzero best lap when every class has one
/// (fastest class's grid first); lexical class-id order for base sessions,
/// where no lap data exists yet, so splits stay reproducible; discovery
/// order otherwise. `num_to_reverse` is the configured reversal count,
/// applied to each class block after its sort.
pub fn per_class_sort(
    strategy: SortStrategy,
    ctx: &FilterContext<'_>,
    session: &Session,
    entrants: &mut [SessionEntrant],
    filter: Option<&SessionFilter>,
    num_to_reverse: i32,
) -> Result<()> {
    if strategy == SortStrategy::ChampionshipClass && ctx.weekend.has_linked_championship() {
        // stable non-results grouping; class blocks keep their internal
        // order, so the per-class pass is skipped entirely
        return strategy.sort(ctx, session, entrants, filter);
    }

    // discovery order of class ids
    let mut classes: Vec<Uuid> = Vec::new();
    let mut fastest_for_class: HashMap<Uuid, i64> = HashMap::new();
    let mut entrants_for_class: HashMap<Uuid, Vec<SessionEntrant>> = HashMap::new();

    for entrant in entrants.iter() {
        let class_id = entrant.result.class_id;

        if !entrants_for_class.contains_key(&class_id) {
            classes.push(class_id);
        }

        if entrant.result.best_lap > 0 {
            let fastest = fastest_for_class.entry(class_id).or_insert(entrant.result.best_lap);
            *fastest = (*fastest).min(entrant.result.best_lap);
        }

        entrants_for_class.entry(class_id).or_default().push(entrant.clone());
    }

    if fastest_for_class.len() == classes.len() {
        // every class has a timed lap: fastest class's grid comes first
        classes.sort_by_key(|class_id| fastest_for_class[class_id]);
    } else if session.is_base() {
        // base sessions have no lap data; lexical class-id order keeps
        // entrant splits consistent between runs
        classes.sort();
    }
    // otherwise classes stay in discovery order

    let mut write_pos = 0;

    for class_id in classes {
        let mut class_entrants = entrants_for_class.remove(&class_id).unwrap_or_default();

        strategy.sort(ctx, session, &mut class_entrants, filter)?;

        reverse_entrants(num_to_reverse, &mut class_entrants);

        match (strategy, ctx.weekend.championship.as_ref()) {
            (SortStrategy::ChampionshipStandings, Some(championship)) => {
                move_zero_attendance_to_back(championship, &mut class_entrants);
            }
            _ => move_zero_time_to_back(&mut class_entrants),
        }

        for entrant in class_entrants {
            entrants[write_pos] = entrant;
            write_pos += 1;
        }
    }

    Ok(())
}

/// Stable pass moving every entrant without a recorded total time behind
/// every classified entrant. Classified entrants keep their relative order.
pub fn move_zero_time_to_back(entrants: &mut [SessionEntrant]) {
    entrants.sort_by_key(|entrant| entrant.result.total_time == 0);
}

/// Stable pass moving every entrant with zero championship-round attendance
/// behind everyone who has raced. Attending entrants keep their relative
/// order.
pub fn move_zero_attendance_to_back(
    championship: &Championship,
    entrants: &mut [SessionEntrant],
) {
    entrants.sort_by_key(|entrant| championship.entrant_attendance(&entrant.car.driver_guid) == 0);
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap as StdHashMap;
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::*;
    use crate::models::{
        ChampionshipClass, EntrantCar, EntrantResult, RaceWeekend, ResultsStore, SessionResults,
        SessionType,
    };
    use crate::setup::SetupStore;

    fn entrant(guid: &str, best_lap: i64, total_time: i64, class_id: Uuid) -> SessionEntrant {
        SessionEntrant {
            session_id: Uuid::nil(),
            car: EntrantCar {
                driver_guid: guid.to_string(),
                driver_name: guid.to_string(),
                model: "car".to_string(),
            },
            result: EntrantResult { best_lap, total_time, class_id },
            session_results: Arc::new(SessionResults::default()),
            pit_box: 0,
            override_setup_file: None,
        }
    }

    fn order(entrants: &[SessionEntrant]) -> Vec<&str> {
        entrants.iter().map(|e| e.car.driver_guid.as_str()).collect()
    }

    struct Env {
        weekend: RaceWeekend,
        results: ResultsStore,
        setups: SetupStore,
    }

    impl Env {
        fn new() -> Self {
            Self {
                weekend: RaceWeekend::new("Test Weekend"),
                results: ResultsStore::new("."),
                setups: SetupStore::new("."),
            }
        }

        fn ctx(&self) -> FilterContext<'_> {
            FilterContext { weekend: &self.weekend, results: &self.results, setups: &self.setups }
        }
    }

    fn race_session() -> Session {
        let mut session = Session::new("Heat 1", SessionType::Race);
        session.parent_ids.push(Uuid::new_v4());
        session
    }

    #[test]
    fn fastest_class_block_comes_first() {
        let env = Env::new();
        let class_a = Uuid::from_u128(10);
        let class_b = Uuid::from_u128(20);
        let mut entrants = vec![
            entrant("a-slow", 90_000, 1_000, class_a),
            entrant("a-fast", 85_000, 1_000, class_a),
            entrant("b-only", 95_000, 1_000, class_b),
        ];

        per_class_sort(
            SortStrategy::FastestLap,
            &env.ctx(),
            &race_session(),
            &mut entrants,
            None,
            0,
        )
        .unwrap();

        // class A (min 85000) precedes class B (min 95000)
        assert_eq!(order(&entrants), ["a-fast", "a-slow", "b-only"]);
    }

    #[test]
    fn base_sessions_fall_back_to_lexical_class_order() {
        let env = Env::new();
        let session = Session::new("Entry", SessionType::Practice);
        assert!(session.is_base());

        let class_a = Uuid::from_u128(1);
        let class_b = Uuid::from_u128(2);
        // no lap data anywhere, discovered b-first
        let mut entrants = vec![
            entrant("b1", 0, 0, class_b),
            entrant("a1", 0, 0, class_a),
            entrant("b2", 0, 0, class_b),
        ];

        per_class_sort(SortStrategy::Unchanged, &env.ctx(), &session, &mut entrants, None, 0)
            .unwrap();

        assert_eq!(order(&entrants), ["a1", "b1", "b2"]);
    }

    #[test]
    fn non_base_sessions_without_full_lap_data_keep_discovery_order() {
        let env = Env::new();
        let class_a = Uuid::from_u128(1);
        let class_b = Uuid::from_u128(2);
        // class B discovered first and has no timed lap
        let mut entrants = vec![
            entrant("b1", 0, 0, class_b),
            entrant("a1", 90_000, 1_000, class_a),
        ];

        per_class_sort(
            SortStrategy::Unchanged,
            &env.ctx(),
            &race_session(),
            &mut entrants,
            None,
            0,
        )
        .unwrap();

        assert_eq!(order(&entrants), ["b1", "a1"]);
    }

    #[test]
    fn reversal_applies_to_each_class_block_independently() {
        let env = Env::new();
        let class_a = Uuid::from_u128(1);
        let class_b = Uuid::from_u128(2);
        let mut entrants = vec![
            entrant("a1", 85_000, 1_000, class_a),
            entrant("a2", 86_000, 1_000, class_a),
            entrant("a3", 87_000, 1_000, class_a),
            entrant("b1", 95_000, 1_000, class_b),
            entrant("b2", 96_000, 1_000, class_b),
        ];

        per_class_sort(
            SortStrategy::FastestLap,
            &env.ctx(),
            &race_session(),
            &mut entrants,
            None,
            2,
        )
        .unwrap();

        // first two reversed within each class, third untouched
        assert_eq!(order(&entrants), ["a2", "a1", "a3", "b2", "b1"]);
    }

    #[test]
    fn unclassified_entrants_move_behind_their_class() {
        let env = Env::new();
        let class_a = Uuid::nil();
        let mut entrants = vec![
            entrant("dnf", 84_000, 0, class_a),
            entrant("p2", 86_000, 1_100, class_a),
            entrant("p1", 85_000, 1_000, class_a),
        ];

        per_class_sort(
            SortStrategy::FastestLap,
            &env.ctx(),
            &race_session(),
            &mut entrants,
            None,
            0,
        )
        .unwrap();

        // "dnf" set the fastest lap but has no total time
        assert_eq!(order(&entrants), ["p1", "p2", "dnf"]);
    }

    #[test]
    fn standings_order_stabilizes_by_attendance_instead_of_time() {
        let mut env = Env::new();
        let class_id = Uuid::nil();
        env.weekend.championship = Some(Championship {
            id: Uuid::new_v4(),
            name: "Cup".to_string(),
            classes: vec![ChampionshipClass {
                id: class_id,
                name: "GT3".to_string(),
                standings: vec![
                    "leader".to_string(),
                    "newcomer".to_string(),
                    "second".to_string(),
                ],
            }],
            attendance: StdHashMap::from([
                ("leader".to_string(), 3),
                ("second".to_string(), 2),
            ]),
        });

        // all entrants unclassified; time-based stabilization would scramble
        // a standings grid, attendance-based keeps it
        let mut entrants = vec![
            entrant("second", 0, 0, class_id),
            entrant("leader", 0, 0, class_id),
            entrant("newcomer", 0, 0, class_id),
        ];

        per_class_sort(
            SortStrategy::ChampionshipStandings,
            &env.ctx(),
            &race_session(),
            &mut entrants,
            None,
            0,
        )
        .unwrap();

        // "newcomer" is second in the standings but has attended no rounds
        assert_eq!(order(&entrants), ["leader", "second", "newcomer"]);
    }

    #[test]
    fn championship_class_bypasses_per_class_handling() {
        let mut env = Env::new();
        env.weekend.championship = Some(Championship {
            id: Uuid::new_v4(),
            name: "Cup".to_string(),
            classes: Vec::new(),
            attendance: StdHashMap::new(),
        });
        let class_a = Uuid::from_u128(1);
        let class_b = Uuid::from_u128(2);
        let mut entrants = vec![
            entrant("b1", 0, 0, class_b),
            entrant("a2", 0, 0, class_a),
            entrant("a1", 0, 0, class_a),
        ];

        // reversal and stabilization are skipped outright: blocks are only
        // grouped, inner order untouched
        per_class_sort(
            SortStrategy::ChampionshipClass,
            &env.ctx(),
            &race_session(),
            &mut entrants,
            None,
            -1,
        )
        .unwrap();

        assert_eq!(order(&entrants), ["a2", "a1", "b1"]);
    }

    #[test]
    fn repeated_runs_give_identical_grids() {
        let env = Env::new();
        let class_a = Uuid::from_u128(7);
        let class_b = Uuid::from_u128(3);
        let build = || {
            vec![
                entrant("a1", 90_000, 1_000, class_a),
                entrant("b1", 88_000, 1_000, class_b),
                entrant("a2", 0, 0, class_a),
                entrant("b2", 89_000, 1_000, class_b),
            ]
        };

        let mut first = build();
        let mut second = build();
        for entrants in [&mut first, &mut second] {
            per_class_sort(
                SortStrategy::FastestLap,
                &env.ctx(),
                &race_session(),
                entrants,
                None,
                1,
            )
            .unwrap();
        }

        assert_eq!(order(&first), order(&second));
    }

    proptest! {
        #[test]
        fn zero_time_stabilization_keeps_nonzero_relative_order(
            times in proptest::collection::vec(0i64..5, 0..24)
        ) {
            let mut entrants: Vec<SessionEntrant> = times
                .iter()
                .enumerate()
                .map(|(i, t)| entrant(&format!("d{}", i), 0, *t, Uuid::nil()))
                .collect();

            let nonzero_before: Vec<String> = entrants
                .iter()
                .filter(|e| e.result.total_time != 0)
                .map(|e| e.car.driver_guid.clone())
                .collect();

            move_zero_time_to_back(&mut entrants);

            let nonzero_after: Vec<String> = entrants
                .iter()
                .take(nonzero_before.len())
                .map(|e| e.car.driver_guid.clone())
                .collect();

            // every zero-time entrant sits behind every nonzero one, and the
            // nonzero entrants keep their relative order
            prop_assert_eq!(nonzero_before, nonzero_after);
            prop_assert!(entrants
                .iter()
                .skip_while(|e| e.result.total_time != 0)
                .all(|e| e.result.total_time == 0));
        }
    }
}
