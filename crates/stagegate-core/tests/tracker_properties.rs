//! Property and scenario tests for the stage-gate interaction controller.

use proptest::prelude::*;
use stagegate_core::catalog::{RequirementCatalog, Stage};
use stagegate_core::gate::{is_stage_complete, CompletedGateFlags};
use stagegate_core::status::ProjectStageState;
use stagegate_core::store::{MemoryStore, StatusStore};
use stagegate_core::tracker::StageGateTracker;
use stagegate_core::types::{Division, Indicator, ProjectId};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn project() -> ProjectId {
    ProjectId::new("prop-1").unwrap()
}

fn stage(name: &str, order: u32, reqs: &[&str]) -> Stage {
    let mut requirements = BTreeMap::new();
    requirements.insert(
        Division::vsc(),
        reqs.iter().map(|r| r.to_string()).collect(),
    );
    Stage {
        name: name.to_string(),
        order,
        document_url: None,
        requirements,
    }
}

fn three_stage_catalog() -> RequirementCatalog {
    RequirementCatalog::new(vec![
        stage("Ideation", 1, &["Objective", "Drivers", "Sponsor"]),
        stage("Scope", 2, &["Deliverables", "Exclusions"]),
        stage("Planning", 3, &["Layout", "Gantt", "Budget"]),
    ])
    .unwrap()
}

fn arb_indicator() -> impl Strategy<Value = Indicator> {
    prop_oneof![
        Just(Indicator::Empty),
        Just(Indicator::Complete),
        Just(Indicator::Reviewed),
    ]
}

fn arb_division() -> impl Strategy<Value = Division> {
    prop_oneof![Just(Division::vsc()), Just(Division::vss())]
}

/// One indicator per catalog slot (VSC and VSS both covered), plus a stale
/// key that no division lists.
fn arb_state() -> impl Strategy<Value = ProjectStageState> {
    (prop::collection::vec(arb_indicator(), 80), arb_indicator()).prop_map(|(values, stale)| {
        let catalog = RequirementCatalog::builtin();
        let mut state = ProjectStageState::new();
        let mut values = values.into_iter().cycle();
        for s in catalog.stages() {
            for division in [Division::vsc(), Division::vss()] {
                for req in s.requirements_for(&division) {
                    if let Some(v) = values.next() {
                        state.set(&s.name, req, v);
                    }
                }
            }
        }
        state.set("Ideation", "Retired Requirement", stale);
        state
    })
}

fn seeded_store(state: &ProjectStageState) -> MemoryStore {
    let mut store = MemoryStore::new();
    store.save(&project(), state).unwrap();
    store
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn derivation_is_idempotent(state in arb_state(), division in arb_division()) {
        let catalog = RequirementCatalog::builtin();
        for s in catalog.stages() {
            let first = is_stage_complete(&catalog, &s.name, &division, &state);
            let second = is_stage_complete(&catalog, &s.name, &division, &state);
            prop_assert_eq!(first, second);
        }
        prop_assert_eq!(
            CompletedGateFlags::derive(&catalog, &division, &state),
            CompletedGateFlags::derive(&catalog, &division, &state)
        );
    }

    #[test]
    fn stage_without_requirements_is_never_complete(state in arb_state()) {
        let catalog = RequirementCatalog::builtin();
        let division = Division::new("NONE");
        for s in catalog.stages() {
            prop_assert!(!is_stage_complete(&catalog, &s.name, &division, &state));
        }
    }

    #[test]
    fn cell_click_cycles_with_period_three(stage_idx in 0usize..6, req_idx in 0usize..20, division in arb_division()) {
        let catalog = RequirementCatalog::builtin();
        let s = &catalog.stages()[stage_idx];
        let reqs = s.requirements_for(&division);
        let req = &reqs[req_idx % reqs.len()];
        let mut store = MemoryStore::new();
        let mut tracker = StageGateTracker::open(project(), division, &catalog, &mut store).unwrap();

        prop_assert_eq!(tracker.click_cell(&s.name, req).unwrap(), Indicator::Complete);
        prop_assert_eq!(tracker.click_cell(&s.name, req).unwrap(), Indicator::Reviewed);
        prop_assert_eq!(tracker.click_cell(&s.name, req).unwrap(), Indicator::Empty);
        prop_assert_eq!(tracker.indicator(&s.name, req), Indicator::Empty);
    }

    #[test]
    fn double_click_resets_stage_and_later_only(
        state in arb_state(),
        division in arb_division(),
        stage_idx in 0usize..6,
    ) {
        let catalog = RequirementCatalog::builtin();
        let mut store = seeded_store(&state);
        let mut tracker =
            StageGateTracker::open(project(), division.clone(), &catalog, &mut store).unwrap();
        let clicked = catalog.stages()[stage_idx].name.clone();
        tracker.click_stage_header(&clicked, 2).unwrap();

        for (i, s) in catalog.stages().iter().enumerate() {
            for req in s.requirements_for(&division) {
                let now = tracker.indicator(&s.name, req);
                if i >= stage_idx {
                    prop_assert_eq!(now, Indicator::Empty);
                } else {
                    prop_assert_eq!(now, state.get(&s.name, req));
                }
            }
            if i >= stage_idx {
                prop_assert!(!tracker.is_stage_complete(&s.name));
            }
        }
        prop_assert_eq!(
            tracker.indicator("Ideation", "Retired Requirement"),
            state.get("Ideation", "Retired Requirement")
        );
    }

    #[test]
    fn triple_click_touches_only_that_stage(
        state in arb_state(),
        division in arb_division(),
        stage_idx in 0usize..6,
    ) {
        let catalog = RequirementCatalog::builtin();
        let mut store = seeded_store(&state);
        let mut tracker =
            StageGateTracker::open(project(), division.clone(), &catalog, &mut store).unwrap();
        let clicked = catalog.stages()[stage_idx].name.clone();
        tracker.click_stage_header(&clicked, 3).unwrap();

        for (i, s) in catalog.stages().iter().enumerate() {
            for req in s.requirements_for(&division) {
                let now = tracker.indicator(&s.name, req);
                if i == stage_idx {
                    prop_assert_eq!(now, Indicator::Complete);
                } else {
                    prop_assert_eq!(now, state.get(&s.name, req));
                }
            }
        }
        prop_assert!(tracker.is_stage_complete(&clicked));
    }

    #[test]
    fn saved_state_matches_memory(
        state in arb_state(),
        stage_idx in 0usize..6,
        clicks in 1u32..5,
    ) {
        let catalog = RequirementCatalog::builtin();
        let mut store = seeded_store(&state);
        let clicked = catalog.stages()[stage_idx].name.clone();
        let in_memory = {
            let mut tracker =
                StageGateTracker::open(project(), Division::vsc(), &catalog, &mut store).unwrap();
            tracker.click_stage_header(&clicked, clicks).unwrap();
            tracker.state().clone()
        };
        prop_assert_eq!(store.load(&project()).unwrap(), in_memory);
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn single_click_header_toggles_three_requirements() {
    let catalog = three_stage_catalog();
    let mut store = MemoryStore::new();
    let mut tracker =
        StageGateTracker::open(project(), Division::vsc(), &catalog, &mut store).unwrap();

    tracker.click_stage_header("Ideation", 1).unwrap();
    for req in ["Objective", "Drivers", "Sponsor"] {
        assert_eq!(tracker.indicator("Ideation", req), Indicator::Complete);
    }
    assert!(tracker.is_stage_complete("Ideation"));

    tracker.click_stage_header("Ideation", 1).unwrap();
    for req in ["Objective", "Drivers", "Sponsor"] {
        assert_eq!(tracker.indicator("Ideation", req), Indicator::Empty);
    }
    assert!(!tracker.is_stage_complete("Ideation"));
}

#[test]
fn double_click_scope_resets_scope_and_planning() {
    let catalog = three_stage_catalog();
    let mut store = MemoryStore::new();
    let mut tracker =
        StageGateTracker::open(project(), Division::vsc(), &catalog, &mut store).unwrap();

    tracker.click_stage_header("Ideation", 3).unwrap();
    tracker.click_stage_header("Scope", 3).unwrap();
    tracker.click_cell("Planning", "Gantt").unwrap();

    tracker.click_stage_header("Scope", 2).unwrap();
    assert!(tracker.is_stage_complete("Ideation"));
    assert!(!tracker.is_stage_complete("Scope"));
    assert!(!tracker.is_stage_complete("Planning"));
    assert_eq!(tracker.indicator("Scope", "Deliverables"), Indicator::Empty);
    assert_eq!(tracker.indicator("Planning", "Gantt"), Indicator::Empty);
    assert_eq!(tracker.indicator("Ideation", "Drivers"), Indicator::Complete);
}

#[test]
fn five_cell_clicks_follow_the_cycle() {
    let catalog = three_stage_catalog();
    let mut store = MemoryStore::new();
    let mut tracker =
        StageGateTracker::open(project(), Division::vsc(), &catalog, &mut store).unwrap();

    let seen: Vec<Indicator> = (0..5)
        .map(|_| tracker.click_cell("Scope", "Exclusions").unwrap())
        .collect();
    assert_eq!(
        seen,
        vec![
            Indicator::Complete,
            Indicator::Reviewed,
            Indicator::Empty,
            Indicator::Complete,
            Indicator::Reviewed,
        ]
    );
}
