use crate::catalog::RequirementCatalog;
use crate::status::ProjectStageState;
use crate::types::Division;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Stage completion
// ---------------------------------------------------------------------------

/// A stage is complete iff it has at least one requirement for `division`
/// and none of them reads `Empty`. Zero requirements is never complete.
pub fn is_stage_complete(
    catalog: &RequirementCatalog,
    stage: &str,
    division: &Division,
    state: &ProjectStageState,
) -> bool {
    let requirements = catalog.requirements_for(stage, division);
    !requirements.is_empty()
        && requirements
            .iter()
            .all(|req| state.get(stage, req).is_satisfied())
}

// ---------------------------------------------------------------------------
// CompletedGateFlags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateFlag {
    pub stage: String,
    pub complete: bool,
}

/// Per-stage completion in catalog order. Always derived, never edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletedGateFlags {
    flags: Vec<GateFlag>,
}

impl CompletedGateFlags {
    pub fn derive(
        catalog: &RequirementCatalog,
        division: &Division,
        state: &ProjectStageState,
    ) -> Self {
        let flags = catalog
            .stages()
            .iter()
            .map(|s| GateFlag {
                stage: s.name.clone(),
                complete: is_stage_complete(catalog, &s.name, division, state),
            })
            .collect();
        Self { flags }
    }

    /// Case-insensitive lookup; `None` for stages outside the catalog.
    pub fn get(&self, stage: &str) -> Option<bool> {
        self.flags
            .iter()
            .find(|f| f.stage.eq_ignore_ascii_case(stage))
            .map(|f| f.complete)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GateFlag> {
        self.flags.iter()
    }

    pub fn all_complete(&self) -> bool {
        self.flags.iter().all(|f| f.complete)
    }

    pub fn completed_count(&self) -> usize {
        self.flags.iter().filter(|f| f.complete).count()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Lowercase-keyed map (`{"ideation": true, ...}`) as consumed by the
    /// project overview.
    pub fn to_legacy_map(&self) -> BTreeMap<String, bool> {
        self.flags
            .iter()
            .map(|f| (f.stage.to_lowercase(), f.complete))
            .collect()
    }

    pub fn current_gate(&self) -> CurrentGate {
        match self.flags.iter().find(|f| !f.complete) {
            Some(f) => CurrentGate::Stage(f.stage.clone()),
            None => CurrentGate::Complete,
        }
    }
}

// ---------------------------------------------------------------------------
// CurrentGate
// ---------------------------------------------------------------------------

/// The gate a project is currently working toward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "stage", rename_all = "snake_case")]
pub enum CurrentGate {
    /// First stage, in catalog order, that is not complete.
    Stage(String),
    Complete,
}

impl fmt::Display for CurrentGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrentGate::Stage(name) => f.write_str(name),
            CurrentGate::Complete => f.write_str("Complete"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
