//! Requirement catalog: per-stage, per-division ordered checklists.
//!
//! The catalog is static for the lifetime of a tracker session. The built-in
//! catalog covers the six delivery stages and the VSC/VSS divisions; a YAML
//! file can replace it wholesale (see [`RequirementCatalog::load`]).

use crate::error::{GateError, Result};
use crate::types::Division;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stage {
    pub name: String,
    /// Display order; lower values come first.
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    #[serde(default)]
    pub requirements: BTreeMap<Division, Vec<String>>,
}

impl Stage {
    pub fn requirements_for(&self, division: &Division) -> &[String] {
        self.requirements
            .get(division)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_requirement(&self, division: &Division, requirement: &str) -> bool {
        self.requirements_for(division)
            .iter()
            .any(|r| r == requirement)
    }
}

// ---------------------------------------------------------------------------
// RequirementCatalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequirementCatalog {
    stages: Vec<Stage>,
}

impl RequirementCatalog {
    /// Build a catalog, sorting stages by `order` and rejecting shapes the
    /// status key format cannot represent unambiguously.
    pub fn new(mut stages: Vec<Stage>) -> Result<Self> {
        let mut names = HashSet::new();
        let mut orders = HashSet::new();
        for stage in &stages {
            if stage.name.trim().is_empty() {
                return Err(GateError::InvalidCatalog("stage name is empty".to_string()));
            }
            if stage.name.contains('-') {
                return Err(GateError::InvalidCatalog(format!(
                    "stage name '{}' must not contain '-'",
                    stage.name
                )));
            }
            if !names.insert(stage.name.to_lowercase()) {
                return Err(GateError::InvalidCatalog(format!(
                    "duplicate stage '{}'",
                    stage.name
                )));
            }
            if !orders.insert(stage.order) {
                return Err(GateError::InvalidCatalog(format!(
                    "stage '{}' reuses order {}",
                    stage.name, stage.order
                )));
            }
            for (division, reqs) in &stage.requirements {
                let mut seen = HashSet::new();
                for req in reqs {
                    if req.trim().is_empty() {
                        return Err(GateError::InvalidCatalog(format!(
                            "empty requirement in stage '{}' for division {division}",
                            stage.name
                        )));
                    }
                    if !seen.insert(req.as_str()) {
                        return Err(GateError::InvalidCatalog(format!(
                            "duplicate requirement '{req}' in stage '{}' for division {division}",
                            stage.name
                        )));
                    }
                }
            }
        }
        stages.sort_by_key(|s| s.order);
        Ok(Self { stages })
    }

    /// Read a YAML list of stages.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let stages: Vec<Stage> = serde_yaml::from_str(&data)?;
        Self::new(stages)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.stages)?)
    }

    /// Stages in display order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Index of `name` in display order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.name == name)
    }

    /// Ordered requirement names for `(stage, division)`. Unknown stages and
    /// unknown divisions both yield an empty list.
    pub fn requirements_for(&self, stage: &str, division: &Division) -> &[String] {
        self.stage(stage)
            .map(|s| s.requirements_for(division))
            .unwrap_or(&[])
    }

    pub fn knows_division(&self, division: &Division) -> bool {
        self.stages
            .iter()
            .any(|s| s.requirements.contains_key(division))
    }

    pub fn divisions(&self) -> BTreeSet<&Division> {
        self.stages
            .iter()
            .flat_map(|s| s.requirements.keys())
            .collect()
    }

    /// Longest requirement list across stages for `division`: the row count
    /// of the tracker board.
    pub fn max_requirements(&self, division: &Division) -> usize {
        self.stages
            .iter()
            .map(|s| s.requirements_for(division).len())
            .max()
            .unwrap_or(0)
    }

    pub fn builtin() -> Self {
        let stages = BUILTIN
            .iter()
            .enumerate()
            .map(|(i, b)| Stage {
                name: b.name.to_string(),
                order: i as u32,
                document_url: Some(format!("{DOCUMENTS_BASE_URL}/{}", b.name)),
                requirements: BTreeMap::from([
                    (Division::vsc(), to_owned(b.vsc)),
                    (Division::vss(), to_owned(b.vss)),
                ]),
            })
            .collect();
        Self { stages }
    }
}

impl Default for RequirementCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Built-in data
// ---------------------------------------------------------------------------

pub const DOCUMENTS_BASE_URL: &str = "https://yourcompany.sharepoint.com/sites";

struct BuiltinStage {
    name: &'static str,
    vsc: &'static [&'static str],
    vss: &'static [&'static str],
}

const BUILTIN: &[BuiltinStage] = &[
    BuiltinStage {
        name: "Ideation",
        vsc: &[
            "Project Name",
            "Development Sponsor",
            "Development Owner",
            "Objective",
            "Drivers",
            "Scope (Products, Service Levels, Volumes, Processes etc)",
            "Stakeholder Functions",
            "5 Yr Plan, Input / Output Model, and Capacity Model",
        ],
        vss: &[
            "Project Charter",
            "Project Sponsor",
            "Resource Assignment",
            "Project Initiation Document (PID)",
            "Project Requirements Document (PRD)",
        ],
    },
    BuiltinStage {
        name: "Scope",
        vsc: &[
            "Updates to all previous stage documents",
            "Teams Site & Structure",
            "Deliverables",
            "Exclusions",
            "Business Options Pugh Matrix",
            "Expected Benefits incl. how to measure, when, and by whom",
            "Expected Drawbacks",
            "Risks & Issues Log (including constraints & assumptions)",
            "Schedule & Milestones (Stakeholder Reviewed)",
            "Budget inc. % Accuracy Assessment",
            "Deliverables & Lessons Checklist",
        ],
        vss: &[
            "Updates to all previous stage gate documents",
            "Product Backlog",
            "High-level Architecture Diagram",
            "MVP Definition",
        ],
    },
    BuiltinStage {
        name: "Planning",
        vsc: &[
            "Updates to all previous stage documents",
            "Project Org inc. PM Approach",
            "Equipment List & Specs, including Software and Test Equipment",
            "Facility Spec / Survey / Dwgs",
            "Equipment Utility Requirements",
            "Layout (Stakeholder Reviewed)",
            "Design & Bidding Phase quotes (architect)",
            "Post-Project Org Chart, Job Descriptions, and Salary Band Reviews",
            "Development CEP PPT",
            "Development CEP Financial Model",
        ],
        vss: &[
            "Updates to all previous stage gate documents",
            "Risk Assessment",
            "Impediment Log",
            "Release Planning Document (RPD)",
            "Wireframes",
        ],
    },
    BuiltinStage {
        name: "Development",
        vsc: &[
            "Updates to all previous stage documents",
            "Execution Phase quotes (all vendors, including construction & equipment)",
            "Realisation CEP PPT Pack",
            "Realisation CEP Financial Model",
            "Realisation CEP CRW",
        ],
        vss: &[
            "Updates to all previous stage gate documents",
            "Sprint Plans",
            "Sprint Reviews",
            "Sprint Retrospectives",
            "Data Design Specification (DDS)",
            "Solution Design Specification (SDS)",
        ],
    },
    BuiltinStage {
        name: "Realisation",
        vsc: &[
            "Updates to all previous stage documents",
            "Note: All files to be created at workstream level and collated at project level",
            "Workstream Scope Breakdown",
            "Gantt",
            "Action Tracker",
            "Cost Tracker",
            "Communications Plan",
            "Project Call Slide Pack inc. Workstream One-Pagers",
            "SteerCo Slide Pack",
            "Control Calls – Individual Workstreams, Project Team, and SteerCo",
            "Decision Log (Changes since CEP)",
        ],
        vss: &[
            "Updates to all previous stage gate documents",
            "Solution Deployment",
            "Post-deployment log (bugs + support)",
        ],
    },
    BuiltinStage {
        name: "Review",
        vsc: &[
            "Updates to all previous stage documents",
            "Lessons Learned Report",
            "Expected Benefits Review (refer to stage 2)",
            "Finalised Control Documents",
            "Teams Site Archived",
        ],
        vss: &[
            "Updates to all previous stage gate documents",
            "User Documentation",
            "Lessons Learned",
            "Customer Feedback Analysis",
        ],
    },
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
