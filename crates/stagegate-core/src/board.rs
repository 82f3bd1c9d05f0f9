//! Read model handed to whatever renders the tracker: per stage its
//! name, completion flag, document link and ordered requirement cells.

use crate::catalog::RequirementCatalog;
use crate::gate::{is_stage_complete, CompletedGateFlags, CurrentGate};
use crate::status::ProjectStageState;
use crate::types::{Division, Indicator, ProjectId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardCell {
    pub requirement: String,
    #[serde(skip)]
    pub indicator: Indicator,
    pub status: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardStage {
    pub name: String,
    pub order: u32,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    pub cells: Vec<BoardCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Board {
    pub project: ProjectId,
    pub division: Division,
    /// Longest requirement list across stages.
    pub row_count: usize,
    pub current_gate: CurrentGate,
    pub stages: Vec<BoardStage>,
    /// Stored statuses with no cell on this board (other division or a
    /// retired requirement).
    pub hidden_statuses: usize,
}

impl Board {
    pub fn build(
        project: &ProjectId,
        catalog: &RequirementCatalog,
        division: &Division,
        state: &ProjectStageState,
    ) -> Self {
        let stages = catalog
            .stages()
            .iter()
            .map(|s| BoardStage {
                name: s.name.clone(),
                order: s.order,
                complete: is_stage_complete(catalog, &s.name, division, state),
                document_url: s.document_url.clone(),
                cells: s
                    .requirements_for(division)
                    .iter()
                    .map(|req| {
                        let indicator = state.get(&s.name, req);
                        BoardCell {
                            requirement: req.clone(),
                            indicator,
                            status: indicator.as_str(),
                            color: indicator.color(),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            project: project.clone(),
            division: division.clone(),
            row_count: catalog.max_requirements(division),
            current_gate: CompletedGateFlags::derive(catalog, division, state).current_gate(),
            stages,
            hidden_statuses: state.stale_keys(catalog, division).count(),
        }
    }

    pub fn stage(&self, name: &str) -> Option<&BoardStage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Row-major view: row `i` holds each stage's `i`-th cell, or `None`
    /// where that stage has fewer requirements.
    pub fn rows(&self) -> Vec<Vec<Option<&BoardCell>>> {
        (0..self.row_count)
            .map(|i| self.stages.iter().map(|s| s.cells.get(i)).collect())
            .collect()
    }
}
