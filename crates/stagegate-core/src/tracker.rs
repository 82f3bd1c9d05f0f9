//! Interaction controller for one project's stage-gate board.
//!
//! Applies cell and stage-header gestures to the in-memory
//! [`ProjectStageState`], re-derives [`CompletedGateFlags`] after every
//! mutation and writes the whole state through a [`StatusStore`].
//!
//! A mutation is applied before it is persisted. When every save attempt
//! fails the new state stays in memory, the tracker is marked dirty and
//! the caller gets [`GateError::Persist`]; [`StageGateTracker::flush`]
//! retries later.

use crate::board::Board;
use crate::catalog::RequirementCatalog;
use crate::config::Config;
use crate::error::{GateError, Result};
use crate::gate::{is_stage_complete, CompletedGateFlags, CurrentGate};
use crate::status::ProjectStageState;
use crate::store::StatusStore;
use crate::types::{Division, Indicator, ProjectId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_PERSIST_RETRIES: u32 = 2;

// ---------------------------------------------------------------------------
// HeaderGesture
// ---------------------------------------------------------------------------

/// What a click on a stage header does, keyed by the click count reported
/// by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderGesture {
    /// Whole stage to `Complete`, or back to `Empty` if it already was.
    Toggle,
    /// This stage and every later stage back to `Empty`.
    CascadeReset,
    /// This stage only, to `Complete`.
    CompleteStage,
}

impl HeaderGesture {
    /// 2 → cascade reset, 3 → complete stage, anything else → toggle.
    pub fn from_click_count(count: u32) -> Self {
        match count {
            2 => HeaderGesture::CascadeReset,
            3 => HeaderGesture::CompleteStage,
            _ => HeaderGesture::Toggle,
        }
    }
}

// ---------------------------------------------------------------------------
// StageGateTracker
// ---------------------------------------------------------------------------

pub struct StageGateTracker<'a, S: StatusStore + ?Sized> {
    project: ProjectId,
    division: Division,
    catalog: &'a RequirementCatalog,
    store: &'a mut S,
    state: ProjectStageState,
    gates: CompletedGateFlags,
    persist_retries: u32,
    dirty: bool,
}

impl<'a, S: StatusStore + ?Sized> StageGateTracker<'a, S> {
    /// Load the project's state (empty if never saved) and derive its gates.
    pub fn open(
        project: ProjectId,
        division: Division,
        catalog: &'a RequirementCatalog,
        store: &'a mut S,
    ) -> Result<Self> {
        if !catalog.knows_division(&division) {
            warn!(
                project = %project,
                division = %division,
                "division has no requirements in the catalog; board will be empty"
            );
        }
        let state = store.load_or_default(&project)?;
        let gates = CompletedGateFlags::derive(catalog, &division, &state);
        debug!(project = %project, division = %division, keys = state.len(), "opened tracker");
        Ok(Self {
            project,
            division,
            catalog,
            store,
            state,
            gates,
            persist_retries: DEFAULT_PERSIST_RETRIES,
            dirty: false,
        })
    }

    /// Open with division and retry count taken from `config`.
    pub fn from_config(
        project: ProjectId,
        config: &Config,
        catalog: &'a RequirementCatalog,
        store: &'a mut S,
    ) -> Result<Self> {
        Ok(Self::open(project, config.division.clone(), catalog, store)?
            .with_persist_retries(config.persist_retries))
    }

    pub fn with_persist_retries(mut self, retries: u32) -> Self {
        self.persist_retries = retries;
        self
    }

    // -----------------------------------------------------------------------
    // Gestures
    // -----------------------------------------------------------------------

    /// Advance one requirement through Empty → Complete → Reviewed → Empty.
    /// Returns the new indicator.
    pub fn click_cell(&mut self, stage: &str, requirement: &str) -> Result<Indicator> {
        let known = self
            .catalog
            .stage(stage)
            .ok_or_else(|| GateError::UnknownStage(stage.to_string()))?;
        if !known.has_requirement(&self.division, requirement) {
            return Err(GateError::UnknownRequirement {
                stage: stage.to_string(),
                requirement: requirement.to_string(),
            });
        }

        let next = self.state.get(stage, requirement).next();
        self.state.set(stage, requirement, next);
        debug!(project = %self.project, stage, requirement, indicator = %next, "cell clicked");
        self.commit()?;
        Ok(next)
    }

    /// Apply the header gesture selected by `click_count` to `stage`.
    pub fn click_stage_header(&mut self, stage: &str, click_count: u32) -> Result<HeaderGesture> {
        let catalog = self.catalog;
        let position = catalog
            .position(stage)
            .ok_or_else(|| GateError::UnknownStage(stage.to_string()))?;
        let target = &catalog.stages()[position];
        let requirements = target.requirements_for(&self.division);
        let gesture = HeaderGesture::from_click_count(click_count);

        match gesture {
            HeaderGesture::Toggle => {
                // Reviewed does not count as green here.
                let all_green = requirements
                    .iter()
                    .all(|req| self.state.get(&target.name, req) == Indicator::Complete);
                let indicator = if all_green {
                    Indicator::Empty
                } else {
                    Indicator::Complete
                };
                self.state.set_all(&target.name, requirements, indicator);
            }
            HeaderGesture::CascadeReset => {
                for later in &catalog.stages()[position..] {
                    self.state.set_all(
                        &later.name,
                        later.requirements_for(&self.division),
                        Indicator::Empty,
                    );
                }
            }
            HeaderGesture::CompleteStage => {
                self.state
                    .set_all(&target.name, requirements, Indicator::Complete);
            }
        }

        debug!(project = %self.project, stage, click_count, ?gesture, "stage header clicked");
        self.commit()?;
        Ok(gesture)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn commit(&mut self) -> Result<()> {
        self.gates = CompletedGateFlags::derive(self.catalog, &self.division, &self.state);
        self.dirty = true;
        self.flush()
    }

    /// Write the in-memory state if it has unsaved changes. Retryable store
    /// errors are attempted up to `persist_retries + 1` times in total.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let max_attempts = self.persist_retries.saturating_add(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.store.save(&self.project, &self.state) {
                Ok(()) => {
                    self.dirty = false;
                    return Ok(());
                }
                Err(e) if attempt < max_attempts && e.is_retryable() => {
                    warn!(project = %self.project, attempt, max_attempts, error = %e, "save failed, retrying");
                }
                Err(e) => {
                    warn!(project = %self.project, attempt, error = %e, "giving up on save; state kept in memory");
                    return Err(GateError::Persist {
                        project: self.project.to_string(),
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
            }
        }
    }

    /// Flush and release the store.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    pub fn division(&self) -> &Division {
        &self.division
    }

    pub fn catalog(&self) -> &RequirementCatalog {
        self.catalog
    }

    pub fn indicator(&self, stage: &str, requirement: &str) -> Indicator {
        self.state.get(stage, requirement)
    }

    pub fn is_stage_complete(&self, stage: &str) -> bool {
        is_stage_complete(self.catalog, stage, &self.division, &self.state)
    }

    pub fn completed_gates(&self) -> &CompletedGateFlags {
        &self.gates
    }

    pub fn current_gate(&self) -> CurrentGate {
        self.gates.current_gate()
    }

    pub fn board(&self) -> Board {
        Board::build(&self.project, self.catalog, &self.division, &self.state)
    }

    pub fn state(&self) -> &ProjectStageState {
        &self.state
    }

    /// True while the latest mutation has not reached the store.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
