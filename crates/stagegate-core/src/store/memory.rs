use super::StatusStore;
use crate::error::{GateError, Result};
use crate::status::ProjectStageState;
use crate::types::ProjectId;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    projects: HashMap<ProjectId, ProjectStageState>,
    saves: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves, across all projects.
    pub fn save_count(&self) -> u64 {
        self.saves
    }
}

impl StatusStore for MemoryStore {
    fn load(&self, project: &ProjectId) -> Result<ProjectStageState> {
        self.projects
            .get(project)
            .cloned()
            .ok_or_else(|| GateError::StatusNotFound(project.to_string()))
    }

    fn save(&mut self, project: &ProjectId, state: &ProjectStageState) -> Result<()> {
        self.projects.insert(project.clone(), state.clone());
        self.saves += 1;
        Ok(())
    }

    fn list(&self) -> Result<Vec<ProjectId>> {
        let mut ids: Vec<ProjectId> = self.projects.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
