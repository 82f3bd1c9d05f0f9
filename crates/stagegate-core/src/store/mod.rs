//! Status store access: load/save of one project's [`ProjectStageState`].
//!
//! Every save replaces the whole blob for the project, so concurrent writers
//! resolve last-write-wins. Backends:
//!
//! - [`MemoryStore`]: process-local map, for tests and embedding.
//! - [`FileStore`]: one JSON document per project under `.stagegate/projects/`.
//! - [`RedbStore`]: a single redb database holding every project.

pub mod db;
pub mod file;
pub mod memory;

pub use db::RedbStore;
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::config::{Config, StoreBackend};
use crate::error::{GateError, Result};
use crate::status::ProjectStageState;
use crate::types::ProjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// StatusStore
// ---------------------------------------------------------------------------

pub trait StatusStore {
    /// Fails with [`GateError::StatusNotFound`] when nothing was saved yet.
    fn load(&self, project: &ProjectId) -> Result<ProjectStageState>;

    fn save(&mut self, project: &ProjectId, state: &ProjectStageState) -> Result<()>;

    /// Ids of every project with stored statuses, sorted.
    fn list(&self) -> Result<Vec<ProjectId>>;

    /// Missing state is an empty state, not an error.
    fn load_or_default(&self, project: &ProjectId) -> Result<ProjectStageState> {
        match self.load(project) {
            Ok(state) => Ok(state),
            Err(GateError::StatusNotFound(_)) => Ok(ProjectStageState::default()),
            Err(e) => Err(e),
        }
    }
}

impl<S: StatusStore + ?Sized> StatusStore for Box<S> {
    fn load(&self, project: &ProjectId) -> Result<ProjectStageState> {
        (**self).load(project)
    }

    fn save(&mut self, project: &ProjectId, state: &ProjectStageState) -> Result<()> {
        (**self).save(project, state)
    }

    fn list(&self) -> Result<Vec<ProjectId>> {
        (**self).list()
    }
}

// ---------------------------------------------------------------------------
// StatusRecord
// ---------------------------------------------------------------------------

/// On-disk envelope shared by the file and redb backends. `statuses` is the
/// flat legacy blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectId,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub statuses: ProjectStageState,
}

fn default_version() -> u32 {
    1
}

impl StatusRecord {
    pub fn new(project: &ProjectId, statuses: &ProjectStageState) -> Self {
        Self {
            version: 1,
            project: project.clone(),
            updated_at: Utc::now(),
            statuses: statuses.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Open the backend selected in `config`, rooted at `root`.
pub fn open_store(root: &Path, config: &Config) -> Result<Box<dyn StatusStore>> {
    match config.store.backend {
        StoreBackend::File => Ok(Box::new(FileStore::new(root))),
        StoreBackend::Redb => {
            let path = crate::paths::status_db_path(root);
            Ok(Box::new(RedbStore::open(&path)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Indicator;
    use tempfile::TempDir;

    #[test]
    fn load_or_default_maps_missing_to_empty() {
        let store = MemoryStore::new();
        let project = ProjectId::new("1").unwrap();
        assert!(matches!(
            store.load(&project),
            Err(GateError::StatusNotFound(_))
        ));
        assert!(store.load_or_default(&project).unwrap().is_empty());
    }

    #[test]
    fn open_store_honours_backend() {
        let dir = TempDir::new().unwrap();
        let project = ProjectId::new("9").unwrap();
        let mut state = ProjectStageState::new();
        state.set("Scope", "Gantt", Indicator::Complete);

        for backend in [StoreBackend::File, StoreBackend::Redb] {
            let mut config = Config::default();
            config.store.backend = backend;
            let mut store = open_store(dir.path(), &config).unwrap();
            store.save(&project, &state).unwrap();
            assert_eq!(store.load(&project).unwrap(), state);
            assert_eq!(store.list().unwrap(), vec![project.clone()]);
        }
        assert!(crate::paths::statuses_path(dir.path(), "9").exists());
        assert!(crate::paths::status_db_path(dir.path()).exists());
    }
}
