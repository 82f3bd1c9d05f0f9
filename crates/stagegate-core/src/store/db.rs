//! redb-backed status store.
//!
//! # Table design
//!
//! A single `STAGE_STATUSES` table keyed by project id:
//! ```text
//! project_id: &str  ->  JSON-encoded StatusRecord
//! ```
//!
//! Each save is one write transaction replacing the project's record, so a
//! reader never observes a half-applied click.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};

use crate::error::{GateError, Result};
use crate::status::ProjectStageState;
use crate::types::ProjectId;

use super::{StatusRecord, StatusStore};

// ---------------------------------------------------------------------------
// Table definition
// ---------------------------------------------------------------------------

const STAGE_STATUSES: TableDefinition<&str, &[u8]> = TableDefinition::new("stage_statuses");

fn store_err(e: impl std::fmt::Display) -> GateError {
    GateError::Store(e.to_string())
}

// ---------------------------------------------------------------------------
// RedbStore
// ---------------------------------------------------------------------------

pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open or create the database at `path`, creating the table if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(store_err)?;
        let wt = db.begin_write().map_err(store_err)?;
        wt.open_table(STAGE_STATUSES).map_err(store_err)?;
        wt.commit().map_err(store_err)?;
        Ok(Self { db })
    }

    pub fn load_record(&self, project: &ProjectId) -> Result<StatusRecord> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(STAGE_STATUSES).map_err(store_err)?;
        let entry = table.get(project.as_str()).map_err(store_err)?;
        match entry {
            Some(v) => Ok(serde_json::from_slice(v.value())?),
            None => Err(GateError::StatusNotFound(project.to_string())),
        }
    }
}

impl StatusStore for RedbStore {
    fn load(&self, project: &ProjectId) -> Result<ProjectStageState> {
        Ok(self.load_record(project)?.statuses)
    }

    fn save(&mut self, project: &ProjectId, state: &ProjectStageState) -> Result<()> {
        let value = serde_json::to_vec(&StatusRecord::new(project, state))?;
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(STAGE_STATUSES).map_err(store_err)?;
            table
                .insert(project.as_str(), value.as_slice())
                .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        Ok(())
    }

    /// Key order of the table, which is sorted.
    fn list(&self) -> Result<Vec<ProjectId>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(STAGE_STATUSES).map_err(store_err)?;
        let mut ids = Vec::new();
        for entry in table.iter().map_err(store_err)? {
            let (k, _) = entry.map_err(store_err)?;
            ids.push(ProjectId::new(k.value())?);
        }
        Ok(ids)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Indicator;
    use tempfile::TempDir;

    fn open_tmp() -> (TempDir, RedbStore) {
        let dir = TempDir::new().unwrap();
        let store = RedbStore::open(&dir.path().join("statuses.redb")).unwrap();
        (dir, store)
    }

    #[test]
    fn empty_db_reports_not_found() {
        let (_dir, store) = open_tmp();
        let project = ProjectId::new("1").unwrap();
        assert!(matches!(
            store.load(&project),
            Err(GateError::StatusNotFound(_))
        ));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn save_replaces_whole_blob() {
        let (_dir, mut store) = open_tmp();
        let project = ProjectId::new("77").unwrap();

        let mut first = ProjectStageState::new();
        first.set("Ideation", "Drivers", Indicator::Complete);
        first.set("Ideation", "Objective", Indicator::Complete);
        store.save(&project, &first).unwrap();

        let mut second = ProjectStageState::new();
        second.set("Ideation", "Drivers", Indicator::Reviewed);
        store.save(&project, &second).unwrap();

        let loaded = store.load(&project).unwrap();
        assert_eq!(loaded, second);
        assert_eq!(loaded.get("Ideation", "Objective"), Indicator::Empty);
    }

    #[test]
    fn survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("statuses.redb");
        let project = ProjectId::new("p-1").unwrap();
        let mut state = ProjectStageState::new();
        state.set("Review", "Lessons Learned Report", Indicator::Complete);
        {
            let mut store = RedbStore::open(&path).unwrap();
            store.save(&project, &state).unwrap();
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.load(&project).unwrap(), state);
        let record = store.load_record(&project).unwrap();
        assert_eq!(record.project, project);
        assert_eq!(record.version, 1);
    }

    #[test]
    fn list_in_key_order() {
        let (_dir, mut store) = open_tmp();
        for id in ["b", "a"] {
            store
                .save(&ProjectId::new(id).unwrap(), &ProjectStageState::new())
                .unwrap();
        }
        let ids: Vec<String> = store.list().unwrap().iter().map(|i| i.to_string()).collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
