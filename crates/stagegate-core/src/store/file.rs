use super::{StatusRecord, StatusStore};
use crate::error::{GateError, Result};
use crate::paths;
use crate::status::ProjectStageState;
use crate::types::ProjectId;
use std::path::{Path, PathBuf};

/// One pretty-printed JSON [`StatusRecord`] per project, written atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn load_record(&self, project: &ProjectId) -> Result<StatusRecord> {
        let path = paths::statuses_path(&self.root, project.as_str());
        if !path.exists() {
            return Err(GateError::StatusNotFound(project.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let record: StatusRecord = serde_json::from_str(&data)?;
        Ok(record)
    }
}

impl StatusStore for FileStore {
    fn load(&self, project: &ProjectId) -> Result<ProjectStageState> {
        Ok(self.load_record(project)?.statuses)
    }

    fn save(&mut self, project: &ProjectId, state: &ProjectStageState) -> Result<()> {
        let path = paths::statuses_path(&self.root, project.as_str());
        let data = serde_json::to_string_pretty(&StatusRecord::new(project, state))?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    fn list(&self) -> Result<Vec<ProjectId>> {
        let dir = paths::projects_dir(&self.root);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.path().join(paths::STATUSES_FILE).exists() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if let Ok(id) = ProjectId::new(name) {
                    ids.push(id);
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}
