use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("not initialized: run 'stagegate init'")]
    NotInitialized,

    #[error("no stage statuses stored for project: {0}")]
    StatusNotFound(String),

    #[error("unknown stage: {0}")]
    UnknownStage(String),

    #[error("requirement '{requirement}' is not part of stage '{stage}' for the active division")]
    UnknownRequirement { stage: String, requirement: String },

    #[error("invalid project id '{0}': must be alphanumeric with '-' or '_'")]
    InvalidProjectId(String),

    #[error("invalid indicator: {0}")]
    InvalidIndicator(String),

    #[error("invalid status key '{0}': expected '<stage>-<requirement>'")]
    InvalidStatusKey(String),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("invalid quadrant: {0}")]
    InvalidQuadrant(String),

    #[error("invalid opportunity status: {0}")]
    InvalidOpportunityStatus(String),

    #[error("invalid grouping '{0}': expected none, category, group or category_and_group")]
    InvalidGroupBy(String),

    #[error("invalid role '{0}': expected user, admin or superadmin")]
    InvalidRole(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("cannot sort by '{0}': expected id, category, group, budget, spent or remaining_budget")]
    InvalidSortColumn(String),

    #[error("unknown store backend '{0}': expected file or redb")]
    InvalidBackend(String),

    #[error("failed to persist stage statuses for project '{project}' after {attempts} attempt(s): {source}")]
    Persist {
        project: String,
        attempts: u32,
        #[source]
        source: Box<GateError>,
    },

    #[error("status store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl GateError {
    /// True when repeating the failed operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GateError::Persist { .. } | GateError::Store(_) | GateError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GateError>;
