use crate::error::{GateError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Division
// ---------------------------------------------------------------------------

/// Organizational track selecting which requirement checklist applies.
///
/// Kept as an open string code: a division the catalog does not know is
/// still a valid value, it just has no requirements anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Division(String);

impl Division {
    pub const VSC: &'static str = "VSC";
    pub const VSS: &'static str = "VSS";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn vsc() -> Self {
        Self::new(Self::VSC)
    }

    pub fn vss() -> Self {
        Self::new(Self::VSS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Division {
    fn default() -> Self {
        Self::vsc()
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Division {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

// ---------------------------------------------------------------------------
// Indicator
// ---------------------------------------------------------------------------

/// Tri-state marker attached to one requirement.
///
/// Serialized as the legacy color values (`gray`, `green`, `#4DA6FF`) so
/// stored blobs stay readable by existing consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Indicator {
    #[default]
    Empty,
    Complete,
    Reviewed,
}

impl Indicator {
    pub fn all() -> &'static [Indicator] {
        &[Indicator::Empty, Indicator::Complete, Indicator::Reviewed]
    }

    /// Next state of the per-cell click cycle: Empty → Complete → Reviewed → Empty.
    pub fn next(self) -> Indicator {
        match self {
            Indicator::Empty => Indicator::Complete,
            Indicator::Complete => Indicator::Reviewed,
            Indicator::Reviewed => Indicator::Empty,
        }
    }

    /// Anything other than `Empty` counts toward stage completion.
    pub fn is_satisfied(self) -> bool {
        !matches!(self, Indicator::Empty)
    }

    pub fn color(self) -> &'static str {
        match self {
            Indicator::Empty => "gray",
            Indicator::Complete => "green",
            Indicator::Reviewed => "#4DA6FF",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Indicator::Empty => "empty",
            Indicator::Complete => "complete",
            Indicator::Reviewed => "reviewed",
        }
    }

    /// Lenient decoding used for stored blobs: unrecognized values read as `Empty`.
    fn from_stored(s: &str) -> Indicator {
        s.parse().unwrap_or(Indicator::Empty)
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Indicator {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gray" | "empty" => Ok(Indicator::Empty),
            "green" | "complete" => Ok(Indicator::Complete),
            "#4DA6FF" | "#4da6ff" | "blue" | "reviewed" => Ok(Indicator::Reviewed),
            _ => Err(GateError::InvalidIndicator(s.to_string())),
        }
    }
}

impl From<String> for Indicator {
    fn from(s: String) -> Self {
        Indicator::from_stored(&s)
    }
}

impl From<Indicator> for String {
    fn from(i: Indicator) -> Self {
        i.color().to_string()
    }
}

// ---------------------------------------------------------------------------
// StatusKey
// ---------------------------------------------------------------------------

/// Composite `(stage, requirement)` key of the status store.
///
/// Wire form is `"{stage}-{requirement}"`. Stage names never contain `-`
/// (the catalog rejects them), so the first `-` always splits the two.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StatusKey {
    pub stage: String,
    pub requirement: String,
}

impl StatusKey {
    pub fn new(stage: impl Into<String>, requirement: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            requirement: requirement.into(),
        }
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.stage, self.requirement)
    }
}

impl std::str::FromStr for StatusKey {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('-') {
            Some((stage, requirement)) if !stage.is_empty() && !requirement.is_empty() => {
                Ok(StatusKey::new(stage, requirement))
            }
            _ => Err(GateError::InvalidStatusKey(s.to_string())),
        }
    }
}

impl TryFrom<String> for StatusKey {
    type Error = GateError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<StatusKey> for String {
    fn from(k: StatusKey) -> Self {
        k.to_string()
    }
}

// ---------------------------------------------------------------------------
// ProjectId
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        crate::paths::validate_project_id(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ProjectId {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        ProjectId::new(s)
    }
}

impl TryFrom<String> for ProjectId {
    type Error = GateError;

    fn try_from(s: String) -> Result<Self> {
        ProjectId::new(s)
    }
}

impl From<ProjectId> for String {
    fn from(id: ProjectId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
