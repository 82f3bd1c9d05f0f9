use crate::catalog::RequirementCatalog;
use crate::types::{Division, Indicator, StatusKey};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// ProjectStageState
// ---------------------------------------------------------------------------

/// Full status store for one project: composite key → indicator.
///
/// Serializes as a flat JSON object (`{"Ideation-Objective": "green", ...}`).
/// Absent keys read as `Empty`. Keys for requirements outside the active
/// division are kept as-is; they are ignored by derivation, never purged.
///
/// Entries that do not decode are carried verbatim: a key without the
/// `stage-requirement` shape is kept under its raw string, and an
/// unrecognized indicator value reads as `Empty` but is written back
/// unchanged until that cell is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectStageState {
    statuses: BTreeMap<StatusKey, Indicator>,
    /// Raw values of keys whose stored indicator was not recognized.
    verbatim: BTreeMap<StatusKey, Value>,
    /// Entries whose key could not be parsed.
    unparsed: BTreeMap<String, Value>,
}

impl ProjectStageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stage: &str, requirement: &str) -> Indicator {
        self.statuses
            .get(&StatusKey::new(stage, requirement))
            .copied()
            .unwrap_or_default()
    }

    pub fn set(&mut self, stage: &str, requirement: &str, indicator: Indicator) {
        let key = StatusKey::new(stage, requirement);
        self.verbatim.remove(&key);
        self.statuses.insert(key, indicator);
    }

    /// Set every listed requirement of `stage` to `indicator`.
    pub fn set_all<'a>(
        &mut self,
        stage: &str,
        requirements: impl IntoIterator<Item = &'a String>,
        indicator: Indicator,
    ) {
        for req in requirements {
            self.set(stage, req, indicator);
        }
    }

    /// Number of stored entries, unparseable ones included.
    pub fn len(&self) -> usize {
        self.statuses.len() + self.unparsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty() && self.unparsed.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StatusKey, &Indicator)> {
        self.statuses.iter()
    }

    /// Stored keys that do not name a requirement of `division` in
    /// `catalog`, unparseable keys included.
    pub fn stale_keys<'a>(
        &'a self,
        catalog: &'a RequirementCatalog,
        division: &'a Division,
    ) -> impl Iterator<Item = String> + 'a {
        self.statuses
            .keys()
            .filter(move |k| {
                !catalog
                    .stage(&k.stage)
                    .is_some_and(|s| s.has_requirement(division, &k.requirement))
            })
            .map(|k| k.to_string())
            .chain(self.unparsed.keys().cloned())
    }

    fn from_stored(raw: BTreeMap<String, Value>) -> Self {
        let mut state = Self::default();
        for (raw_key, value) in raw {
            let Ok(key) = raw_key.parse::<StatusKey>() else {
                state.unparsed.insert(raw_key, value);
                continue;
            };
            match value.as_str().and_then(|s| s.parse::<Indicator>().ok()) {
                Some(indicator) => {
                    state.statuses.insert(key, indicator);
                }
                None => {
                    state.statuses.insert(key.clone(), Indicator::Empty);
                    state.verbatim.insert(key, value);
                }
            }
        }
        state
    }
}

impl Serialize for ProjectStageState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, indicator) in &self.statuses {
            match self.verbatim.get(key) {
                Some(raw) => map.serialize_entry(&key.to_string(), raw)?,
                None => map.serialize_entry(&key.to_string(), indicator)?,
            }
        }
        for (key, raw) in &self.unparsed {
            map.serialize_entry(key, raw)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ProjectStageState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_stored(raw))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
