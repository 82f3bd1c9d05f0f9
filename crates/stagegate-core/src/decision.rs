//! Opportunity decision quadrants: how a triaged opportunity maps onto a
//! status, who may convert it, and how its comments are bucketed.

use crate::error::{GateError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// OpportunityStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OpportunityStatus {
    Active,
    Draft,
    Planning,
    Converted,
    Rejected,
    Revisit,
}

impl OpportunityStatus {
    pub fn all() -> &'static [OpportunityStatus] {
        &[
            OpportunityStatus::Active,
            OpportunityStatus::Draft,
            OpportunityStatus::Planning,
            OpportunityStatus::Converted,
            OpportunityStatus::Rejected,
            OpportunityStatus::Revisit,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OpportunityStatus::Active => "Active",
            OpportunityStatus::Draft => "Draft",
            OpportunityStatus::Planning => "Planning",
            OpportunityStatus::Converted => "Converted",
            OpportunityStatus::Rejected => "Rejected",
            OpportunityStatus::Revisit => "Revisit",
        }
    }
}

impl fmt::Display for OpportunityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpportunityStatus {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        OpportunityStatus::all()
            .iter()
            .copied()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GateError::InvalidOpportunityStatus(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Quadrant
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    PlanNow,
    DoNow,
    Reject,
    Revisit,
}

impl Quadrant {
    /// Display order: top-left, top-right, bottom-left, bottom-right.
    pub fn all() -> &'static [Quadrant] {
        &[
            Quadrant::PlanNow,
            Quadrant::DoNow,
            Quadrant::Reject,
            Quadrant::Revisit,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Quadrant::PlanNow => "Plan Now",
            Quadrant::DoNow => "Do Now",
            Quadrant::Reject => "Reject",
            Quadrant::Revisit => "Revisit",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Quadrant::PlanNow => "High value, needs preparation",
            Quadrant::DoNow => "High value, ready to execute",
            Quadrant::Reject => "Low value, not worth pursuing",
            Quadrant::Revisit => "Potential value, needs reassessment",
        }
    }

    pub fn convert_label(self) -> &'static str {
        match self {
            Quadrant::PlanNow => "Convert for Planning",
            Quadrant::DoNow => "Convert to Project",
            Quadrant::Reject => "Convert to Rejected",
            Quadrant::Revisit => "Convert for Revisit",
        }
    }

    pub fn confirmation_prompt(self) -> &'static str {
        match self {
            Quadrant::PlanNow => {
                "Are you sure you want to convert this opportunity to a status of planning?"
            }
            Quadrant::DoNow => "Are you sure you want to convert this opportunity to a project?",
            Quadrant::Reject => {
                "Are you sure you want to convert this opportunity to a status of rejected?"
            }
            Quadrant::Revisit => {
                "Are you sure you want to convert this opportunity to a status of revisit?"
            }
        }
    }

    pub fn status(self) -> OpportunityStatus {
        match self {
            Quadrant::PlanNow => OpportunityStatus::Planning,
            Quadrant::DoNow => OpportunityStatus::Converted,
            Quadrant::Reject => OpportunityStatus::Rejected,
            Quadrant::Revisit => OpportunityStatus::Revisit,
        }
    }

    /// The quadrant highlighted for an opportunity already in `status`.
    pub fn for_status(status: OpportunityStatus) -> Option<Quadrant> {
        Quadrant::all().iter().copied().find(|q| q.status() == status)
    }

    pub fn conversion(self) -> Conversion {
        match self {
            Quadrant::DoNow => Conversion::CreateProject,
            other => Conversion::UpdateStatus(other.status()),
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts `plan_now`, `plan-now` or the display label, any case.
impl FromStr for Quadrant {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        match norm.as_str() {
            "plannow" => Ok(Quadrant::PlanNow),
            "donow" => Ok(Quadrant::DoNow),
            "reject" => Ok(Quadrant::Reject),
            "revisit" => Ok(Quadrant::Revisit),
            _ => Err(GateError::InvalidQuadrant(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "status", rename_all = "snake_case")]
pub enum Conversion {
    /// Hand off to project creation; the opportunity becomes `Converted`
    /// once the project exists.
    CreateProject,
    UpdateStatus(OpportunityStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Superadmin,
}

impl Role {
    pub fn can_convert(self) -> bool {
        matches!(self, Role::Admin | Role::Superadmin)
    }
}

impl FromStr for Role {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::Superadmin),
            _ => Err(GateError::InvalidRole(s.to_string())),
        }
    }
}

pub fn convert(quadrant: Quadrant, role: Role) -> Result<Conversion> {
    if !role.can_convert() {
        return Err(GateError::Forbidden(format!(
            "only admins can {}",
            quadrant.convert_label().to_lowercase()
        )));
    }
    Ok(quadrant.conversion())
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuadrantSelection {
    selected: Option<Quadrant>,
}

impl QuadrantSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `quadrant`, or clear the selection if it is already selected.
    pub fn toggle(&mut self, quadrant: Quadrant) -> Option<Quadrant> {
        self.selected = if self.selected == Some(quadrant) {
            None
        } else {
            Some(quadrant)
        };
        self.selected
    }

    pub fn selected(&self) -> Option<Quadrant> {
        self.selected
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityComment {
    pub id: u64,
    pub comment: String,
    /// `None` when the stored status is missing or not one we know.
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<OpportunityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_name: Option<String>,
}

fn lenient_status<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<OpportunityStatus>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

impl OpportunityComment {
    pub fn author(&self) -> &str {
        self.created_by_name.as_deref().unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuadrantComments {
    buckets: BTreeMap<Quadrant, Vec<OpportunityComment>>,
}

impl QuadrantComments {
    /// Bucket by status; comments whose status has no quadrant are dropped.
    pub fn group(comments: impl IntoIterator<Item = OpportunityComment>) -> Self {
        let mut grouped = Self::default();
        for comment in comments {
            if let Some(q) = comment.status.and_then(Quadrant::for_status) {
                grouped.buckets.entry(q).or_default().push(comment);
            }
        }
        grouped
    }

    pub fn get(&self, quadrant: Quadrant) -> &[OpportunityComment] {
        self.buckets
            .get(&quadrant)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Append to the quadrant's bucket. Blank text is ignored.
    pub fn add(&mut self, quadrant: Quadrant, id: u64, text: &str, author: Option<String>) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.buckets.entry(quadrant).or_default().push(OpportunityComment {
            id,
            comment: text.to_string(),
            status: Some(quadrant.status()),
            created_by_name: author,
        });
        true
    }

    pub fn remove(&mut self, quadrant: Quadrant, id: u64) -> Option<OpportunityComment> {
        let bucket = self.buckets.get_mut(&quadrant)?;
        let pos = bucket.iter().position(|c| c.id == id)?;
        Some(bucket.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: u64, status: OpportunityStatus) -> OpportunityComment {
        OpportunityComment {
            id,
            comment: format!("note {id}"),
            status: Some(status),
            created_by_name: None,
        }
    }

    #[test]
    fn status_mapping_round_trips() {
        for q in Quadrant::all() {
            assert_eq!(Quadrant::for_status(q.status()), Some(*q));
        }
        assert_eq!(Quadrant::for_status(OpportunityStatus::Active), None);
        assert_eq!(Quadrant::for_status(OpportunityStatus::Draft), None);
    }

    #[test]
    fn do_now_goes_through_project_creation() {
        assert_eq!(Quadrant::DoNow.conversion(), Conversion::CreateProject);
        assert_eq!(
            Quadrant::Reject.conversion(),
            Conversion::UpdateStatus(OpportunityStatus::Rejected)
        );
        assert_eq!(
            Quadrant::PlanNow.conversion(),
            Conversion::UpdateStatus(OpportunityStatus::Planning)
        );
    }

    #[test]
    fn only_admins_convert() {
        assert!(matches!(
            convert(Quadrant::PlanNow, Role::User),
            Err(GateError::Forbidden(_))
        ));
        assert_eq!(
            convert(Quadrant::Revisit, Role::Admin).unwrap(),
            Conversion::UpdateStatus(OpportunityStatus::Revisit)
        );
        assert_eq!(
            convert(Quadrant::DoNow, Role::Superadmin).unwrap(),
            Conversion::CreateProject
        );
    }

    #[test]
    fn labels_and_prompts() {
        assert_eq!(Quadrant::PlanNow.label(), "Plan Now");
        assert_eq!(Quadrant::DoNow.convert_label(), "Convert to Project");
        assert_eq!(
            Quadrant::Reject.confirmation_prompt(),
            "Are you sure you want to convert this opportunity to a status of rejected?"
        );
        assert_eq!(
            Quadrant::Revisit.description(),
            "Potential value, needs reassessment"
        );
    }

    #[test]
    fn parse_quadrant_and_status() {
        assert_eq!("plan_now".parse::<Quadrant>().unwrap(), Quadrant::PlanNow);
        assert_eq!("Do Now".parse::<Quadrant>().unwrap(), Quadrant::DoNow);
        assert_eq!("revisit".parse::<Quadrant>().unwrap(), Quadrant::Revisit);
        assert!("later".parse::<Quadrant>().is_err());
        assert_eq!(
            "converted".parse::<OpportunityStatus>().unwrap(),
            OpportunityStatus::Converted
        );
        assert!("archived".parse::<OpportunityStatus>().is_err());
        assert_eq!("SuperAdmin".parse::<Role>().unwrap(), Role::Superadmin);
    }

    #[test]
    fn selection_toggles_off() {
        let mut sel = QuadrantSelection::new();
        assert_eq!(sel.toggle(Quadrant::Reject), Some(Quadrant::Reject));
        assert_eq!(sel.toggle(Quadrant::DoNow), Some(Quadrant::DoNow));
        assert_eq!(sel.toggle(Quadrant::DoNow), None);
        assert_eq!(sel.selected(), None);
    }

    #[test]
    fn comments_grouped_in_order() {
        let grouped = QuadrantComments::group(vec![
            comment(1, OpportunityStatus::Planning),
            comment(2, OpportunityStatus::Active),
            comment(3, OpportunityStatus::Rejected),
            comment(4, OpportunityStatus::Planning),
        ]);
        let ids: Vec<u64> = grouped.get(Quadrant::PlanNow).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(grouped.get(Quadrant::Reject).len(), 1);
        assert!(grouped.get(Quadrant::DoNow).is_empty());
        assert_eq!(grouped.len(), 3);
    }

    #[test]
    fn unknown_comment_status_is_dropped() {
        let list: Vec<OpportunityComment> = serde_json::from_str(
            r#"[
                {"id": 1, "comment": "go", "status": "Planning"},
                {"id": 2, "comment": "hm", "status": "Pending"},
                {"id": 3, "comment": "no status"}
            ]"#,
        )
        .unwrap();
        assert_eq!(list[1].status, None);
        assert_eq!(list[2].status, None);

        let grouped = QuadrantComments::group(list);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped.get(Quadrant::PlanNow)[0].id, 1);
    }

    #[test]
    fn add_and_remove_comments() {
        let mut grouped = QuadrantComments::default();
        assert!(!grouped.add(Quadrant::Revisit, 1, "   ", None));
        assert!(grouped.add(Quadrant::Revisit, 2, " check in Q3 ", Some("Ana".into())));
        let c = &grouped.get(Quadrant::Revisit)[0];
        assert_eq!(c.comment, "check in Q3");
        assert_eq!(c.status, Some(OpportunityStatus::Revisit));
        assert_eq!(c.author(), "Ana");

        assert!(grouped.remove(Quadrant::Revisit, 9).is_none());
        assert_eq!(grouped.remove(Quadrant::Revisit, 2).map(|c| c.id), Some(2));
        assert!(grouped.is_empty());
    }
}
