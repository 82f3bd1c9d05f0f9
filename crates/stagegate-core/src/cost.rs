//! Cost tracker rows: grouping, sorting and the budget summary.

use crate::error::{GateError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// CostRow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRow {
    pub id: u64,
    #[serde(default)]
    pub cost_id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub additional_comment: String,
    #[serde(default, deserialize_with = "amount")]
    pub budget: f64,
    #[serde(default, deserialize_with = "amount")]
    pub spent: f64,
    #[serde(default, deserialize_with = "amount")]
    pub remaining_budget: f64,
    #[serde(default, deserialize_with = "amount")]
    pub spend_to_finish: f64,
    #[serde(default, deserialize_with = "amount")]
    pub forecast: f64,
    #[serde(default, deserialize_with = "amount")]
    pub variance: f64,
    #[serde(default)]
    pub project: u64,
}

/// Money arrives as a JSON number or a decimal string (`"1250.00"`).
fn amount<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Null(()),
    }

    match Raw::deserialize(de)? {
        Raw::Num(n) => Ok(n),
        Raw::Null(()) => Ok(0.0),
        Raw::Text(s) if s.trim().is_empty() => Ok(0.0),
        Raw::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount '{s}'"))),
    }
}

impl CostRow {
    fn add_amounts(&mut self, other: &CostRow) {
        self.budget += other.budget;
        self.spent += other.spent;
        self.remaining_budget += other.remaining_budget;
        self.spend_to_finish += other.spend_to_finish;
        self.forecast += other.forecast;
        self.variance += other.variance;
    }
}

/// Parse the JSON list returned by the cost listing endpoint. Accepts a
/// bare array or a paginated `{"results": [...]}` envelope.
pub fn parse_rows(json: &str) -> Result<Vec<CostRow>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Listing {
        Page { results: Vec<CostRow> },
        Rows(Vec<CostRow>),
    }

    Ok(match serde_json::from_str(json)? {
        Listing::Page { results } => results,
        Listing::Rows(rows) => rows,
    })
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    None,
    Category,
    Group,
    CategoryAndGroup,
}

impl GroupBy {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupBy::None => "none",
            GroupBy::Category => "category",
            GroupBy::Group => "group",
            GroupBy::CategoryAndGroup => "category_and_group",
        }
    }

    fn key(self, row: &CostRow) -> String {
        match self {
            GroupBy::None => row.id.to_string(),
            GroupBy::Category => row.category.clone(),
            GroupBy::Group => row.group.clone(),
            GroupBy::CategoryAndGroup => format!("{}-{}", row.category, row.group),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "none" => Ok(GroupBy::None),
            "category" => Ok(GroupBy::Category),
            "group" => Ok(GroupBy::Group),
            "category_and_group" | "category-and-group" => Ok(GroupBy::CategoryAndGroup),
            other => Err(GateError::InvalidGroupBy(other.to_string())),
        }
    }
}

/// Merge rows sharing a grouping key, in first-seen order. Amounts are
/// summed; the first row of each group supplies the descriptive fields.
pub fn aggregate(rows: &[CostRow], group_by: GroupBy) -> Vec<CostRow> {
    if group_by == GroupBy::None {
        return rows.to_vec();
    }

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<(CostRow, usize)> = Vec::new();
    for row in rows {
        let key = group_by.key(row);
        match index.get(&key) {
            Some(&i) => {
                merged[i].0.add_amounts(row);
                merged[i].1 += 1;
            }
            None => {
                index.insert(key, merged.len());
                merged.push((row.clone(), 1));
            }
        }
    }

    merged
        .into_iter()
        .map(|(mut row, count)| {
            if count > 1 {
                row.cost_id = format!("Multiple ({count})");
            }
            row.remaining_budget = row.budget - row.spent;
            row.variance = row.budget - row.forecast;
            row
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Id,
    Category,
    Group,
    Budget,
    Spent,
    RemainingBudget,
}

impl FromStr for SortColumn {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "id" => Ok(SortColumn::Id),
            "category" => Ok(SortColumn::Category),
            "group" => Ok(SortColumn::Group),
            "budget" => Ok(SortColumn::Budget),
            "spent" => Ok(SortColumn::Spent),
            "remaining_budget" => Ok(SortColumn::RemainingBudget),
            other => Err(GateError::InvalidSortColumn(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Stable sort; equal keys keep their relative order.
pub fn sort_rows(rows: &mut [CostRow], column: SortColumn, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ord = match column {
            SortColumn::Id => a.id.cmp(&b.id),
            SortColumn::Category => a.category.cmp(&b.category),
            SortColumn::Group => a.group.cmp(&b.group),
            SortColumn::Budget => a.budget.total_cmp(&b.budget),
            SortColumn::Spent => a.spent.total_cmp(&b.spent),
            SortColumn::RemainingBudget => a.remaining_budget.total_cmp(&b.remaining_budget),
        };
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetHealth {
    UnderBudget,
    OverBudget,
}

impl fmt::Display for BudgetHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetHealth::UnderBudget => f.write_str("Under Budget"),
            BudgetHealth::OverBudget => f.write_str("Over Budget"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetTotal {
    pub key: String,
    pub budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetShare {
    pub category: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostSummary {
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_remaining_budget: f64,
    pub total_spend_to_finish: f64,
    pub total_variance: f64,
    pub by_category: Vec<BudgetTotal>,
    pub by_group: Vec<BudgetTotal>,
    pub by_category_and_group: Vec<BudgetTotal>,
    pub category_shares: Vec<BudgetShare>,
    pub health: BudgetHealth,
}

impl CostSummary {
    pub fn from_rows(rows: &[CostRow]) -> Self {
        let total_budget = total(rows, |r| r.budget);
        let total_variance = total(rows, |r| r.variance);

        let by_category = budget_by(rows, |r| r.category.clone());
        let category_shares = by_category
            .iter()
            .map(|t| BudgetShare {
                category: t.key.clone(),
                percentage: if total_budget == 0.0 {
                    0.0
                } else {
                    t.budget / total_budget * 100.0
                },
            })
            .collect();

        Self {
            total_budget,
            total_spent: total(rows, |r| r.spent),
            total_remaining_budget: total(rows, |r| r.remaining_budget),
            total_spend_to_finish: total(rows, |r| r.spend_to_finish),
            total_variance,
            by_category,
            by_group: budget_by(rows, |r| r.group.clone()),
            by_category_and_group: budget_by(rows, |r| format!("{} - {}", r.category, r.group)),
            category_shares,
            health: if total_variance >= 0.0 {
                BudgetHealth::UnderBudget
            } else {
                BudgetHealth::OverBudget
            },
        }
    }
}

fn total(rows: &[CostRow], field: impl Fn(&CostRow) -> f64) -> f64 {
    rows.iter().map(field).sum()
}

fn budget_by(rows: &[CostRow], key: impl Fn(&CostRow) -> String) -> Vec<BudgetTotal> {
    let mut totals: Vec<BudgetTotal> = Vec::new();
    for row in rows {
        let k = key(row);
        match totals.iter_mut().find(|t| t.key == k) {
            Some(t) => t.budget += row.budget,
            None => totals.push(BudgetTotal {
                key: k,
                budget: row.budget,
            }),
        }
    }
    totals
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Whole units with `,` thousands separators: `1234567.6` → `"1,234,568"`.
pub fn format_amount(x: f64) -> String {
    let rounded = x.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u64, category: &str, group: &str, budget: f64, spent: f64, forecast: f64) -> CostRow {
        CostRow {
            id,
            cost_id: format!("C-{id}"),
            category: category.to_string(),
            group: group.to_string(),
            description: String::new(),
            additional_comment: String::new(),
            budget,
            spent,
            remaining_budget: budget - spent,
            spend_to_finish: forecast - spent,
            forecast,
            variance: budget - forecast,
            project: 7,
        }
    }

    fn sample() -> Vec<CostRow> {
        vec![
            row(1, "Capex", "Equipment", 1000.0, 400.0, 900.0),
            row(2, "Opex", "Staff", 500.0, 500.0, 700.0),
            row(3, "Capex", "Building", 2000.0, 100.0, 2100.0),
            row(4, "Capex", "Equipment", 300.0, 0.0, 300.0),
        ]
    }

    #[test]
    fn none_returns_rows_unchanged() {
        assert_eq!(aggregate(&sample(), GroupBy::None), sample());
    }

    #[test]
    fn aggregate_by_category_keeps_first_seen_order() {
        let out = aggregate(&sample(), GroupBy::Category);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].category, "Capex");
        assert_eq!(out[0].cost_id, "Multiple (3)");
        assert_eq!(out[0].budget, 3300.0);
        assert_eq!(out[0].spent, 500.0);
        assert_eq!(out[0].remaining_budget, 2800.0);
        assert_eq!(out[0].variance, 3300.0 - 3300.0);
        assert_eq!(out[0].id, 1);
        assert_eq!(out[1].cost_id, "C-2");
        assert_eq!(out[1].variance, -200.0);
    }

    #[test]
    fn aggregate_by_category_and_group() {
        let out = aggregate(&sample(), GroupBy::CategoryAndGroup);
        let ids: Vec<&str> = out.iter().map(|r| r.cost_id.as_str()).collect();
        assert_eq!(ids, vec!["Multiple (2)", "C-2", "C-3"]);
        assert_eq!(out[0].budget, 1300.0);
    }

    #[test]
    fn amounts_accept_strings() {
        let json = r#"{"results": [
            {"id": 9, "cost_id": "X", "category": "Opex", "group": "IT",
             "budget": "1250.50", "spent": 250, "remaining_budget": "1000.50",
             "spend_to_finish": null, "forecast": "", "variance": "0"}
        ]}"#;
        let rows = parse_rows(json).unwrap();
        assert_eq!(rows[0].budget, 1250.5);
        assert_eq!(rows[0].spent, 250.0);
        assert_eq!(rows[0].spend_to_finish, 0.0);
        assert_eq!(rows[0].forecast, 0.0);
        assert_eq!(rows[0].project, 0);

        assert!(parse_rows(r#"[{"id": 1, "budget": "lots"}]"#).is_err());
    }

    #[test]
    fn sort_by_budget_descending() {
        let mut rows = sample();
        sort_rows(&mut rows, SortColumn::Budget, SortDirection::Descending);
        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 2, 4]);

        sort_rows(&mut rows, SortColumn::Category, SortDirection::Ascending);
        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 4, 2]);
    }

    #[test]
    fn summary_totals_and_health() {
        let summary = CostSummary::from_rows(&sample());
        assert_eq!(summary.total_budget, 3800.0);
        assert_eq!(summary.total_spent, 1000.0);
        assert_eq!(summary.total_variance, -200.0);
        assert_eq!(summary.health, BudgetHealth::OverBudget);
        assert_eq!(summary.health.to_string(), "Over Budget");
        assert_eq!(summary.by_category[0].key, "Capex");
        assert_eq!(summary.by_category[0].budget, 3300.0);
        assert_eq!(summary.by_group.len(), 3);
        assert_eq!(summary.by_category_and_group[0].key, "Capex - Equipment");
        let pct: f64 = summary.category_shares.iter().map(|s| s.percentage).sum();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_summary_is_under_budget_with_zero_shares() {
        let summary = CostSummary::from_rows(&[row(1, "Capex", "A", 0.0, 0.0, 0.0)]);
        assert_eq!(summary.health, BudgetHealth::UnderBudget);
        assert_eq!(summary.category_shares[0].percentage, 0.0);
    }

    #[test]
    fn group_by_parses() {
        assert_eq!("category_and_group".parse::<GroupBy>().unwrap(), GroupBy::CategoryAndGroup);
        assert!("division".parse::<GroupBy>().is_err());
        assert_eq!(GroupBy::Group.to_string(), "group");
    }

    #[test]
    fn format_amount_groups_thousands() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.4), "999");
        assert_eq!(format_amount(1000.0), "1,000");
        assert_eq!(format_amount(1234567.6), "1,234,568");
        assert_eq!(format_amount(-45210.0), "-45,210");
    }
}
