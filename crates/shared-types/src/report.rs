//! Scrutiny report tables

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plan::PlanMetadata;

/// Decimal places used for every displayed quantity
pub const DISPLAY_SCALE: u32 = 2;

/// Placeholder shown in the Required column when a rule has no threshold
pub const NO_REQUIREMENT: &str = "-";

/// Round half-up (away from zero) to two decimal places
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DISPLAY_SCALE);
    rounded
}

/// Display string for a provided or required value, always two decimals
pub fn format_decimal(value: Decimal) -> String {
    round_half_up(value).to_string()
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Row in '{key}' has columns {found:?} but headings are {expected:?}")]
    HeadingMismatch {
        key: String,
        expected: Vec<Column>,
        found: Vec<Column>,
    },
}

/// Report column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    RuleNo,
    Description,
    Required,
    Provided,
    Status,
}

impl Column {
    pub fn heading(&self) -> &'static str {
        match self {
            Column::RuleNo => "Byelaw Reference",
            Column::Description => "Description",
            Column::Required => "Required",
            Column::Provided => "Provided",
            Column::Status => "Status",
        }
    }
}

/// The five-column layout used by most topics
pub const STANDARD_COLUMNS: [Column; 5] = [
    Column::RuleNo,
    Column::Description,
    Column::Required,
    Column::Provided,
    Column::Status,
];

/// Verdict of one checked rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Accepted,
    #[serde(rename = "Not Accepted")]
    Rejected,
}

impl Status {
    pub fn from_pass(pass: bool) -> Self {
        if pass {
            Status::Accepted
        } else {
            Status::Rejected
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Accepted => "Accepted",
            Status::Rejected => "Not Accepted",
        }
    }
}

/// One checked rule instance. Only the cells named by the owning table's
/// headings may be populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrutinyRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provided: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl ScrutinyRow {
    /// Populated columns in canonical order
    pub fn columns(&self) -> Vec<Column> {
        let mut columns = Vec::with_capacity(5);
        if self.rule_no.is_some() {
            columns.push(Column::RuleNo);
        }
        if self.description.is_some() {
            columns.push(Column::Description);
        }
        if self.required.is_some() {
            columns.push(Column::Required);
        }
        if self.provided.is_some() {
            columns.push(Column::Provided);
        }
        if self.status.is_some() {
            columns.push(Column::Status);
        }
        columns
    }

    pub fn cell(&self, column: Column) -> Option<&str> {
        match column {
            Column::RuleNo => self.rule_no.as_deref(),
            Column::Description => self.description.as_deref(),
            Column::Required => self.required.as_deref(),
            Column::Provided => self.provided.as_deref(),
            Column::Status => self.status.as_ref().map(Status::label),
        }
    }

    /// Cell values in the order of the given headings
    pub fn values(&self, headings: &[Column]) -> Vec<&str> {
        headings
            .iter()
            .map(|c| self.cell(*c).unwrap_or(""))
            .collect()
    }

    pub fn is_accepted(&self) -> bool {
        self.status == Some(Status::Accepted)
    }
}

/// One topic's report table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrutinyDetail {
    pub key: String,
    pub headings: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<ScrutinyRow>,
}

impl ScrutinyDetail {
    pub fn new(key: impl Into<String>, headings: &[Column]) -> Self {
        Self {
            key: key.into(),
            headings: headings.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn with_standard_columns(key: impl Into<String>) -> Self {
        Self::new(key, &STANDARD_COLUMNS)
    }

    /// Append a row, refusing any row whose cells do not line up with the
    /// declared headings
    pub fn add_row(&mut self, row: ScrutinyRow) -> Result<(), ReportError> {
        self.check_row(&row)?;
        self.rows.push(row);
        Ok(())
    }

    fn check_row(&self, row: &ScrutinyRow) -> Result<(), ReportError> {
        let found = row.columns();
        let mut expected = self.headings.clone();
        // headings may be declared in any order, but each column only once
        expected.sort();
        let unique = expected.windows(2).all(|w| w[0] != w[1]);
        if !unique || found != expected {
            return Err(ReportError::HeadingMismatch {
                key: self.key.clone(),
                expected: self.headings.clone(),
                found,
            });
        }
        Ok(())
    }

    /// Re-check every row; used when a table was built outside `add_row`
    pub fn validate(&self) -> Result<(), ReportError> {
        self.rows.iter().try_for_each(|row| self.check_row(row))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One entry of the final report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportSection {
    Detail(ScrutinyDetail),
    /// A topic that could not be evaluated, e.g. missing rule parameters
    Failed { topic: String, reason: String },
}

impl ReportSection {
    pub fn key(&self) -> &str {
        match self {
            ReportSection::Detail(detail) => &detail.key,
            ReportSection::Failed { topic, .. } => topic,
        }
    }

    pub fn detail(&self) -> Option<&ScrutinyDetail> {
        match self {
            ReportSection::Detail(detail) => Some(detail),
            ReportSection::Failed { .. } => None,
        }
    }
}

/// Finished scrutiny report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOutput {
    pub metadata: PlanMetadata,
    pub sections: Vec<ReportSection>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub plan_errors: BTreeMap<String, String>,
}

impl ReportOutput {
    pub fn section(&self, key: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.key() == key)
    }

    pub fn detail(&self, key: &str) -> Option<&ScrutinyDetail> {
        self.section(key).and_then(ReportSection::detail)
    }

    pub fn failed_topics(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|s| matches!(s, ReportSection::Failed { .. }))
            .map(ReportSection::key)
            .collect()
    }

    /// True when every row of every evaluated topic was accepted and no
    /// topic failed
    pub fn is_compliant(&self) -> bool {
        self.sections.iter().all(|section| match section {
            ReportSection::Detail(detail) => detail
                .rows
                .iter()
                .all(|row| row.status.is_none() || row.is_accepted()),
            ReportSection::Failed { .. } => false,
        })
    }

    /// Plain-text rendering of the report
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Scrutiny Report: {} ({})\n",
            self.metadata.application_number, self.metadata.jurisdiction
        ));
        output.push_str(&format!("Effective date: {}\n", self.metadata.effective_date));
        output.push_str(&"=".repeat(60));
        output.push_str("\n\n");

        for section in &self.sections {
            match section {
                ReportSection::Detail(detail) => {
                    output.push_str(&format!("[{}]\n", detail.key));
                    let headings: Vec<&str> =
                        detail.headings.iter().map(Column::heading).collect();
                    output.push_str(&headings.join(" | "));
                    output.push('\n');
                    if detail.rows.is_empty() {
                        output.push_str("  (nothing to report)\n");
                    }
                    for row in &detail.rows {
                        output.push_str(&row.values(&detail.headings).join(" | "));
                        output.push('\n');
                    }
                }
                ReportSection::Failed { topic, reason } => {
                    output.push_str(&format!("[{}] FAILED: {}\n", topic, reason));
                }
            }
            output.push('\n');
        }

        if !self.plan_errors.is_empty() {
            output.push_str("Extraction errors:\n");
            for (key, message) in &self.plan_errors {
                output.push_str(&format!("  - {}: {}\n", key, message));
            }
        }

        output
    }
}
