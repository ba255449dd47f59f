use shared_types::report::NO_REQUIREMENT;
use shared_types::{format_decimal, Plan, ScrutinyDetail, ScrutinyRow, Status};
use tracing::debug;

use super::{rule_no, RuleError, RuleEvaluator};
use crate::amendments::RuleParameterSet;

pub const TOPIC: &str = "terrace";
const RULE_NO: &str = "4.4.4(xi)";

/// Reports each block's terrace area; presence alone is accepted
pub struct TerraceRule;

impl RuleEvaluator for TerraceRule {
    fn topic(&self) -> &str {
        TOPIC
    }

    fn parameter_topic(&self) -> Option<&str> {
        None
    }

    fn evaluate(
        &self,
        plan: &Plan,
        params: Option<&RuleParameterSet>,
    ) -> Result<ScrutinyDetail, RuleError> {
        let rule_no = rule_no(params, RULE_NO);
        let mut detail = ScrutinyDetail::with_standard_columns(TOPIC);

        for block in &plan.blocks {
            let Some(terrace) = &block.terrace else {
                debug!(block = block.number, "No terrace");
                continue;
            };
            let provided = terrace
                .area()
                .map(format_decimal)
                .unwrap_or_else(|| NO_REQUIREMENT.to_string());
            detail.add_row(ScrutinyRow {
                rule_no: Some(rule_no.clone()),
                description: Some(format!("Block {} terrace area", block.number)),
                required: Some(NO_REQUIREMENT.to_string()),
                provided: Some(provided),
                status: Some(Status::Accepted),
            })?;
        }
        Ok(detail)
    }
}
