use rust_decimal::Decimal;
use shared_types::{
    format_decimal, Column, ExemptionCategory, Plan, ScrutinyDetail, ScrutinyRow, Status,
};

use super::{RuleError, RuleEvaluator};
use crate::amendments::RuleParameterSet;

pub const TOPIC: &str = "far_exemptions";

const COLUMNS: [Column; 3] = [Column::Description, Column::Provided, Column::Status];

/// Lists every FAR-exempt category with a positive area
pub struct FarExemptionRule;

impl RuleEvaluator for FarExemptionRule {
    fn topic(&self) -> &str {
        TOPIC
    }

    fn parameter_topic(&self) -> Option<&str> {
        None
    }

    fn evaluate(
        &self,
        plan: &Plan,
        _params: Option<&RuleParameterSet>,
    ) -> Result<ScrutinyDetail, RuleError> {
        let mut detail = ScrutinyDetail::new(TOPIC, &COLUMNS);
        for category in ExemptionCategory::ALL {
            let Some(area) = plan.far_exemptions.get(category) else {
                continue;
            };
            if area <= Decimal::ZERO {
                continue;
            }
            detail.add_row(ScrutinyRow {
                description: Some(category.description().to_string()),
                provided: Some(format_decimal(area)),
                status: Some(Status::Accepted),
                ..Default::default()
            })?;
        }
        Ok(detail)
    }
}
