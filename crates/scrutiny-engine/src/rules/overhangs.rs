use shared_types::{Plan, ScrutinyDetail};

use super::{required_params, rule_no, threshold_row, unmeasured_row, Requirement};
use super::{RuleError, RuleEvaluator};
use crate::amendments::RuleParameterSet;

pub const TOPIC: &str = "overhangs";
const RULE_NO: &str = "4.4.4(ix)";

/// Shade overhang widths and balcony clearances from the plot boundary
pub struct OverhangRule;

impl RuleEvaluator for OverhangRule {
    fn topic(&self) -> &str {
        TOPIC
    }

    fn evaluate(
        &self,
        plan: &Plan,
        params: Option<&RuleParameterSet>,
    ) -> Result<ScrutinyDetail, RuleError> {
        let set = required_params(TOPIC, params)?;
        let max_width = Requirement::AtMost(set.require("max_overhang_width")?);
        let min_distance = Requirement::AtLeast(set.require("min_balcony_distance")?);
        let rule_no = rule_no(params, RULE_NO);

        let mut detail = ScrutinyDetail::with_standard_columns(TOPIC);
        for block in &plan.blocks {
            for floor in &block.floors {
                for (index, overhang) in floor.overhangs.iter().enumerate() {
                    let description = format!(
                        "Block {} floor {} shade overhang {} width",
                        block.number,
                        floor.number,
                        index + 1
                    );
                    let row = match overhang.width() {
                        Some(width) => threshold_row(&rule_no, description, max_width, width),
                        None => unmeasured_row(&rule_no, description, max_width),
                    };
                    detail.add_row(row)?;
                }
                let distances = floor.balcony_distances_to_plot_boundary.iter();
                for (index, distance) in distances.enumerate() {
                    detail.add_row(threshold_row(
                        &rule_no,
                        format!(
                            "Block {} floor {} balcony {} distance to plot boundary",
                            block.number,
                            floor.number,
                            index + 1
                        ),
                        min_distance,
                        *distance,
                    ))?;
                }
            }
        }
        Ok(detail)
    }
}
