use shared_types::{Plan, ScrutinyDetail, YardKind};
use tracing::debug;

use super::{required_params, rule_no, threshold_row, unmeasured_row, Requirement};
use super::{RuleError, RuleEvaluator};
use crate::amendments::RuleParameterSet;

pub const TOPIC: &str = "setback";
const RULE_NO: &str = "4.4.4(iii)";

/// Minimum yard distances, checked per yard at every level a block declares
pub struct SetbackRule;

impl RuleEvaluator for SetbackRule {
    fn topic(&self) -> &str {
        TOPIC
    }

    fn evaluate(
        &self,
        plan: &Plan,
        params: Option<&RuleParameterSet>,
    ) -> Result<ScrutinyDetail, RuleError> {
        let set = required_params(TOPIC, params)?;
        let front = Requirement::AtLeast(set.require("front_min")?);
        let rear = Requirement::AtLeast(set.require("rear_min")?);
        let side = Requirement::AtLeast(set.require("side_min")?);
        let rule_no = rule_no(params, RULE_NO);

        let mut detail = ScrutinyDetail::with_standard_columns(TOPIC);
        for block in &plan.blocks {
            for set_back in &block.set_backs {
                for (kind, yard) in set_back.yards() {
                    let requirement = match kind {
                        YardKind::Front => front,
                        YardKind::Rear => rear,
                        YardKind::Side1 | YardKind::Side2 => side,
                    };
                    let description = format!(
                        "Block {} level {} {}",
                        block.number,
                        set_back.level,
                        kind.description().to_lowercase()
                    );
                    let row = match yard.min_distance {
                        Some(distance) => {
                            threshold_row(&rule_no, description, requirement, distance)
                        }
                        None => {
                            debug!(
                                block = block.number,
                                level = set_back.level,
                                ?kind,
                                "Yard distance not measured"
                            );
                            unmeasured_row(&rule_no, description, requirement)
                        }
                    };
                    detail.add_row(row)?;
                }
            }
        }
        Ok(detail)
    }
}
