//! Natural light and ventilation
//!
//! The opening area serving a space must be at least a fixed fraction of its
//! floor area. Air-conditioned rooms are exempt.

use rust_decimal::Decimal;
use shared_types::{format_decimal, Measurement, Plan, ScrutinyDetail};
use tracing::debug;

use super::{required_params, rule_no, threshold_row, unmeasured_row, Requirement};
use super::{RuleError, RuleEvaluator};
use crate::amendments::RuleParameterSet;

pub const TOPIC: &str = "light_ventilation";
const RULE_NO: &str = "4.4.4(v)";

pub struct LightVentilationRule;

impl RuleEvaluator for LightVentilationRule {
    fn topic(&self) -> &str {
        TOPIC
    }

    fn evaluate(
        &self,
        plan: &Plan,
        params: Option<&RuleParameterSet>,
    ) -> Result<ScrutinyDetail, RuleError> {
        let set = required_params(TOPIC, params)?;
        let ratio = set.require("min_opening_ratio")?;
        let rule_no = rule_no(params, RULE_NO);

        let mut detail = ScrutinyDetail::with_standard_columns(TOPIC);
        for block in &plan.blocks {
            for floor in &block.floors {
                for unit in &floor.units {
                    let prefix = format!(
                        "Block {} floor {} unit {}",
                        block.number, floor.number, unit.number
                    );

                    let outline = unit
                        .outline
                        .as_ref()
                        .filter(|_| !unit.light_and_ventilation.is_empty());
                    if let Some(outline) = outline {
                        let description = format!("{} light and ventilation", prefix);
                        let row = match outline.area() {
                            Some(area) => threshold_row(
                                &rule_no,
                                description,
                                Requirement::AtLeast(area * ratio),
                                unit.light_and_ventilation.total_area(),
                            ),
                            None => unmeasured_row(&rule_no, description, ratio_of_area(ratio)),
                        };
                        detail.add_row(row)?;
                    }

                    for room in &unit.rooms {
                        if room.air_conditioned {
                            debug!(room = room.number, "Air-conditioned room skipped");
                            continue;
                        }
                        let description =
                            format!("{} room {} light and ventilation", prefix, room.number);
                        if all_invalid(&room.areas) {
                            detail.add_row(unmeasured_row(
                                &rule_no,
                                description,
                                ratio_of_area(ratio),
                            ))?;
                            continue;
                        }
                        let area = room.floor_area();
                        if area <= Decimal::ZERO {
                            continue;
                        }
                        detail.add_row(threshold_row(
                            &rule_no,
                            description,
                            Requirement::AtLeast(area * ratio),
                            room.light_and_ventilation.total_area(),
                        ))?;
                    }
                }
            }
        }
        Ok(detail)
    }
}

/// Required cell when the floor area itself is unknown
fn ratio_of_area(ratio: Decimal) -> String {
    format!(">= {} x floor area", format_decimal(ratio))
}

/// Drawn but with no measurable polygon
fn all_invalid(areas: &[Measurement]) -> bool {
    !areas.is_empty() && areas.iter().all(|m| !m.is_valid())
}
