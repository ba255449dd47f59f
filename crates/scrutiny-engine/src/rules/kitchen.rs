use rust_decimal::Decimal;
use shared_types::{Plan, ScrutinyDetail};

use super::{required_params, rule_no, threshold_row, Requirement};
use super::{RuleError, RuleEvaluator};
use crate::amendments::RuleParameterSet;

pub const TOPIC: &str = "kitchen";
const RULE_NO: &str = "4.4.4(vi)";

/// Kitchen window and door sizes. Only the collections a kitchen actually
/// declares produce rows.
pub struct KitchenRule;

struct Limits {
    window_width: Requirement,
    door_width: Requirement,
    door_height: Requirement,
    window_height: Requirement,
}

impl Limits {
    fn from_params(set: &RuleParameterSet) -> Result<Self, RuleError> {
        Ok(Self {
            window_width: Requirement::AtLeast(set.require("window_min_width")?),
            door_width: Requirement::AtLeast(set.require("door_min_width")?),
            door_height: Requirement::AtLeast(set.require("door_min_height")?),
            window_height: Requirement::AtLeast(set.require("window_min_height")?),
        })
    }
}

impl RuleEvaluator for KitchenRule {
    fn topic(&self) -> &str {
        TOPIC
    }

    fn evaluate(
        &self,
        plan: &Plan,
        params: Option<&RuleParameterSet>,
    ) -> Result<ScrutinyDetail, RuleError> {
        let limits = Limits::from_params(required_params(TOPIC, params)?)?;
        let rule_no = rule_no(params, RULE_NO);

        let mut detail = ScrutinyDetail::with_standard_columns(TOPIC);
        for block in &plan.blocks {
            for floor in &block.floors {
                for unit in &floor.units {
                    let Some(kitchen) = &unit.kitchen else {
                        continue;
                    };
                    let prefix = format!(
                        "Block {} floor {} unit {} kitchen",
                        block.number, floor.number, unit.number
                    );

                    if !kitchen.window_widths.is_empty() {
                        let total: Decimal = kitchen.window_widths.iter().copied().sum();
                        detail.add_row(threshold_row(
                            &rule_no,
                            format!("{} window width", prefix),
                            limits.window_width,
                            total,
                        ))?;
                    }
                    if let Some(narrowest) = kitchen.door_widths.iter().min() {
                        detail.add_row(threshold_row(
                            &rule_no,
                            format!("{} door width", prefix),
                            limits.door_width,
                            *narrowest,
                        ))?;
                    }
                    if let Some(lowest) = kitchen.door_heights.iter().min() {
                        detail.add_row(threshold_row(
                            &rule_no,
                            format!("{} door height", prefix),
                            limits.door_height,
                            *lowest,
                        ))?;
                    }
                    if let Some(height) = kitchen.window_height {
                        detail.add_row(threshold_row(
                            &rule_no,
                            format!("{} window height", prefix),
                            limits.window_height,
                            height,
                        ))?;
                    }
                }
            }
        }
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::{date, dec, plan};
    use pretty_assertions::assert_eq;
    use shared_types::{Block, Floor, FloorUnit, Kitchen, Status};

    fn params() -> RuleParameterSet {
        RuleParameterSet::new(TOPIC, date())
            .with_value("window_min_width", dec("1.0"))
            .with_value("door_min_width", dec("0.75"))
            .with_value("door_min_height", dec("2.0"))
            .with_value("window_min_height", dec("1.2"))
    }

    fn plan_with_kitchen(kitchen: Kitchen) -> Plan {
        let mut plan = plan();
        let mut unit = FloorUnit::new(1);
        unit.kitchen = Some(kitchen);
        let mut floor = Floor::new(2);
        floor.units.push(unit);
        let mut block = Block::new(1);
        block.floors.push(floor);
        plan.blocks.push(block);
        plan
    }

    #[test]
    fn test_windows_are_summed_and_doors_use_minimum() {
        let kitchen = Kitchen {
            window_widths: vec![dec("0.6"), dec("0.5")],
            door_widths: vec![dec("0.9"), dec("0.7")],
            door_heights: vec![dec("2.1")],
            window_height: Some(dec("1.2")),
            ..Default::default()
        };
        let detail = KitchenRule
            .evaluate(&plan_with_kitchen(kitchen), Some(&params()))
            .unwrap();

        let provided: Vec<(&str, Status)> = detail
            .rows
            .iter()
            .map(|r| (r.provided.as_deref().unwrap(), r.status.unwrap()))
            .collect();
        assert_eq!(
            provided,
            vec![
                ("1.10", Status::Accepted),
                ("0.70", Status::Rejected),
                ("2.10", Status::Accepted),
                ("1.20", Status::Accepted),
            ]
        );
        assert_eq!(
            detail.rows[0].description.as_deref(),
            Some("Block 1 floor 2 unit 1 kitchen window width")
        );
    }

    #[test]
    fn test_absent_collections_have_no_rows() {
        let kitchen = Kitchen {
            door_heights: vec![dec("1.9")],
            ..Default::default()
        };
        let detail = KitchenRule
            .evaluate(&plan_with_kitchen(kitchen), Some(&params()))
            .unwrap();
        assert_eq!(detail.rows.len(), 1);
        assert_eq!(detail.rows[0].status, Some(Status::Rejected));
    }

    #[test]
    fn test_every_limit_is_required() {
        let set = RuleParameterSet::new(TOPIC, date()).with_value("window_min_width", dec("1"));
        assert!(KitchenRule.evaluate(&plan(), Some(&set)).is_err());
    }
}
