use shared_types::{Plan, ScrutinyDetail};
use tracing::debug;

use super::{required_params, rule_no, threshold_row, unmeasured_row, Requirement};
use super::{RuleError, RuleEvaluator};
use crate::amendments::RuleParameterSet;

pub const TOPIC: &str = "doors";
const RULE_NO: &str = "4.4.7";

/// Door height within a closed range and a minimum width, per room door
pub struct DoorRule;

impl RuleEvaluator for DoorRule {
    fn topic(&self) -> &str {
        TOPIC
    }

    fn evaluate(
        &self,
        plan: &Plan,
        params: Option<&RuleParameterSet>,
    ) -> Result<ScrutinyDetail, RuleError> {
        let set = required_params(TOPIC, params)?;
        let width = Requirement::AtLeast(set.require("door_min_width")?);
        let height = Requirement::closed(
            set.require("door_min_height")?,
            set.require("door_max_height")?,
        );
        let rule_no = rule_no(params, RULE_NO);

        let mut detail = ScrutinyDetail::with_standard_columns(TOPIC);
        for block in &plan.blocks {
            for floor in &block.floors {
                for unit in &floor.units {
                    for room in &unit.rooms {
                        for door in &room.doors {
                            let room_kind = if room.air_conditioned { "ac room" } else { "room" };
                            let prefix = format!(
                                "Block {} floor {} unit {} {} {} door {}",
                                block.number,
                                floor.number,
                                unit.number,
                                room_kind,
                                room.number,
                                door.number
                            );
                            if !door.measurement.is_valid() {
                                debug!(door = %prefix, "Door could not be measured");
                            }

                            let description = format!("{} height", prefix);
                            detail.add_row(match door.height() {
                                Some(h) => threshold_row(&rule_no, description, height, h),
                                None => unmeasured_row(&rule_no, description, height),
                            })?;

                            let description = format!("{} width", prefix);
                            detail.add_row(match door.width() {
                                Some(w) => threshold_row(&rule_no, description, width, w),
                                None => unmeasured_row(&rule_no, description, width),
                            })?;
                        }
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
    use shared_types::{Block, Dimensions, Floor, FloorUnit, Measurement, Opening, Room, Status};

    fn params() -> RuleParameterSet {
        RuleParameterSet::new(TOPIC, date())
            .with_value("door_min_width", dec("0.9"))
            .with_value("door_min_height", dec("2.0"))
            .with_value("door_max_height", dec("2.4"))
    }

    fn door(number: u32, width: &str, height: &str) -> Opening {
        Opening {
            number,
            measurement: Measurement::valid(Dimensions {
                area: dec(width) * dec(height),
                width: dec(width),
                height: dec(height),
                ..Default::default()
            }),
        }
    }

    fn plan_with_doors(doors: Vec<Opening>) -> Plan {
        let mut room = Room::new(1);
        room.doors = doors;
        let mut unit = FloorUnit::new(1);
        unit.rooms.push(room);
        let mut floor = Floor::new(0);
        floor.units.push(unit);
        let mut block = Block::new(1);
        block.floors.push(floor);
        let mut plan = plan();
        plan.blocks.push(block);
        plan
    }

    #[test]
    fn test_height_range_is_closed() {
        let plan = plan_with_doors(vec![
            door(1, "0.9", "2.0"),
            door(2, "0.9", "2.4"),
            door(3, "0.9", "2.41"),
        ]);
        let detail = DoorRule.evaluate(&plan, Some(&params())).unwrap();

        let heights: Vec<Status> = detail
            .rows
            .iter()
            .filter(|r| r.description.as_deref().is_some_and(|d| d.ends_with("height")))
            .map(|r| r.status.unwrap())
            .collect();
        assert_eq!(
            heights,
            vec![Status::Accepted, Status::Accepted, Status::Rejected]
        );
        assert_eq!(detail.rows[0].required.as_deref(), Some("[2.00, 2.40]"));
    }

    #[test]
    fn test_narrow_and_unmeasured_doors_are_rejected() {
        let plan = plan_with_doors(vec![
            door(1, "0.85", "2.1"),
            Opening {
                number: 2,
                measurement: Measurement::invalid("fewer than 3 distinct vertices"),
            },
        ]);
        let detail = DoorRule.evaluate(&plan, Some(&params())).unwrap();

        assert_eq!(detail.rows.len(), 4);
        assert_eq!(
            detail.rows[1].description.as_deref(),
            Some("Block 1 floor 0 unit 1 room 1 door 1 width")
        );
        assert_eq!(detail.rows[1].status, Some(Status::Rejected));
        assert_eq!(detail.rows[2].provided.as_deref(), Some("-"));
        assert_eq!(detail.rows[3].provided.as_deref(), Some("-"));
    }
}
