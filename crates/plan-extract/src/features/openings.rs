use shared_types::{Measurement, Opening, Plan};

use super::{room_coordinates, room_mut};
use crate::error::ExtractError;
use crate::layer_names::keys;
use crate::pipeline::{ExtractContext, FeatureExtractor};

pub const NAME: &str = "openings";

/// Room windows and doors, numbered in layer order from 1
pub struct OpeningExtractor;

impl FeatureExtractor for OpeningExtractor {
    fn name(&self) -> &str {
        NAME
    }

    fn extract(&self, ctx: &ExtractContext<'_>, mut plan: Plan) -> Result<Plan, ExtractError> {
        for (at, air_conditioned) in room_coordinates(&plan) {
            let (window_key, door_key) = if air_conditioned {
                (keys::UNIT_AC_ROOM_WINDOW, keys::UNIT_AC_ROOM_DOOR)
            } else {
                (keys::UNIT_ROOM_WINDOW, keys::UNIT_ROOM_DOOR)
            };
            let windows = numbered(ctx.measure_all(window_key, &at, &mut plan.warnings)?);
            let doors = numbered(ctx.measure_all(door_key, &at, &mut plan.warnings)?);

            if let Some(room) = room_mut(&mut plan.blocks, &at, air_conditioned) {
                room.windows = windows;
                room.doors = doors;
            }
        }
        Ok(plan)
    }
}

fn numbered(measurements: Vec<Measurement>) -> Vec<Opening> {
    measurements
        .into_iter()
        .zip(1..)
        .map(|(measurement, number)| Opening {
            number,
            measurement,
        })
        .collect()
}
