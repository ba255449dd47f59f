use shared_types::{Plan, Projection};

use super::{room_coordinates, room_mut};
use crate::error::ExtractError;
use crate::layer_names::keys;
use crate::pipeline::{ExtractContext, FeatureExtractor};

pub const NAME: &str = "projections";

pub struct ProjectionExtractor;

impl FeatureExtractor for ProjectionExtractor {
    fn name(&self) -> &str {
        NAME
    }

    fn extract(&self, ctx: &ExtractContext<'_>, mut plan: Plan) -> Result<Plan, ExtractError> {
        for (at, air_conditioned) in room_coordinates(&plan) {
            let key = if air_conditioned {
                keys::UNIT_AC_ROOM_PROJECTION
            } else {
                keys::UNIT_ROOM_PROJECTION
            };
            let projections: Vec<Projection> = ctx
                .measure_all(key, &at, &mut plan.warnings)?
                .into_iter()
                .zip(1..)
                .map(|(measurement, number)| Projection {
                    number,
                    measurement,
                })
                .collect();
            if let Some(room) = room_mut(&mut plan.blocks, &at, air_conditioned) {
                room.projections = projections;
            }
        }
        Ok(plan)
    }
}
