use shared_types::Plan;

use super::{block_mut, floor_coordinates, floor_mut};
use crate::error::ExtractError;
use crate::layer_names::{keys, Coordinates};
use crate::pipeline::{ExtractContext, FeatureExtractor};

pub const NAME: &str = "overhangs";

/// Shade overhangs, projected balconies and balcony distances to the plot boundary
pub struct OverhangExtractor;

impl FeatureExtractor for OverhangExtractor {
    fn name(&self) -> &str {
        NAME
    }

    fn extract(&self, ctx: &ExtractContext<'_>, mut plan: Plan) -> Result<Plan, ExtractError> {
        let numbers: Vec<u32> = plan.blocks.iter().map(|b| b.number).collect();
        for number in numbers {
            let at = Coordinates::block(number);
            let balconies = ctx.measure_all(keys::PROJECTED_BALCONY, &at, &mut plan.warnings)?;
            if let Some(block) = block_mut(&mut plan.blocks, &at) {
                block.projected_balconies.extend(balconies);
            }
        }

        for at in floor_coordinates(&plan) {
            let overhangs = ctx.measure_all(keys::SHADE_OVERHANG, &at, &mut plan.warnings)?;
            let balconies =
                ctx.measure_all(keys::FLOOR_PROJECTED_BALCONY, &at, &mut plan.warnings)?;
            let distances = ctx.dimension_values(keys::BALCONY_DIST_TO_PLOT_BOUNDARY, &at)?;

            if let Some(floor) = floor_mut(&mut plan.blocks, &at) {
                floor.overhangs.extend(overhangs);
                floor.projected_balconies.extend(balconies);
                floor.balcony_distances_to_plot_boundary.extend(distances);
            }
        }
        Ok(plan)
    }
}
