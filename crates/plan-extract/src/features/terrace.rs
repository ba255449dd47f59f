use shared_types::{Plan, Terrace};
use tracing::debug;

use super::block_mut;
use crate::error::ExtractError;
use crate::layer_names::{keys, Coordinates};
use crate::pipeline::{ExtractContext, FeatureExtractor};

pub const NAME: &str = "terrace";

/// Roof terrace per block
pub struct TerraceExtractor;

impl FeatureExtractor for TerraceExtractor {
    fn name(&self) -> &str {
        NAME
    }

    fn extract(&self, ctx: &ExtractContext<'_>, mut plan: Plan) -> Result<Plan, ExtractError> {
        let numbers: Vec<u32> = plan.blocks.iter().map(|b| b.number).collect();
        for number in numbers {
            let at = Coordinates::block(number);
            let measurements = ctx.measure_all(keys::TERRACE, &at, &mut plan.warnings)?;
            let Some(measurement) = measurements
                .iter()
                .find(|m| m.is_valid())
                .or(measurements.first())
                .cloned()
            else {
                continue;
            };
            debug!(block = number, "Terrace found");
            if let Some(block) = block_mut(&mut plan.blocks, &at) {
                block.terrace = Some(Terrace { measurement });
            }
        }
        Ok(plan)
    }
}
