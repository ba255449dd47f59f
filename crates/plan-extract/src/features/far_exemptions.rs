use rust_decimal::Decimal;
use shared_types::{ExemptionCategory, Plan};
use tracing::debug;

use super::floor_coordinates;
use crate::error::ExtractError;
use crate::layer_names::keys;
use crate::pipeline::{ExtractContext, FeatureExtractor};

pub const NAME: &str = "far_exemptions";

/// Sums FAR-exempt areas per category across every floor
pub struct FarExemptionExtractor;

impl FeatureExtractor for FarExemptionExtractor {
    fn name(&self) -> &str {
        NAME
    }

    fn extract(&self, ctx: &ExtractContext<'_>, mut plan: Plan) -> Result<Plan, ExtractError> {
        for at in floor_coordinates(&plan) {
            for category in ExemptionCategory::ALL {
                let measurements =
                    ctx.measure_all(&keys::far_deduct(category), &at, &mut plan.warnings)?;
                if measurements.is_empty() {
                    continue;
                }
                let area: Decimal = measurements.iter().filter_map(|m| m.area()).sum();
                debug!(category = category.key(), area = %area, "FAR exemption");
                plan.far_exemptions.add(category, area);
            }
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::InMemoryDrawing;
    use crate::features::testing::{plan, rectangle};
    use crate::pipeline::ExtractConfig;
    use pretty_assertions::assert_eq;
    use shared_types::{Block, Floor};

    #[test]
    fn test_sums_categories_across_floors() {
        let mut input = plan();
        let mut block = Block::new(1);
        block.floors.push(Floor::new(-1));
        block.floors.push(Floor::new(0));
        input.blocks.push(block);

        let drawing = InMemoryDrawing::new()
            .with_polygon("BLK_1_FLR_-1_FAR_DEDUCT_BASEMENT_PARKING", rectangle(10, 5))
            .with_polygon("BLK_1_FLR_0_FAR_DEDUCT_CORRIDOR", rectangle(2, 3))
            .with_polygon("BLK_1_FLR_0_FAR_DEDUCT_CORRIDOR_2", rectangle(1, 3));
        let config = ExtractConfig::default();
        let ctx = ExtractContext::new(&drawing, &config);

        let plan = FarExemptionExtractor.extract(&ctx, input).unwrap();
        let exemptions = &plan.far_exemptions;
        assert_eq!(
            exemptions.get(ExemptionCategory::BasementParking),
            Some(Decimal::from(50))
        );
        assert_eq!(exemptions.get(ExemptionCategory::Corridor), Some(Decimal::from(9)));
        assert_eq!(exemptions.get(ExemptionCategory::Balcony), None);
    }
}
