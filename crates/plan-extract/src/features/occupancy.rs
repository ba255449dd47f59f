//! Occupancy areas per floor
//!
//! Every polygon on a built-up / carpet / deduction layer is measured and
//! classified by colour. Areas are merged through the floor's aggregator so
//! that repeated layers and repeated colours fold into one bucket per code.

use rust_decimal::Decimal;
use shared_types::{Floor, Occupancy, Plan};
use tracing::{debug, warn};

use super::{floor_coordinates, floor_mut};
use crate::error::ExtractError;
use crate::layer_names::keys;
use crate::pipeline::{ExtractContext, FeatureExtractor};

pub const NAME: &str = "occupancy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AreaKind {
    BuiltUp,
    ExistingBuiltUp,
    Carpet,
    ExistingCarpet,
    Deduction,
    ExistingDeduction,
}

const LAYERS: [(&str, AreaKind); 6] = [
    (keys::FLOOR_OUTLINE, AreaKind::BuiltUp),
    (keys::EXISTING_BUILT_UP, AreaKind::ExistingBuiltUp),
    (keys::CARPET_AREA, AreaKind::Carpet),
    (keys::EXISTING_CARPET_AREA, AreaKind::ExistingCarpet),
    (keys::BUILT_UP_DEDUCTION, AreaKind::Deduction),
    (keys::EXISTING_BUILT_UP_DEDUCTION, AreaKind::ExistingDeduction),
];

impl AreaKind {
    fn entry(self, code: &str, area: Decimal) -> Occupancy {
        let mut entry = Occupancy::new(code);
        match self {
            AreaKind::BuiltUp => entry.built_up_area = Some(area),
            AreaKind::ExistingBuiltUp => entry.existing_built_up_area = Some(area),
            AreaKind::Carpet => entry.carpet_area = Some(area),
            AreaKind::ExistingCarpet => entry.existing_carpet_area = Some(area),
            AreaKind::Deduction => entry.deduction = Some(area),
            AreaKind::ExistingDeduction => entry.existing_deduction = Some(area),
        }
        entry
    }

    fn accumulate(self, floor: &mut Floor, entry: Occupancy) {
        match self {
            AreaKind::BuiltUp | AreaKind::ExistingBuiltUp => floor.add_built_up_area(entry),
            AreaKind::Carpet | AreaKind::ExistingCarpet => floor.add_carpet_area(entry),
            AreaKind::Deduction | AreaKind::ExistingDeduction => floor.add_deduction_area(entry),
        }
    }
}

pub struct OccupancyExtractor;

impl FeatureExtractor for OccupancyExtractor {
    fn name(&self) -> &str {
        NAME
    }

    fn extract(&self, ctx: &ExtractContext<'_>, mut plan: Plan) -> Result<Plan, ExtractError> {
        for at in floor_coordinates(&plan) {
            let mut entries = Vec::new();
            for (key, kind) in LAYERS {
                for layer in ctx.layers(key, &at)? {
                    let entities = ctx.entities(&layer);
                    let measurements = ctx.measure_layer(&layer, &mut plan.warnings);
                    for (polygon, measurement) in entities.polygons.iter().zip(measurements) {
                        let Some(area) = measurement.area() else {
                            continue;
                        };
                        match ctx.config.occupancy_code(polygon.colour) {
                            Some(code) => entries.push((kind, kind.entry(code, area))),
                            None => {
                                warn!(layer = %layer, colour = ?polygon.colour, "No occupancy mapped for colour");
                                plan.warnings.push(format!(
                                    "{}: no occupancy type for colour {}",
                                    layer,
                                    polygon
                                        .colour
                                        .map(|c| c.to_string())
                                        .unwrap_or_else(|| "none".to_string())
                                ));
                            }
                        }
                    }
                }
            }

            if let Some(floor) = floor_mut(&mut plan.blocks, &at) {
                debug!(floor = floor.number, entries = entries.len(), "Accumulating occupancy areas");
                for (kind, entry) in entries {
                    kind.accumulate(floor, entry);
                }
            }
        }
        Ok(plan)
    }
}
