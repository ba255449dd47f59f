//! Light and ventilation openings for units, rooms, kitchens and laundries
//!
//! Kitchen ventilation layers carry three sibling collections told apart by
//! dimension colour: window widths, door widths and door heights. The
//! kitchen window height is a free-text label on the same layers.

use shared_types::{Kitchen, MeasurementWithHeight, Plan};
use tracing::{debug, warn};

use super::{room_coordinates, room_mut, unit_coordinates, unit_mut};
use crate::error::ExtractError;
use crate::layer_names::{keys, Coordinates};
use crate::measurement::parse_numeric_label;
use crate::pipeline::{ExtractContext, FeatureExtractor};

pub const NAME: &str = "ventilation";

pub struct VentilationExtractor;

impl FeatureExtractor for VentilationExtractor {
    fn name(&self) -> &str {
        NAME
    }

    fn extract(&self, ctx: &ExtractContext<'_>, mut plan: Plan) -> Result<Plan, ExtractError> {
        for at in unit_coordinates(&plan) {
            let unit_lv = read(ctx, keys::UNIT_LIGHT_VENTILATION, &at, &mut plan.warnings)?;
            let laundry = read(
                ctx,
                keys::UNIT_LAUNDRY_RECREATION_VENTILATION,
                &at,
                &mut plan.warnings,
            )?;
            let kitchen = read_kitchen(ctx, &at, &mut plan.warnings)?;

            let Some(unit) = unit_mut(&mut plan.blocks, &at) else {
                continue;
            };
            if let Some(lv) = unit_lv {
                unit.light_and_ventilation = lv;
            }
            if laundry.is_some() {
                unit.laundry_or_recreation_ventilation = laundry;
            }
            if let Some(update) = kitchen {
                let kitchen = unit.kitchen.get_or_insert_with(Kitchen::default);
                kitchen.room.light_and_ventilation = update.room.light_and_ventilation;
                kitchen.window_widths = update.window_widths;
                kitchen.door_widths = update.door_widths;
                kitchen.door_heights = update.door_heights;
                kitchen.window_height = update.window_height;
            }
        }

        for (at, air_conditioned) in room_coordinates(&plan) {
            let key = if air_conditioned {
                keys::UNIT_AC_ROOM_LIGHT_VENTILATION
            } else {
                keys::UNIT_ROOM_LIGHT_VENTILATION
            };
            if let Some(lv) = read(ctx, key, &at, &mut plan.warnings)? {
                if let Some(room) = room_mut(&mut plan.blocks, &at, air_conditioned) {
                    debug!(room = room.number, openings = lv.measurements.len(), "Room ventilation");
                    room.light_and_ventilation = lv;
                }
            }
        }
        Ok(plan)
    }
}

/// Measurements and dimension values from every matching layer, or `None`
/// when no layer matches
fn read(
    ctx: &ExtractContext<'_>,
    key: &str,
    at: &Coordinates,
    warnings: &mut Vec<String>,
) -> Result<Option<MeasurementWithHeight>, ExtractError> {
    let layers = ctx.layers(key, at)?;
    if layers.is_empty() {
        return Ok(None);
    }
    let mut lv = MeasurementWithHeight::default();
    for layer in &layers {
        lv.measurements.extend(ctx.measure_layer(layer, warnings));
        lv.heights_or_depths
            .extend(ctx.entities(layer).dimension_values());
    }
    Ok(Some(lv))
}

fn read_kitchen(
    ctx: &ExtractContext<'_>,
    at: &Coordinates,
    warnings: &mut Vec<String>,
) -> Result<Option<Kitchen>, ExtractError> {
    let layers = ctx.layers(keys::UNIT_KITCHEN_VENTILATION, at)?;
    if layers.is_empty() {
        return Ok(None);
    }
    let colours = ctx.config.kitchen_colours;
    let mut kitchen = Kitchen::default();

    for layer in &layers {
        let entities = ctx.entities(layer);
        kitchen
            .room
            .light_and_ventilation
            .measurements
            .extend(ctx.measure_layer(layer, warnings));
        kitchen
            .room
            .light_and_ventilation
            .heights_or_depths
            .extend(entities.dimension_values());
        kitchen
            .window_widths
            .extend(entities.dimension_values_by_colour(colours.window_width));
        kitchen
            .door_widths
            .extend(entities.dimension_values_by_colour(colours.door_width));
        kitchen
            .door_heights
            .extend(entities.dimension_values_by_colour(colours.door_height));

        if kitchen.window_height.is_none() {
            if let Some(text) = entities.first_text() {
                match parse_numeric_label(text) {
                    Some(height) => kitchen.window_height = Some(height),
                    None => {
                        warn!(layer = %layer, text, "Unparsable kitchen window height");
                        warnings.push(format!("{}: unparsable window height '{}'", layer, text));
                    }
                }
            }
        }
    }
    Ok(Some(kitchen))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::{Dimension, DimensionRole, InMemoryDrawing, LayerEntities, TextLabel};
    use crate::features::testing::{plan, rectangle};
    use crate::pipeline::ExtractConfig;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use shared_types::{Block, Floor, FloorUnit, Room};

    fn dim(value: i64, scale: u32, colour: u16) -> Dimension {
        Dimension {
            value: Decimal::new(value, scale),
            role: DimensionRole::Unspecified,
            colour: Some(colour),
        }
    }

    fn one_unit() -> Plan {
        let mut unit = FloorUnit::new(1);
        unit.rooms.push(Room::new(1));
        let mut ac_room = Room::new(2);
        ac_room.air_conditioned = true;
        unit.rooms.push(ac_room);
        let mut floor = Floor::new(0);
        floor.units.push(unit);
        let mut block = Block::new(1);
        block.floors.push(floor);
        let mut plan = plan();
        plan.blocks.push(block);
        plan
    }

    #[test]
    fn test_kitchen_collections_are_split_by_colour() {
        let drawing = InMemoryDrawing::new()
            .with_polygon(
                "BLK_1_FLR_0_UNIT_1_KITCHEN_DINING_VENTILATION",
                rectangle(1, 1),
            )
            .with_layer(
                "BLK_1_FLR_0_UNIT_1_KITCHEN_DINING_VENTILATION",
                LayerEntities {
                    dimensions: vec![dim(12, 1, 2), dim(9, 1, 3), dim(21, 1, 4), dim(8, 1, 2)],
                    texts: vec![TextLabel {
                        content: "1.5M".to_string(),
                        colour: None,
                    }],
                    ..Default::default()
                },
            );
        let config = ExtractConfig::default();
        let ctx = ExtractContext::new(&drawing, &config);

        let plan = VentilationExtractor.extract(&ctx, one_unit()).unwrap();
        let kitchen = plan.blocks[0].floors[0].units[0].kitchen.as_ref().unwrap();

        assert_eq!(kitchen.window_widths, vec![Decimal::new(12, 1), Decimal::new(8, 1)]);
        assert_eq!(kitchen.door_widths, vec![Decimal::new(9, 1)]);
        assert_eq!(kitchen.door_heights, vec![Decimal::new(21, 1)]);
        assert_eq!(kitchen.window_height, Some(Decimal::new(15, 1)));
        assert_eq!(kitchen.room.light_and_ventilation.measurements.len(), 1);
    }

    #[test]
    fn test_laundry_stays_absent_without_layer() {
        let drawing = InMemoryDrawing::new()
            .with_polygon("BLK_1_FLR_0_UNIT_1_LIGHT_VENTILATION", rectangle(2, 1));
        let config = ExtractConfig::default();
        let ctx = ExtractContext::new(&drawing, &config);

        let plan = VentilationExtractor.extract(&ctx, one_unit()).unwrap();
        let unit = &plan.blocks[0].floors[0].units[0];

        assert!(unit.laundry_or_recreation_ventilation.is_none());
        assert!(unit.kitchen.is_none());
        assert_eq!(unit.light_and_ventilation.total_area(), Decimal::from(2));
    }

    #[test]
    fn test_room_ventilation_uses_ac_layers_for_ac_rooms() {
        let drawing = InMemoryDrawing::new()
            .with_polygon("BLK_1_FLR_0_UNIT_1_ROOM_1_LIGHT_VENTILATION", rectangle(1, 1))
            .with_polygon("BLK_1_FLR_0_UNIT_1_ROOM_1_LIGHT_VENTILATION2", rectangle(2, 1))
            .with_polygon("BLK_1_FLR_0_UNIT_1_ACROOM_2_LIGHT_VENTILATION", rectangle(3, 1))
            .with_polygon("BLK_1_FLR_0_UNIT_1_LAUNDRY_RECREATION_VENTILATION", rectangle(1, 1));
        let config = ExtractConfig::default();
        let ctx = ExtractContext::new(&drawing, &config);

        let plan = VentilationExtractor.extract(&ctx, one_unit()).unwrap();
        let unit = &plan.blocks[0].floors[0].units[0];

        assert_eq!(
            unit.room(1).unwrap().light_and_ventilation.total_area(),
            Decimal::from(3)
        );
        assert_eq!(
            unit.ac_room(2).unwrap().light_and_ventilation.total_area(),
            Decimal::from(3)
        );
        assert!(unit.laundry_or_recreation_ventilation.is_some());
    }
}
