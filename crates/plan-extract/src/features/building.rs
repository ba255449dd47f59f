//! Block / floor / unit / room discovery
//!
//! Reads the hierarchy from the numbers embedded in layer names. Nodes that
//! already exist keep their position; discovered ones are appended in
//! ascending number order.

use std::collections::BTreeSet;

use shared_types::{Block, Floor, FloorUnit, Kitchen, Plan, Room};
use tracing::debug;

use super::{block_mut, floor_mut, unit_mut};
use crate::error::ExtractError;
use crate::layer_names::{keys, Coordinates};
use crate::pipeline::{ExtractContext, FeatureExtractor};

pub const NAME: &str = "building";

/// Keys whose layers prove a unit exists
const UNIT_KEYS: [&str; 5] = [
    keys::UNIT_OUTLINE,
    keys::UNIT_ROOM,
    keys::UNIT_AC_ROOM,
    keys::UNIT_KITCHEN,
    keys::UNIT_LAUNDRY_RECREATION,
];

pub struct BuildingExtractor;

impl FeatureExtractor for BuildingExtractor {
    fn name(&self) -> &str {
        NAME
    }

    fn extract(&self, ctx: &ExtractContext<'_>, mut plan: Plan) -> Result<Plan, ExtractError> {
        let any = Coordinates::default();

        let mut floors = ctx.discover(keys::FLOOR_OUTLINE, &any)?;
        let mut units = BTreeSet::new();
        for key in UNIT_KEYS {
            units.extend(ctx.discover(key, &any)?);
        }
        floors.extend(units.iter().map(|u| Coordinates {
            unit: None,
            room: None,
            ..*u
        }));
        let mut rooms = BTreeSet::new();
        for (key, air_conditioned) in [(keys::UNIT_ROOM, false), (keys::UNIT_AC_ROOM, true)] {
            rooms.extend(
                ctx.discover(key, &any)?
                    .into_iter()
                    .map(|at| (at, air_conditioned)),
            );
        }

        for at in &floors {
            ensure_floor(&mut plan, at);
        }
        for at in &units {
            ensure_unit(&mut plan, at);
        }

        let Plan {
            blocks, warnings, ..
        } = &mut plan;

        for at in &units {
            let outline = ctx
                .measure_all(keys::UNIT_OUTLINE, at, warnings)?
                .into_iter()
                .next();
            let kitchen_layers = ctx.layers(keys::UNIT_KITCHEN, at)?;
            let kitchen = if kitchen_layers.is_empty() {
                None
            } else {
                let mut room = Room::new(0);
                for layer in &kitchen_layers {
                    room.closed |= ctx.entities(layer).polygons.iter().any(|p| p.closed);
                    room.areas.extend(ctx.measure_layer(layer, warnings));
                }
                Some(room)
            };

            if let Some(unit) = unit_mut(blocks, at) {
                if outline.is_some() {
                    unit.outline = outline;
                }
                if let Some(room) = kitchen {
                    match unit.kitchen.as_mut() {
                        Some(existing) => {
                            existing.room.closed |= room.closed;
                            existing.room.areas.extend(room.areas);
                        }
                        None => {
                            unit.kitchen = Some(Kitchen {
                                room,
                                ..Default::default()
                            })
                        }
                    }
                }
            }
        }

        for (at, air_conditioned) in &rooms {
            let key = if *air_conditioned {
                keys::UNIT_AC_ROOM
            } else {
                keys::UNIT_ROOM
            };
            let mut closed = false;
            let mut areas = Vec::new();
            for layer in ctx.layers(key, at)? {
                closed |= ctx.entities(&layer).polygons.iter().any(|p| p.closed);
                areas.extend(ctx.measure_layer(&layer, warnings));
            }
            let (Some(unit), Some(number)) = (unit_mut(blocks, at), at.room) else {
                continue;
            };
            if unit.find_room(number, *air_conditioned).is_none() {
                debug!(
                    unit = unit.number,
                    room = number,
                    air_conditioned = *air_conditioned,
                    "Discovered room"
                );
                unit.rooms.push(Room {
                    air_conditioned: *air_conditioned,
                    ..Room::new(number)
                });
            }
            if let Some(room) = unit.room_mut(number, *air_conditioned) {
                room.closed |= closed;
                room.areas.extend(areas);
            }
        }

        Ok(plan)
    }
}

fn ensure_floor(plan: &mut Plan, at: &Coordinates) {
    let (Some(block_no), Some(floor_no)) = (at.block, at.floor) else {
        return;
    };
    if plan.block(block_no).is_none() {
        debug!(block = block_no, "Discovered block");
        plan.blocks.push(Block::new(block_no));
    }
    if let Some(block) = block_mut(&mut plan.blocks, at) {
        if block.floor(floor_no).is_none() {
            debug!(block = block_no, floor = floor_no, "Discovered floor");
            block.floors.push(Floor::new(floor_no));
        }
    }
}

fn ensure_unit(plan: &mut Plan, at: &Coordinates) {
    let Some(unit_no) = at.unit else {
        return;
    };
    if let Some(floor) = floor_mut(&mut plan.blocks, at) {
        if floor.unit(unit_no).is_none() {
            debug!(unit = unit_no, floor = floor.number, "Discovered unit");
            floor.units.push(FloorUnit::new(unit_no));
        }
    }
}
