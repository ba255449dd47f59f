//! Front / rear / side yards per block level
//!
//! Levels are read from the yard layer names. A yard's minimum distance is
//! the smallest dimension value drawn on its layers.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use shared_types::{Plan, SetBack, Yard, YardKind};
use tracing::warn;

use super::block_mut;
use crate::error::ExtractError;
use crate::layer_names::{keys, Coordinates};
use crate::pipeline::{ExtractContext, FeatureExtractor};

pub const NAME: &str = "setbacks";

const YARDS: [(&str, YardKind); 4] = [
    (keys::FRONT_YARD, YardKind::Front),
    (keys::REAR_YARD, YardKind::Rear),
    (keys::SIDE_YARD1, YardKind::Side1),
    (keys::SIDE_YARD2, YardKind::Side2),
];

pub struct SetbackExtractor;

impl FeatureExtractor for SetbackExtractor {
    fn name(&self) -> &str {
        NAME
    }

    fn extract(&self, ctx: &ExtractContext<'_>, mut plan: Plan) -> Result<Plan, ExtractError> {
        let numbers: Vec<u32> = plan.blocks.iter().map(|b| b.number).collect();
        for number in numbers {
            let block_at = Coordinates::block(number);
            let mut levels = BTreeSet::new();
            for (key, _) in YARDS {
                levels.extend(ctx.discover(key, &block_at)?.into_iter().filter_map(|c| c.floor));
            }

            for level in levels {
                let at = block_at.floor(level);
                let mut set_back = SetBack {
                    level,
                    ..Default::default()
                };
                for (key, kind) in YARDS {
                    let Some(yard) = read_yard(ctx, key, kind, &at, &mut plan.warnings)? else {
                        continue;
                    };
                    match kind {
                        YardKind::Front => set_back.front_yard = Some(yard),
                        YardKind::Rear => set_back.rear_yard = Some(yard),
                        YardKind::Side1 => set_back.side_yard1 = Some(yard),
                        YardKind::Side2 => set_back.side_yard2 = Some(yard),
                    }
                }
                if set_back.is_empty() {
                    continue;
                }
                if let Some(block) = block_mut(&mut plan.blocks, &block_at) {
                    match block.set_backs.iter_mut().find(|s| s.level == level) {
                        Some(existing) => *existing = set_back,
                        None => block.set_backs.push(set_back),
                    }
                }
            }
        }
        Ok(plan)
    }
}

fn read_yard(
    ctx: &ExtractContext<'_>,
    key: &str,
    kind: YardKind,
    at: &Coordinates,
    warnings: &mut Vec<String>,
) -> Result<Option<Yard>, ExtractError> {
    let layers = ctx.layers(key, at)?;
    let Some(measurement) = layers
        .iter()
        .flat_map(|layer| ctx.measure_layer(layer, warnings))
        .next()
    else {
        return Ok(None);
    };
    let min_distance: Option<Decimal> = layers
        .iter()
        .flat_map(|layer| ctx.entities(layer).dimension_values())
        .min();
    if min_distance.is_none() {
        warn!(yard = kind.description(), level = ?at.floor, "Yard has no distance dimension");
        warnings.push(format!(
            "{} at block {} level {} has no distance dimension",
            kind.description(),
            at.block.unwrap_or_default(),
            at.floor.unwrap_or_default()
        ));
    }
    Ok(Some(Yard {
        measurement,
        min_distance,
    }))
}
