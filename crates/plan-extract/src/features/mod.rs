//! Bundled feature extractors
//!
//! Each extractor reads one family of layers and writes one part of the
//! Plan. Extractors after `building` only visit nodes that already exist.

pub mod building;
pub mod far_exemptions;
pub mod occupancy;
pub mod openings;
pub mod overhangs;
pub mod plot;
pub mod projections;
pub mod setbacks;
pub mod terrace;
pub mod ventilation;

use shared_types::{Block, Floor, FloorUnit, Plan, Room};

use crate::layer_names::Coordinates;
use crate::pipeline::FeatureExtractor;

pub use building::BuildingExtractor;
pub use far_exemptions::FarExemptionExtractor;
pub use occupancy::OccupancyExtractor;
pub use openings::OpeningExtractor;
pub use overhangs::OverhangExtractor;
pub use plot::PlotExtractor;
pub use projections::ProjectionExtractor;
pub use setbacks::SetbackExtractor;
pub use terrace::TerraceExtractor;
pub use ventilation::VentilationExtractor;

/// Default registration order
pub const STANDARD_ORDER: [&str; 10] = [
    building::NAME,
    plot::NAME,
    occupancy::NAME,
    far_exemptions::NAME,
    terrace::NAME,
    overhangs::NAME,
    setbacks::NAME,
    ventilation::NAME,
    openings::NAME,
    projections::NAME,
];

pub fn by_name(name: &str) -> Option<Box<dyn FeatureExtractor>> {
    let extractor: Box<dyn FeatureExtractor> = match name {
        building::NAME => Box::new(BuildingExtractor),
        plot::NAME => Box::new(PlotExtractor),
        occupancy::NAME => Box::new(OccupancyExtractor),
        far_exemptions::NAME => Box::new(FarExemptionExtractor),
        terrace::NAME => Box::new(TerraceExtractor),
        overhangs::NAME => Box::new(OverhangExtractor),
        setbacks::NAME => Box::new(SetbackExtractor),
        ventilation::NAME => Box::new(VentilationExtractor),
        openings::NAME => Box::new(OpeningExtractor),
        projections::NAME => Box::new(ProjectionExtractor),
        _ => return None,
    };
    Some(extractor)
}

pub fn standard_extractors() -> Vec<Box<dyn FeatureExtractor>> {
    STANDARD_ORDER.iter().filter_map(|name| by_name(name)).collect()
}

pub(crate) fn floor_coordinates(plan: &Plan) -> Vec<Coordinates> {
    plan.blocks
        .iter()
        .flat_map(|b| {
            b.floors
                .iter()
                .map(move |f| Coordinates::block(b.number).floor(f.number))
        })
        .collect()
}

pub(crate) fn unit_coordinates(plan: &Plan) -> Vec<Coordinates> {
    plan.blocks
        .iter()
        .flat_map(|b| {
            b.floors.iter().flat_map(move |f| {
                f.units
                    .iter()
                    .map(move |u| Coordinates::block(b.number).floor(f.number).unit(u.number))
            })
        })
        .collect()
}

/// Room coordinates paired with the room's air-conditioned flag
pub(crate) fn room_coordinates(plan: &Plan) -> Vec<(Coordinates, bool)> {
    let mut rooms = Vec::new();
    for at in unit_coordinates(plan) {
        if let Some(unit) = unit_at(&plan.blocks, &at) {
            for room in &unit.rooms {
                rooms.push((at.room(room.number), room.air_conditioned));
            }
        }
    }
    rooms
}

fn unit_at<'p>(blocks: &'p [Block], at: &Coordinates) -> Option<&'p FloorUnit> {
    blocks
        .iter()
        .find(|b| Some(b.number) == at.block)?
        .floor(at.floor?)?
        .unit(at.unit?)
}

pub(crate) fn block_mut<'p>(blocks: &'p mut [Block], at: &Coordinates) -> Option<&'p mut Block> {
    blocks.iter_mut().find(|b| Some(b.number) == at.block)
}

pub(crate) fn floor_mut<'p>(blocks: &'p mut [Block], at: &Coordinates) -> Option<&'p mut Floor> {
    block_mut(blocks, at)?.floor_mut(at.floor?)
}

pub(crate) fn unit_mut<'p>(blocks: &'p mut [Block], at: &Coordinates) -> Option<&'p mut FloorUnit> {
    floor_mut(blocks, at)?.unit_mut(at.unit?)
}

pub(crate) fn room_mut<'p>(
    blocks: &'p mut [Block],
    at: &Coordinates,
    air_conditioned: bool,
) -> Option<&'p mut Room> {
    unit_mut(blocks, at)?.room_mut(at.room?, air_conditioned)
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared_types::{Plan, PlanMetadata};

    use crate::drawing::{Point, Polygon};

    pub fn plan() -> Plan {
        Plan::new(PlanMetadata {
            application_number: "APP-1".to_string(),
            jurisdiction: "test".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        })
    }

    pub fn rectangle(width: i64, height: i64) -> Polygon {
        let (w, h) = (Decimal::from(width), Decimal::from(height));
        Polygon::closed(vec![
            Point::new(Decimal::ZERO, Decimal::ZERO),
            Point::new(w, Decimal::ZERO),
            Point::new(w, h),
            Point::new(Decimal::ZERO, h),
        ])
    }
}
