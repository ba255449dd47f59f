//! Plan domain model: the hierarchy extracted from one building drawing

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::measurement::{total_area, Measurement, MeasurementWithHeight};
use crate::occupancy::{self, Occupancy};

/// Structural violations that make a plan untrustworthy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Duplicate block number {0}")]
    DuplicateBlock(u32),

    #[error("Duplicate floor number {floor} in block {block}")]
    DuplicateFloor { block: u32, floor: i32 },

    #[error("Duplicate unit number {unit} on block {block} floor {floor}")]
    DuplicateUnit { block: u32, floor: i32, unit: u32 },

    #[error("Duplicate room number {room} in block {block} floor {floor} unit {unit}")]
    DuplicateRoom {
        block: u32,
        floor: i32,
        unit: u32,
        room: u32,
    },
}

/// Caller-supplied facts about the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub application_number: String,
    /// Tenant / jurisdiction identifier
    pub jurisdiction: String,
    /// Date used to pick the applicable rule amendments
    pub effective_date: NaiveDate,
}

/// Full drawing-derived state of one application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub metadata: PlanMetadata,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<Plot>,
    #[serde(default)]
    pub far_exemptions: FarExemption,
    /// Extraction failures keyed by feature name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Plan {
    pub fn new(metadata: PlanMetadata) -> Self {
        Self {
            metadata,
            blocks: Vec::new(),
            plot: None,
            far_exemptions: FarExemption::default(),
            errors: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn block(&self, number: u32) -> Option<&Block> {
        self.blocks.iter().find(|b| b.number == number)
    }

    pub fn block_mut(&mut self, number: u32) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.number == number)
    }

    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(key.into(), message.into());
    }

    /// Check the uniqueness invariants of the whole hierarchy
    pub fn validate_structure(&self) -> Result<(), PlanError> {
        let mut blocks = HashSet::new();
        for block in &self.blocks {
            if !blocks.insert(block.number) {
                return Err(PlanError::DuplicateBlock(block.number));
            }
            let mut floors = HashSet::new();
            for floor in &block.floors {
                if !floors.insert(floor.number) {
                    return Err(PlanError::DuplicateFloor {
                        block: block.number,
                        floor: floor.number,
                    });
                }
                let mut units = HashSet::new();
                for unit in &floor.units {
                    if !units.insert(unit.number) {
                        return Err(PlanError::DuplicateUnit {
                            block: block.number,
                            floor: floor.number,
                            unit: unit.number,
                        });
                    }
                    // regular and AC rooms are numbered independently
                    let mut rooms = HashSet::new();
                    for room in &unit.rooms {
                        if !rooms.insert((room.number, room.air_conditioned)) {
                            return Err(PlanError::DuplicateRoom {
                                block: block.number,
                                floor: floor.number,
                                unit: unit.number,
                                room: room.number,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Plot and floor-area-ratio summary across all blocks
    pub fn far_summary(&self) -> FarSummary {
        let mut built_up = Decimal::ZERO;
        let mut deduction = Decimal::ZERO;
        for floor in self.blocks.iter().flat_map(|b| b.floors.iter()) {
            for occupancy in &floor.occupancies {
                built_up += occupancy.built_up_area.unwrap_or_default();
                deduction += occupancy.deduction.unwrap_or_default();
            }
        }
        let net_floor_area = built_up - deduction;
        let plot_area = self.plot.as_ref().and_then(|p| p.measurement.area());
        let far = plot_area
            .filter(|area| !area.is_zero())
            .map(|area| net_floor_area / area);

        FarSummary {
            plot_area,
            total_built_up_area: built_up,
            total_deduction: deduction,
            net_floor_area,
            far,
        }
    }
}

/// Plot boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plot {
    pub measurement: Measurement,
}

/// Derived FAR figures, full precision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarSummary {
    pub plot_area: Option<Decimal>,
    pub total_built_up_area: Decimal,
    pub total_deduction: Decimal,
    pub net_floor_area: Decimal,
    pub far: Option<Decimal>,
}

/// Areas exempted from FAR, summed across the plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarExemption {
    pub basement_parking: Option<Decimal>,
    pub basement_service_floor: Option<Decimal>,
    pub entrance_lobby: Option<Decimal>,
    pub balcony: Option<Decimal>,
    pub corridor: Option<Decimal>,
    pub projection: Option<Decimal>,
    pub guard_room: Option<Decimal>,
    pub care_taker_room: Option<Decimal>,
}

/// Exemption categories in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExemptionCategory {
    BasementParking,
    BasementServiceFloor,
    EntranceLobby,
    Balcony,
    Corridor,
    Projection,
    GuardRoom,
    CareTakerRoom,
}

impl ExemptionCategory {
    pub const ALL: [ExemptionCategory; 8] = [
        ExemptionCategory::BasementParking,
        ExemptionCategory::BasementServiceFloor,
        ExemptionCategory::EntranceLobby,
        ExemptionCategory::Balcony,
        ExemptionCategory::Corridor,
        ExemptionCategory::Projection,
        ExemptionCategory::GuardRoom,
        ExemptionCategory::CareTakerRoom,
    ];

    /// Suffix used in configuration keys, e.g. `far_deduct_basement_parking`
    pub fn key(&self) -> &'static str {
        match self {
            ExemptionCategory::BasementParking => "basement_parking",
            ExemptionCategory::BasementServiceFloor => "basement_service_floor",
            ExemptionCategory::EntranceLobby => "entrance_lobby",
            ExemptionCategory::Balcony => "balcony",
            ExemptionCategory::Corridor => "corridor",
            ExemptionCategory::Projection => "projection",
            ExemptionCategory::GuardRoom => "guard_room",
            ExemptionCategory::CareTakerRoom => "care_taker_room",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ExemptionCategory::BasementParking => "Deducted basement parking area",
            ExemptionCategory::BasementServiceFloor => "Deducted basement service floor area",
            ExemptionCategory::EntranceLobby => "Deducted entrance lobby area",
            ExemptionCategory::Balcony => "Deducted balcony area",
            ExemptionCategory::Corridor => "Deducted corridor area",
            ExemptionCategory::Projection => "Deducted total projections area",
            ExemptionCategory::GuardRoom => "Deducted guard room area",
            ExemptionCategory::CareTakerRoom => "Deducted caretaker room area",
        }
    }
}

impl FarExemption {
    pub fn get(&self, category: ExemptionCategory) -> Option<Decimal> {
        match category {
            ExemptionCategory::BasementParking => self.basement_parking,
            ExemptionCategory::BasementServiceFloor => self.basement_service_floor,
            ExemptionCategory::EntranceLobby => self.entrance_lobby,
            ExemptionCategory::Balcony => self.balcony,
            ExemptionCategory::Corridor => self.corridor,
            ExemptionCategory::Projection => self.projection,
            ExemptionCategory::GuardRoom => self.guard_room,
            ExemptionCategory::CareTakerRoom => self.care_taker_room,
        }
    }

    fn slot(&mut self, category: ExemptionCategory) -> &mut Option<Decimal> {
        match category {
            ExemptionCategory::BasementParking => &mut self.basement_parking,
            ExemptionCategory::BasementServiceFloor => &mut self.basement_service_floor,
            ExemptionCategory::EntranceLobby => &mut self.entrance_lobby,
            ExemptionCategory::Balcony => &mut self.balcony,
            ExemptionCategory::Corridor => &mut self.corridor,
            ExemptionCategory::Projection => &mut self.projection,
            ExemptionCategory::GuardRoom => &mut self.guard_room,
            ExemptionCategory::CareTakerRoom => &mut self.care_taker_room,
        }
    }

    /// Add to a category, starting from zero when nothing was recorded yet
    pub fn add(&mut self, category: ExemptionCategory, area: Decimal) {
        let slot = self.slot(category);
        *slot = Some(slot.unwrap_or_default() + area);
    }
}

/// One building or wing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub floors: Vec<Floor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrace: Option<Terrace>,
    #[serde(default)]
    pub set_backs: Vec<SetBack>,
    #[serde(default)]
    pub projected_balconies: Vec<Measurement>,
}

impl Block {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            name: format!("Block {}", number),
            ..Default::default()
        }
    }

    pub fn floor(&self, number: i32) -> Option<&Floor> {
        self.floors.iter().find(|f| f.number == number)
    }

    pub fn floor_mut(&mut self, number: i32) -> Option<&mut Floor> {
        self.floors.iter_mut().find(|f| f.number == number)
    }

    pub fn set_back(&self, level: i32) -> Option<&SetBack> {
        self.set_backs.iter().find(|s| s.level == level)
    }
}

/// Roof terrace of a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terrace {
    pub measurement: Measurement,
}

impl Terrace {
    pub fn area(&self) -> Option<Decimal> {
        self.measurement.area()
    }
}

/// Yards around a block at one level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetBack {
    pub level: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_yard: Option<Yard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rear_yard: Option<Yard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_yard1: Option<Yard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_yard2: Option<Yard>,
}

impl SetBack {
    pub fn yards(&self) -> impl Iterator<Item = (YardKind, &Yard)> {
        [
            (YardKind::Front, self.front_yard.as_ref()),
            (YardKind::Rear, self.rear_yard.as_ref()),
            (YardKind::Side1, self.side_yard1.as_ref()),
            (YardKind::Side2, self.side_yard2.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, yard)| yard.map(|y| (kind, y)))
    }

    pub fn is_empty(&self) -> bool {
        self.yards().next().is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YardKind {
    Front,
    Rear,
    Side1,
    Side2,
}

impl YardKind {
    pub fn description(&self) -> &'static str {
        match self {
            YardKind::Front => "Front yard",
            YardKind::Rear => "Rear yard",
            YardKind::Side1 => "Side yard 1",
            YardKind::Side2 => "Side yard 2",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Yard {
    pub measurement: Measurement,
    /// Shortest distance to the plot boundary, when it could be determined
    pub min_distance: Option<Decimal>,
}

/// One storey within a block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub number: i32,
    pub name: String,
    #[serde(default)]
    pub occupancies: Vec<Occupancy>,
    #[serde(default)]
    pub units: Vec<FloorUnit>,
    #[serde(default)]
    pub overhangs: Vec<Measurement>,
    #[serde(default)]
    pub projected_balconies: Vec<Measurement>,
    #[serde(default)]
    pub balcony_distances_to_plot_boundary: Vec<Decimal>,
}

impl Floor {
    pub fn new(number: i32) -> Self {
        Self {
            number,
            name: format!("Floor {}", number),
            ..Default::default()
        }
    }

    pub fn unit(&self, number: u32) -> Option<&FloorUnit> {
        self.units.iter().find(|u| u.number == number)
    }

    pub fn unit_mut(&mut self, number: u32) -> Option<&mut FloorUnit> {
        self.units.iter_mut().find(|u| u.number == number)
    }

    pub fn add_built_up_area(&mut self, incoming: Occupancy) {
        occupancy::add_built_up_area(&mut self.occupancies, incoming);
    }

    pub fn add_carpet_area(&mut self, incoming: Occupancy) {
        occupancy::add_carpet_area(&mut self.occupancies, incoming);
    }

    pub fn add_deduction_area(&mut self, incoming: Occupancy) {
        occupancy::add_deduction_area(&mut self.occupancies, incoming);
    }
}

/// An independently occupiable unit on a floor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorUnit {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<Measurement>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kitchen: Option<Kitchen>,
    #[serde(default)]
    pub light_and_ventilation: MeasurementWithHeight,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laundry_or_recreation_ventilation: Option<MeasurementWithHeight>,
}

impl FloorUnit {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    /// Regular (non-AC) room by number
    pub fn room(&self, number: u32) -> Option<&Room> {
        self.find_room(number, false)
    }

    pub fn ac_room(&self, number: u32) -> Option<&Room> {
        self.find_room(number, true)
    }

    pub fn find_room(&self, number: u32, air_conditioned: bool) -> Option<&Room> {
        self.rooms
            .iter()
            .find(|r| r.number == number && r.air_conditioned == air_conditioned)
    }

    pub fn room_mut(&mut self, number: u32, air_conditioned: bool) -> Option<&mut Room> {
        self.rooms
            .iter_mut()
            .find(|r| r.number == number && r.air_conditioned == air_conditioned)
    }
}

/// An enclosed space inside a unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub number: u32,
    pub closed: bool,
    #[serde(default)]
    pub air_conditioned: bool,
    #[serde(default)]
    pub areas: Vec<Measurement>,
    #[serde(default)]
    pub light_and_ventilation: MeasurementWithHeight,
    #[serde(default)]
    pub windows: Vec<Opening>,
    #[serde(default)]
    pub doors: Vec<Opening>,
    #[serde(default)]
    pub projections: Vec<Projection>,
}

impl Room {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    pub fn floor_area(&self) -> Decimal {
        total_area(&self.areas)
    }
}

/// Kitchen room plus the sibling collections read from its ventilation layers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kitchen {
    pub room: Room,
    #[serde(default)]
    pub window_widths: Vec<Decimal>,
    #[serde(default)]
    pub door_widths: Vec<Decimal>,
    #[serde(default)]
    pub door_heights: Vec<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_height: Option<Decimal>,
}

/// A window or door
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    pub number: u32,
    pub measurement: Measurement,
}

impl Opening {
    pub fn width(&self) -> Option<Decimal> {
        self.measurement.width()
    }

    pub fn height(&self) -> Option<Decimal> {
        self.measurement.height()
    }
}

/// A room projection such as a sunshade or bay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub number: u32,
    pub measurement: Measurement,
}
