//! Domain model shared by plan extraction and scrutiny

pub mod measurement;
pub mod occupancy;
pub mod plan;
pub mod report;

pub use measurement::{Dimensions, Measurement, MeasurementWithHeight};
pub use occupancy::Occupancy;
pub use plan::{
    Block, ExemptionCategory, FarExemption, FarSummary, Floor, FloorUnit, Kitchen, Opening,
    Plan, PlanError, PlanMetadata, Plot, Projection, Room, SetBack, Terrace, Yard, YardKind,
};
pub use report::{
    format_decimal, round_half_up, Column, ReportError, ReportOutput, ReportSection,
    ScrutinyDetail, ScrutinyRow, Status, STANDARD_COLUMNS,
};
