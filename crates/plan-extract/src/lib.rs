//! Drawing-to-Plan extraction
//!
//! A [`DrawingAccessor`] exposes the layered drawing, [`LayerNames`] maps
//! plan nodes to layer names, and the [`ExtractionPipeline`] runs the
//! feature extractors that populate a [`shared_types::Plan`].

pub mod drawing;
pub mod error;
pub mod features;
pub mod layer_names;
pub mod measurement;
pub mod pipeline;

pub use drawing::{
    ColourCode, Dimension, DimensionRole, DrawingAccessor, InMemoryDrawing, LayerEntities, Point,
    Polygon, TextLabel,
};
pub use error::ExtractError;
pub use layer_names::{
    keys, Coordinates, LayerNameError, LayerNames, LayerPattern, LayerTemplate, Placeholder,
};
pub use measurement::{
    measure, parse_dimension_value, parse_numeric_label, MeasurementBuilder, Overrides,
};
pub use pipeline::{
    ExtractConfig, ExtractContext, ExtractionPipeline, FeatureExtractor, KitchenColours,
};
