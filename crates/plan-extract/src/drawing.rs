//! Entity lookup contract for a vectorized drawing
//!
//! The engine never parses a CAD container. A collaborator exposes the
//! drawing through [`DrawingAccessor`]; [`InMemoryDrawing`] is a serde-loadable
//! implementation used by the CLI and tests.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::layer_names::LayerPattern;

/// Drawing colour index used to key sibling collections on one layer
pub type ColourCode = u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: Decimal,
    pub y: Decimal,
}

impl Point {
    pub fn new(x: Decimal, y: Decimal) -> Self {
        Self { x, y }
    }
}

fn default_closed() -> bool {
    true
}

/// Polyline entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<Point>,
    #[serde(default = "default_closed")]
    pub closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<ColourCode>,
}

impl Polygon {
    pub fn closed(vertices: Vec<Point>) -> Self {
        Self {
            vertices,
            closed: true,
            colour: None,
        }
    }

    pub fn with_colour(mut self, colour: ColourCode) -> Self {
        self.colour = Some(colour);
        self
    }
}

/// Which quantity a dimension annotation overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionRole {
    Width,
    Height,
    Length,
    #[default]
    Unspecified,
}

/// Dimension annotation with its measured value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub value: Decimal,
    #[serde(default)]
    pub role: DimensionRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<ColourCode>,
}

/// Free-text label (TEXT / MTEXT)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLabel {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<ColourCode>,
}

/// Everything drawn on one layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerEntities {
    #[serde(default)]
    pub polygons: Vec<Polygon>,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub texts: Vec<TextLabel>,
}

impl LayerEntities {
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.dimensions.is_empty() && self.texts.is_empty()
    }

    /// Every dimension value on the layer, in drawing order
    pub fn dimension_values(&self) -> Vec<Decimal> {
        self.dimensions.iter().map(|d| d.value).collect()
    }

    /// Dimension values drawn in one colour
    pub fn dimension_values_by_colour(&self, colour: ColourCode) -> Vec<Decimal> {
        self.dimensions
            .iter()
            .filter(|d| d.colour == Some(colour))
            .map(|d| d.value)
            .collect()
    }

    pub fn first_text(&self) -> Option<&str> {
        self.texts
            .iter()
            .map(|t| t.content.as_str())
            .find(|t| !t.trim().is_empty())
    }
}

/// Read-only entity lookup over one drawing
pub trait DrawingAccessor: Send + Sync {
    /// Entities on exactly this layer; empty when the layer does not exist
    fn entities_by_layer(&self, layer: &str) -> LayerEntities;

    /// Names of all layers matched by the pattern
    fn layer_names_matching(&self, pattern: &LayerPattern) -> Vec<String>;

    fn has_layer(&self, layer: &str) -> bool;
}

/// Drawing held in memory as a layer-name to entities map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryDrawing {
    #[serde(default)]
    pub layers: BTreeMap<String, LayerEntities>,
}

impl InMemoryDrawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Add a layer, merging with any entities already on it
    pub fn with_layer(mut self, name: impl Into<String>, entities: LayerEntities) -> Self {
        let layer = self.layers.entry(name.into()).or_default();
        layer.polygons.extend(entities.polygons);
        layer.dimensions.extend(entities.dimensions);
        layer.texts.extend(entities.texts);
        self
    }

    pub fn with_polygon(self, name: impl Into<String>, polygon: Polygon) -> Self {
        self.with_layer(
            name,
            LayerEntities {
                polygons: vec![polygon],
                ..Default::default()
            },
        )
    }
}

impl DrawingAccessor for InMemoryDrawing {
    fn entities_by_layer(&self, layer: &str) -> LayerEntities {
        self.layers.get(layer).cloned().unwrap_or_default()
    }

    fn layer_names_matching(&self, pattern: &LayerPattern) -> Vec<String> {
        self.layers
            .keys()
            .filter(|name| pattern.matches(name))
            .cloned()
            .collect()
    }

    fn has_layer(&self, layer: &str) -> bool {
        self.layers.contains_key(layer)
    }
}
