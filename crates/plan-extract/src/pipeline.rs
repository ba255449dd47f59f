//! Extraction pipeline
//!
//! Feature extractors run in registration order over one Plan. Each gets a
//! draft copy; the draft is committed only when the extractor succeeds, so a
//! misconfigured extractor leaves no partial writes behind.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared_types::{Measurement, Plan};
use tracing::{debug, info, warn};

use crate::drawing::{ColourCode, DrawingAccessor, LayerEntities};
use crate::error::ExtractError;
use crate::features;
use crate::layer_names::{Coordinates, LayerNames, LayerPattern};
use crate::measurement::{MeasurementBuilder, Overrides};

/// Colour codes separating the sibling collections on kitchen ventilation layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitchenColours {
    pub window_width: ColourCode,
    pub door_width: ColourCode,
    pub door_height: ColourCode,
}

impl Default for KitchenColours {
    fn default() -> Self {
        Self {
            window_width: 2,
            door_width: 3,
            door_height: 4,
        }
    }
}

/// Jurisdiction-specific extraction settings
#[derive(Debug, Clone, Default)]
pub struct ExtractConfig {
    pub layer_names: LayerNames,
    /// Polygon colour to occupancy type code
    pub occupancy_colours: BTreeMap<ColourCode, String>,
    /// Type code for polygons drawn without a colour
    pub default_occupancy: Option<String>,
    pub kitchen_colours: KitchenColours,
}

impl ExtractConfig {
    pub fn occupancy_code(&self, colour: Option<ColourCode>) -> Option<&str> {
        match colour {
            Some(colour) => self.occupancy_colours.get(&colour).map(String::as_str),
            None => self.default_occupancy.as_deref(),
        }
    }
}

/// Read-only view handed to every extractor
pub struct ExtractContext<'a> {
    pub drawing: &'a dyn DrawingAccessor,
    pub config: &'a ExtractConfig,
}

impl<'a> ExtractContext<'a> {
    pub fn new(drawing: &'a dyn DrawingAccessor, config: &'a ExtractConfig) -> Self {
        Self { drawing, config }
    }

    pub fn resolve(&self, key: &str, at: &Coordinates) -> Result<LayerPattern, ExtractError> {
        Ok(self.config.layer_names.resolve(key, at)?)
    }

    /// Drawing layers matching a template, ordered by repetition number
    pub fn layers(&self, key: &str, at: &Coordinates) -> Result<Vec<String>, ExtractError> {
        let pattern = self.resolve(key, at)?;
        let mut layers: Vec<(u32, String)> = self
            .drawing
            .layer_names_matching(&pattern)
            .into_iter()
            .map(|name| (pattern.repetition_index(&name).unwrap_or(0), name))
            .collect();
        layers.sort();
        debug!(pattern = %pattern, matched = layers.len(), "Resolved layer pattern");
        Ok(layers.into_iter().map(|(_, name)| name).collect())
    }

    /// Coordinates of every drawing layer matching a template, with
    /// placeholders not fixed by `bound` read back from the layer name
    pub fn discover(
        &self,
        key: &str,
        bound: &Coordinates,
    ) -> Result<BTreeSet<Coordinates>, ExtractError> {
        let pattern = self.config.layer_names.discovery(key, bound)?;
        Ok(self
            .drawing
            .layer_names_matching(&pattern)
            .iter()
            .filter_map(|layer| pattern.captures(layer))
            .map(|found| Coordinates {
                block: bound.block.or(found.block),
                floor: bound.floor.or(found.floor),
                unit: bound.unit.or(found.unit),
                room: bound.room.or(found.room),
            })
            .collect())
    }

    pub fn entities(&self, layer: &str) -> LayerEntities {
        self.drawing.entities_by_layer(layer)
    }

    /// Measure every polygon on one layer. Geometry defects and label
    /// problems are reported into `warnings`.
    pub fn measure_layer(&self, layer: &str, warnings: &mut Vec<String>) -> Vec<Measurement> {
        let entities = self.entities(layer);
        let overrides = Overrides::from_dimensions(&entities.dimensions);
        let labels: Vec<&str> = entities.texts.iter().map(|t| t.content.as_str()).collect();

        entities
            .polygons
            .iter()
            .enumerate()
            .map(|(index, polygon)| {
                let measurement = MeasurementBuilder::new(polygon)
                    .overrides(overrides)
                    .labels(labels.iter().copied())
                    .build();
                note_defects(layer, index, &measurement, warnings);
                measurement
            })
            .collect()
    }

    /// Measurements from every layer matching a template
    pub fn measure_all(
        &self,
        key: &str,
        at: &Coordinates,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<Measurement>, ExtractError> {
        Ok(self
            .layers(key, at)?
            .iter()
            .flat_map(|layer| self.measure_layer(layer, warnings))
            .collect())
    }

    /// Dimension values from every layer matching a template
    pub fn dimension_values(&self, key: &str, at: &Coordinates) -> Result<Vec<Decimal>, ExtractError> {
        Ok(self
            .layers(key, at)?
            .iter()
            .flat_map(|layer| self.entities(layer).dimension_values())
            .collect())
    }
}

fn note_defects(layer: &str, index: usize, measurement: &Measurement, warnings: &mut Vec<String>) {
    if let Some(reason) = measurement.invalid_reason() {
        warn!(layer, polygon = index, reason, "Unmeasurable polygon");
        warnings.push(format!("{} polygon {}: {}", layer, index + 1, reason));
    }
    for warning in measurement.warnings() {
        warn!(layer, polygon = index, warning = %warning, "Measurement override ignored");
        warnings.push(format!("{} polygon {}: {}", layer, index + 1, warning));
    }
}

/// One step of the extraction pipeline
pub trait FeatureExtractor: Send + Sync {
    /// Name used in configuration and in `Plan::errors`
    fn name(&self) -> &str;

    /// Pre-condition on the plan before this extractor runs
    fn validate(&self, plan: &Plan) -> Result<(), ExtractError> {
        plan.validate_structure()?;
        Ok(())
    }

    /// Populate the draft plan from the drawing
    fn extract(&self, ctx: &ExtractContext<'_>, plan: Plan) -> Result<Plan, ExtractError>;
}

/// Ordered list of extractors
pub struct ExtractionPipeline {
    extractors: Vec<Box<dyn FeatureExtractor>>,
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl ExtractionPipeline {
    pub fn empty() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Every bundled extractor in its default order
    pub fn standard() -> Self {
        Self {
            extractors: features::standard_extractors(),
        }
    }

    /// Bundled extractors selected and ordered by name
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, ExtractError> {
        let extractors = names
            .iter()
            .map(|name| {
                features::by_name(name.as_ref())
                    .ok_or_else(|| ExtractError::UnknownExtractor(name.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { extractors })
    }

    pub fn with_extractor(mut self, extractor: Box<dyn FeatureExtractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// Run every extractor over the plan.
    ///
    /// Configuration failures are recorded in `plan.errors` under the
    /// extractor's name and the run continues. Structural violations abort.
    pub fn run(&self, ctx: &ExtractContext<'_>, plan: Plan) -> Result<Plan, ExtractError> {
        plan.validate_structure()?;
        let mut plan = plan;

        for extractor in &self.extractors {
            let name = extractor.name();
            extractor.validate(&plan)?;
            info!(extractor = name, "Running feature extractor");

            match extractor.extract(ctx, plan.clone()) {
                Ok(draft) => {
                    draft.validate_structure()?;
                    plan = draft;
                }
                Err(err) if err.is_structural() => return Err(err),
                Err(err) => {
                    warn!(extractor = name, error = %err, "Extractor failed, draft discarded");
                    plan.add_error(name, err.to_string());
                }
            }
        }

        Ok(plan)
    }
}
