use shared_types::{Plan, Plot};
use tracing::warn;

use crate::error::ExtractError;
use crate::layer_names::{keys, Coordinates};
use crate::pipeline::{ExtractContext, FeatureExtractor};

pub const NAME: &str = "plot";

/// Plot boundary area
pub struct PlotExtractor;

impl FeatureExtractor for PlotExtractor {
    fn name(&self) -> &str {
        NAME
    }

    fn extract(&self, ctx: &ExtractContext<'_>, mut plan: Plan) -> Result<Plan, ExtractError> {
        let measurements =
            ctx.measure_all(keys::PLOT_BOUNDARY, &Coordinates::default(), &mut plan.warnings)?;

        // First measurable boundary wins; an unmeasurable one is still recorded
        let chosen = measurements
            .iter()
            .position(|m| m.is_valid())
            .or(if measurements.is_empty() { None } else { Some(0) });

        match chosen {
            Some(index) => {
                if measurements.len() > 1 {
                    plan.warnings.push(format!(
                        "{} plot boundary polygons found, using polygon {}",
                        measurements.len(),
                        index + 1
                    ));
                }
                plan.plot = Some(Plot {
                    measurement: measurements[index].clone(),
                });
            }
            None => {
                warn!("No plot boundary in drawing");
                plan.warnings.push("Plot boundary not found".to_string());
            }
        }
        Ok(plan)
    }
}
