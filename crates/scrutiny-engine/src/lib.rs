//! Building-plan scrutiny
//!
//! Extracts a [`Plan`] from a layered drawing and checks it against a
//! jurisdiction's dated rule parameters, producing a [`ReportOutput`].

pub mod amendments;
pub mod config;
pub mod report;
pub mod rules;
pub mod topic;

use plan_extract::{
    DrawingAccessor, ExtractConfig, ExtractContext, ExtractError, ExtractionPipeline,
};
use shared_types::{Plan, ReportError, ReportOutput};
use thiserror::Error;
use tracing::info;

pub use amendments::{AmendmentError, RuleCatalogue, RuleParameterSet};
pub use config::{JurisdictionConfig, OccupancyColour};
pub use report::ReportAssembler;
pub use rules::{Requirement, RuleError, RuleEvaluator};
pub use topic::TopicState;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrutinyError {
    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Unknown rule topic '{0}'")]
    UnknownTopic(String),

    #[error("Rule evaluation failed: {0}")]
    Rule(#[from] RuleError),

    #[error("Report assembly failed: {0}")]
    Report(#[from] ReportError),
}

/// Extraction and scrutiny for one jurisdiction. Immutable once built, so a
/// single engine can serve concurrent runs.
pub struct ScrutinyEngine {
    jurisdiction: String,
    extract_config: ExtractConfig,
    pipeline: ExtractionPipeline,
    evaluators: Vec<Box<dyn RuleEvaluator>>,
    catalogue: RuleCatalogue,
}

impl ScrutinyEngine {
    pub fn new(config: JurisdictionConfig) -> Result<Self, ScrutinyError> {
        let extract_config = config.extract_config();
        let pipeline = match &config.extractors {
            Some(names) => ExtractionPipeline::from_names(names.as_slice())?,
            None => ExtractionPipeline::standard(),
        };
        let evaluators = match &config.topics {
            Some(topics) => topics
                .iter()
                .map(|t| {
                    rules::by_name(t).ok_or_else(|| ScrutinyError::UnknownTopic(t.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => rules::standard_evaluators(),
        };
        let catalogue = config.catalogue();

        info!(
            jurisdiction = %config.jurisdiction,
            extractors = pipeline.names().len(),
            topics = evaluators.len(),
            parameter_sets = catalogue.len(),
            "Scrutiny engine configured"
        );

        Ok(Self {
            jurisdiction: config.jurisdiction,
            extract_config,
            pipeline,
            evaluators,
            catalogue,
        })
    }

    pub fn jurisdiction(&self) -> &str {
        &self.jurisdiction
    }

    pub fn topics(&self) -> Vec<&str> {
        self.evaluators.iter().map(|e| e.topic()).collect()
    }

    /// Populate the plan from the drawing
    pub fn extract(
        &self,
        plan: Plan,
        drawing: &dyn DrawingAccessor,
    ) -> Result<Plan, ScrutinyError> {
        let ctx = ExtractContext::new(drawing, &self.extract_config);
        let plan = self.pipeline.run(&ctx, plan)?;
        info!(
            blocks = plan.blocks.len(),
            errors = plan.errors.len(),
            warnings = plan.warnings.len(),
            "Extraction complete"
        );
        Ok(plan)
    }

    /// Evaluate every configured topic against the plan.
    ///
    /// Topics that cannot be resolved or evaluated appear as failed
    /// sections; other topics are unaffected. Only structural errors fail
    /// the whole run.
    pub fn scrutinize(&self, plan: &Plan) -> Result<ReportOutput, ScrutinyError> {
        let date = plan.metadata.effective_date;
        let mut assembler = ReportAssembler::new(plan.metadata.clone());

        for evaluator in &self.evaluators {
            let topic = evaluator.topic();
            info!(topic, %date, "Evaluating rule topic");
            let state = TopicState::Pending
                .resolve(evaluator.as_ref(), &self.catalogue, date)
                .evaluate(evaluator.as_ref(), plan)?;
            assembler.push(topic, state)?;
        }

        let report = assembler.finish(&plan.errors);
        info!(
            sections = report.sections.len(),
            failed = report.failed_topics().len(),
            compliant = report.is_compliant(),
            "Scrutiny complete"
        );
        Ok(report)
    }

    /// Extract then scrutinize
    pub fn run(
        &self,
        plan: Plan,
        drawing: &dyn DrawingAccessor,
    ) -> Result<(Plan, ReportOutput), ScrutinyError> {
        let plan = self.extract(plan, drawing)?;
        let report = self.scrutinize(&plan)?;
        Ok((plan, report))
    }
}
