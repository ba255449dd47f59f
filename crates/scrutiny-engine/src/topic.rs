//! Per-topic progress
//!
//! A topic moves `Pending -> Resolved -> Evaluated`, or drops to `Failed`
//! when its parameters cannot be resolved or its evaluation hits a
//! configuration error. Structural errors are not absorbed here.

use chrono::NaiveDate;
use shared_types::{Plan, ScrutinyDetail};
use tracing::{debug, warn};

use crate::amendments::{RuleCatalogue, RuleParameterSet};
use crate::rules::{RuleError, RuleEvaluator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicState<'c> {
    Pending,
    /// Parameters chosen; `None` for topics that take none
    Resolved(Option<&'c RuleParameterSet>),
    Evaluated(ScrutinyDetail),
    Failed(String),
}

impl<'c> TopicState<'c> {
    /// Choose the parameter set in force on `date`. Depends only on the
    /// topic, the date and the catalogue.
    pub fn resolve(
        self,
        evaluator: &dyn RuleEvaluator,
        catalogue: &'c RuleCatalogue,
        date: NaiveDate,
    ) -> Self {
        if !matches!(self, TopicState::Pending) {
            return self;
        }
        let Some(parameter_topic) = evaluator.parameter_topic() else {
            return TopicState::Resolved(None);
        };
        match catalogue.resolve(parameter_topic, date) {
            Ok(set) => {
                debug!(
                    topic = evaluator.topic(),
                    effective_from = %set.effective_from,
                    "Resolved rule parameters"
                );
                TopicState::Resolved(Some(set))
            }
            Err(err) => {
                warn!(topic = evaluator.topic(), error = %err, "Rule parameters unavailable");
                TopicState::Failed(err.to_string())
            }
        }
    }

    /// Run the evaluator on a resolved topic
    pub fn evaluate(self, evaluator: &dyn RuleEvaluator, plan: &Plan) -> Result<Self, RuleError> {
        let params = match self {
            TopicState::Resolved(params) => params,
            other => return Ok(other),
        };
        match evaluator.evaluate(plan, params) {
            Ok(detail) => Ok(TopicState::Evaluated(detail)),
            Err(err) if err.is_structural() => Err(err),
            Err(err) => {
                warn!(topic = evaluator.topic(), error = %err, "Topic evaluation failed");
                Ok(TopicState::Failed(err.to_string()))
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TopicState::Evaluated(_) | TopicState::Failed(_))
    }
}
