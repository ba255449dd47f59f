//! Rule evaluators
//!
//! One evaluator per topic. Each reads the Plan and the topic's resolved
//! parameter set and produces that topic's report table.

pub mod doors;
pub mod far;
pub mod far_exemptions;
pub mod kitchen;
pub mod light_ventilation;
pub mod overhangs;
pub mod setback;
pub mod terrace;

use std::fmt;

use rust_decimal::Decimal;
use shared_types::{format_decimal, Plan, ReportError, ScrutinyDetail, ScrutinyRow, Status};
use thiserror::Error;

use crate::amendments::{AmendmentError, RuleParameterSet};

pub use doors::DoorRule;
pub use far::FarRule;
pub use far_exemptions::FarExemptionRule;
pub use kitchen::KitchenRule;
pub use light_ventilation::LightVentilationRule;
pub use overhangs::OverhangRule;
pub use setback::SetbackRule;
pub use terrace::TerraceRule;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("{0}")]
    Amendment(#[from] AmendmentError),

    #[error("Topic '{0}' was evaluated without its rule parameters")]
    ParametersNotResolved(String),

    #[error("Report structure violated: {0}")]
    Report(#[from] ReportError),
}

impl RuleError {
    /// Structural errors abort the whole run instead of one topic
    pub fn is_structural(&self) -> bool {
        matches!(self, RuleError::Report(_))
    }
}

/// Evaluates one rule topic
pub trait RuleEvaluator: Send + Sync {
    /// Topic key used in configuration and as the report table key
    fn topic(&self) -> &str;

    /// Catalogue topic whose parameters this evaluator needs, if any
    fn parameter_topic(&self) -> Option<&str> {
        Some(self.topic())
    }

    fn evaluate(
        &self,
        plan: &Plan,
        params: Option<&RuleParameterSet>,
    ) -> Result<ScrutinyDetail, RuleError>;
}

/// Provided cell for a quantity that could not be measured
const UNMEASURED: &str = "-";

/// Default topic order
pub const STANDARD_TOPICS: [&str; 8] = [
    far::TOPIC,
    far_exemptions::TOPIC,
    setback::TOPIC,
    terrace::TOPIC,
    overhangs::TOPIC,
    light_ventilation::TOPIC,
    kitchen::TOPIC,
    doors::TOPIC,
];

pub fn by_name(topic: &str) -> Option<Box<dyn RuleEvaluator>> {
    let evaluator: Box<dyn RuleEvaluator> = match topic {
        far::TOPIC => Box::new(FarRule),
        far_exemptions::TOPIC => Box::new(FarExemptionRule),
        setback::TOPIC => Box::new(SetbackRule),
        terrace::TOPIC => Box::new(TerraceRule),
        overhangs::TOPIC => Box::new(OverhangRule),
        light_ventilation::TOPIC => Box::new(LightVentilationRule),
        kitchen::TOPIC => Box::new(KitchenRule),
        doors::TOPIC => Box::new(DoorRule),
        _ => return None,
    };
    Some(evaluator)
}

pub fn standard_evaluators() -> Vec<Box<dyn RuleEvaluator>> {
    STANDARD_TOPICS.iter().filter_map(|t| by_name(t)).collect()
}

/// One end of a range requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Inclusive(Decimal),
    Exclusive(Decimal),
}

impl Bound {
    fn value(&self) -> Decimal {
        match self {
            Bound::Inclusive(v) | Bound::Exclusive(v) => *v,
        }
    }
}

/// Comparison between a provided quantity and a regulatory threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    AtLeast(Decimal),
    AtMost(Decimal),
    Range { min: Bound, max: Bound },
}

impl Requirement {
    pub fn closed(min: Decimal, max: Decimal) -> Self {
        Requirement::Range {
            min: Bound::Inclusive(min),
            max: Bound::Inclusive(max),
        }
    }

    pub fn open(min: Decimal, max: Decimal) -> Self {
        Requirement::Range {
            min: Bound::Exclusive(min),
            max: Bound::Exclusive(max),
        }
    }

    /// Compare on the exact value; rounding is for display only
    pub fn check(&self, provided: Decimal) -> bool {
        match self {
            Requirement::AtLeast(min) => provided >= *min,
            Requirement::AtMost(max) => provided <= *max,
            Requirement::Range { min, max } => {
                let above = match min {
                    Bound::Inclusive(v) => provided >= *v,
                    Bound::Exclusive(v) => provided > *v,
                };
                let below = match max {
                    Bound::Inclusive(v) => provided <= *v,
                    Bound::Exclusive(v) => provided < *v,
                };
                above && below
            }
        }
    }

    pub fn status(&self, provided: Decimal) -> Status {
        Status::from_pass(self.check(provided))
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::AtLeast(v) => write!(f, ">= {}", format_decimal(*v)),
            Requirement::AtMost(v) => write!(f, "<= {}", format_decimal(*v)),
            Requirement::Range { min, max } => {
                let open = if matches!(min, Bound::Inclusive(_)) { '[' } else { '(' };
                let close = if matches!(max, Bound::Inclusive(_)) { ']' } else { ')' };
                write!(
                    f,
                    "{}{}, {}{}",
                    open,
                    format_decimal(min.value()),
                    format_decimal(max.value()),
                    close
                )
            }
        }
    }
}

/// The parameter set a parameterised topic cannot run without
pub(crate) fn required_params<'p>(
    topic: &str,
    params: Option<&'p RuleParameterSet>,
) -> Result<&'p RuleParameterSet, RuleError> {
    params.ok_or_else(|| RuleError::ParametersNotResolved(topic.to_string()))
}

/// Byelaw reference from the parameter set, or the topic's default
pub(crate) fn rule_no(params: Option<&RuleParameterSet>, default: &str) -> String {
    params
        .and_then(|p| p.rule_no.clone())
        .unwrap_or_else(|| default.to_string())
}

/// Standard five-column row for a threshold comparison
pub(crate) fn threshold_row(
    rule_no: &str,
    description: impl Into<String>,
    requirement: Requirement,
    provided: Decimal,
) -> ScrutinyRow {
    ScrutinyRow {
        rule_no: Some(rule_no.to_string()),
        description: Some(description.into()),
        required: Some(requirement.to_string()),
        provided: Some(format_decimal(provided)),
        status: Some(requirement.status(provided)),
    }
}

/// Standard five-column row for a quantity that could not be measured
pub(crate) fn unmeasured_row(
    rule_no: &str,
    description: impl Into<String>,
    requirement: impl fmt::Display,
) -> ScrutinyRow {
    ScrutinyRow {
        rule_no: Some(rule_no.to_string()),
        description: Some(description.into()),
        required: Some(requirement.to_string()),
        provided: Some(UNMEASURED.to_string()),
        status: Some(Status::Rejected),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::NaiveDate;
    use shared_types::{Plan, PlanMetadata};

    pub fn plan() -> Plan {
        Plan::new(PlanMetadata {
            application_number: "APP-1".to_string(),
            jurisdiction: "test".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        })
    }

    pub fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
    }

    pub fn dec(s: &str) -> rust_decimal::Decimal {
        s.parse().unwrap()
    }
}
