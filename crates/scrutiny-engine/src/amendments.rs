//! Date-versioned rule parameters
//!
//! Each topic may have several parameter sets, one per amendment. The set
//! that applies to a plan is the one with the latest `effective_from` on or
//! before the plan's effective date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmendmentError {
    #[error("No rule parameters configured for topic '{topic}'")]
    NoParameterSets { topic: String },

    #[error("No rule parameters for topic '{topic}' in force on {date} (earliest is {earliest})")]
    NotYetEffective {
        topic: String,
        date: NaiveDate,
        earliest: NaiveDate,
    },

    #[error("Topic '{topic}' has more than one parameter set effective from {effective_from}")]
    AmbiguousAmendment {
        topic: String,
        effective_from: NaiveDate,
    },

    #[error("Parameter '{name}' missing from topic '{topic}' set effective {effective_from}")]
    MissingParameter {
        topic: String,
        effective_from: NaiveDate,
        name: String,
    },
}

/// Thresholds for one topic, valid from a given date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleParameterSet {
    pub topic: String,
    pub effective_from: NaiveDate,
    /// Byelaw reference shown in the report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_no: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, Decimal>,
}

impl RuleParameterSet {
    pub fn new(topic: impl Into<String>, effective_from: NaiveDate) -> Self {
        Self {
            topic: topic.into(),
            effective_from,
            rule_no: None,
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: Decimal) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn with_rule_no(mut self, rule_no: impl Into<String>) -> Self {
        self.rule_no = Some(rule_no.into());
        self
    }

    pub fn value(&self, name: &str) -> Option<Decimal> {
        self.values.get(name).copied()
    }

    /// A named value that the topic cannot be evaluated without
    pub fn require(&self, name: &str) -> Result<Decimal, AmendmentError> {
        self.value(name)
            .ok_or_else(|| AmendmentError::MissingParameter {
                topic: self.topic.clone(),
                effective_from: self.effective_from,
                name: name.to_string(),
            })
    }
}

/// Every parameter set of one jurisdiction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCatalogue {
    sets: Vec<RuleParameterSet>,
}

impl RuleCatalogue {
    pub fn new(sets: Vec<RuleParameterSet>) -> Self {
        Self { sets }
    }

    pub fn push(&mut self, set: RuleParameterSet) {
        self.sets.push(set);
    }

    pub fn for_topic<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a RuleParameterSet> {
        self.sets.iter().filter(move |s| s.topic == topic)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Pick the parameter set in force for `topic` on `date`
    pub fn resolve(&self, topic: &str, date: NaiveDate) -> Result<&RuleParameterSet, AmendmentError> {
        let mut candidates = self.sets.iter().filter(|s| s.topic == topic).peekable();
        if candidates.peek().is_none() {
            return Err(AmendmentError::NoParameterSets {
                topic: topic.to_string(),
            });
        }

        let mut earliest: Option<NaiveDate> = None;
        let mut selected: Vec<&RuleParameterSet> = Vec::new();
        for set in candidates {
            earliest = Some(earliest.map_or(set.effective_from, |e| e.min(set.effective_from)));
            if set.effective_from > date {
                continue;
            }
            match selected.first().map(|best| best.effective_from) {
                Some(best) if set.effective_from < best => {}
                Some(best) if set.effective_from == best => selected.push(set),
                _ => selected = vec![set],
            }
        }

        match selected.as_slice() {
            [] => Err(AmendmentError::NotYetEffective {
                topic: topic.to_string(),
                date,
                earliest: earliest.unwrap_or(date),
            }),
            [only] => Ok(*only),
            [first, ..] => Err(AmendmentError::AmbiguousAmendment {
                topic: topic.to_string(),
                effective_from: first.effective_from,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn catalogue() -> RuleCatalogue {
        RuleCatalogue::new(vec![
            RuleParameterSet::new("setback", date(2023, 6, 1))
                .with_value("front_min", Decimal::from(4)),
            RuleParameterSet::new("setback", date(2020, 1, 1))
                .with_value("front_min", Decimal::from(3)),
            RuleParameterSet::new("far", date(2010, 1, 1))
                .with_value("permissible_far", Decimal::from(2)),
        ])
    }

    #[test]
    fn test_resolves_latest_set_not_after_date() {
        let catalogue = catalogue();
        assert_eq!(
            catalogue.resolve("setback", date(2022, 1, 1)).unwrap().effective_from,
            date(2020, 1, 1)
        );
        assert_eq!(
            catalogue.resolve("setback", date(2024, 1, 1)).unwrap().effective_from,
            date(2023, 6, 1)
        );
    }

    #[test]
    fn test_effective_date_is_inclusive() {
        let catalogue = catalogue();
        assert_eq!(
            catalogue.resolve("setback", date(2023, 6, 1)).unwrap().effective_from,
            date(2023, 6, 1)
        );
    }

    #[test]
    fn test_date_before_every_set_fails() {
        let err = catalogue().resolve("setback", date(2019, 1, 1)).unwrap_err();
        assert_eq!(
            err,
            AmendmentError::NotYetEffective {
                topic: "setback".to_string(),
                date: date(2019, 1, 1),
                earliest: date(2020, 1, 1),
            }
        );
    }

    #[test]
    fn test_other_topics_are_never_borrowed() {
        let err = catalogue().resolve("kitchen", date(2024, 1, 1)).unwrap_err();
        assert_eq!(
            err,
            AmendmentError::NoParameterSets {
                topic: "kitchen".to_string()
            }
        );
    }

    #[test]
    fn test_tied_dates_are_ambiguous() {
        let mut latest_tie = catalogue();
        latest_tie.push(RuleParameterSet::new("setback", date(2023, 6, 1)));
        assert!(matches!(
            latest_tie.resolve("setback", date(2024, 1, 1)),
            Err(AmendmentError::AmbiguousAmendment { .. })
        ));

        // an older tie does not matter once a later set is selected
        let mut older_tie = catalogue();
        older_tie.push(RuleParameterSet::new("setback", date(2020, 1, 1)));
        assert!(older_tie.resolve("setback", date(2024, 1, 1)).is_ok());
    }

    #[test]
    fn test_require_reports_missing_parameter() {
        let set = RuleParameterSet::new("far", date(2010, 1, 1));
        assert!(matches!(
            set.require("permissible_far"),
            Err(AmendmentError::MissingParameter { name, .. }) if name == "permissible_far"
        ));
    }

    #[test]
    fn test_parameter_sets_load_from_toml() {
        let set: RuleParameterSet = toml::from_str(
            r#"
            topic = "doors"
            effective_from = "2021-04-01"
            rule_no = "4.4.7"
            [values]
            door_min_width = "0.90"
            door_min_height = 2.1
            "#,
        )
        .unwrap();
        assert_eq!(set.value("door_min_width"), Some(Decimal::new(90, 2)));
        assert_eq!(set.value("door_min_height"), Some(Decimal::new(21, 1)));
        assert_eq!(set.rule_no.as_deref(), Some("4.4.7"));
    }
}
