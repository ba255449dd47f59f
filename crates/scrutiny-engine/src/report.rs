//! Report assembly
//!
//! Collects each topic's terminal state into report sections, in the order
//! the topics were registered.

use std::collections::BTreeMap;

use shared_types::{PlanMetadata, ReportError, ReportOutput, ReportSection};

use crate::topic::TopicState;

pub struct ReportAssembler {
    metadata: PlanMetadata,
    sections: Vec<ReportSection>,
}

impl ReportAssembler {
    pub fn new(metadata: PlanMetadata) -> Self {
        Self {
            metadata,
            sections: Vec::new(),
        }
    }

    /// Append one topic. Tables are checked against their headings; a
    /// mismatch is a structural error.
    pub fn push(&mut self, topic: &str, state: TopicState<'_>) -> Result<(), ReportError> {
        let section = match state {
            TopicState::Evaluated(detail) => {
                detail.validate()?;
                ReportSection::Detail(detail)
            }
            TopicState::Failed(reason) => ReportSection::Failed {
                topic: topic.to_string(),
                reason,
            },
            TopicState::Pending | TopicState::Resolved(_) => ReportSection::Failed {
                topic: topic.to_string(),
                reason: "Topic was not evaluated".to_string(),
            },
        };
        self.sections.push(section);
        Ok(())
    }

    pub fn finish(self, plan_errors: &BTreeMap<String, String>) -> ReportOutput {
        ReportOutput {
            metadata: self.metadata,
            sections: self.sections,
            plan_errors: plan_errors.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::plan;
    use pretty_assertions::assert_eq;
    use shared_types::{Column, ScrutinyDetail, ScrutinyRow, Status};

    #[test]
    fn test_sections_keep_registration_order() {
        let plan = plan();
        let mut assembler = ReportAssembler::new(plan.metadata.clone());
        assembler
            .push("far", TopicState::Failed("no parameters".to_string()))
            .unwrap();
        assembler
            .push(
                "terrace",
                TopicState::Evaluated(ScrutinyDetail::with_standard_columns("terrace")),
            )
            .unwrap();

        let mut errors = BTreeMap::new();
        errors.insert("plot".to_string(), "bad template".to_string());
        let report = assembler.finish(&errors);

        let keys: Vec<&str> = report.sections.iter().map(ReportSection::key).collect();
        assert_eq!(keys, vec!["far", "terrace"]);
        assert_eq!(report.failed_topics(), vec!["far"]);
        // an empty table still appears
        assert!(report.detail("terrace").unwrap().is_empty());
        assert_eq!(report.plan_errors, errors);
    }

    #[test]
    fn test_misaligned_table_is_rejected() {
        let mut detail =
            ScrutinyDetail::new("far_exemptions", &[Column::Description, Column::Status]);
        // bypass add_row to simulate a corrupted table
        detail.rows.push(ScrutinyRow {
            rule_no: Some("1".to_string()),
            status: Some(Status::Accepted),
            ..Default::default()
        });

        let mut assembler = ReportAssembler::new(plan().metadata);
        let err = assembler
            .push("far_exemptions", TopicState::Evaluated(detail))
            .unwrap_err();
        assert!(matches!(err, ReportError::HeadingMismatch { .. }));
    }

    #[test]
    fn test_unfinished_topic_is_reported_as_failed() {
        let mut assembler = ReportAssembler::new(plan().metadata);
        assembler.push("doors", TopicState::Pending).unwrap();
        let report = assembler.finish(&BTreeMap::new());
        assert_eq!(report.failed_topics(), vec!["doors"]);
    }
}
