use shared_types::{Plan, ScrutinyDetail};
use tracing::debug;

use super::{required_params, rule_no, threshold_row, unmeasured_row, Requirement};
use super::{RuleError, RuleEvaluator};
use crate::amendments::RuleParameterSet;

pub const TOPIC: &str = "far";
const RULE_NO: &str = "4.4.4(i)";
const DESCRIPTION: &str = "Floor area ratio";

pub struct FarRule;

impl RuleEvaluator for FarRule {
    fn topic(&self) -> &str {
        TOPIC
    }

    fn evaluate(
        &self,
        plan: &Plan,
        params: Option<&RuleParameterSet>,
    ) -> Result<ScrutinyDetail, RuleError> {
        let set = required_params(TOPIC, params)?;
        let requirement = Requirement::AtMost(set.require("permissible_far")?);
        let rule_no = rule_no(params, RULE_NO);

        let summary = plan.far_summary();
        debug!(
            built_up = %summary.total_built_up_area,
            deduction = %summary.total_deduction,
            plot = ?summary.plot_area,
            "FAR summary"
        );

        let mut detail = ScrutinyDetail::with_standard_columns(TOPIC);
        let row = match summary.far {
            Some(far) => threshold_row(&rule_no, DESCRIPTION, requirement, far),
            None => unmeasured_row(&rule_no, DESCRIPTION, requirement),
        };
        detail.add_row(row)?;
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amendments::AmendmentError;
    use crate::rules::testing::{date, dec, plan};
    use pretty_assertions::assert_eq;
    use shared_types::{Block, Dimensions, Floor, Measurement, Occupancy, Plot, Status};

    fn params(permissible: &str) -> RuleParameterSet {
        RuleParameterSet::new(TOPIC, date()).with_value("permissible_far", dec(permissible))
    }

    fn plan_with_far(built_up: &str, deduction: &str, plot_area: &str) -> Plan {
        let mut plan = plan();
        let mut floor = Floor::new(0);
        floor.add_built_up_area(Occupancy::new("A").with_built_up_area(dec(built_up), None));
        floor.add_deduction_area(Occupancy::new("A").with_deduction(dec(deduction), None));
        let mut block = Block::new(1);
        block.floors.push(floor);
        plan.blocks.push(block);
        plan.plot = Some(Plot {
            measurement: Measurement::valid(Dimensions {
                area: dec(plot_area),
                ..Default::default()
            }),
        });
        plan
    }

    #[test]
    fn test_far_within_limit_is_accepted() {
        let plan = plan_with_far("300", "50", "200");
        let detail = FarRule.evaluate(&plan, Some(&params("1.5"))).unwrap();

        assert_eq!(detail.rows.len(), 1);
        let row = &detail.rows[0];
        assert_eq!(row.provided.as_deref(), Some("1.25"));
        assert_eq!(row.required.as_deref(), Some("<= 1.50"));
        assert_eq!(row.rule_no.as_deref(), Some(RULE_NO));
        assert!(row.is_accepted());
    }

    #[test]
    fn test_far_above_limit_is_rejected() {
        let plan = plan_with_far("401", "0", "200");
        let detail = FarRule.evaluate(&plan, Some(&params("2"))).unwrap();
        assert_eq!(detail.rows[0].status, Some(Status::Rejected));
    }

    #[test]
    fn test_missing_plot_is_unmeasured() {
        let mut plan = plan_with_far("100", "0", "1");
        plan.plot = None;

        let detail = FarRule.evaluate(&plan, Some(&params("2"))).unwrap();
        assert_eq!(detail.rows[0].provided.as_deref(), Some("-"));
        assert_eq!(detail.rows[0].status, Some(Status::Rejected));
    }

    #[test]
    fn test_rule_no_comes_from_parameters() {
        let plan = plan_with_far("100", "0", "100");
        let set = params("2").with_rule_no("29(2)");
        let detail = FarRule.evaluate(&plan, Some(&set)).unwrap();
        assert_eq!(detail.rows[0].rule_no.as_deref(), Some("29(2)"));
    }

    #[test]
    fn test_missing_parameter_fails_topic() {
        let set = RuleParameterSet::new(TOPIC, date());
        let err = FarRule.evaluate(&plan(), Some(&set)).unwrap_err();
        assert!(matches!(
            err,
            RuleError::Amendment(AmendmentError::MissingParameter { .. })
        ));
        assert!(!err.is_structural());

        let err = FarRule.evaluate(&plan(), None).unwrap_err();
        assert_eq!(err, RuleError::ParametersNotResolved(TOPIC.to_string()));
    }
}
