//! Occupancy area buckets and the additive merge rule shared by every
//! floor-level accumulator.
//!
//! Entries are keyed by occupancy type code. Matching is exact and ASCII
//! case-insensitive in all three accumulators; a code that matches nothing
//! always opens a new bucket. Each accumulator reads only its own field pair
//! from the incoming entry.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One accumulated area bucket for an occupancy type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    pub type_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built_up_area: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_built_up_area: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carpet_area: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_carpet_area: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deduction: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_deduction: Option<Decimal>,
}

impl Occupancy {
    pub fn new(type_code: impl Into<String>) -> Self {
        Self {
            type_code: type_code.into(),
            ..Default::default()
        }
    }

    pub fn with_built_up_area(mut self, current: Decimal, existing: Option<Decimal>) -> Self {
        self.built_up_area = Some(current);
        self.existing_built_up_area = existing;
        self
    }

    pub fn with_carpet_area(mut self, current: Decimal, existing: Option<Decimal>) -> Self {
        self.carpet_area = Some(current);
        self.existing_carpet_area = existing;
        self
    }

    pub fn with_deduction(mut self, current: Decimal, existing: Option<Decimal>) -> Self {
        self.deduction = Some(current);
        self.existing_deduction = existing;
        self
    }

    pub fn matches_code(&self, code: &str) -> bool {
        self.type_code.eq_ignore_ascii_case(code)
    }
}

/// Add two optional quantities, treating a missing side as zero.
/// Stays `None` only when both sides are missing.
fn add_zero_default(existing: Option<Decimal>, incoming: Option<Decimal>) -> Option<Decimal> {
    match (existing, incoming) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(Decimal::ZERO) + b.unwrap_or(Decimal::ZERO)),
    }
}

/// Field pair selected by one accumulator
type FieldPair = fn(&mut Occupancy) -> (&mut Option<Decimal>, &mut Option<Decimal>);

fn merge(entries: &mut Vec<Occupancy>, mut incoming: Occupancy, fields: FieldPair) {
    let (in_current, in_existing) = fields(&mut incoming);
    let (in_current, in_existing) = (in_current.take(), in_existing.take());

    let found = entries
        .iter()
        .position(|entry| entry.matches_code(&incoming.type_code));
    let entry = match found {
        Some(index) => &mut entries[index],
        None => {
            entries.push(Occupancy::new(incoming.type_code));
            let last = entries.len() - 1;
            &mut entries[last]
        }
    };
    let (current, existing) = fields(entry);
    *current = add_zero_default(*current, in_current);
    *existing = add_zero_default(*existing, in_existing);
}

/// Merge the incoming entry's built-up and existing built-up areas
pub fn add_built_up_area(entries: &mut Vec<Occupancy>, incoming: Occupancy) {
    merge(entries, incoming, |o| {
        (&mut o.built_up_area, &mut o.existing_built_up_area)
    });
}

/// Merge the incoming entry's carpet and existing carpet areas
pub fn add_carpet_area(entries: &mut Vec<Occupancy>, incoming: Occupancy) {
    merge(entries, incoming, |o| {
        (&mut o.carpet_area, &mut o.existing_carpet_area)
    });
}

/// Merge the incoming entry's deduction and existing deduction areas
pub fn add_deduction_area(entries: &mut Vec<Occupancy>, incoming: Occupancy) {
    merge(entries, incoming, |o| {
        (&mut o.deduction, &mut o.existing_deduction)
    });
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn entry_strategy() -> impl Strategy<Value = (usize, i64, Option<i64>)> {
        (0usize..3, 0i64..10_000, proptest::option::of(0i64..10_000))
    }

    fn to_occupancy((code, cents, existing): (usize, i64, Option<i64>)) -> Occupancy {
        let code = ["A", "b", "C"][code];
        Occupancy::new(code).with_built_up_area(
            Decimal::new(cents, 2),
            existing.map(|e| Decimal::new(e, 2)),
        )
    }

    fn totals(entries: &[Occupancy]) -> Vec<(String, Option<Decimal>, Option<Decimal>)> {
        let mut out: Vec<_> = entries
            .iter()
            .map(|o| {
                (
                    o.type_code.to_ascii_uppercase(),
                    o.built_up_area,
                    o.existing_built_up_area,
                )
            })
            .collect();
        out.sort();
        out
    }

    proptest! {
        /// Property: merge result does not depend on arrival order
        #[test]
        fn merge_is_order_independent(
            raw in proptest::collection::vec(entry_strategy(), 0..20)
        ) {
            let mut forward = Vec::new();
            for item in raw.iter().copied() {
                add_built_up_area(&mut forward, to_occupancy(item));
            }

            let mut backward = Vec::new();
            for item in raw.iter().rev().copied() {
                add_built_up_area(&mut backward, to_occupancy(item));
            }

            prop_assert_eq!(totals(&forward), totals(&backward));
        }

        /// Property: one bucket per distinct code
        #[test]
        fn one_bucket_per_code(
            raw in proptest::collection::vec(entry_strategy(), 0..20)
        ) {
            let mut entries = Vec::new();
            for item in raw.iter().copied() {
                add_built_up_area(&mut entries, to_occupancy(item));
            }
            let mut codes: Vec<usize> = raw.iter().map(|(c, _, _)| *c).collect();
            codes.sort_unstable();
            codes.dedup();
            prop_assert_eq!(entries.len(), codes.len());
        }
    }
}
