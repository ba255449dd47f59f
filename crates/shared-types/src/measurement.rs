//! Physical quantities derived from drawing geometry

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reason used when a caller hands in an empty invalid-reason string
const UNSPECIFIED_DEFECT: &str = "unspecified geometry defect";

/// Numeric part of a valid measurement, kept at full precision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub area: Decimal,
    pub width: Decimal,
    pub height: Decimal,
    pub length: Decimal,
}

/// A quantity derived from one closed polygon.
///
/// Either fully numeric or carrying a non-empty reason for why the geometry
/// could not be measured. There is no zero-valued "valid" fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Measurement {
    Valid {
        dimensions: Dimensions,
        /// Soft defects such as an unparsable text override
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    Invalid {
        reason: String,
    },
}

impl Measurement {
    pub fn valid(dimensions: Dimensions) -> Self {
        Measurement::Valid {
            dimensions,
            warnings: Vec::new(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            UNSPECIFIED_DEFECT.to_string()
        } else {
            reason
        };
        Measurement::Invalid { reason }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Measurement::Valid { .. })
    }

    pub fn dimensions(&self) -> Option<&Dimensions> {
        match self {
            Measurement::Valid { dimensions, .. } => Some(dimensions),
            Measurement::Invalid { .. } => None,
        }
    }

    pub fn area(&self) -> Option<Decimal> {
        self.dimensions().map(|d| d.area)
    }

    pub fn width(&self) -> Option<Decimal> {
        self.dimensions().map(|d| d.width)
    }

    pub fn height(&self) -> Option<Decimal> {
        self.dimensions().map(|d| d.height)
    }

    pub fn length(&self) -> Option<Decimal> {
        self.dimensions().map(|d| d.length)
    }

    pub fn invalid_reason(&self) -> Option<&str> {
        match self {
            Measurement::Invalid { reason } => Some(reason),
            Measurement::Valid { .. } => None,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            Measurement::Valid { warnings, .. } => warnings,
            Measurement::Invalid { .. } => &[],
        }
    }

    /// Attach a soft warning. Invalid measurements already carry their reason.
    pub fn push_warning(&mut self, warning: impl Into<String>) {
        if let Measurement::Valid { warnings, .. } = self {
            warnings.push(warning.into());
        }
    }
}

/// Sum of the areas of every valid measurement; invalid ones are skipped
pub fn total_area(measurements: &[Measurement]) -> Decimal {
    measurements.iter().filter_map(Measurement::area).sum()
}

/// Opening measurements together with dimension values read from the same layers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementWithHeight {
    pub measurements: Vec<Measurement>,
    pub heights_or_depths: Vec<Decimal>,
}

impl MeasurementWithHeight {
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty() && self.heights_or_depths.is_empty()
    }

    pub fn total_area(&self) -> Decimal {
        total_area(&self.measurements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(area: i64) -> Dimensions {
        Dimensions {
            area: Decimal::from(area),
            width: Decimal::ONE,
            height: Decimal::ONE,
            length: Decimal::ONE,
        }
    }

    #[test]
    fn test_invalid_measurement_never_has_empty_reason() {
        let m = Measurement::invalid("   ");
        assert!(!m.is_valid());
        assert_eq!(m.invalid_reason(), Some(UNSPECIFIED_DEFECT));
        assert_eq!(m.area(), None);
    }

    #[test]
    fn test_total_area_skips_invalid() {
        let measurements = vec![
            Measurement::valid(dims(4)),
            Measurement::invalid("open polyline"),
            Measurement::valid(dims(6)),
        ];
        assert_eq!(total_area(&measurements), Decimal::from(10));
    }

    #[test]
    fn test_warnings_only_attach_to_valid() {
        let mut valid = Measurement::valid(dims(1));
        valid.push_warning("bad label");
        assert_eq!(valid.warnings(), ["bad label".to_string()]);

        let mut invalid = Measurement::invalid("degenerate");
        invalid.push_warning("ignored");
        assert!(invalid.warnings().is_empty());
    }

    #[test]
    fn test_measurement_serializes_with_status_tag() {
        let json = serde_json::to_value(Measurement::invalid("open")).unwrap();
        assert_eq!(json["status"], "invalid");
        assert_eq!(json["reason"], "open");
    }
}
