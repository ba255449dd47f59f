//! Measurement Builder
//!
//! Turns one polygon plus any dimension overrides and text labels into a
//! [`Measurement`]. Geometry defects give `Measurement::Invalid`; override
//! defects give warnings on an otherwise valid measurement.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::{Decimal, MathematicalOps};
use shared_types::{Dimensions, Measurement};

use crate::drawing::{Dimension, DimensionRole, Point, Polygon};

lazy_static! {
    /// `KEY=value` or `KEY:value`, e.g. `W=1.20M`, `HT: 2.1`
    static ref KEYED_LABEL: Regex =
        Regex::new(r"^\s*(?P<key>[A-Za-z]+)\s*[=:]\s*(?P<value>.+?)\s*$").unwrap();

    /// A number with an optional unit suffix and nothing else, e.g. `2.10M`, `2,100 mm`
    static ref DIMENSION_VALUE: Regex =
        Regex::new(r"(?i)^\s*(?P<number>\d[\d,]*(?:\.\d+)?)\s*(?:mm|m)?\s*$").unwrap();
}

/// Width/height/length supplied by dimension annotations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    pub length: Option<Decimal>,
}

impl Overrides {
    /// First value per declared role; unspecified dimensions are ignored
    pub fn from_dimensions(dimensions: &[Dimension]) -> Self {
        let first = |role: DimensionRole| {
            dimensions
                .iter()
                .find(|d| d.role == role)
                .map(|d| d.value)
        };
        Self {
            width: first(DimensionRole::Width),
            height: first(DimensionRole::Height),
            length: first(DimensionRole::Length),
        }
    }

    fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.length.is_none()
    }
}

/// Which quantity a text label sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTarget {
    Width,
    Height,
    Length,
}

/// Parse the numeric part of a label, dropping unit suffixes and separators.
///
/// `"1.20M"` gives `1.20`, `"2,100 mm"` gives `2100`.
pub fn parse_numeric_label(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<Decimal>().ok()
}

/// Parse a dimension annotation. Text carrying anything beyond a number
/// and a unit suffix (door tags, room names) is rejected.
pub fn parse_dimension_value(raw: &str) -> Option<Decimal> {
    let caps = DIMENSION_VALUE.captures(raw)?;
    caps.name("number")?.as_str().replace(',', "").parse().ok()
}

/// Parse a label into its target and value
pub fn parse_label(label: &str) -> Result<(LabelTarget, Decimal), String> {
    let (target, value) = match KEYED_LABEL.captures(label) {
        Some(caps) => {
            let key = caps.name("key").map(|m| m.as_str()).unwrap_or_default();
            let target = match key.to_ascii_uppercase().as_str() {
                "W" | "WIDTH" => LabelTarget::Width,
                "H" | "HT" | "HEIGHT" => LabelTarget::Height,
                "L" | "LEN" | "LENGTH" => LabelTarget::Length,
                other => return Err(format!("unknown label key '{}' in '{}'", other, label)),
            };
            let value = caps.name("value").map(|m| m.as_str()).unwrap_or_default();
            (target, value)
        }
        None => (LabelTarget::Height, label),
    };
    parse_dimension_value(value)
        .map(|v| (target, v))
        .ok_or_else(|| format!("non-numeric label '{}' ignored", label.trim()))
}

/// Builds a measurement from one polygon
#[derive(Debug, Clone)]
pub struct MeasurementBuilder<'a> {
    polygon: &'a Polygon,
    overrides: Overrides,
    labels: Vec<&'a str>,
}

impl<'a> MeasurementBuilder<'a> {
    pub fn new(polygon: &'a Polygon) -> Self {
        Self {
            polygon,
            overrides: Overrides::default(),
            labels: Vec::new(),
        }
    }

    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn labels(mut self, labels: impl IntoIterator<Item = &'a str>) -> Self {
        self.labels.extend(labels);
        self
    }

    pub fn build(self) -> Measurement {
        if !self.polygon.closed {
            return Measurement::invalid("polyline is not closed");
        }
        let points = distinct_vertices(&self.polygon.vertices);
        if points.len() < 3 {
            return Measurement::invalid(format!(
                "polygon has {} distinct vertices, at least 3 required",
                points.len()
            ));
        }

        let Some(area) = shoelace_area(&points) else {
            return Measurement::invalid("polygon area overflows decimal range");
        };
        if area.is_zero() {
            return Measurement::invalid("polygon is degenerate (zero area)");
        }
        let Some((width, height)) = bounding_box(&points) else {
            return Measurement::invalid("polygon extent overflows decimal range");
        };
        let Some(length) = longest_edge(&points) else {
            return Measurement::invalid("polygon edge length overflows decimal range");
        };

        let mut dimensions = Dimensions {
            area,
            width,
            height,
            length,
        };
        let mut warnings = Vec::new();

        // Labels first so that declared dimensions take precedence
        for label in self.labels.iter().filter(|l| !l.trim().is_empty()) {
            match parse_label(label) {
                Ok((LabelTarget::Width, v)) => dimensions.width = v,
                Ok((LabelTarget::Height, v)) => dimensions.height = v,
                Ok((LabelTarget::Length, v)) => dimensions.length = v,
                Err(warning) => warnings.push(warning),
            }
        }
        if !self.overrides.is_empty() {
            if let Some(w) = self.overrides.width {
                dimensions.width = w;
            }
            if let Some(h) = self.overrides.height {
                dimensions.height = h;
            }
            if let Some(l) = self.overrides.length {
                dimensions.length = l;
            }
        }

        Measurement::Valid {
            dimensions,
            warnings,
        }
    }
}

/// Measure a polygon with no overrides
pub fn measure(polygon: &Polygon) -> Measurement {
    MeasurementBuilder::new(polygon).build()
}

/// Drop consecutive repeats and a duplicated closing vertex
fn distinct_vertices(vertices: &[Point]) -> Vec<Point> {
    let mut points: Vec<Point> = Vec::with_capacity(vertices.len());
    for v in vertices {
        if points.last() != Some(v) {
            points.push(*v);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

fn shoelace_area(points: &[Point]) -> Option<Decimal> {
    let mut twice = Decimal::ZERO;
    for (i, a) in points.iter().enumerate() {
        let b = &points[(i + 1) % points.len()];
        let term = a.x.checked_mul(b.y)?.checked_sub(b.x.checked_mul(a.y)?)?;
        twice = twice.checked_add(term)?;
    }
    twice.abs().checked_div(Decimal::TWO)
}

fn bounding_box(points: &[Point]) -> Option<(Decimal, Decimal)> {
    let xs = points.iter().map(|p| p.x);
    let ys = points.iter().map(|p| p.y);
    let (min_x, max_x) = (xs.clone().min()?, xs.max()?);
    let (min_y, max_y) = (ys.clone().min()?, ys.max()?);
    Some((max_x.checked_sub(min_x)?, max_y.checked_sub(min_y)?))
}

fn edge_length(a: &Point, b: &Point) -> Option<Decimal> {
    let dx = (b.x.checked_sub(a.x)?).abs();
    let dy = (b.y.checked_sub(a.y)?).abs();
    if dx.is_zero() {
        return Some(dy);
    }
    if dy.is_zero() {
        return Some(dx);
    }
    dx.checked_mul(dx)?.checked_add(dy.checked_mul(dy)?)?.sqrt()
}

fn longest_edge(points: &[Point]) -> Option<Decimal> {
    let mut longest = Decimal::ZERO;
    for (i, a) in points.iter().enumerate() {
        let b = &points[(i + 1) % points.len()];
        longest = longest.max(edge_length(a, b)?);
    }
    Some(longest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn polygon(points: &[(&str, &str)]) -> Polygon {
        Polygon::closed(
            points
                .iter()
                .map(|(x, y)| Point::new(dec(x), dec(y)))
                .collect(),
        )
    }

    fn rectangle(w: &str, h: &str) -> Polygon {
        polygon(&[("0", "0"), (w, "0"), (w, h), ("0", h)])
    }

    #[test]
    fn test_unit_square() {
        let m = measure(&rectangle("1", "1"));
        let d = m.dimensions().unwrap();
        assert_eq!(d.area.round_dp(2), dec("1.00"));
        assert_eq!(d.width, dec("1"));
        assert_eq!(d.height, dec("1"));
        assert_eq!(d.length, dec("1"));
    }

    #[test]
    fn test_two_vertices_are_invalid() {
        let m = measure(&polygon(&[("0", "0"), ("1", "1")]));
        assert!(!m.is_valid());
        assert!(m.invalid_reason().unwrap().contains("distinct vertices"));
    }

    #[test]
    fn test_duplicate_closing_vertex_is_ignored() {
        let m = measure(&polygon(&[
            ("0", "0"),
            ("2", "0"),
            ("2", "3"),
            ("0", "3"),
            ("0", "0"),
        ]));
        assert_eq!(m.area(), Some(dec("6")));
    }

    #[test]
    fn test_repeated_point_does_not_count_as_distinct() {
        let m = measure(&polygon(&[("0", "0"), ("0", "0"), ("1", "0"), ("1", "0")]));
        assert!(!m.is_valid());
    }

    #[test]
    fn test_open_polyline_is_invalid() {
        let mut open = rectangle("2", "2");
        open.closed = false;
        assert_eq!(
            measure(&open).invalid_reason(),
            Some("polyline is not closed")
        );
    }

    #[test]
    fn test_collinear_points_are_invalid() {
        let m = measure(&polygon(&[("0", "0"), ("1", "0"), ("2", "0")]));
        assert!(!m.is_valid());
    }

    #[test]
    fn test_area_is_orientation_independent() {
        let clockwise = measure(&polygon(&[("0", "0"), ("0", "2"), ("3", "2"), ("3", "0")]));
        assert_eq!(clockwise.area(), Some(dec("6")));
    }

    #[test]
    fn test_triangle_length_is_hypotenuse() {
        let m = measure(&polygon(&[("0", "0"), ("3", "0"), ("0", "4")]));
        assert_eq!(m.area(), Some(dec("6")));
        assert_eq!(m.length().unwrap().round_dp(6), dec("5"));
    }

    #[test]
    fn test_dimension_overrides_win_over_labels_and_geometry() {
        let rect = rectangle("2", "3");
        let m = MeasurementBuilder::new(&rect)
            .overrides(Overrides {
                width: Some(dec("0.9")),
                ..Default::default()
            })
            .labels(["W=1.5", "H=2.1"])
            .build();
        let d = m.dimensions().unwrap();
        assert_eq!(d.width, dec("0.9"));
        assert_eq!(d.height, dec("2.1"));
        assert_eq!(d.area, dec("6"));
    }

    #[test]
    fn test_bare_label_sets_height() {
        let rect = rectangle("1", "1");
        let m = MeasurementBuilder::new(&rect).labels(["2.10M"]).build();
        assert_eq!(m.height(), Some(dec("2.10")));
    }

    #[test]
    fn test_bad_label_warns_and_keeps_geometry() {
        let rect = rectangle("2", "1");
        let m = MeasurementBuilder::new(&rect)
            .labels(["WIDTH=abc", "DEPTH=3"])
            .build();
        assert!(m.is_valid());
        assert_eq!(m.width(), Some(dec("2")));
        assert_eq!(m.warnings().len(), 2);
    }

    #[test]
    fn test_overrides_from_dimensions_take_first_per_role() {
        let dims = vec![
            Dimension {
                value: dec("1.0"),
                role: DimensionRole::Width,
                colour: None,
            },
            Dimension {
                value: dec("9.0"),
                role: DimensionRole::Unspecified,
                colour: None,
            },
            Dimension {
                value: dec("2.0"),
                role: DimensionRole::Width,
                colour: None,
            },
        ];
        let overrides = Overrides::from_dimensions(&dims);
        assert_eq!(overrides.width, Some(dec("1.0")));
        assert_eq!(overrides.height, None);
    }

    #[test]
    fn test_parse_numeric_label() {
        assert_eq!(parse_numeric_label("1.20M"), Some(dec("1.20")));
        assert_eq!(parse_numeric_label("2,100 mm"), Some(dec("2100")));
        assert_eq!(parse_numeric_label("n/a"), None);
        assert_eq!(parse_numeric_label("1.2.3"), None);
    }

    #[test]
    fn test_tag_text_does_not_override_height() {
        let door = rectangle("0.9", "2.1");
        let m = MeasurementBuilder::new(&door)
            .labels(["D1", "BEDROOM 2", "H=2.1m2"])
            .build();
        assert_eq!(m.height(), Some(dec("2.1")));
        assert_eq!(m.warnings().len(), 3);
        assert!(m.warnings()[0].contains("'D1'"));
    }

    #[test]
    fn test_parse_dimension_value() {
        assert_eq!(parse_dimension_value(" 2.10M "), Some(dec("2.10")));
        assert_eq!(parse_dimension_value("2,100 mm"), Some(dec("2100")));
        assert_eq!(parse_dimension_value("0.9"), Some(dec("0.9")));
        assert_eq!(parse_dimension_value("D1"), None);
        assert_eq!(parse_dimension_value("TERRACE 2"), None);
        assert_eq!(parse_dimension_value("1.2.3"), None);
    }

    #[test]
    fn test_parse_label_keys() {
        assert_eq!(parse_label("ht: 2.4"), Ok((LabelTarget::Height, dec("2.4"))));
        assert_eq!(parse_label("LEN=4"), Ok((LabelTarget::Length, dec("4"))));
        assert!(parse_label("X=1").is_err());
    }
}
