//! Layer-name templates
//!
//! Jurisdictions name drawing layers after the node they describe, e.g.
//! `BLK_1_FLR_0_UNIT_2_ROOM_3_WINDOW2`. A template such as
//! `BLK_{block}_FLR_{floor}_UNIT_{unit}_ROOM_{room}_WINDOW*` is parsed once
//! into ordered literal/placeholder segments plus an optional trailing
//! repetition marker, and resolved against node coordinates.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use shared_types::ExemptionCategory;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayerNameError {
    #[error("No layer template configured for '{0}'")]
    UnknownTemplate(String),

    #[error("Layer template '{key}' needs a {placeholder} number")]
    MissingPlaceholder {
        key: String,
        placeholder: Placeholder,
    },

    #[error("Malformed layer template '{template}': {reason}")]
    MalformedTemplate { template: String, reason: String },
}

/// Template keys understood by the bundled extractors
pub mod keys {
    pub const FLOOR_OUTLINE: &str = "floor_outline";
    pub const EXISTING_BUILT_UP: &str = "existing_built_up";
    pub const CARPET_AREA: &str = "carpet_area";
    pub const EXISTING_CARPET_AREA: &str = "existing_carpet_area";
    pub const BUILT_UP_DEDUCTION: &str = "built_up_deduction";
    pub const EXISTING_BUILT_UP_DEDUCTION: &str = "existing_built_up_deduction";
    pub const UNIT_OUTLINE: &str = "unit_outline";
    pub const UNIT_ROOM: &str = "unit_room";
    pub const UNIT_AC_ROOM: &str = "unit_ac_room";
    pub const UNIT_KITCHEN: &str = "unit_kitchen";
    pub const UNIT_LAUNDRY_RECREATION: &str = "unit_laundry_recreation";
    pub const PLOT_BOUNDARY: &str = "plot_boundary";
    pub const TERRACE: &str = "terrace";
    pub const PROJECTED_BALCONY: &str = "projected_balcony";
    pub const SHADE_OVERHANG: &str = "shade_overhang";
    pub const FLOOR_PROJECTED_BALCONY: &str = "floor_projected_balcony";
    pub const BALCONY_DIST_TO_PLOT_BOUNDARY: &str = "balcony_dist_to_plot_boundary";
    pub const FRONT_YARD: &str = "front_yard";
    pub const REAR_YARD: &str = "rear_yard";
    pub const SIDE_YARD1: &str = "side_yard1";
    pub const SIDE_YARD2: &str = "side_yard2";
    pub const UNIT_LIGHT_VENTILATION: &str = "unit_light_ventilation";
    pub const UNIT_ROOM_LIGHT_VENTILATION: &str = "unit_room_light_ventilation";
    pub const UNIT_AC_ROOM_LIGHT_VENTILATION: &str = "unit_ac_room_light_ventilation";
    pub const UNIT_KITCHEN_VENTILATION: &str = "unit_kitchen_ventilation";
    pub const UNIT_LAUNDRY_RECREATION_VENTILATION: &str = "unit_laundry_recreation_ventilation";
    pub const UNIT_ROOM_WINDOW: &str = "unit_room_window";
    pub const UNIT_AC_ROOM_WINDOW: &str = "unit_ac_room_window";
    pub const UNIT_ROOM_DOOR: &str = "unit_room_door";
    pub const UNIT_AC_ROOM_DOOR: &str = "unit_ac_room_door";
    pub const UNIT_ROOM_PROJECTION: &str = "unit_room_projection";
    pub const UNIT_AC_ROOM_PROJECTION: &str = "unit_ac_room_projection";

    /// Key for one FAR exemption category, e.g. `far_deduct_corridor`
    pub fn far_deduct(category: shared_types::ExemptionCategory) -> String {
        format!("far_deduct_{}", category.key())
    }
}

const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    (keys::FLOOR_OUTLINE, "BLK_{block}_FLR_{floor}_BLT_UP_AREA*"),
    (keys::EXISTING_BUILT_UP, "BLK_{block}_FLR_{floor}_EXISTING_BLT_UP_AREA*"),
    (keys::CARPET_AREA, "BLK_{block}_FLR_{floor}_CARPET_AREA*"),
    (keys::EXISTING_CARPET_AREA, "BLK_{block}_FLR_{floor}_EXISTING_CARPET_AREA*"),
    (keys::BUILT_UP_DEDUCTION, "BLK_{block}_FLR_{floor}_BLT_UP_AREA_DEDUCT*"),
    (
        keys::EXISTING_BUILT_UP_DEDUCTION,
        "BLK_{block}_FLR_{floor}_EXISTING_BLT_UP_AREA_DEDUCT*",
    ),
    (keys::UNIT_OUTLINE, "BLK_{block}_FLR_{floor}_UNIT_{unit}_BLT_UP_AREA"),
    (keys::UNIT_ROOM, "BLK_{block}_FLR_{floor}_UNIT_{unit}_ROOM_{room}"),
    (keys::UNIT_AC_ROOM, "BLK_{block}_FLR_{floor}_UNIT_{unit}_ACROOM_{room}"),
    (keys::UNIT_KITCHEN, "BLK_{block}_FLR_{floor}_UNIT_{unit}_KITCHEN"),
    (
        keys::UNIT_LAUNDRY_RECREATION,
        "BLK_{block}_FLR_{floor}_UNIT_{unit}_LAUNDRY_RECREATION",
    ),
    (keys::PLOT_BOUNDARY, "PLOT_BOUNDARY"),
    (keys::TERRACE, "BLK_{block}_TERRACE"),
    (keys::PROJECTED_BALCONY, "BLK_{block}_PROJECTED_BALCONY"),
    (keys::SHADE_OVERHANG, "BLK_{block}_FLR_{floor}_SHADE_OVERHANG"),
    (keys::FLOOR_PROJECTED_BALCONY, "BLK_{block}_FLR_{floor}_PROJECTED_BALCONY"),
    (
        keys::BALCONY_DIST_TO_PLOT_BOUNDARY,
        "BLK_{block}_FLR_{floor}_BALCONY_DIST_TO_PLOT_BNDRY",
    ),
    (keys::FRONT_YARD, "BLK_{block}_LVL_{floor}_FRONT_SETBACK"),
    (keys::REAR_YARD, "BLK_{block}_LVL_{floor}_REAR_SETBACK"),
    (keys::SIDE_YARD1, "BLK_{block}_LVL_{floor}_SIDE_SETBACK1"),
    (keys::SIDE_YARD2, "BLK_{block}_LVL_{floor}_SIDE_SETBACK2"),
    (
        keys::UNIT_LIGHT_VENTILATION,
        "BLK_{block}_FLR_{floor}_UNIT_{unit}_LIGHT_VENTILATION",
    ),
    (
        keys::UNIT_ROOM_LIGHT_VENTILATION,
        "BLK_{block}_FLR_{floor}_UNIT_{unit}_ROOM_{room}_LIGHT_VENTILATION*",
    ),
    (
        keys::UNIT_AC_ROOM_LIGHT_VENTILATION,
        "BLK_{block}_FLR_{floor}_UNIT_{unit}_ACROOM_{room}_LIGHT_VENTILATION*",
    ),
    (
        keys::UNIT_KITCHEN_VENTILATION,
        "BLK_{block}_FLR_{floor}_UNIT_{unit}_KITCHEN_DINING_VENTILATION*",
    ),
    (
        keys::UNIT_LAUNDRY_RECREATION_VENTILATION,
        "BLK_{block}_FLR_{floor}_UNIT_{unit}_LAUNDRY_RECREATION_VENTILATION*",
    ),
    (
        keys::UNIT_ROOM_WINDOW,
        "BLK_{block}_FLR_{floor}_UNIT_{unit}_ROOM_{room}_WINDOW*",
    ),
    (
        keys::UNIT_AC_ROOM_WINDOW,
        "BLK_{block}_FLR_{floor}_UNIT_{unit}_ACROOM_{room}_WINDOW*",
    ),
    (keys::UNIT_ROOM_DOOR, "BLK_{block}_FLR_{floor}_UNIT_{unit}_ROOM_{room}_DOOR*"),
    (
        keys::UNIT_AC_ROOM_DOOR,
        "BLK_{block}_FLR_{floor}_UNIT_{unit}_ACROOM_{room}_DOOR*",
    ),
    (
        keys::UNIT_ROOM_PROJECTION,
        "BLK_{block}_FLR_{floor}_UNIT_{unit}_ROOM_{room}_PROJECTION*",
    ),
    (
        keys::UNIT_AC_ROOM_PROJECTION,
        "BLK_{block}_FLR_{floor}_UNIT_{unit}_ACROOM_{room}_PROJECTION*",
    ),
];

/// Node coordinate a template can refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Block,
    Floor,
    Unit,
    Room,
}

impl Placeholder {
    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::Block => "block",
            Placeholder::Floor => "floor",
            Placeholder::Unit => "unit",
            Placeholder::Room => "room",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "block" => Some(Placeholder::Block),
            "floor" => Some(Placeholder::Floor),
            "unit" => Some(Placeholder::Unit),
            "room" => Some(Placeholder::Room),
            _ => None,
        }
    }

    /// Regex fragment capturing a value for this placeholder
    fn capture(&self) -> String {
        let digits = match self {
            Placeholder::Floor => r"-?\d+",
            _ => r"\d+",
        };
        format!("(?P<{}>{})", self.name(), digits)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Position of a node in the plan hierarchy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinates {
    pub block: Option<u32>,
    pub floor: Option<i32>,
    pub unit: Option<u32>,
    pub room: Option<u32>,
}

impl Coordinates {
    pub fn block(block: u32) -> Self {
        Self {
            block: Some(block),
            ..Default::default()
        }
    }

    pub fn floor(mut self, floor: i32) -> Self {
        self.floor = Some(floor);
        self
    }

    pub fn unit(mut self, unit: u32) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn room(mut self, room: u32) -> Self {
        self.room = Some(room);
        self
    }

    fn value(&self, placeholder: Placeholder) -> Option<String> {
        match placeholder {
            Placeholder::Block => self.block.map(|v| v.to_string()),
            Placeholder::Floor => self.floor.map(|v| v.to_string()),
            Placeholder::Unit => self.unit.map(|v| v.to_string()),
            Placeholder::Room => self.room.map(|v| v.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Placeholder),
}

/// Parsed layer-name template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerTemplate {
    source: String,
    segments: Vec<Segment>,
    repeating: bool,
}

impl FromStr for LayerTemplate {
    type Err = LayerNameError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| LayerNameError::MalformedTemplate {
            template: source.to_string(),
            reason: reason.to_string(),
        };

        let (body, repeating) = match source.strip_suffix('*') {
            Some(body) => (body, true),
            None => (source, false),
        };
        if body.trim().is_empty() {
            return Err(malformed("template is empty"));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut seen = Vec::new();
        let mut chars = body.chars();
        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let name: String = chars.by_ref().take_while(|c| *c != '}').collect();
                    let placeholder = Placeholder::parse(name.trim()).ok_or_else(|| {
                        malformed(&format!("unknown or unterminated placeholder '{}'", name))
                    })?;
                    if seen.contains(&placeholder) {
                        return Err(malformed(&format!("placeholder '{}' repeated", name)));
                    }
                    seen.push(placeholder);
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(placeholder));
                }
                '}' => return Err(malformed("unbalanced '}'")),
                '*' => return Err(malformed("'*' is only allowed at the end")),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
            repeating,
        })
    }
}

impl LayerTemplate {
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_repeating(&self) -> bool {
        self.repeating
    }

    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Slot(p) => Some(*p),
            Segment::Literal(_) => None,
        })
    }

    /// Fill every placeholder; a missing coordinate is an error
    pub fn resolve(&self, key: &str, coords: &Coordinates) -> Result<LayerPattern, LayerNameError> {
        let mut name = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => name.push_str(text),
                Segment::Slot(p) => {
                    let value =
                        coords
                            .value(*p)
                            .ok_or_else(|| LayerNameError::MissingPlaceholder {
                                key: key.to_string(),
                                placeholder: *p,
                            })?;
                    name.push_str(&value);
                }
            }
        }
        let mut pattern = regex::escape(&name);
        if self.repeating {
            pattern.push_str(r"(?:_?(?P<rep>\d+))?");
        }
        let display = if self.repeating {
            format!("{}*", name)
        } else {
            name
        };
        LayerPattern::compile(display, &pattern, self.repeating)
    }

    /// Pattern that captures any placeholder left unbound in `bound`
    pub fn discovery(&self, bound: &Coordinates) -> Result<LayerPattern, LayerNameError> {
        let mut pattern = String::new();
        let mut display = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => {
                    pattern.push_str(&regex::escape(text));
                    display.push_str(text);
                }
                Segment::Slot(p) => match bound.value(*p) {
                    Some(value) => {
                        pattern.push_str(&regex::escape(&value));
                        display.push_str(&value);
                    }
                    None => {
                        pattern.push_str(&p.capture());
                        display.push_str(&format!("{{{}}}", p));
                    }
                },
            }
        }
        if self.repeating {
            pattern.push_str(r"(?:_?(?P<rep>\d+))?");
            display.push('*');
        }
        LayerPattern::compile(display, &pattern, self.repeating)
    }
}

/// Concrete layer-name pattern handed to the drawing accessor.
///
/// Matching is ASCII case-insensitive. A repeating pattern for stem `S`
/// matches `S`, `S1`, `S2`, ... and `S_1`, `S_2`, ...
#[derive(Debug, Clone)]
pub struct LayerPattern {
    display: String,
    regex: Regex,
    repeating: bool,
}

impl LayerPattern {
    fn compile(display: String, body: &str, repeating: bool) -> Result<Self, LayerNameError> {
        let regex = Regex::new(&format!("(?i)^{}$", body)).map_err(|e| {
            LayerNameError::MalformedTemplate {
                template: display.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            display,
            regex,
            repeating,
        })
    }

    /// Pattern for one literal layer name
    pub fn exact(name: &str) -> Result<Self, LayerNameError> {
        Self::compile(name.to_string(), &regex::escape(name), false)
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }

    pub fn is_repeating(&self) -> bool {
        self.repeating
    }

    pub fn matches(&self, layer: &str) -> bool {
        self.regex.is_match(layer)
    }

    /// Repetition number of a matched layer; the bare stem counts as 0
    pub fn repetition_index(&self, layer: &str) -> Option<u32> {
        let captures = self.regex.captures(layer)?;
        Some(
            captures
                .name("rep")
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0),
        )
    }

    /// Coordinates captured from a layer name by a discovery pattern
    pub fn captures(&self, layer: &str) -> Option<Coordinates> {
        let captures = self.regex.captures(layer)?;
        let parse_u32 = |name: &str| captures.name(name).and_then(|m| m.as_str().parse().ok());
        Some(Coordinates {
            block: parse_u32("block"),
            floor: captures.name("floor").and_then(|m| m.as_str().parse().ok()),
            unit: parse_u32("unit"),
            room: parse_u32("room"),
        })
    }
}

impl fmt::Display for LayerPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// Jurisdiction's template table. A malformed override is held against its
/// key, so only the extractors that read that key fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerNames {
    templates: BTreeMap<String, Result<LayerTemplate, LayerNameError>>,
}

impl Default for LayerNames {
    fn default() -> Self {
        let mut templates = BTreeMap::new();
        for (key, template) in DEFAULT_TEMPLATES {
            if let Ok(parsed) = template.parse() {
                templates.insert(key.to_string(), Ok(parsed));
            }
        }
        for category in ExemptionCategory::ALL {
            let template = format!(
                "BLK_{{block}}_FLR_{{floor}}_FAR_DEDUCT_{}*",
                category.key().to_ascii_uppercase()
            );
            if let Ok(parsed) = template.parse() {
                templates.insert(keys::far_deduct(category), Ok(parsed));
            }
        }
        Self { templates }
    }
}

impl LayerNames {
    /// An empty table, without the bundled defaults
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Defaults with jurisdiction overrides applied on top
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut names = Self::default();
        for (key, template) in overrides {
            let parsed = template.parse::<LayerTemplate>();
            if let Err(err) = &parsed {
                warn!(key = %key, error = %err, "Malformed layer template override");
            }
            names.templates.insert(key.clone(), parsed);
        }
        names
    }

    pub fn insert(&mut self, key: &str, template: &str) -> Result<(), LayerNameError> {
        self.templates.insert(key.to_string(), Ok(template.parse()?));
        Ok(())
    }

    pub fn template(&self, key: &str) -> Result<&LayerTemplate, LayerNameError> {
        match self.templates.get(key) {
            Some(Ok(template)) => Ok(template),
            Some(Err(err)) => Err(err.clone()),
            None => Err(LayerNameError::UnknownTemplate(key.to_string())),
        }
    }

    /// Keys whose configured template could not be parsed
    pub fn malformed(&self) -> impl Iterator<Item = (&str, &LayerNameError)> {
        self.templates
            .iter()
            .filter_map(|(key, parsed)| parsed.as_ref().err().map(|err| (key.as_str(), err)))
    }

    pub fn resolve(&self, key: &str, coords: &Coordinates) -> Result<LayerPattern, LayerNameError> {
        self.template(key)?.resolve(key, coords)
    }

    pub fn discovery(
        &self,
        key: &str,
        bound: &Coordinates,
    ) -> Result<LayerPattern, LayerNameError> {
        self.template(key)?.discovery(bound)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolves_exact_layer_name() {
        let names = LayerNames::default();
        let pattern = names
            .resolve(keys::TERRACE, &Coordinates::block(2))
            .unwrap();
        assert_eq!(pattern.as_str(), "BLK_2_TERRACE");
        assert!(pattern.matches("BLK_2_TERRACE"));
        assert!(pattern.matches("blk_2_terrace"));
        assert!(!pattern.matches("BLK_2_TERRACE1"));
        assert!(!pattern.is_repeating());
    }

    #[test]
    fn test_repeating_pattern_matches_numbered_layers() {
        let names = LayerNames::default();
        let coords = Coordinates::block(1).floor(0).unit(1).room(3);
        let pattern = names.resolve(keys::UNIT_ROOM_WINDOW, &coords).unwrap();

        assert_eq!(pattern.as_str(), "BLK_1_FLR_0_UNIT_1_ROOM_3_WINDOW*");
        assert!(pattern.matches("BLK_1_FLR_0_UNIT_1_ROOM_3_WINDOW"));
        assert!(pattern.matches("BLK_1_FLR_0_UNIT_1_ROOM_3_WINDOW2"));
        assert!(pattern.matches("BLK_1_FLR_0_UNIT_1_ROOM_3_WINDOW_12"));
        assert!(!pattern.matches("BLK_1_FLR_0_UNIT_1_ROOM_3_WINDOWX"));
        assert!(!pattern.matches("BLK_1_FLR_0_UNIT_1_ROOM_30_WINDOW"));
        assert_eq!(
            pattern.repetition_index("BLK_1_FLR_0_UNIT_1_ROOM_3_WINDOW_12"),
            Some(12)
        );
        assert_eq!(
            pattern.repetition_index("BLK_1_FLR_0_UNIT_1_ROOM_3_WINDOW"),
            Some(0)
        );
    }

    #[test]
    fn test_missing_placeholder_is_an_error() {
        let names = LayerNames::default();
        let err = names
            .resolve(keys::UNIT_LIGHT_VENTILATION, &Coordinates::block(1).floor(0))
            .unwrap_err();
        assert_eq!(
            err,
            LayerNameError::MissingPlaceholder {
                key: keys::UNIT_LIGHT_VENTILATION.to_string(),
                placeholder: Placeholder::Unit,
            }
        );
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        let names = LayerNames::empty();
        assert_eq!(
            names.resolve("terrace", &Coordinates::block(1)).unwrap_err(),
            LayerNameError::UnknownTemplate("terrace".to_string())
        );
    }

    #[test]
    fn test_malformed_templates_are_rejected() {
        for bad in [
            "",
            "*",
            "BLK_{block",
            "BLK_{storey}",
            "BLK_*_X",
            "BLK_{block}_{block}",
            "BLK}",
        ] {
            assert!(
                matches!(
                    bad.parse::<LayerTemplate>(),
                    Err(LayerNameError::MalformedTemplate { .. })
                ),
                "template {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_literal_regex_characters_are_escaped() {
        let template: LayerTemplate = "PLOT.BOUNDARY(1)".parse().unwrap();
        let pattern = template.resolve("plot", &Coordinates::default()).unwrap();
        assert!(pattern.matches("PLOT.BOUNDARY(1)"));
        assert!(!pattern.matches("PLOTXBOUNDARY(1)"));
    }

    #[test]
    fn test_discovery_captures_unbound_placeholders() {
        let names = LayerNames::default();
        let pattern = names
            .discovery(keys::FLOOR_OUTLINE, &Coordinates::default())
            .unwrap();

        assert_eq!(
            pattern.captures("BLK_2_FLR_-1_BLT_UP_AREA"),
            Some(Coordinates::block(2).floor(-1))
        );
        assert_eq!(
            pattern.captures("BLK_2_FLR_3_BLT_UP_AREA_4"),
            Some(Coordinates::block(2).floor(3))
        );
        assert_eq!(pattern.captures("BLK_2_FLR_3_BLT_UP_AREA_DEDUCT"), None);
    }

    #[test]
    fn test_discovery_respects_bound_coordinates() {
        let names = LayerNames::default();
        let pattern = names
            .discovery(keys::UNIT_ROOM, &Coordinates::block(1).floor(0))
            .unwrap();
        assert_eq!(pattern.as_str(), "BLK_1_FLR_0_UNIT_{unit}_ROOM_{room}");
        assert_eq!(
            pattern.captures("BLK_1_FLR_0_UNIT_4_ROOM_2"),
            Some(Coordinates::block(1).floor(0).unit(4).room(2))
        );
        assert_eq!(pattern.captures("BLK_2_FLR_0_UNIT_4_ROOM_2"), None);
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let mut overrides = BTreeMap::new();
        overrides.insert(keys::TERRACE.to_string(), "B{block}-TERRACE".to_string());
        let names = LayerNames::with_overrides(&overrides);
        let pattern = names
            .resolve(keys::TERRACE, &Coordinates::block(7))
            .unwrap();
        assert_eq!(pattern.as_str(), "B7-TERRACE");
        assert_eq!(names.malformed().count(), 0);
    }

    #[test]
    fn test_malformed_override_fails_only_its_key() {
        let mut overrides = BTreeMap::new();
        overrides.insert(keys::TERRACE.to_string(), "BLK_{blok}_TERRACE".to_string());
        let names = LayerNames::with_overrides(&overrides);

        assert!(matches!(
            names.resolve(keys::TERRACE, &Coordinates::block(1)),
            Err(LayerNameError::MalformedTemplate { template, .. })
                if template == "BLK_{blok}_TERRACE"
        ));
        assert!(names
            .resolve(keys::PLOT_BOUNDARY, &Coordinates::default())
            .is_ok());
        let malformed: Vec<&str> = names.malformed().map(|(key, _)| key).collect();
        assert_eq!(malformed, vec![keys::TERRACE]);
    }

    #[test]
    fn test_defaults_cover_far_deduction_categories() {
        let names = LayerNames::default();
        for category in ExemptionCategory::ALL {
            let pattern = names
                .resolve(&keys::far_deduct(category), &Coordinates::block(1).floor(-1))
                .unwrap();
            assert!(pattern.as_str().starts_with("BLK_1_FLR_-1_FAR_DEDUCT_"));
        }
    }
}
