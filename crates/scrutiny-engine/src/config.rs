//! Jurisdiction configuration
//!
//! Everything that differs between jurisdictions lives in one TOML file:
//! layer-name templates, occupancy colours, which extractors and topics run,
//! and the dated rule parameter sets.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use plan_extract::{ColourCode, ExtractConfig, KitchenColours, LayerNames};
use serde::{Deserialize, Serialize};

use crate::amendments::{RuleCatalogue, RuleParameterSet};

/// One jurisdiction's settings, loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionConfig {
    /// Jurisdiction identifier, e.g. "kerala"
    pub jurisdiction: String,
    /// Layer template overrides by key; unlisted keys keep the defaults
    #[serde(default)]
    pub layer_names: BTreeMap<String, String>,
    #[serde(default)]
    pub occupancies: Vec<OccupancyColour>,
    /// Type code for polygons drawn without a colour
    #[serde(default)]
    pub default_occupancy: Option<String>,
    #[serde(default)]
    pub kitchen_colours: KitchenColours,
    /// Extractors to run, in order (default: all bundled extractors)
    #[serde(default)]
    pub extractors: Option<Vec<String>>,
    /// Rule topics to evaluate, in report order (default: all bundled topics)
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    #[serde(default)]
    pub rules: Vec<RuleParameterSet>,
}

/// Maps a drawing colour to an occupancy type code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyColour {
    pub colour: ColourCode,
    pub type_code: String,
}

impl JurisdictionConfig {
    /// Configuration with bundled defaults and no rule parameters
    pub fn new(jurisdiction: impl Into<String>) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
            layer_names: BTreeMap::new(),
            occupancies: Vec::new(),
            default_occupancy: None,
            kitchen_colours: KitchenColours::default(),
            extractors: None,
            topics: None,
            rules: Vec::new(),
        }
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read jurisdiction config: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Invalid jurisdiction config: {}", path.display()))
    }

    /// Parse configuration from a TOML string
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    /// Extraction settings with the layer-name overrides applied. Malformed
    /// overrides surface later, from the extractors that use them.
    pub fn extract_config(&self) -> ExtractConfig {
        ExtractConfig {
            layer_names: LayerNames::with_overrides(&self.layer_names),
            occupancy_colours: self
                .occupancies
                .iter()
                .map(|o| (o.colour, o.type_code.clone()))
                .collect(),
            default_occupancy: self.default_occupancy.clone(),
            kitchen_colours: self.kitchen_colours,
        }
    }

    pub fn catalogue(&self) -> RuleCatalogue {
        RuleCatalogue::new(self.rules.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use plan_extract::{keys, Coordinates, LayerNameError};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    const SAMPLE: &str = r#"
        jurisdiction = "testville"
        default_occupancy = "A1"
        topics = ["far", "terrace"]

        [layer_names]
        plot_boundary = "SITE_BOUNDARY"

        [[occupancies]]
        colour = 1
        type_code = "A1"

        [[occupancies]]
        colour = 5
        type_code = "F"

        [kitchen_colours]
        window_width = 12
        door_width = 13
        door_height = 14

        [[rules]]
        topic = "far"
        effective_from = "2019-04-01"
        rule_no = "31(1)"
        [rules.values]
        permissible_far = 2.5
    "#;

    #[test]
    fn test_parse_full_config() {
        let config = JurisdictionConfig::from_str(SAMPLE).unwrap();
        assert_eq!(config.jurisdiction, "testville");
        assert_eq!(config.topics, Some(vec!["far".to_string(), "terrace".to_string()]));
        assert!(config.extractors.is_none());

        let extract = config.extract_config();
        assert_eq!(extract.occupancy_code(Some(5)), Some("F"));
        assert_eq!(extract.occupancy_code(None), Some("A1"));
        assert_eq!(extract.kitchen_colours.door_height, 14);
        assert!(extract
            .layer_names
            .resolve(keys::PLOT_BOUNDARY, &Coordinates::default())
            .unwrap()
            .matches("SITE_BOUNDARY"));

        let catalogue = config.catalogue();
        let set = catalogue
            .resolve("far", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
            .unwrap();
        assert_eq!(set.value("permissible_far"), Some(Decimal::new(25, 1)));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = JurisdictionConfig::from_str(r#"jurisdiction = "bare""#).unwrap();
        assert_eq!(config.kitchen_colours, KitchenColours::default());
        assert!(config.rules.is_empty());
        assert_eq!(config.extract_config().layer_names.malformed().count(), 0);
    }

    #[test]
    fn test_bad_template_is_held_against_its_key() {
        let mut config = JurisdictionConfig::new("broken");
        config
            .layer_names
            .insert(keys::TERRACE.to_string(), "BLK_{blok}_TERRACE".to_string());
        let extract = config.extract_config();
        assert!(matches!(
            extract.layer_names.resolve(keys::TERRACE, &Coordinates::block(1)),
            Err(LayerNameError::MalformedTemplate { .. })
        ));
        assert!(extract
            .layer_names
            .resolve(keys::PLOT_BOUNDARY, &Coordinates::default())
            .is_ok());
    }

    #[test]
    fn test_missing_jurisdiction_is_rejected() {
        let err = JurisdictionConfig::from_str("topics = []").unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = JurisdictionConfig::from_file("/nonexistent/jurisdiction.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/jurisdiction.toml"));
    }
}
