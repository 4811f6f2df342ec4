//! Media settings module.
//!
//! Handles loading, validating, and layering `config.toml`. Stock defaults
//! are overridden by the user's config file; only the keys that differ need
//! to be written.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [images]
//! enabled = false           # Serve images through the image service
//! service_url = ""          # e.g. "image-dot-myproject.appspot.com"
//! quality = 90              # Serving quality (1-100, 0 = endpoint default)
//!
//! [uploads]
//! use_https = false         # Force https:// on serving URLs
//!
//! [sizes.thumbnail]
//! width = 150
//! height = 150
//! crop = true               # or an anchor pair, e.g. [0.5, 0.0]
//!
//! [sizes.medium]
//! width = 300
//! height = 300
//! crop = false
//!
//! [sizes.large]
//! width = 1024
//! height = 1024
//! crop = false
//! ```
//!
//! Additional `[sizes.<name>]` tables register custom presets. Unknown keys
//! are rejected to catch typos early.

use crate::planner::presets::default_presets;
use crate::planner::{Crop, PresetRegistry, Quality, SizeSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Media settings loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    /// Image service settings (enable flag, endpoint, quality).
    pub images: ImagesConfig,
    /// Upload/URL settings shared with the storage side.
    pub uploads: UploadsConfig,
    /// Named size presets.
    #[serde(default = "default_presets")]
    pub sizes: BTreeMap<String, SizeSpec>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            images: ImagesConfig::default(),
            uploads: UploadsConfig::default(),
            sizes: default_presets(),
        }
    }
}

impl MediaConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 0-100".into(),
            ));
        }
        if self.images.service_url.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "images.service_url must not contain whitespace".into(),
            ));
        }
        for (name, spec) in &self.sizes {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "sizes: preset names must not be empty".into(),
                ));
            }
            if name == "full" {
                return Err(ConfigError::Validation(
                    "sizes.full is reserved for the original size".into(),
                ));
            }
            if let Crop::Anchor([x, y]) = spec.crop
                && !((0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y))
            {
                return Err(ConfigError::Validation(format!(
                    "sizes.{name}.crop anchor values must be within 0.0-1.0"
                )));
            }
        }
        Ok(())
    }

    /// Snapshot of the configured presets for the planner.
    pub fn preset_registry(&self) -> PresetRegistry {
        PresetRegistry::new(self.sizes.clone())
    }
}

/// Image service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Serve media-library images through the image service.
    pub enabled: bool,
    /// Image service endpoint. Empty means no service is configured.
    pub service_url: String,
    /// Serving quality (1 = worst, 100 = best, 0 = endpoint default).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service_url: String::new(),
            quality: 90,
        }
    }
}

impl ImagesConfig {
    /// Quality token for serving URLs; `None` when disabled with `0`.
    pub fn quality(&self) -> Option<Quality> {
        Quality::from_setting(self.quality)
    }

    /// The service endpoint, if one is configured.
    pub fn service_url(&self) -> Option<&str> {
        let url = self.service_url.trim();
        (!url.is_empty()).then_some(url)
    }
}

/// Upload and URL settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Rewrite serving URLs to `https://`.
    pub use_https: bool,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(MediaConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<MediaConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: MediaConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<MediaConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# gcs-media configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Image service
# ---------------------------------------------------------------------------
[images]
# Serve media-library images through the image service. When off, every
# request falls back to the host's own image sizes.
enabled = false

# Image service endpoint, e.g. "image-dot-myproject.appspot.com".
# https:// is assumed when no scheme is given.
service_url = ""

# Serving quality (1 = worst, 100 = best). 0 leaves it to the endpoint.
quality = 90

# ---------------------------------------------------------------------------
# Uploads
# ---------------------------------------------------------------------------
[uploads]
# Force https:// on serving URLs.
use_https = false

# ---------------------------------------------------------------------------
# Size presets
# ---------------------------------------------------------------------------
# Each [sizes.<name>] table defines a named size. A zero width or height
# leaves that axis unconstrained. crop = true fills the box exactly
# (centred); crop = [x, y] anchors the crop, 0.0 = left/top, 1.0 = right/bottom.
# Add tables to register custom presets.
[sizes.thumbnail]
width = 150
height = 150
crop = true

[sizes.medium]
width = 300
height = 300
crop = false

[sizes.large]
width = 1024
height = 1024
crop = false
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_image_settings() {
        let config = MediaConfig::default();
        assert!(!config.images.enabled);
        assert_eq!(config.images.service_url, "");
        assert_eq!(config.images.quality, 90);
        assert!(!config.uploads.use_https);
    }

    #[test]
    fn default_config_has_host_presets() {
        let config = MediaConfig::default();
        assert_eq!(config.sizes["thumbnail"], SizeSpec::cropped(150, 150));
        assert_eq!(config.sizes["medium"], SizeSpec::fit(300, 300));
        assert_eq!(config.sizes["large"], SizeSpec::fit(1024, 1024));
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[images]
quality = 70
"#;
        let config: MediaConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.images.quality, 70);
        // Default values preserved
        assert!(!config.images.enabled);
        assert_eq!(config.sizes.len(), 3);
    }

    #[test]
    fn quality_zero_disables_token() {
        let mut config = MediaConfig::default();
        config.images.quality = 0;
        assert_eq!(config.images.quality(), None);
        config.images.quality = 85;
        assert_eq!(config.images.quality(), Some(Quality::new(85)));
    }

    #[test]
    fn service_url_blank_is_none() {
        let mut images = ImagesConfig::default();
        assert_eq!(images.service_url(), None);
        images.service_url = "  ".to_string();
        assert_eq!(images.service_url(), None);
        images.service_url = "image-dot-demo.appspot.com".to_string();
        assert_eq!(images.service_url(), Some("image-dot-demo.appspot.com"));
    }

    #[test]
    fn preset_registry_reflects_sizes() {
        let mut config = MediaConfig::default();
        config
            .sizes
            .insert("hero".to_string(), SizeSpec::cropped(1600, 600));
        let registry = config.preset_registry();
        assert_eq!(registry.get("hero"), Some(&SizeSpec::cropped(1600, 600)));
        assert!(registry.get("thumbnail").is_some());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.images.quality, 90);
        assert_eq!(config.sizes.len(), 3);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[images]
enabled = true
service_url = "image-dot-demo.appspot.com"

[uploads]
use_https = true
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert!(config.images.enabled);
        assert_eq!(config.images.service_url, "image-dot-demo.appspot.com");
        assert!(config.uploads.use_https);
        // Unspecified values should be defaults
        assert_eq!(config.images.quality, 90);
    }

    #[test]
    fn load_config_overrides_one_preset_keeps_others() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[sizes.thumbnail]
width = 200
height = 200
crop = [0.5, 0.0]

[sizes.hero]
width = 1600
height = 600
crop = true
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.sizes["thumbnail"].width, 200);
        assert_eq!(config.sizes["thumbnail"].crop, Crop::Anchor([0.5, 0.0]));
        assert_eq!(config.sizes["medium"], SizeSpec::fit(300, 300));
        assert_eq!(config.sizes["hero"], SizeSpec::cropped(1600, 600));
    }

    #[test]
    fn load_config_partial_preset_merges_with_stock() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[sizes.large]
width = 2048
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.sizes["large"], SizeSpec::fit(2048, 1024));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"quality = 90"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"quality = 70"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("quality").unwrap().as_integer(), Some(70));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[images]
enabled = false
quality = 90
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[images]
quality = 70
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let images = merged.get("images").unwrap();
        assert_eq!(images.get("quality").unwrap().as_integer(), Some(70));
        assert_eq!(images.get("enabled").unwrap().as_bool(), Some(false));
    }

    #[test]
    fn merge_toml_array_replaces() {
        let base: toml::Value = toml::from_str(r#"crop = [0.5, 0.5]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"crop = true"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("crop").unwrap().as_bool(), Some(true));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[images]
qualty = 90
"#;
        let result: Result<MediaConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<MediaConfig, _> = toml::from_str("[imagez]\nquality = 90\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_preset_key_rejected() {
        let toml_str = r#"
[sizes.thumbnail]
width = 150
height = 150
gravity = "center"
"#;
        let result: Result<MediaConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(MediaConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_too_high() {
        let mut config = MediaConfig::default();
        config.images.quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("quality"));
    }

    #[test]
    fn validate_anchor_out_of_range() {
        let mut config = MediaConfig::default();
        config.sizes.insert(
            "banner".to_string(),
            SizeSpec {
                width: 100,
                height: 100,
                crop: Crop::Anchor([1.5, 0.0]),
            },
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sizes.banner"));
    }

    #[test]
    fn validate_reserved_full_preset() {
        let mut config = MediaConfig::default();
        config.sizes.insert("full".to_string(), SizeSpec::fit(1, 1));
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_service_url_whitespace() {
        let mut config = MediaConfig::default();
        config.images.service_url = "image dot demo".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[images]\nquality = 200\n").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // stock_config_toml / stock_defaults_value tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: MediaConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config.images.quality, 90);
        assert!(!config.images.enabled);
        assert!(!config.uploads.use_https);
        assert_eq!(config.sizes, MediaConfig::default().sizes);
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[images]"));
        assert!(content.contains("[uploads]"));
        assert!(content.contains("[sizes.thumbnail]"));
        assert!(content.contains("[sizes.medium]"));
        assert!(content.contains("[sizes.large]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        assert!(val.get("images").is_some());
        assert!(val.get("uploads").is_some());
        assert!(val.get("sizes").unwrap().get("thumbnail").is_some());
    }
}
