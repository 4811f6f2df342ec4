//! Named size presets.
//!
//! A [`PresetRegistry`] is a read-only snapshot of the `[sizes.*]` tables in
//! the settings. It is built once (per process or per request) and passed to
//! the [`Planner`](super::Planner) explicitly; presets only change through
//! configuration, never per request.

use super::params::SizeSpec;
use std::collections::BTreeMap;

/// Preset names the host always defines.
pub const DEFAULT_PRESETS: [&str; 3] = ["thumbnail", "medium", "large"];

/// Stock definitions of the default presets, matching the host's own defaults.
pub fn default_presets() -> BTreeMap<String, SizeSpec> {
    BTreeMap::from([
        ("thumbnail".to_string(), SizeSpec::cropped(150, 150)),
        ("medium".to_string(), SizeSpec::fit(300, 300)),
        ("large".to_string(), SizeSpec::fit(1024, 1024)),
    ])
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresetRegistry {
    presets: BTreeMap<String, SizeSpec>,
}

impl PresetRegistry {
    pub fn new(presets: BTreeMap<String, SizeSpec>) -> Self {
        Self { presets }
    }

    pub fn get(&self, name: &str) -> Option<&SizeSpec> {
        self.presets.get(name)
    }

    /// Presets in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SizeSpec)> {
        self.presets.iter().map(|(name, spec)| (name.as_str(), spec))
    }
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::new(default_presets())
    }
}
