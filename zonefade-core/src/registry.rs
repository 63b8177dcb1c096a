//! Static zone descriptors and scene configuration.

use crate::errors::ConfigError;
use crate::zone::ZoneId;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Identity, anchor and fade geometry of a single zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneDescriptor {
    /// Zone identifier. Also the asset source when `source` is not set.
    pub name: String,
    /// Asset file name handed to the importer unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// World-space point the zone is centered on.
    pub anchor: Vec3,
    /// Distance from `anchor` within which the zone is fully opaque.
    pub radius: f32,
    /// Distance beyond `radius` over which opacity decays to zero.
    #[serde(default)]
    pub fade_width: f32,
}

impl ZoneDescriptor {
    pub fn new(name: impl Into<String>, anchor: Vec3, radius: f32, fade_width: f32) -> Self {
        Self {
            name: name.into(),
            source: None,
            anchor,
            radius,
            fade_width,
        }
    }

    /// Load the zone from `source` instead of its name.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The asset source identifier for this zone.
    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }

    /// Outer edge of the fade band.
    pub fn reach(&self) -> f32 {
        self.radius + self.fade_width
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName(index));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(ConfigError::InvalidRadius {
                name: self.name.clone(),
                value: self.radius,
            });
        }
        if !self.fade_width.is_finite() || self.fade_width < 0.0 {
            return Err(ConfigError::InvalidFadeWidth {
                name: self.name.clone(),
                value: self.fade_width,
            });
        }
        if !self.anchor.is_finite() {
            return Err(ConfigError::InvalidAnchor {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Ordered, immutable set of validated zone descriptors.
///
/// Registry order is the tie-break order used when two zones weigh the same.
#[derive(Debug, Clone, Default)]
pub struct ZoneRegistry {
    descriptors: Vec<ZoneDescriptor>,
}

impl ZoneRegistry {
    /// Validate every descriptor and build the registry. The first invalid entry fails the whole set.
    pub fn new(descriptors: Vec<ZoneDescriptor>) -> Result<Self, ConfigError> {
        let mut names = HashSet::with_capacity(descriptors.len());
        for (index, descriptor) in descriptors.iter().enumerate() {
            descriptor.validate(index)?;
            if !names.insert(descriptor.name.as_str()) {
                return Err(ConfigError::DuplicateName(descriptor.name.clone()));
            }
        }
        debug!("Zone registry validated: {} zones", descriptors.len());
        Ok(Self { descriptors })
    }

    /// Parse a scene JSON document and build its registry.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        SceneConfig::from_json_str(json)?.registry()
    }

    /// Read a scene JSON file and build its registry.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        SceneConfig::from_json_file(path)?.registry()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, &ZoneDescriptor)> {
        self.descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| (ZoneId::new(i), d))
    }

    pub fn get(&self, id: ZoneId) -> Option<&ZoneDescriptor> {
        self.descriptors.get(id.index())
    }

    /// Look up a zone by name.
    pub fn find(&self, name: &str) -> Option<ZoneId> {
        self.descriptors
            .iter()
            .position(|d| d.name == name)
            .map(ZoneId::new)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Scene file contents: where assets live, load policy, and the zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    /// Root that zone sources are resolved against.
    #[serde(default)]
    pub asset_root: PathBuf,
    /// Zones still pending after this long are marked failed. Unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_timeout_ms: Option<u64>,
    pub zones: Vec<ZoneDescriptor>,
}

impl SceneConfig {
    /// Parse and validate a scene JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        // Validate eagerly so a bad scene never gets as far as issuing loads.
        config.registry()?;
        Ok(config)
    }

    /// Read, parse and validate a scene JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Reading scene config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn registry(&self) -> Result<ZoneRegistry, ConfigError> {
        ZoneRegistry::new(self.zones.clone())
    }

    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(name: &str, radius: f32, fade_width: f32) -> ZoneDescriptor {
        ZoneDescriptor::new(name, Vec3::ZERO, radius, fade_width)
    }

    #[test]
    fn test_registry_preserves_order() {
        let registry = ZoneRegistry::new(vec![zone("b", 1.0, 1.0), zone("a", 2.0, 0.0)]).unwrap();
        let names: Vec<_> = registry.iter().map(|(_, d)| d.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(registry.find("a"), Some(ZoneId::new(1)));
        assert_eq!(registry.find("missing"), None);
        assert_eq!(registry.get(ZoneId::new(0)).unwrap().name, "b");
    }

    #[test]
    fn test_registry_rejects_negative_radius() {
        let err = ZoneRegistry::new(vec![zone("a", -1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRadius { .. }));
    }

    #[test]
    fn test_registry_rejects_negative_fade_width() {
        let err = ZoneRegistry::new(vec![zone("a", 1.0, -0.5)]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFadeWidth { .. }));
    }

    #[test]
    fn test_registry_rejects_nan_values() {
        let err = ZoneRegistry::new(vec![zone("a", f32::NAN, 1.0)]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRadius { .. }));

        let bad_anchor = ZoneDescriptor::new("b", Vec3::new(f32::INFINITY, 0.0, 0.0), 1.0, 1.0);
        let err = ZoneRegistry::new(vec![bad_anchor]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAnchor { .. }));
    }

    #[test]
    fn test_registry_rejects_duplicates_and_empty_names() {
        let err = ZoneRegistry::new(vec![zone("a", 1.0, 1.0), zone("a", 2.0, 1.0)]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(name) if name == "a"));

        let err = ZoneRegistry::new(vec![zone("a", 1.0, 1.0), zone("  ", 1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyName(1)));
    }

    #[test]
    fn test_zero_radius_and_fade_are_valid() {
        let registry = ZoneRegistry::new(vec![zone("point", 0.0, 0.0)]).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_source_defaults_to_name() {
        let plain = zone("porch", 5.0, 3.0);
        assert_eq!(plain.source(), "porch");
        let sourced = plain.with_source("porch.ply");
        assert_eq!(sourced.source(), "porch.ply");
        assert_eq!(sourced.reach(), 8.0);
    }

    #[test]
    fn test_scene_config_from_json() {
        let json = r#"{
            "asset_root": "public",
            "load_timeout_ms": 1500,
            "zones": [
                { "name": "porch", "source": "porch.ply", "anchor": [0, 0, 0], "radius": 5, "fade_width": 3 },
                { "name": "yard", "anchor": [20, 0, 0], "radius": 13 }
            ]
        }"#;
        let config = SceneConfig::from_json_str(json).unwrap();
        assert_eq!(config.asset_root, PathBuf::from("public"));
        assert_eq!(config.load_timeout(), Some(Duration::from_millis(1500)));

        let registry = config.registry().unwrap();
        let yard = registry.get(ZoneId::new(1)).unwrap();
        assert_eq!(yard.anchor, Vec3::new(20.0, 0.0, 0.0));
        assert_eq!(yard.fade_width, 0.0);
        assert_eq!(yard.source(), "yard");
    }

    #[test]
    fn test_scene_config_rejects_invalid_zone() {
        let json = r#"{ "zones": [ { "name": "a", "anchor": [0, 0, 0], "radius": -2 } ] }"#;
        let err = SceneConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRadius { .. }));
    }

    #[test]
    fn test_scene_config_rejects_malformed_json() {
        let err = ZoneRegistry::from_json_str("{ \"zones\": [ }").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
