//! Built-in demo scene used when no scene file is given.

use zonefade_core::{ConfigError, SceneConfig};

/// Two zones: a porch splat and a larger yard around it, 30 units apart.
const DEMO_SCENE: &str = r#"{
    "asset_root": "public",
    "zones": [
        { "name": "porch", "source": "360_portch_gs2(export).ply", "anchor": [0, 0, 0], "radius": 5, "fade_width": 3 },
        { "name": "yard", "source": "yard.ply", "anchor": [30, 0, 0], "radius": 13, "fade_width": 3 }
    ]
}"#;

pub fn demo_scene() -> Result<SceneConfig, ConfigError> {
    SceneConfig::from_json_str(DEMO_SCENE)
}
