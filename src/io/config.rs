use log::info;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Optional runtime settings. Every field has a built-in default, so a
/// missing file or a partial file both work. Screen and shadow-map
/// resolutions are deliberately not configurable.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    /// Image applied to the cube. Falls back to a flat tint if it cannot
    /// be decoded.
    #[serde(default = "default_texture")]
    pub texture: String,
    #[serde(default = "default_shadow_bias")]
    pub shadow_bias: f32,
    #[serde(default = "default_background")]
    pub background: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            texture: default_texture(),
            shadow_bias: default_shadow_bias(),
            background: default_background(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            sensitivity: default_sensitivity(),
        }
    }
}

fn default_texture() -> String {
    "assets/crate.jpg".to_string()
}
fn default_shadow_bias() -> f32 {
    0.005
}
fn default_background() -> [f32; 3] {
    [0.1, 0.1, 0.1]
}
fn default_speed() -> f32 {
    2.5
}
fn default_sensitivity() -> f32 {
    0.1
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Loads `path` if it exists. A missing file silently yields the
    /// defaults; an unreadable or malformed file is an error the caller
    /// should treat as fatal.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            info!("No config at {:?}, using defaults", path_ref);
            return Ok(Self::default());
        }
        Self::load(path_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_constants() {
        let config = Config::default();
        assert_eq!(config.camera.speed, 2.5);
        assert_eq!(config.camera.sensitivity, 0.1);
        assert_eq!(config.render.shadow_bias, 0.005);
        assert_eq!(config.render.background, [0.1, 0.1, 0.1]);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str("[camera]\nspeed = 4.0\n").unwrap();
        assert_eq!(config.camera.speed, 4.0);
        assert_eq!(config.camera.sensitivity, 0.1);
        assert_eq!(config.render.texture, "assets/crate.jpg");
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(toml::from_str::<Config>("[camera\nspeed = ").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load_or_default("no/such/config.toml").unwrap();
        assert_eq!(config.camera.speed, 2.5);
    }
}
