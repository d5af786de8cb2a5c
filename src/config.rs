// Game settings, optionally read from a RON file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming a RON settings file.
pub const CONFIG_ENV: &str = "FALSEBOUND_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Tunables for the window, camera and starting field. Missing fields in a
/// file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Camera position relative to the followed actor.
    pub camera_offset: [f32; 3],
    pub field_of_view_degrees: f32,
    pub player_speed: f32,
    pub player_collider_radius: f32,
    pub marshal_collider_radius: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_title: "Falsebound".to_string(),
            window_width: 800,
            window_height: 450,
            camera_offset: [0.0, 20.0, 25.0],
            field_of_view_degrees: 60.0,
            player_speed: 15.0,
            player_collider_radius: 1.0,
            marshal_collider_radius: 2.0,
        }
    }
}

impl GameConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    /// Load the file named by [`CONFIG_ENV`], or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = GameConfig::from_ron_str("(window_width: 1280, player_speed: 9.5)").unwrap();
        assert_eq!(config.window_width, 1280);
        assert_eq!(config.player_speed, 9.5);
        assert_eq!(config.window_height, 450);
        assert_eq!(config.window_title, "Falsebound");
    }

    #[test]
    fn malformed_file_is_rejected() {
        assert!(matches!(
            GameConfig::from_ron_str("(window_width: \"wide\")"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GameConfig::load(Path::new("/nonexistent/falsebound.ron")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/falsebound.ron"));
    }
}
