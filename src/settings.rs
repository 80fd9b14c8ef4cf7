//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/tetrad/settings.toml (or platform equivalent)

use crate::game::GameConfig;
use crate::grid::{DEFAULT_COLUMNS, DEFAULT_ROWS};
use crate::score::{DEFAULT_INTERVALS_MS, GravityCurve};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to write settings: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed piece seed; a random one is drawn per session when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Keybindings
    pub keys: KeyBindings,
    /// Playfield size
    pub board: BoardSettings,
    /// Speed curve
    pub gravity: GravitySettings,
}

/// Key bindings (stored as strings for easy editing)
/// Each action can have one or more keys bound to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_down: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub hard_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub pause: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub quit: Vec<String>,
}

/// A binding as written in the file: one key name or a list of them
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum KeyList {
    One(String),
    Many(Vec<String>),
}

fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match KeyList::deserialize(deserializer)? {
        KeyList::One(key) => vec![key],
        KeyList::Many(keys) => keys,
    })
}

/// A lone key is written back as a plain string
fn serialize_keys<S>(keys: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let list = match keys {
        [key] => KeyList::One(key.clone()),
        _ => KeyList::Many(keys.to_vec()),
    };
    list.serialize(serializer)
}

/// Playfield dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub rows: usize,
    pub columns: usize,
}

/// Gravity settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravitySettings {
    /// Tick period in milliseconds for level 1, 2, ...; the last entry
    /// applies to every higher level
    pub intervals_ms: Vec<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            keys: KeyBindings::default(),
            board: BoardSettings::default(),
            gravity: GravitySettings::default(),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["Left".to_string()],
            move_right: vec!["Right".to_string()],
            move_down: vec!["Down".to_string()],
            rotate: vec!["Up".to_string()],
            hard_drop: vec!["Space".to_string()],
            pause: vec!["p".to_string(), "Esc".to_string()],
            quit: vec!["q".to_string()],
        }
    }
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
        }
    }
}

impl Default for GravitySettings {
    fn default() -> Self {
        Self {
            intervals_ms: DEFAULT_INTERVALS_MS.to_vec(),
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "tetrad", "tetrad").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from file, or fall back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("no config directory, using default settings");
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => {
                    info!(path = %path.display(), "loaded settings");
                    settings
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "invalid settings, using defaults");
                    Self::default()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                warn!(path = %path.display(), %err, "could not read settings, using defaults");
                Self::default()
            }
        }
    }

    /// Parse settings from TOML text
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Save settings to file
    pub fn save(&self) -> Result<(), SettingsError> {
        let dir = Self::config_dir().ok_or(SettingsError::NoConfigDir)?;
        fs::create_dir_all(&dir)?;
        let contents = toml::to_string_pretty(self)?;
        fs::write(dir.join("settings.toml"), contents)?;
        Ok(())
    }

    /// Engine configuration described by these settings
    pub fn game_config(&self) -> GameConfig {
        if self.gravity.intervals_ms.contains(&0) {
            warn!("zero gravity interval in settings, using default curve");
        }
        GameConfig {
            rows: self.board.rows,
            columns: self.board.columns,
            gravity: GravityCurve::from_millis(&self.gravity.intervals_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Settings::parse("").unwrap(), Settings::default());
    }

    #[test]
    fn test_keys_accept_string_or_array() {
        let settings = Settings::parse(
            r#"
            [keys]
            rotate = "x"
            hard_drop = ["Space", "Enter"]
            "#,
        )
        .unwrap();
        assert_eq!(settings.keys.rotate, vec!["x"]);
        assert_eq!(settings.keys.hard_drop, vec!["Space", "Enter"]);
        // Unlisted keys keep their defaults
        assert_eq!(settings.keys.move_left, vec!["Left"]);
    }

    #[test]
    fn test_partial_sections() {
        let settings = Settings::parse(
            r#"
            seed = 1234

            [board]
            rows = 16

            [gravity]
            intervals_ms = [800, 400]
            "#,
        )
        .unwrap();
        assert_eq!(settings.seed, Some(1234));
        let config = settings.game_config();
        assert_eq!(config.rows, 16);
        assert_eq!(config.columns, DEFAULT_COLUMNS);
        assert_eq!(config.gravity.interval(1), Duration::from_millis(800));
        assert_eq!(config.gravity.interval(7), Duration::from_millis(400));
    }

    #[test]
    fn test_empty_gravity_table_uses_default_curve() {
        let settings = Settings::parse("[gravity]\nintervals_ms = []\n").unwrap();
        assert_eq!(settings.game_config().gravity, GravityCurve::default());
    }

    #[test]
    fn test_serialized_settings_read_back() {
        let mut settings = Settings::default();
        settings.seed = Some(9);
        settings.keys.quit = vec!["q".to_string(), "Ctrl".to_string()];
        let text = toml::to_string_pretty(&settings).unwrap();
        // Single bindings are written as plain strings
        assert!(text.contains("move_left = \"Left\""));
        assert_eq!(Settings::parse(&text).unwrap(), settings);
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(Settings::parse("[board]\nrows = \"tall\"\n").is_err());
        assert!(Settings::parse("[keys]\nrotate = 5\n").is_err());
    }
}
