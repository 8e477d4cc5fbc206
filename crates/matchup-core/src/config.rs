use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::deck::TABLE_RANGE;
use crate::error::ErrorCode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchupConfig {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub screens: Vec<CustomScreenConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_screen")]
    pub default_screen: String,
    #[serde(default = "default_table")]
    pub default_table: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            default_screen: default_screen(),
            default_table: default_table(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Profile file override. `None` uses the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// A `[[screens]]` entry: a word-pair deck defined by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomScreenConfig {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub left_heading: Option<String>,
    #[serde(default)]
    pub right_heading: Option<String>,
    pub pairs: Vec<(String, String)>,
    #[serde(default)]
    pub pair_count: Option<usize>,
}

/// Default config path: `<config_dir>/matchup/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("matchup/config.toml"))
}

/// Default profile path: `<data_dir>/matchup/profile.json`.
#[must_use]
pub fn default_profile_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("matchup/profile.json"))
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<MatchupConfig> {
    if !path.exists() {
        return Ok(MatchupConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str::<MatchupConfig>(&content)
        .with_context(|| {
            format!(
                "{}: Failed to parse {}",
                ErrorCode::ConfigParseError,
                path.display()
            )
        })?;

    if !TABLE_RANGE.contains(&config.game.default_table) {
        anyhow::bail!(
            "{}: {}: game.default_table = {} is outside {:?}",
            ErrorCode::ConfigParseError,
            path.display(),
            config.game.default_table,
            TABLE_RANGE
        );
    }

    Ok(config)
}

/// Resolve the config: an explicit path wins, then the platform default,
/// then built-in defaults.
///
/// # Errors
///
/// Returns an error if the chosen file exists but is invalid.
pub fn resolve_config(explicit: Option<&Path>) -> Result<MatchupConfig> {
    match explicit {
        Some(path) => load_config(path),
        None => default_config_path()
            .map_or_else(|| Ok(MatchupConfig::default()), |path| load_config(&path)),
    }
}

/// Where the profile store lives for this config.
#[must_use]
pub fn profile_path(config: &MatchupConfig) -> Option<PathBuf> {
    config.storage.path.clone().or_else(default_profile_path)
}

fn default_screen() -> String {
    "numbers".to_string()
}

const fn default_table() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = load_config(&dir.path().join("config.toml")).expect("load should succeed");
        assert_eq!(cfg.game.default_screen, "numbers");
        assert_eq!(cfg.game.default_table, 2);
        assert!(cfg.storage.path.is_none());
        assert!(cfg.screens.is_empty());
    }

    #[test]
    fn custom_screens_parse() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[game]
default_screen = "colors"
default_table = 5

[storage]
path = "/tmp/matchup-profile.json"

[[screens]]
id = "colors"
title = "Colours in Urdu"
left_heading = "English"
right_heading = "Urdu"
pairs = [["Red", "Laal"], ["Green", "Hara"], ["Blue", "Neela"]]
pair_count = 2
"#,
        )
        .expect("write config");

        let cfg = load_config(&path).expect("parse");
        assert_eq!(cfg.game.default_screen, "colors");
        assert_eq!(cfg.game.default_table, 5);
        assert_eq!(
            profile_path(&cfg),
            Some(PathBuf::from("/tmp/matchup-profile.json"))
        );
        assert_eq!(cfg.screens.len(), 1);
        assert_eq!(cfg.screens[0].pairs[2], ("Blue".to_string(), "Neela".to_string()));
        assert_eq!(cfg.screens[0].pair_count, Some(2));
    }

    #[test]
    fn out_of_range_table_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[game]\ndefault_table = 16\n").expect("write config");
        let err = load_config(&path).expect_err("table 16 is invalid");
        assert!(err.to_string().contains("default_table"));
        assert!(err.to_string().contains("1..=15"));

        std::fs::write(&path, "[game]\ndefault_table = 1\n").expect("write config");
        let cfg = load_config(&path).expect("table 1 is valid");
        assert_eq!(cfg.game.default_table, 1);
    }

    #[test]
    fn malformed_config_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[game\n").expect("write config");
        let err = load_config(&path).expect_err("malformed");
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn explicit_path_wins() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("alt.toml");
        std::fs::write(&path, "[game]\ndefault_screen = \"genders\"\n").expect("write config");
        let cfg = resolve_config(Some(&path)).expect("resolve");
        assert_eq!(cfg.game.default_screen, "genders");
    }
}
