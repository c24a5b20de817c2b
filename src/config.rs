//! Configuration management for sezontui
//!
//! Config is stored at ~/.config/sezontui/config.toml. Every field has a
//! default, so a partial or missing file is fine.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::stream::PlayerType;

/// Environment variable overriding the catalog path from the config file
pub const CATALOG_ENV: &str = "SEZONTUI_CATALOG";

/// Catalog file looked up in the working directory when nothing else is set
pub const DEFAULT_CATALOG: &str = "links.txt";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Episode catalog file
    pub catalog_path: PathBuf,
    /// Player name ("mpv" or "vlc")
    pub player: String,
    /// Volume change per key press, in percent
    pub volume_step: i16,
    /// Seek distance per arrow key, in seconds
    pub seek_step_secs: f64,
    /// Hide the controls hint this long after the last key in fullscreen
    pub overlay_timeout_ms: u64,
    /// How often the TUI asks the player for its position
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG),
            player: PlayerType::default().command().to_string(),
            volume_step: 10,
            seek_step_secs: 10.0,
            overlay_timeout_ms: 3000,
            poll_interval_ms: 500,
        }
    }
}

impl Config {
    /// Get config file path (~/.config/sezontui/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sezontui").join("config.toml"))
    }

    /// Load config from the default location. On first run the defaults
    /// are written there, so there is a file to edit.
    pub fn load() -> Self {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                let config = Self::default();
                match config.save() {
                    Ok(()) => info!(path = %path.display(), "wrote default config"),
                    Err(e) => warn!(path = %path.display(), error = %e, "could not write default config"),
                }
                config
            }
            None => Self::default(),
        }
    }

    /// Load config from `path`; a missing or broken file yields defaults
    pub fn load_from(path: &Path) -> Self {
        let Ok(text) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Configured player, falling back to mpv for unknown names
    pub fn player_type(&self) -> PlayerType {
        PlayerType::from_name(&self.player).unwrap_or_else(|| {
            warn!(player = %self.player, "unknown player in config, using mpv");
            PlayerType::default()
        })
    }

    /// Catalog file to open:
    /// 1. `flag` (the `--catalog` argument)
    /// 2. Environment variable SEZONTUI_CATALOG
    /// 3. `catalog_path` from the config file
    pub fn resolve_catalog_path(&self, flag: Option<&Path>) -> PathBuf {
        self.catalog_path_with(flag, std::env::var_os(CATALOG_ENV))
    }

    fn catalog_path_with(&self, flag: Option<&Path>, env: Option<OsString>) -> PathBuf {
        if let Some(path) = flag {
            return path.to_path_buf();
        }
        match env {
            Some(value) if !value.is_empty() => PathBuf::from(value),
            _ => self.catalog_path.clone(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(50))
    }

    pub fn overlay_timeout(&self) -> Duration {
        Duration::from_millis(self.overlay_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.catalog_path, PathBuf::from("links.txt"));
        assert_eq!(config.player, "mpv");
        assert_eq!(config.volume_step, 10);
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.overlay_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str("player = \"vlc\"\n").unwrap();
        assert_eq!(config.player_type(), PlayerType::Vlc);
        assert_eq!(config.seek_step_secs, 10.0);
    }

    #[test]
    fn test_unknown_player_falls_back() {
        let config = Config {
            player: "winamp".into(),
            ..Config::default()
        };
        assert_eq!(config.player_type(), PlayerType::Mpv);
    }

    #[test]
    fn test_catalog_path_precedence() {
        let config = Config {
            catalog_path: "from-config.txt".into(),
            ..Config::default()
        };
        let flag = PathBuf::from("from-flag.txt");

        assert_eq!(
            config.catalog_path_with(Some(&flag), Some("from-env.txt".into())),
            flag
        );
        assert_eq!(
            config.catalog_path_with(None, Some("from-env.txt".into())),
            PathBuf::from("from-env.txt")
        );
        assert_eq!(
            config.catalog_path_with(None, Some(OsString::new())),
            PathBuf::from("from-config.txt")
        );
        assert_eq!(
            config.catalog_path_with(None, None),
            PathBuf::from("from-config.txt")
        );
    }

    #[test]
    fn test_save_and_load_from() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            catalog_path: "/srv/kiepscy/links.txt".into(),
            volume_step: 5,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_invalid_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "volume_step = \"loud\"").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }
}
