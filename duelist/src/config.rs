//! Runtime configuration, read from an optional `duelist.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use duelist_combat::timer::DEFAULT_TURN_SECONDS;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "duelist.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the enemy and weapon files and of the save file.
    pub data_dir: PathBuf,
    /// Where `debug.log` and `crash.log` go.
    pub log_dir: PathBuf,
    /// Seconds the player gets to pick an ability.
    pub turn_seconds: u32,
    pub log_level: String,
    pub pacing: PacingConfig,
}

/// Narration delays for both speeds of the battle log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub normal: Pacing,
    pub faster: Pacing,
}

/// Delays, in milliseconds, between battle log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacing {
    /// Between two lines of the same turn.
    pub line_ms: u64,
    /// After the enemy's answer, before the next turn opens.
    pub turn_ms: u64,
}

impl Pacing {
    pub fn line(&self) -> Duration {
        Duration::from_millis(self.line_ms)
    }

    pub fn turn(&self) -> Duration {
        Duration::from_millis(self.turn_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
            turn_seconds: DEFAULT_TURN_SECONDS,
            log_level: "info".to_string(),
            pacing: PacingConfig::default(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            normal: Pacing {
                line_ms: 1500,
                turn_ms: 2500,
            },
            faster: Pacing {
                line_ms: 500,
                turn_ms: 1500,
            },
        }
    }
}

impl PacingConfig {
    pub fn select(&self, faster: bool) -> Pacing {
        if faster { self.faster } else { self.normal }
    }
}

impl Config {
    /// Parse a config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))?;
        if config.turn_seconds == 0 {
            config.turn_seconds = DEFAULT_TURN_SECONDS;
        }
        Ok(config)
    }

    /// Load `path` if it exists. A broken file falls back to the defaults;
    /// the reason is handed back so it can be logged once logging is up.
    pub fn load_or_default(path: &Path) -> (Self, Option<String>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(format!("{e}; using defaults"))),
        }
    }

    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str("turn_seconds = 5\n[pacing.faster]\nline_ms = 100\nturn_ms = 200\n").unwrap();
        assert_eq!(config.turn_seconds, 5);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.pacing.normal.line_ms, 1500);
        assert_eq!(config.pacing.select(true).turn(), Duration::from_millis(200));
    }

    #[test]
    fn bad_level_is_info() {
        let config = Config {
            log_level: "loud".into(),
            ..Default::default()
        };
        assert_eq!(config.level_filter(), log::LevelFilter::Info);
        let config = Config {
            log_level: "debug".into(),
            ..Default::default()
        };
        assert_eq!(config.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn missing_file_is_default() {
        let (config, warning) = Config::load_or_default(Path::new("does/not/exist.toml"));
        assert_eq!(config, Config::default());
        assert!(warning.is_none());
    }

    #[test]
    fn zero_turn_seconds_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        std::fs::write(&path, "turn_seconds = 0\nlog_level = \"warn\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.turn_seconds, DEFAULT_TURN_SECONDS);
        assert_eq!(config.log_level, "warn");

        std::fs::write(&path, "turn_seconds = \"ten\"\n").unwrap();
        let (config, warning) = Config::load_or_default(&path);
        assert_eq!(config, Config::default());
        assert!(warning.unwrap().contains("Failed to parse"));
    }
}
