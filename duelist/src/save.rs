//! The player's save file, `save_file.json` in the data directory.
//!
//! Every load and every save first copies the current file to
//! `save_file.json.bak`, unless the current file is empty or not JSON.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use duelist_combat::leveling::xp_goal;

pub const SAVE_FILE: &str = "save_file.json";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to read save {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write save {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt save {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode save: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Player options. Keys this version does not know about are kept as
/// they were and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub display_controls: bool,
    pub use_arrow_keys: bool,
    pub faster_battle_logs: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        let defaults = serde_json::json!({
            "shopSortType": "levelRequirement",
            "shopSortAscending": true,
            "invSortType": "levelRequirement",
            "invSortAscending": true,
            "primarySortKeybind": "z",
            "secondarySortKeybind": "x",
            "displayTextTooltips": false,
            "displayExtraTooltips": true,
        });
        let extra = match defaults {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        };
        Self {
            display_controls: true,
            use_arrow_keys: true,
            faster_battle_logs: false,
            extra,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xp {
    pub current: i64,
    pub max: i64,
}

impl Default for Xp {
    fn default() -> Self {
        Self {
            current: 0,
            max: xp_goal(0),
        }
    }
}

/// The on-disk shape of the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveData {
    pub health: i32,
    pub money: i64,
    pub level: i32,
    pub xp: Xp,
    pub inventory: Vec<String>,
    pub equipped: String,
    pub settings: Settings,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            health: 100,
            money: 0,
            level: 0,
            xp: Xp::default(),
            inventory: vec!["default".to_string()],
            equipped: "default".to_string(),
            settings: Settings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    /// The save file inside `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        Self::at(data_dir.join(SAVE_FILE))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    /// Read the save. A missing file is created from the defaults.
    pub fn load(&self) -> Result<SaveData, SaveError> {
        if !self.path.exists() {
            log::warn!("{} does not exist, starting a new save", self.path.display());
            let data = SaveData::default();
            self.save(&data)?;
            return Ok(data);
        }
        let content = fs::read_to_string(&self.path).map_err(|source| SaveError::Read {
            path: self.path.clone(),
            source,
        })?;
        self.backup(&content);
        let data = serde_json::from_str(&content).map_err(|source| SaveError::Parse {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("loaded {}", self.path.display());
        Ok(data)
    }

    /// Write the save, refreshing the backup first.
    pub fn save(&self, data: &SaveData) -> Result<(), SaveError> {
        if let Ok(current) = fs::read_to_string(&self.path) {
            self.backup(&current);
        }
        let json = serde_json::to_string_pretty(data)?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|source| SaveError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        fs::write(&self.path, json).map_err(|source| SaveError::Write {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("saved {}", self.path.display());
        Ok(())
    }

    /// Copy the current file aside. Empty or unparsable content is never
    /// backed up, so a good backup is not replaced by a broken file.
    fn backup(&self, current: &str) {
        let worth_keeping = match serde_json::from_str::<serde_json::Value>(current) {
            Ok(serde_json::Value::Object(map)) => !map.is_empty(),
            Ok(serde_json::Value::Null) | Err(_) => false,
            Ok(_) => true,
        };
        if !worth_keeping {
            log::warn!("not backing up {}: empty or invalid", self.path.display());
            return;
        }
        if let Err(e) = fs::copy(&self.path, self.backup_path()) {
            log::error!("failed to back up {}: {e}", self.path.display());
        }
    }
}
