//! Static game data: enemies, weapons and the attacks weapons refer to.
//!
//! ```text
//! data/enemies/<id>/main.json      name, title, health, level, rewards
//! data/enemies/<id>/attacks.json   { "attacks": [ ... ] }
//! data/weapons/*.json              one weapon per file
//! data/weapons/attacks/*.json      one attack per file
//! ```
//!
//! A file that cannot be read or parsed is logged and skipped; the rest of
//! the data still loads.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use duelist_combat::record::AttacksFile;
use duelist_combat::{AttackRecord, EnemyRecord, WeaponRecord};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and parse one JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let content = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// The `.json` files directly inside `dir`, sorted by name.
fn json_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("cannot list {}: {e}", dir.display());
            return Vec::new();
        }
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// Load every file in `dir`, skipping the ones that fail.
fn load_all<T: DeserializeOwned>(dir: &Path, kind: &str) -> Vec<T> {
    json_files(dir)
        .iter()
        .filter_map(|path| match read_json(path) {
            Ok(item) => Some(item),
            Err(e) => {
                log::error!("skipping {kind}: {e}");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct GameData {
    /// Sorted by level.
    pub enemies: Vec<EnemyRecord>,
    /// Sorted by level requirement.
    pub weapons: Vec<WeaponRecord>,
    pub attacks: Vec<AttackRecord>,
}

impl GameData {
    pub fn load(data_dir: &Path) -> Self {
        let weapons_dir = data_dir.join("weapons");
        let attacks = load_all(&weapons_dir.join("attacks"), "attack");
        let mut weapons: Vec<WeaponRecord> = load_all(&weapons_dir, "weapon");
        weapons.sort_by_key(|w| w.level_requirement);
        let mut enemies = load_enemies(&data_dir.join("enemies"));
        enemies.sort_by_key(|e| e.level);

        log::info!(
            "loaded {} enemies, {} weapons, {} attacks from {}",
            enemies.len(),
            weapons.len(),
            attacks.len(),
            data_dir.display()
        );
        Self {
            enemies,
            weapons,
            attacks,
        }
    }

    pub fn weapon(&self, id: &str) -> Option<&WeaponRecord> {
        self.weapons.iter().find(|w| w.id == id)
    }

    /// Weapons offered in the shop, in level order.
    pub fn shop_weapons(&self) -> impl Iterator<Item = &WeaponRecord> {
        self.weapons.iter().filter(|w| w.in_shop)
    }
}

fn load_enemies(dir: &Path) -> Vec<EnemyRecord> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("cannot list {}: {e}", dir.display());
            return Vec::new();
        }
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs.iter()
        .filter_map(|dir| match load_enemy(dir) {
            Ok(enemy) => Some(enemy),
            Err(e) => {
                log::error!("skipping enemy: {e}");
                None
            }
        })
        .collect()
}

/// `main.json` merged with the attacks of `attacks.json`; the id is the
/// directory name.
fn load_enemy(dir: &Path) -> Result<EnemyRecord, DataError> {
    let mut enemy: EnemyRecord = read_json(&dir.join("main.json"))?;
    let attacks: AttacksFile = read_json(&dir.join("attacks.json"))?;
    enemy.attacks = attacks.attacks;
    enemy.id = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(enemy)
}
