use thiserror::Error;

use duelist_combat::{Progress, RewardRoll, WeaponRecord};

use crate::data::GameData;
use crate::save::{SaveData, Settings, Xp};

/// Why a purchase or an equip was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("you need level {required}, you are level {level}")]
    LevelTooLow { required: i32, level: i32 },
    #[error("you need ${price}, you have ${balance}")]
    InsufficientFunds { price: i64, balance: i64 },
    #[error("you already own this weapon")]
    AlreadyOwned,
    #[error("you do not own this weapon")]
    NotOwned,
    #[error("this weapon is not for sale")]
    NotForSale,
}

/// What a won battle changed.
#[derive(Debug, Clone, PartialEq)]
pub struct VictoryGains {
    pub levels: u32,
    pub new_level: i32,
    /// Id of the weapon added to the inventory.
    pub weapon: Option<String>,
}

/// The player between battles.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub progress: Progress,
    pub money: i64,
    pub inventory: Vec<String>,
    pub equipped: String,
    pub settings: Settings,
}

impl Player {
    pub fn from_save(save: SaveData) -> Self {
        let mut progress = Progress {
            level: save.level,
            xp: save.xp.current,
            xp_goal: save.xp.max,
            health: save.health,
        };
        if progress.normalize() {
            log::warn!(
                "save progress repaired: level {}, xp {}/{}, health {}",
                progress.level,
                progress.xp,
                progress.xp_goal,
                progress.health
            );
        }
        Self {
            progress,
            money: save.money,
            inventory: save.inventory,
            equipped: save.equipped,
            settings: save.settings,
        }
    }

    pub fn to_save(&self) -> SaveData {
        SaveData {
            health: self.progress.health,
            money: self.money,
            level: self.progress.level,
            xp: Xp {
                current: self.progress.xp,
                max: self.progress.xp_goal,
            },
            inventory: self.inventory.clone(),
            equipped: self.equipped.clone(),
            settings: self.settings.clone(),
        }
    }

    pub fn level(&self) -> i32 {
        self.progress.level
    }

    pub fn health(&self) -> i32 {
        self.progress.health
    }

    pub fn owns(&self, id: &str) -> bool {
        self.inventory.iter().any(|w| w == id)
    }

    /// Drop inventory ids with no weapon behind them, and move the equipped
    /// weapon to the first owned one if it is gone. Returns the removed ids.
    pub fn prune_inventory(&mut self, data: &GameData) -> Vec<String> {
        let (kept, removed): (Vec<String>, Vec<String>) = std::mem::take(&mut self.inventory)
            .into_iter()
            .partition(|id| data.weapon(id).is_some());
        self.inventory = kept;
        for id in &removed {
            log::warn!("removed unknown weapon {id:?} from the inventory");
        }
        if !self.owns(&self.equipped) {
            let fallback = self.inventory.first().cloned().unwrap_or_default();
            log::warn!(
                "equipped weapon {:?} is not owned, equipping {:?}",
                self.equipped,
                fallback
            );
            self.equipped = fallback;
        }
        removed
    }

    pub fn check_buy(&self, weapon: &WeaponRecord) -> Result<(), PlayerError> {
        if !weapon.in_shop {
            return Err(PlayerError::NotForSale);
        }
        if self.owns(&weapon.id) {
            return Err(PlayerError::AlreadyOwned);
        }
        if self.level() < weapon.level_requirement {
            return Err(PlayerError::LevelTooLow {
                required: weapon.level_requirement,
                level: self.level(),
            });
        }
        if self.money < weapon.price {
            return Err(PlayerError::InsufficientFunds {
                price: weapon.price,
                balance: self.money,
            });
        }
        Ok(())
    }

    pub fn buy(&mut self, weapon: &WeaponRecord) -> Result<(), PlayerError> {
        self.check_buy(weapon)?;
        self.money -= weapon.price;
        self.inventory.push(weapon.id.clone());
        log::info!("bought {} for ${}", weapon.id, weapon.price);
        Ok(())
    }

    pub fn equip(&mut self, weapon: &WeaponRecord) -> Result<(), PlayerError> {
        if !self.owns(&weapon.id) {
            return Err(PlayerError::NotOwned);
        }
        if self.level() < weapon.level_requirement {
            return Err(PlayerError::LevelTooLow {
                required: weapon.level_requirement,
                level: self.level(),
            });
        }
        self.equipped = weapon.id.clone();
        log::info!("equipped {}", weapon.id);
        Ok(())
    }

    /// Pay out a won battle.
    pub fn claim_victory(&mut self, roll: &RewardRoll) -> VictoryGains {
        self.money += roll.money;
        let levels = self.progress.gain(roll.xp);
        let weapon = roll
            .weapon
            .as_ref()
            .filter(|drop| !self.owns(&drop.id))
            .map(|drop| drop.id.clone());
        if let Some(id) = &weapon {
            self.inventory.push(id.clone());
        }
        log::info!(
            "victory: +{} xp, +${}, {} level(s), weapon {:?}",
            roll.xp,
            roll.money,
            levels,
            weapon
        );
        VictoryGains {
            levels,
            new_level: self.level(),
            weapon,
        }
    }
}
