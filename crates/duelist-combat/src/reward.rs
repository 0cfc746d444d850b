use rand::Rng;

use crate::record::{Rewards, WeaponDrop};
use crate::rng::{chance, roll_amount};

/// What a won battle pays out.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardRoll {
    pub xp: i64,
    pub money: i64,
    /// At most one weapon: the last drop in table order that succeeded and
    /// is not already owned.
    pub weapon: Option<WeaponDrop>,
}

impl RewardRoll {
    /// Roll xp and money uniformly within bounds, and every drop
    /// independently.
    pub fn roll(rewards: &Rewards, owned: &[String], rng: &mut impl Rng) -> Self {
        let xp = roll_amount(rng, rewards.min_xp, rewards.max_xp);
        let money = roll_amount(rng, rewards.min_money, rewards.max_money);
        let mut weapon = None;
        for drop in &rewards.weapons {
            if chance(rng, drop.chance) && !owned.contains(&drop.id) {
                weapon = Some(drop.clone());
            }
        }
        Self { xp, money, weapon }
    }
}
