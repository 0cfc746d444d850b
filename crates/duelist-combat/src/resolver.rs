//! Attack resolution with streak correction.
//!
//! Each side carries a [`Streak`]. When the same attack is used twice in a
//! row, a miss raises the next hit chance by 5 and a normal hit raises the
//! next crit chance by 1, both capped at 100. Using a different attack
//! starts again from the attack's own chances.

use rand::Rng;

use crate::record::Attack;
use crate::rng::{chance, roll_damage, roll_percent};

/// Hit chance bonus after a miss on the same attack.
pub const MISS_CORRECTION: f64 = 5.0;
/// Crit chance bonus after a normal hit on the same attack.
pub const NORMAL_CORRECTION: f64 = 1.0;

/// The outcome of one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Miss,
    Normal,
    Crit,
}

/// One side's memory of its previous attack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Streak {
    pub last_id: Option<String>,
    pub last_outcome: Option<Outcome>,
    pub hit_chance: Option<f64>,
    pub crit_chance: Option<f64>,
}

impl Streak {
    /// The hit and crit chances `attack` would be rolled with next.
    pub fn chances_for(&self, attack: &Attack) -> (f64, f64) {
        if self.last_id.as_deref() != Some(attack.id.as_str()) {
            return (attack.hit_chance, attack.crit_chance);
        }
        let mut hit = self.hit_chance.unwrap_or(attack.hit_chance);
        let mut crit = self.crit_chance.unwrap_or(attack.crit_chance);
        match self.last_outcome {
            Some(Outcome::Miss) => hit = (hit + MISS_CORRECTION).min(100.0),
            Some(Outcome::Normal) => crit = (crit + NORMAL_CORRECTION).min(100.0),
            _ => {}
        }
        (hit, crit)
    }
}

/// The result of [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub outcome: Outcome,
    /// Damage to apply. Zero for a miss.
    pub damage: i32,
    /// The chances the roll was made with.
    pub hit_chance: f64,
    pub crit_chance: f64,
}

impl Strike {
    pub fn landed(&self) -> bool {
        self.outcome != Outcome::Miss
    }
}

/// Resolve `attack` for the side owning `streak`.
pub fn resolve(attack: &Attack, streak: &mut Streak, rng: &mut impl Rng) -> Strike {
    let (hit_chance, crit_chance) = streak.chances_for(attack);
    let damage = roll_damage(rng, attack.min_damage, attack.max_damage);

    let (outcome, damage, stored) = if hit_chance < 100.0 && roll_percent(rng) >= hit_chance {
        (Outcome::Miss, 0, (hit_chance, attack.crit_chance))
    } else if chance(rng, crit_chance) {
        let boosted = (damage as f64 * (1.0 + attack.crit_multi)).round() as i32;
        (
            Outcome::Crit,
            boosted.max(attack.max_damage.saturating_add(1)),
            (attack.hit_chance, attack.crit_chance),
        )
    } else {
        (Outcome::Normal, damage, (attack.hit_chance, crit_chance))
    };

    streak.last_id = Some(attack.id.clone());
    streak.last_outcome = Some(outcome);
    streak.hit_chance = Some(stored.0);
    streak.crit_chance = Some(stored.1);

    Strike {
        outcome,
        damage,
        hit_chance,
        crit_chance,
    }
}
