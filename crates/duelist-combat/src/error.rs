use thiserror::Error;

use crate::battle::BattleState;

/// Errors raised while building or driving a battle.
#[derive(Debug, Error)]
pub enum CombatError {
    /// An ability or enemy attack lacks a key the fight needs.
    #[error("{owner}: missing required key `{field}`")]
    MissingField { owner: String, field: &'static str },

    /// A weapon ability references an attack id that was not loaded.
    #[error("{owner}: ability `{id}` has no corresponding attack")]
    UnknownAttack { owner: String, id: String },

    /// Damage bounds are negative or reversed.
    #[error("{owner}: invalid damage range {min}..={max}")]
    InvalidDamage { owner: String, min: i32, max: i32 },

    /// The enemy has no attack with a positive `attackChance`.
    #[error("{enemy} has no usable attacks")]
    NoEnemyAttacks { enemy: String },

    /// The player or enemy health is not positive at the start.
    #[error("{who} starts the battle with no health")]
    NoHealth { who: String },

    /// A resolution step was requested in the wrong battle state.
    #[error("action not allowed while {0:?}")]
    OutOfTurn(BattleState),
}
