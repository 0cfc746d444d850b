//! The duelist combat engine.
//!
//! Leaves first: probability primitives ([`rng`]), data records and their
//! validation ([`record`]), the attack resolver ([`resolver`]), the cooldown
//! tracker ([`cooldown`]), the turn timer and its countdown subscription
//! ([`timer`]), message templating ([`template`], [`narration`]), and on top
//! of those the battle state machine ([`battle`]) with its reward roll
//! ([`reward`]) and level progression ([`leveling`]).

pub mod battle;
pub mod cooldown;
pub mod error;
pub mod leveling;
pub mod narration;
pub mod record;
pub mod resolver;
pub mod reward;
pub mod rng;
pub mod template;
pub mod timer;

pub use battle::{AbilityOption, Action, Battle, BattleSetup, BattleState, Combatant, Ending, TurnReport};
pub use cooldown::Cooldowns;
pub use error::CombatError;
pub use leveling::Progress;
pub use record::{Attack, AttackRecord, EnemyAttack, EnemyRecord, MessagePools, Rewards, TitleStyle, WeaponDrop, WeaponRecord};
pub use resolver::{Outcome, Streak, Strike};
pub use reward::RewardRoll;
pub use timer::{Countdown, TurnTimer};
