//! The battle state machine.
//!
//! ```text
//! AwaitingPlayerTurn --choose / timeout--> ResolvingPlayerAttack
//! ResolvingPlayerAttack --resolve_player--> ResolvingEnemyAttack | Ended(Victory)
//! ResolvingEnemyAttack --resolve_enemy--> AwaitingPlayerTurn | Ended(Defeat)
//! AwaitingPlayerTurn / ResolvingPlayerAttack --flee--> Ended(Fled)
//! ```
//!
//! The battle owns everything a fight needs: both healths, the player's
//! abilities with their cooldowns, both streaks, the turn timer and the
//! random source. Nothing carries over from one battle to the next.

use rand::Rng;

use duelist_ui::StyledText;

use crate::cooldown::Cooldowns;
use crate::error::CombatError;
use crate::narration;
use crate::record::{
    Attack, AttackRecord, EnemyAttack, EnemyRecord, Rewards, WeaponRecord, resolve_abilities,
    resolve_enemy_attacks,
};
use crate::resolver::{Streak, Strike, resolve};
use crate::reward::RewardRoll;
use crate::rng::pick_weighted;
use crate::timer::TurnTimer;

/// One side of the fight.
#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub name: StyledText,
    pub health: i32,
    pub max_health: i32,
}

impl Combatant {
    fn new(name: StyledText, health: i32) -> Self {
        Self {
            name,
            health,
            max_health: health,
        }
    }

    fn take(&mut self, damage: i32) {
        self.health = (self.health - damage.max(0)).clamp(0, self.max_health);
    }

    pub fn is_down(&self) -> bool {
        self.health <= 0
    }
}

/// Everything needed to start a battle.
#[derive(Debug, Clone)]
pub struct BattleSetup {
    pub player_health: i32,
    pub weapon: WeaponRecord,
    /// Shared attack definitions the weapon's abilities refer to.
    pub attacks: Vec<AttackRecord>,
    pub enemy: EnemyRecord,
    pub turn_seconds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ending {
    Victory,
    Defeat,
    Fled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattleState {
    AwaitingPlayerTurn,
    ResolvingPlayerAttack,
    ResolvingEnemyAttack,
    Ended(Ending),
}

/// What the player does this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Use the ability in this slot.
    Ability(usize),
    /// The turn ran out.
    Idle,
}

/// The result of one resolution step.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    /// `None` for an idle turn.
    pub strike: Option<Strike>,
    /// Narration, in the order it should be shown.
    pub lines: Vec<StyledText>,
}

/// An ability as offered on the player's menu.
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityOption {
    pub slot: usize,
    /// Shortcut key: 1-9, then 0 for the tenth.
    pub key: char,
    pub name: StyledText,
    pub turns_left: i32,
}

impl AbilityOption {
    pub fn ready(&self) -> bool {
        self.turns_left == 0
    }
}

/// Shortcut key of an ability slot.
pub fn slot_key(slot: usize) -> char {
    match slot {
        0..=8 => char::from(b'1' + slot as u8),
        _ => '0',
    }
}

/// A single fight between the player and one enemy.
#[derive(Debug)]
pub struct Battle<R: Rng> {
    rng: R,
    state: BattleState,
    player: Combatant,
    enemy: Combatant,
    weapon_name: StyledText,
    abilities: Vec<Attack>,
    enemy_attacks: Vec<EnemyAttack>,
    rewards: Rewards,
    cooldowns: Cooldowns,
    player_streak: Streak,
    enemy_streak: Streak,
    chosen: Option<Action>,
    timer: TurnTimer,
    turn: u32,
}

impl<R: Rng> Battle<R> {
    /// Validate `setup` and start the first player turn.
    pub fn new(setup: BattleSetup, rng: R) -> Result<Self, CombatError> {
        let abilities = resolve_abilities(&setup.weapon, &setup.attacks)?;
        let enemy_attacks = resolve_enemy_attacks(&setup.enemy)?;
        if setup.player_health <= 0 {
            return Err(CombatError::NoHealth {
                who: "player".to_string(),
            });
        }
        if setup.enemy.health <= 0 {
            return Err(CombatError::NoHealth {
                who: setup.enemy.name.clone(),
            });
        }
        log::info!(
            "battle vs {} ({} hp) with {} ({} abilities)",
            setup.enemy.id,
            setup.enemy.health,
            setup.weapon.id,
            abilities.len()
        );
        Ok(Self {
            rng,
            state: BattleState::AwaitingPlayerTurn,
            player: Combatant::new(StyledText::text("You"), setup.player_health),
            enemy: Combatant::new(setup.enemy.styled_name(), setup.enemy.health),
            weapon_name: setup.weapon.styled_name(),
            abilities,
            enemy_attacks,
            rewards: setup.enemy.rewards.clone(),
            cooldowns: Cooldowns::new(),
            player_streak: Streak::default(),
            enemy_streak: Streak::default(),
            chosen: None,
            timer: TurnTimer::new(setup.turn_seconds),
            turn: 1,
        })
    }

    // -- Accessors --

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn ending(&self) -> Option<Ending> {
        match self.state {
            BattleState::Ended(e) => Some(e),
            _ => None,
        }
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn enemy(&self) -> &Combatant {
        &self.enemy
    }

    pub fn weapon_name(&self) -> &StyledText {
        &self.weapon_name
    }

    pub fn abilities(&self) -> &[Attack] {
        &self.abilities
    }

    pub fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    pub fn player_streak(&self) -> &Streak {
        &self.player_streak
    }

    pub fn enemy_streak(&self) -> &Streak {
        &self.enemy_streak
    }

    pub fn chosen(&self) -> Option<Action> {
        self.chosen
    }

    pub fn timer(&self) -> &TurnTimer {
        &self.timer
    }

    /// The current turn number, starting at 1.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn rewards(&self) -> &Rewards {
        &self.rewards
    }

    // -- Player turn --

    /// The abilities as menu options, with their cooldowns.
    pub fn options(&self) -> Vec<AbilityOption> {
        self.abilities
            .iter()
            .enumerate()
            .map(|(slot, a)| AbilityOption {
                slot,
                key: slot_key(slot),
                name: a.styled_name(),
                turns_left: self.cooldowns.turns_left(&a.id),
            })
            .collect()
    }

    /// The slot a shortcut key selects, if it names an existing ability.
    pub fn slot_for_key(&self, key: char) -> Option<usize> {
        let slot = match key.to_digit(10)? {
            0 => 9,
            d => d as usize - 1,
        };
        (slot < self.abilities.len()).then_some(slot)
    }

    /// Whether the ability in `slot` can be chosen right now.
    pub fn can_use(&self, slot: usize) -> bool {
        self.state == BattleState::AwaitingPlayerTurn
            && self
                .abilities
                .get(slot)
                .is_some_and(|a| self.cooldowns.is_ready(&a.id))
    }

    /// Choose the ability in `slot`. Does nothing and returns `false` when it
    /// is out of range, on cooldown, or it is not the player's turn.
    pub fn choose(&mut self, slot: usize) -> bool {
        if !self.can_use(slot) {
            return false;
        }
        self.chosen = Some(Action::Ability(slot));
        self.state = BattleState::ResolvingPlayerAttack;
        true
    }

    /// One second of the turn passed. Returns `true` when this tick ran the
    /// timer out, which commits the turn to an idle action.
    pub fn tick(&mut self) -> bool {
        if self.state != BattleState::AwaitingPlayerTurn {
            return false;
        }
        if self.timer.tick() {
            log::debug!("turn {} timed out", self.turn);
            self.chosen = Some(Action::Idle);
            self.state = BattleState::ResolvingPlayerAttack;
            return true;
        }
        false
    }

    /// Run away. Allowed until the player's action has been resolved.
    pub fn flee(&mut self) -> bool {
        match self.state {
            BattleState::AwaitingPlayerTurn | BattleState::ResolvingPlayerAttack => {
                log::info!("fled on turn {}", self.turn);
                self.chosen = None;
                self.state = BattleState::Ended(Ending::Fled);
                true
            }
            _ => false,
        }
    }

    // -- Resolution --

    /// Resolve the player's chosen action.
    pub fn resolve_player(&mut self) -> Result<TurnReport, CombatError> {
        if self.state != BattleState::ResolvingPlayerAttack {
            return Err(CombatError::OutOfTurn(self.state));
        }
        let action = self.chosen.take().unwrap_or(Action::Idle);

        let report = match action {
            Action::Idle => TurnReport {
                strike: None,
                lines: vec![narration::idle(
                    &self.enemy.name,
                    &self.weapon_name,
                    &mut self.rng,
                )],
            },
            Action::Ability(slot) => {
                let attack = self
                    .abilities
                    .get(slot)
                    .ok_or(CombatError::OutOfTurn(self.state))?;
                self.cooldowns.trigger(&attack.id, attack.cooldown);
                self.cooldowns.tick();

                let strike = resolve(attack, &mut self.player_streak, &mut self.rng);
                if strike.landed() {
                    self.enemy.take(strike.damage);
                }
                log::debug!(
                    "player {} -> {:?} for {} (hit {}%, crit {}%)",
                    attack.id,
                    strike.outcome,
                    strike.damage,
                    strike.hit_chance,
                    strike.crit_chance
                );
                let start = narration::player_start(attack, &mut self.rng);
                let result =
                    narration::player_result(attack, &strike, &self.enemy.name, &mut self.rng);
                TurnReport {
                    strike: Some(strike),
                    lines: vec![start, result],
                }
            }
        };

        self.state = self.settle(BattleState::ResolvingEnemyAttack);
        Ok(report)
    }

    /// Resolve the enemy's answer.
    pub fn resolve_enemy(&mut self) -> Result<TurnReport, CombatError> {
        if self.state != BattleState::ResolvingEnemyAttack {
            return Err(CombatError::OutOfTurn(self.state));
        }
        let picked = pick_weighted(&mut self.rng, &self.enemy_attacks, |a| a.weight).ok_or_else(
            || CombatError::NoEnemyAttacks {
                enemy: self.enemy.name.content(),
            },
        )?;
        let attack = &picked.attack;

        let strike = resolve(attack, &mut self.enemy_streak, &mut self.rng);
        if strike.landed() {
            self.player.take(strike.damage);
        }
        log::debug!(
            "enemy {} -> {:?} for {}",
            attack.id,
            strike.outcome,
            strike.damage
        );
        let line = narration::enemy_result(attack, &strike, &self.enemy.name, &mut self.rng);

        self.state = self.settle(BattleState::AwaitingPlayerTurn);
        if self.state == BattleState::AwaitingPlayerTurn {
            self.turn += 1;
            self.chosen = None;
            self.timer.reset();
        }
        Ok(TurnReport {
            strike: Some(strike),
            lines: vec![line],
        })
    }

    /// Roll the rewards of a won battle.
    pub fn roll_rewards(&mut self, owned: &[String]) -> Option<RewardRoll> {
        (self.ending() == Some(Ending::Victory))
            .then(|| RewardRoll::roll(&self.rewards, owned, &mut self.rng))
    }

    /// The state after a resolution step. The player is checked first.
    fn settle(&self, next: BattleState) -> BattleState {
        let state = if self.player.is_down() {
            BattleState::Ended(Ending::Defeat)
        } else if self.enemy.is_down() {
            BattleState::Ended(Ending::Victory)
        } else {
            next
        };
        if let BattleState::Ended(e) = state {
            log::info!("battle ended on turn {}: {e:?}", self.turn);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::{slash, weapon_with};
    use crate::resolver::{Outcome, Streak};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ability(id: &str) -> AttackRecord {
        AttackRecord {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    fn attacks() -> Vec<AttackRecord> {
        let sure = AttackRecord {
            id: Some("sure".into()),
            hit_chance: Some(100.0),
            crit_chance: Some(0.0),
            ..slash()
        };
        let heavy = AttackRecord {
            id: Some("heavy".into()),
            cooldown: Some(2),
            hit_chance: Some(100.0),
            crit_chance: Some(0.0),
            ..slash()
        };
        vec![sure, heavy]
    }

    fn enemy(health: i32, hit: f64) -> EnemyRecord {
        let bite = AttackRecord {
            id: Some("bite".into()),
            name: Some("Bite".into()),
            min_damage: Some(3),
            max_damage: Some(3),
            hit_chance: Some(hit),
            crit_chance: Some(0.0),
            crit_multi: Some(1.0),
            attack_chance: Some(1.0),
            ..Default::default()
        };
        EnemyRecord {
            id: "wolf".into(),
            name: "Wolf".into(),
            health,
            level: 1,
            rewards: Rewards {
                min_xp: 10,
                max_xp: 10,
                min_money: 5,
                max_money: 5,
                weapons: Vec::new(),
            },
            attacks: vec![bite],
            ..Default::default()
        }
    }

    fn battle_with(
        abilities: Vec<AttackRecord>,
        player_health: i32,
        enemy: EnemyRecord,
    ) -> Battle<StdRng> {
        Battle::new(
            BattleSetup {
                player_health,
                weapon: weapon_with(abilities),
                attacks: attacks(),
                enemy,
                turn_seconds: 3,
            },
            StdRng::seed_from_u64(7),
        )
        .unwrap()
    }

    fn battle() -> Battle<StdRng> {
        battle_with(vec![ability("sure"), ability("heavy")], 100, enemy(200, 100.0))
    }

    #[test]
    fn setup_is_validated() {
        let err = Battle::new(
            BattleSetup {
                player_health: 100,
                weapon: weapon_with(vec![ability("missing")]),
                attacks: attacks(),
                enemy: enemy(10, 100.0),
                turn_seconds: 10,
            },
            StdRng::seed_from_u64(1),
        )
        .unwrap_err();
        assert!(matches!(err, CombatError::UnknownAttack { .. }));

        let mut no_attacks = enemy(10, 100.0);
        no_attacks.attacks.clear();
        let err = Battle::new(
            BattleSetup {
                player_health: 100,
                weapon: weapon_with(vec![ability("sure")]),
                attacks: attacks(),
                enemy: no_attacks,
                turn_seconds: 10,
            },
            StdRng::seed_from_u64(1),
        )
        .unwrap_err();
        assert!(matches!(err, CombatError::NoEnemyAttacks { .. }));
    }

    #[test]
    fn eleven_abilities_give_ten_keys() {
        let b = battle_with(
            (0..11).map(|_| ability("sure")).collect(),
            100,
            enemy(50, 100.0),
        );
        let keys: String = b.options().iter().map(|o| o.key).collect();
        assert_eq!(keys, "1234567890");
        assert_eq!(b.slot_for_key('0'), Some(9));
        assert_eq!(b.slot_for_key('1'), Some(0));

        let small = battle();
        assert_eq!(small.slot_for_key('3'), None);
        assert_eq!(small.slot_for_key('x'), None);
    }

    #[test]
    fn normal_hit_reduces_enemy_health() {
        let mut b = battle();
        assert!(b.choose(0));
        assert_eq!(b.state(), BattleState::ResolvingPlayerAttack);
        let report = b.resolve_player().unwrap();
        let strike = report.strike.unwrap();
        assert_eq!(strike.outcome, Outcome::Normal);
        assert_eq!(b.enemy().health, (200 - strike.damage).max(0));
        assert_eq!(report.lines.len(), 2);
        assert_eq!(b.state(), BattleState::ResolvingEnemyAttack);
    }

    #[test]
    fn cooldown_blocks_selection() {
        let mut b = battle();
        assert!(b.choose(1));
        b.resolve_player().unwrap();
        b.resolve_enemy().unwrap();
        assert_eq!(b.cooldowns().turns_left("heavy"), 2);
        assert!(!b.options()[1].ready());

        assert!(!b.choose(1));
        assert_eq!(b.chosen(), None);
        assert_eq!(b.state(), BattleState::AwaitingPlayerTurn);

        // Two more real turns bring it back.
        for _ in 0..2 {
            assert!(b.choose(0));
            b.resolve_player().unwrap();
            b.resolve_enemy().unwrap();
        }
        assert!(b.can_use(1));
    }

    #[test]
    fn timeout_resolves_idle() {
        let mut b = battle();
        b.choose(1);
        b.resolve_player().unwrap();
        b.resolve_enemy().unwrap();
        let before = b.cooldowns().clone();
        let enemy_health = b.enemy().health;

        assert!(!b.tick());
        assert!(!b.tick());
        assert!(b.tick());
        assert_eq!(b.chosen(), Some(Action::Idle));
        assert!(!b.tick());

        let report = b.resolve_player().unwrap();
        assert!(report.strike.is_none());
        assert_eq!(report.lines.len(), 1);
        assert_eq!(b.enemy().health, enemy_health);
        assert_eq!(b.cooldowns(), &before);
        assert_eq!(b.state(), BattleState::ResolvingEnemyAttack);
    }

    #[test]
    fn enemy_acts_once_per_turn() {
        let mut b = battle();
        assert!(matches!(
            b.resolve_enemy(),
            Err(CombatError::OutOfTurn(BattleState::AwaitingPlayerTurn))
        ));
        b.choose(0);
        b.resolve_player().unwrap();
        b.resolve_enemy().unwrap();
        assert_eq!(b.player().health, 97);
        assert!(b.resolve_enemy().is_err());
        assert_eq!(b.player().health, 97);
        assert_eq!(b.turn(), 2);
        assert_eq!(b.timer().left(), 3);
    }

    #[test]
    fn victory_skips_enemy_turn() {
        let mut b = battle_with(vec![ability("sure")], 100, enemy(1, 100.0));
        b.choose(0);
        b.resolve_player().unwrap();
        assert_eq!(b.ending(), Some(Ending::Victory));
        assert_eq!(b.enemy().health, 0);
        assert!(b.resolve_enemy().is_err());

        let roll = b.roll_rewards(&[]).unwrap();
        assert_eq!((roll.xp, roll.money), (10, 5));
    }

    #[test]
    fn defeat_on_zero_health() {
        let mut b = battle_with(vec![ability("sure")], 3, enemy(500, 100.0));
        b.choose(0);
        b.resolve_player().unwrap();
        b.resolve_enemy().unwrap();
        assert_eq!(b.player().health, 0);
        assert_eq!(b.ending(), Some(Ending::Defeat));
        assert!(b.roll_rewards(&[]).is_none());
        assert!(!b.choose(0));
    }

    #[test]
    fn flee_ends_without_enemy_turn() {
        let mut b = battle();
        assert!(b.flee());
        assert_eq!(b.ending(), Some(Ending::Fled));
        assert!(b.resolve_enemy().is_err());
        assert!(b.roll_rewards(&[]).is_none());
        assert!(!b.flee());
    }

    #[test]
    fn flee_after_timeout_is_allowed() {
        let mut b = battle();
        for _ in 0..3 {
            b.tick();
        }
        assert_eq!(b.state(), BattleState::ResolvingPlayerAttack);
        assert!(b.flee());
    }

    #[test]
    fn enemy_miss_deals_nothing() {
        let mut b = battle_with(vec![ability("sure")], 100, enemy(500, 0.0));
        b.choose(0);
        b.resolve_player().unwrap();
        let report = b.resolve_enemy().unwrap();
        assert_eq!(report.strike.unwrap().outcome, Outcome::Miss);
        assert_eq!(b.player().health, 100);
    }

    #[test]
    fn each_side_keeps_its_own_streak() {
        let wild = AttackRecord {
            id: Some("sure".into()),
            hit_chance: Some(0.0),
            ..Default::default()
        };
        let mut b = battle_with(vec![wild], 100, enemy(500, 0.0));

        b.choose(0);
        let report = b.resolve_player().unwrap();
        assert_eq!(report.strike.unwrap().outcome, Outcome::Miss);
        assert_eq!(b.player_streak().last_id.as_deref(), Some("sure"));
        assert_eq!(b.player_streak().last_outcome, Some(Outcome::Miss));
        assert_eq!(b.enemy_streak(), &Streak::default());

        let player_before = b.player_streak().clone();
        let report = b.resolve_enemy().unwrap();
        assert_eq!(report.strike.unwrap().outcome, Outcome::Miss);
        assert_eq!(b.enemy_streak().last_id.as_deref(), Some("bite"));
        assert_eq!(b.enemy_streak().last_outcome, Some(Outcome::Miss));
        assert_eq!(b.enemy_streak().hit_chance, Some(0.0));
        assert_eq!(b.player_streak(), &player_before);
    }
}
