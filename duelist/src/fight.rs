//! The battle screen.
//!
//! The screen drives a [`Battle`] from messages: a [`Countdown`] ticks the
//! turn timer while the player chooses, and a queue of narration steps is
//! played back with one-shot countdowns between lines. Ticks whose tag does
//! not belong to a live countdown are dropped.

use std::collections::VecDeque;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use duelist_combat::narration::{self, health_text, timer_color};
use duelist_combat::{Battle, BattleSetup, BattleState, Countdown, Ending};
use duelist_core::{Effect, Frame, Key, Line, Msg, Span, Style};
use duelist_ui::{Menu, MenuAction, MenuEntry, StyledText};

use crate::colors;
use crate::config::Pacing;
use crate::log::BattleLog;
use crate::session::Session;

/// What the model should do after the fight screen handled a message.
#[derive(Debug)]
pub enum FightFlow {
    Stay(Option<Effect>),
    /// The battle is over and its summary has been shown.
    Leave,
}

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Show(StyledText),
    Wait(Duration),
    EnemyTurn,
    OpenTurn,
    Finish,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Choosing,
    Narrating,
    Finished,
}

pub struct FightScreen {
    battle: Battle<SmallRng>,
    enemy_id: String,
    menu: Menu,
    flee: Option<Menu>,
    log: BattleLog,
    phase: Phase,
    /// Ticks the turn timer while the player chooses.
    countdown: Option<Countdown>,
    /// Wakes the narration queue up.
    pacer: Option<Countdown>,
    steps: VecDeque<Step>,
    pacing: Pacing,
    show_controls: bool,
}

impl FightScreen {
    /// Build the battle against the enemy at `enemy` in the data list.
    /// Fails when the enemy or the equipped weapon is unusable; nothing is
    /// started in that case.
    pub fn start(session: &mut Session, enemy: usize) -> Result<(Self, Effect)> {
        let enemy = session
            .data
            .enemies
            .get(enemy)
            .ok_or_else(|| anyhow!("no enemy at index {enemy}"))?
            .clone();
        let weapon = session
            .data
            .weapon(&session.player.equipped)
            .ok_or_else(|| anyhow!("no weapon equipped"))?
            .clone();
        let enemy_id = enemy.id.clone();
        let setup = BattleSetup {
            player_health: session.player.health(),
            weapon,
            attacks: session.data.attacks.clone(),
            enemy,
            turn_seconds: session.config.turn_seconds,
        };
        let battle = Battle::new(setup, SmallRng::from_rng(&mut rand::rng()))
            .with_context(|| format!("cannot start the battle against {enemy_id}"))?;
        log::info!("battle against {enemy_id} started");

        let mut screen = Self {
            battle,
            enemy_id,
            menu: Menu::new(Vec::new(), session.keys()),
            flee: None,
            log: BattleLog::new(),
            phase: Phase::Narrating,
            countdown: None,
            pacer: None,
            steps: VecDeque::new(),
            pacing: session.pacing(),
            show_controls: session.show_controls(),
        };
        screen.log.push(
            StyledText::text("You face the ")
                .append(screen.battle.enemy().name.clone())
                .push("!", Style::default()),
        );
        let effect = screen.open_turn(session);
        Ok((screen, effect))
    }

    pub fn enemy_id(&self) -> &str {
        &self.enemy_id
    }

    pub fn update(&mut self, msg: Msg, session: &mut Session) -> Result<FightFlow> {
        match msg {
            Msg::Tick { .. } => self.on_tick(&msg, session),
            Msg::KeyDown { .. } => self.on_key(&msg, session),
            _ => Ok(FightFlow::Stay(None)),
        }
    }

    fn on_tick(&mut self, msg: &Msg, session: &mut Session) -> Result<FightFlow> {
        if self.countdown.as_ref().is_some_and(|c| c.owns(msg)) {
            if self.battle.tick() {
                self.countdown = None;
                // With the flee dialog open, the idle turn waits for "No".
                if self.flee.is_none() {
                    return self.resolve_turn(session);
                }
            }
            return Ok(FightFlow::Stay(None));
        }
        if self.pacer.as_ref().is_some_and(|p| p.owns(msg)) {
            self.pacer = None;
            return self.advance(session);
        }
        if let Msg::Tick { tag, .. } = msg {
            log::trace!("dropping stale tick {tag}");
        }
        Ok(FightFlow::Stay(None))
    }

    fn on_key(&mut self, msg: &Msg, session: &mut Session) -> Result<FightFlow> {
        if let Some(menu) = &mut self.flee {
            let action = menu.update(msg);
            let confirmed = menu.active() == 1;
            match action {
                MenuAction::Invoke if confirmed => {
                    self.flee = None;
                    self.battle.flee();
                    self.countdown = None;
                    self.steps.clear();
                    self.steps.push_back(Step::Finish);
                    return self.advance(session);
                }
                MenuAction::Invoke | MenuAction::Quit => {
                    self.flee = None;
                    if self.battle.state() == BattleState::ResolvingPlayerAttack {
                        return self.resolve_turn(session);
                    }
                }
                _ => {}
            }
            return Ok(FightFlow::Stay(None));
        }

        if self.phase != Phase::Choosing || self.battle.state() != BattleState::AwaitingPlayerTurn
        {
            return Ok(FightFlow::Stay(None));
        }
        match self.menu.update(msg) {
            MenuAction::Invoke => {
                let slot = self.menu.active();
                if slot >= self.battle.abilities().len() {
                    self.open_flee(session);
                } else if self.battle.choose(slot) {
                    return self.resolve_turn(session);
                }
            }
            MenuAction::Quit => self.open_flee(session),
            _ => {}
        }
        Ok(FightFlow::Stay(None))
    }

    fn open_flee(&mut self, session: &Session) {
        let entries = vec![MenuEntry::new("No"), MenuEntry::new("Yes")];
        self.flee = Some(Menu::new(entries, session.keys()));
    }

    /// Start a player turn: fresh menu, fresh countdown.
    fn open_turn(&mut self, session: &mut Session) -> Effect {
        self.phase = Phase::Choosing;
        self.refresh_menu();
        self.log.new_turn();
        let (countdown, effect) = Countdown::start(session.next_tag(), self.battle.timer().length());
        self.countdown = Some(countdown);
        effect
    }

    fn refresh_menu(&mut self) {
        let mut entries: Vec<MenuEntry> = self
            .battle
            .options()
            .into_iter()
            .map(|opt| {
                let mut text = if self.show_controls {
                    StyledText::new(&format!("[{}] ", opt.key), Style::fg(colors::MUTED))
                } else {
                    StyledText::default()
                };
                text = text.append(opt.name.clone());
                if !opt.ready() {
                    let turns = if opt.turns_left == 1 { "turn" } else { "turns" };
                    text = text.push(
                        &format!(" ({} {turns} left)", opt.turns_left),
                        Style::fg(narration::ON_COOLDOWN),
                    );
                }
                MenuEntry::new(text)
                    .with_key(Key::Char(opt.key))
                    .disabled(!opt.ready())
            })
            .collect();
        let flee = if self.show_controls {
            StyledText::new("[ESC] ", Style::fg(colors::MUTED)).push("Flee", Style::default())
        } else {
            StyledText::text("Flee")
        };
        entries.push(MenuEntry::new(flee));
        self.menu.set_entries(entries);
    }

    /// Resolve the player's action and queue the narration that follows.
    fn resolve_turn(&mut self, session: &mut Session) -> Result<FightFlow> {
        self.countdown = None;
        self.phase = Phase::Narrating;
        let report = self.battle.resolve_player()?;
        let line = self.pacing.line();
        for (i, text) in report.lines.into_iter().enumerate() {
            if i > 0 {
                self.steps.push_back(Step::Wait(line));
            }
            self.steps.push_back(Step::Show(text));
        }
        self.steps.push_back(Step::Wait(line));
        match self.battle.state() {
            BattleState::ResolvingEnemyAttack => self.steps.push_back(Step::EnemyTurn),
            _ => self.steps.push_back(Step::Finish),
        }
        self.advance(session)
    }

    /// Play queued steps until one has to wait.
    fn advance(&mut self, session: &mut Session) -> Result<FightFlow> {
        while let Some(step) = self.steps.pop_front() {
            match step {
                Step::Show(text) => self.log.push(text),
                Step::Wait(after) => {
                    let (pacer, effect) = Countdown::start_with_period(session.next_tag(), 1, after);
                    self.pacer = Some(pacer);
                    return Ok(FightFlow::Stay(Some(effect)));
                }
                Step::EnemyTurn => {
                    let report = self.battle.resolve_enemy()?;
                    for text in report.lines {
                        self.log.push(text);
                    }
                    match self.battle.state() {
                        BattleState::AwaitingPlayerTurn => {
                            self.steps.push_back(Step::Wait(self.pacing.turn()));
                            self.steps.push_back(Step::OpenTurn);
                        }
                        _ => {
                            self.steps.push_back(Step::Wait(self.pacing.line()));
                            self.steps.push_back(Step::Finish);
                        }
                    }
                }
                Step::OpenTurn => return Ok(FightFlow::Stay(Some(self.open_turn(session)))),
                Step::Finish => self.finish(session)?,
                Step::Leave => {
                    log::info!("leaving the battle against {}", self.enemy_id);
                    return Ok(FightFlow::Leave);
                }
            }
        }
        Ok(FightFlow::Stay(None))
    }

    /// Queue the closing lines and pay out a victory.
    fn finish(&mut self, session: &mut Session) -> Result<()> {
        self.phase = Phase::Finished;
        self.countdown = None;
        self.log.new_turn();
        let enemy = self.battle.enemy().name.clone();
        let line = self.pacing.line();
        match self.battle.ending() {
            Some(Ending::Victory) => {
                self.steps.push_back(Step::Show(
                    StyledText::text("You defeated ")
                        .append(enemy.clone())
                        .push("! Victory is yours!", Style::default()),
                ));
                self.steps.push_back(Step::Wait(line));
                self.pay_out(session)?;
            }
            Some(Ending::Defeat) => {
                self.steps.push_back(Step::Show(
                    StyledText::text("You have been defeated. The ")
                        .append(enemy.clone())
                        .push(" stands victorious.", Style::default()),
                ));
            }
            Some(Ending::Fled) => {
                self.steps.push_back(Step::Show(
                    StyledText::text("You slip away from the ")
                        .append(enemy.clone())
                        .push(".", Style::default()),
                ));
            }
            None => {}
        }
        self.steps.push_back(Step::Wait(line));
        self.steps.push_back(Step::Show(
            StyledText::text("Leaving the battle with ")
                .append(enemy)
                .push("...", Style::default()),
        ));
        self.steps.push_back(Step::Wait(line));
        self.steps.push_back(Step::Leave);
        Ok(())
    }

    fn pay_out(&mut self, session: &mut Session) -> Result<()> {
        let Some(roll) = self.battle.roll_rewards(&session.player.inventory) else {
            return Ok(());
        };
        let gains = session.player.claim_victory(&roll);
        session.save().context("saving the rewards of a victory")?;

        self.steps.push_back(Step::Show(
            StyledText::text("You've gained ")
                .push(&roll.xp.to_string(), Style::fg(colors::MONEY))
                .push(" XP and ", Style::default())
                .push(&format!("${}", roll.money), Style::fg(colors::MONEY)),
        ));
        if let (Some(id), Some(drop)) = (&gains.weapon, &roll.weapon) {
            let name = match session.data.weapon(id) {
                Some(w) => w.title.paint(&format!("{} ({}%)", w.name, drop.chance)),
                None => StyledText::textf(format!("{id} ({}%)", drop.chance)),
            };
            self.steps
                .push_back(Step::Show(StyledText::text("You have obtained: ").append(name)));
        }
        if gains.levels > 0 {
            self.steps.push_back(Step::Show(
                StyledText::text("You leveled up to ")
                    .push(&gains.new_level.to_string(), Style::fg(colors::XP))
                    .push("!", Style::default()),
            ));
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Drawing
    // -------------------------------------------------------------------

    pub fn draw(&self, frame: &mut Frame) {
        let width = frame.width.max(20) as usize;
        let player = self.battle.player();
        let enemy = self.battle.enemy();

        let you = StyledText::new("You", colors::TITLE_STYLE);
        frame.push(spread(&you, &enemy.name, width));
        frame.push(spread(
            &health_text(player.health, player.max_health),
            &health_text(enemy.health, enemy.max_health),
            width,
        ));
        frame.blank();

        let mut status = StyledText::textf(format!("Turn {}", self.battle.turn()));
        if self.phase == Phase::Choosing {
            let left = self.battle.timer().left();
            status = status
                .push("   Time left: ", Style::default())
                .push(&format!("{left}s"), Style::fg(timer_color(left)));
        }
        frame.push(Line::from(&status));
        frame.blank();

        match (&self.flee, self.phase) {
            (Some(menu), _) => {
                frame.push(Line::from(
                    &StyledText::text("Are you sure you want to flee from the ")
                        .append(enemy.name.clone())
                        .push("?", Style::default()),
                ));
                for line in menu.lines() {
                    frame.push(line);
                }
            }
            (None, Phase::Choosing) => {
                for line in self.menu.lines() {
                    frame.push(line);
                }
            }
            (None, _) => {}
        }
        frame.blank();

        let used = frame.lines.len() as i32 + 2;
        let room = (frame.height - used).max(3) as usize;
        for line in self.log.recent_lines(width, room) {
            frame.push(line);
        }

        if self.show_controls && self.phase == Phase::Choosing {
            frame.blank();
            frame.push(Line::from(&StyledText::new(
                "Number keys pick an ability, ENTER selects, ESC flees",
                colors::HINT_STYLE,
            )));
        }
    }
}

/// `left` at the start of the line and `right` flush with its end.
fn spread(left: &StyledText, right: &StyledText, width: usize) -> Line {
    let used = left.content().chars().count() + right.content().chars().count();
    let gap = width.saturating_sub(used).max(1);
    let mut spans = left.spans().to_vec();
    spans.push(Span::new(" ".repeat(gap), Style::default()));
    spans.extend(right.spans().iter().cloned());
    Line { spans }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use std::path::Path;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// A data dir with one sure-hit weapon and a harmless enemy.
    fn session(dir: &Path, enemy_health: i32) -> Session {
        write(
            &dir.join("weapons/attacks/jab.json"),
            r#"{
                "id": "jab", "name": "Jab", "title": {}, "minDamage": 5, "maxDamage": 5,
                "hitChance": 100, "critChance": 0, "critMulti": 0, "cooldown": 1,
                "messages": {"start": ["You jab."], "miss": ["Miss."],
                             "hit": ["Hit for {damage}."], "crit": ["Crit {damage}."]}
            }"#,
        );
        write(
            &dir.join("weapons/default.json"),
            r#"{"id": "default", "name": "Fists", "abilities": [{"id": "jab"}]}"#,
        );
        write(
            &dir.join("enemies/dummy/main.json"),
            &format!(
                r#"{{"name": "Dummy", "health": {enemy_health}, "level": 0,
                    "rewards": {{"minXp": 10, "maxXp": 10, "minMoney": 5, "maxMoney": 5}}}}"#
            ),
        );
        write(
            &dir.join("enemies/dummy/attacks.json"),
            r#"{"attacks": [{"id": "nudge", "name": "Nudge", "minDamage": 0,
                "maxDamage": 0, "critChance": 0, "critMulti": 0, "attackChance": 1}]}"#,
        );
        let mut config = Config {
            data_dir: dir.to_path_buf(),
            ..Default::default()
        };
        config.pacing.normal.line_ms = 0;
        config.pacing.normal.turn_ms = 0;
        Session::open(config)
    }

    /// Deliver the tick of whatever the screen waits on.
    fn pump(screen: &mut FightScreen, session: &mut Session) -> FightFlow {
        let tag = screen
            .pacer
            .as_ref()
            .map(|p| p.tag())
            .expect("screen is waiting on narration");
        screen.update(Msg::tick(tag), session).unwrap()
    }

    #[test]
    fn one_turn_then_enemy_answers() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), 100);
        let (mut screen, _) = FightScreen::start(&mut session, 0).unwrap();
        assert_eq!(screen.phase, Phase::Choosing);

        screen.update(Msg::key(Key::Char('1')), &mut session).unwrap();
        assert_eq!(screen.phase, Phase::Narrating);
        assert_eq!(screen.battle.enemy().health, 95);

        // start line, result line, enemy line, next turn
        let mut guard = 0;
        while screen.phase != Phase::Choosing {
            pump(&mut screen, &mut session);
            guard += 1;
            assert!(guard < 10);
        }
        assert_eq!(screen.battle.turn(), 2);
        assert_eq!(screen.battle.player().health, 100);
        // jab has a one-turn cooldown
        assert_eq!(screen.battle.cooldowns().turns_left("jab"), 1);
        assert!(screen.menu.entries()[0].disabled);
        screen.update(Msg::key(Key::Char('1')), &mut session).unwrap();
        assert_eq!(screen.phase, Phase::Choosing);
    }

    #[test]
    fn stale_ticks_do_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), 100);
        let (mut screen, _) = FightScreen::start(&mut session, 0).unwrap();
        let left = screen.battle.timer().left();
        screen.update(Msg::tick(9999), &mut session).unwrap();
        assert_eq!(screen.battle.timer().left(), left);

        let tag = screen.countdown.as_ref().unwrap().tag();
        screen.update(Msg::tick(tag), &mut session).unwrap();
        assert_eq!(screen.battle.timer().left(), left - 1);
    }

    #[test]
    fn timeout_while_fleeing_waits_for_no() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), 100);
        let (mut screen, _) = FightScreen::start(&mut session, 0).unwrap();
        screen.update(Msg::key(Key::Escape), &mut session).unwrap();
        assert!(screen.flee.is_some());

        let tag = screen.countdown.as_ref().unwrap().tag();
        for _ in 0..screen.battle.timer().length() {
            screen.update(Msg::tick(tag), &mut session).unwrap();
        }
        assert_eq!(screen.battle.state(), BattleState::ResolvingPlayerAttack);
        assert_eq!(screen.phase, Phase::Choosing);

        screen.update(Msg::key(Key::Escape), &mut session).unwrap();
        assert!(screen.flee.is_none());
        assert_eq!(screen.phase, Phase::Narrating);
        assert_eq!(screen.battle.enemy().health, 100);
    }

    #[test]
    fn fleeing_leaves_without_rewards() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), 100);
        let (mut screen, _) = FightScreen::start(&mut session, 0).unwrap();
        screen.update(Msg::key(Key::Escape), &mut session).unwrap();
        screen.update(Msg::key(Key::ArrowDown), &mut session).unwrap();
        screen.update(Msg::key(Key::Enter), &mut session).unwrap();
        assert_eq!(screen.battle.ending(), Some(Ending::Fled));
        assert!(screen.countdown.is_none());

        let mut left = false;
        for _ in 0..10 {
            if let FightFlow::Leave = pump(&mut screen, &mut session) {
                left = true;
                break;
            }
        }
        assert!(left);
        assert_eq!(session.player.money, 0);
    }

    #[test]
    fn victory_pays_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), 5);
        let (mut screen, _) = FightScreen::start(&mut session, 0).unwrap();
        screen.update(Msg::key(Key::Enter), &mut session).unwrap();
        assert_eq!(screen.battle.ending(), Some(Ending::Victory));

        // the payout happens once the queue reaches the finish step
        pump(&mut screen, &mut session);
        pump(&mut screen, &mut session);
        assert_eq!(session.player.money, 5);
        assert_eq!(session.player.progress.xp, 10);
        let saved = session.store.load().unwrap();
        assert_eq!(saved.money, 5);
    }
}
