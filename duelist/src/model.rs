//! The application model: the screen stack of menus and the battle.

use anyhow::{Context, Result};

use duelist_combat::record::resolve_abilities;
use duelist_core::{Effect, Frame, Line, Model, Msg, Style, delay};
use duelist_ui::{Menu, MenuAction, MenuEntry, StyledText};

use crate::colors;
use crate::config::Config;
use crate::crash;
use crate::fight::{FightFlow, FightScreen};
use crate::session::Session;

enum Screen {
    Main(Menu),
    ExitConfirm(Menu),
    Play(Menu),
    ConfirmFight { enemy: usize, menu: Menu },
    Fight(Box<FightScreen>),
    Shop { ids: Vec<String>, menu: Menu },
    ShopView { id: String, menu: Menu },
    Buy { id: String, menu: Menu },
    Inventory { ids: Vec<String>, menu: Menu },
    Settings(Menu),
    /// The apology after a crash; gives way to the main menu on the tick
    /// with this tag or on any key.
    Crashed { tag: u64 },
}

impl Screen {
    fn menu_mut(&mut self) -> Option<&mut Menu> {
        match self {
            Screen::Main(menu)
            | Screen::ExitConfirm(menu)
            | Screen::Play(menu)
            | Screen::ConfirmFight { menu, .. }
            | Screen::Shop { menu, .. }
            | Screen::ShopView { menu, .. }
            | Screen::Buy { menu, .. }
            | Screen::Inventory { menu, .. }
            | Screen::Settings(menu) => Some(menu),
            Screen::Fight(_) | Screen::Crashed { .. } => None,
        }
    }
}

const MAIN_ENTRIES: [&str; 5] = ["Play", "Shop", "Inventory", "Settings", "Exit"];
const SETTINGS_COUNT: usize = 3;

pub struct DuelistModel {
    session: Session,
    screen: Screen,
    /// One-line feedback under the current menu.
    notice: Option<StyledText>,
}

impl DuelistModel {
    pub fn new(config: Config) -> Self {
        Self::from_session(Session::open(config))
    }

    pub fn from_session(session: Session) -> Self {
        let mut model = Self {
            session,
            screen: Screen::Crashed { tag: 0 },
            notice: None,
        };
        model.screen = model.main_screen(0);
        model
    }

    pub fn in_battle(&self) -> bool {
        matches!(self.screen, Screen::Fight(_))
    }

    // -------------------------------------------------------------------
    // Screen builders
    // -------------------------------------------------------------------

    fn menu(&self, entries: Vec<MenuEntry>, active: usize) -> Menu {
        let mut menu = Menu::new(entries, self.session.keys());
        menu.set_active(active);
        menu
    }

    fn yes_no(&self) -> Menu {
        self.menu(vec![MenuEntry::new("No"), MenuEntry::new("Yes")], 0)
    }

    fn main_screen(&self, active: usize) -> Screen {
        let entries = MAIN_ENTRIES.iter().map(|e| MenuEntry::new(*e)).collect();
        Screen::Main(self.menu(entries, active))
    }

    fn play_screen(&self, active: usize) -> Screen {
        let entries = self
            .session
            .data
            .enemies
            .iter()
            .map(|e| {
                MenuEntry::new(
                    e.styled_name()
                        .push(&format!("  Lv {}", e.level), Style::fg(colors::MUTED)),
                )
            })
            .collect();
        Screen::Play(self.menu(entries, active))
    }

    fn shop_screen(&self, active: usize) -> Screen {
        let player = &self.session.player;
        let weapons: Vec<_> = self.session.data.shop_weapons().collect();
        let entries = weapons
            .iter()
            .map(|w| {
                let mut text = w
                    .styled_name()
                    .push("  ", Style::default())
                    .push(&format!("${}", w.price), Style::fg(money_color(player.money, w.price)))
                    .push("  ", Style::default())
                    .push(
                        &format!("Lv {}", w.level_requirement),
                        Style::fg(level_color(player.level(), w.level_requirement)),
                    );
                if player.owns(&w.id) {
                    text = text.push("  (owned)", Style::fg(colors::MUTED));
                }
                MenuEntry::new(text)
            })
            .collect();
        let ids = weapons.iter().map(|w| w.id.clone()).collect();
        Screen::Shop {
            ids,
            menu: self.menu(entries, active),
        }
    }

    fn shop_view_screen(&self, id: String) -> Screen {
        let can_buy = self
            .session
            .data
            .weapon(&id)
            .is_some_and(|w| self.session.player.check_buy(w).is_ok());
        let entries = vec![MenuEntry::new("Buy").disabled(!can_buy), MenuEntry::new("Back")];
        let active = if can_buy { 0 } else { 1 };
        Screen::ShopView {
            id,
            menu: self.menu(entries, active),
        }
    }

    fn inventory_screen(&self, active: usize) -> Screen {
        let player = &self.session.player;
        let mut ids = Vec::new();
        let mut entries = Vec::new();
        for id in &player.inventory {
            let Some(w) = self.session.data.weapon(id) else {
                continue;
            };
            let mut text = w.styled_name().push(
                &format!("  Lv {}", w.level_requirement),
                Style::fg(level_color(player.level(), w.level_requirement)),
            );
            if player.equipped == w.id {
                text = text.push("  [equipped]", Style::fg(colors::OK));
            }
            ids.push(w.id.clone());
            entries.push(MenuEntry::new(text));
        }
        Screen::Inventory {
            ids,
            menu: self.menu(entries, active),
        }
    }

    fn settings_screen(&self, active: usize) -> Screen {
        let s = &self.session.player.settings;
        let entries = [
            ("Display controls", s.display_controls),
            ("Use arrow keys", s.use_arrow_keys),
            ("Faster battle logs", s.faster_battle_logs),
        ]
        .iter()
        .map(|(name, on)| {
            let (word, color) = if *on {
                ("On", colors::OK)
            } else {
                ("Off", colors::BAD)
            };
            MenuEntry::new(StyledText::textf(format!("{name}: ")).push(word, Style::fg(color)))
        })
        .collect();
        Screen::Settings(self.menu(entries, active))
    }

    // -------------------------------------------------------------------
    // Update
    // -------------------------------------------------------------------

    fn handle(&mut self, msg: Msg) -> Result<Option<Effect>> {
        if let Screen::Fight(fight) = &mut self.screen {
            return match fight.update(msg, &mut self.session)? {
                FightFlow::Stay(effect) => Ok(effect),
                FightFlow::Leave => {
                    let enemy = self
                        .session
                        .data
                        .enemies
                        .iter()
                        .position(|e| e.id == fight.enemy_id())
                        .unwrap_or(0);
                    self.screen = self.play_screen(enemy);
                    Ok(None)
                }
            };
        }
        if let Screen::Crashed { tag } = self.screen {
            let done = msg.pressed().is_some() || matches!(msg, Msg::Tick { tag: t, .. } if t == tag);
            if done {
                self.screen = self.main_screen(0);
            }
            return Ok(None);
        }

        let Some(menu) = self.screen.menu_mut() else {
            return Ok(None);
        };
        let action = menu.update(&msg);
        let active = menu.active();
        match action {
            MenuAction::Invoke => {
                self.notice = None;
                self.invoke(active)
            }
            MenuAction::Quit => {
                self.notice = None;
                self.back();
                Ok(None)
            }
            MenuAction::Move => {
                self.notice = None;
                Ok(None)
            }
            MenuAction::Pass => Ok(None),
        }
    }

    fn invoke(&mut self, active: usize) -> Result<Option<Effect>> {
        match &self.screen {
            Screen::Main(_) => {
                self.screen = match active {
                    0 => self.play_screen(0),
                    1 => self.shop_screen(0),
                    2 => self.inventory_screen(0),
                    3 => self.settings_screen(0),
                    _ => Screen::ExitConfirm(self.yes_no()),
                };
            }
            Screen::ExitConfirm(_) => {
                if active == 1 {
                    log::info!("exiting from the main menu");
                    return Ok(Some(Effect::End));
                }
                self.screen = self.main_screen(MAIN_ENTRIES.len() - 1);
            }
            Screen::Play(_) => {
                if active < self.session.data.enemies.len() {
                    self.screen = Screen::ConfirmFight {
                        enemy: active,
                        menu: self.yes_no(),
                    };
                }
            }
            Screen::ConfirmFight { enemy, .. } => {
                let enemy = *enemy;
                if active != 1 {
                    self.screen = self.play_screen(enemy);
                    return Ok(None);
                }
                return self.start_fight(enemy);
            }
            Screen::Shop { ids, .. } => {
                if let Some(id) = ids.get(active).cloned() {
                    self.screen = self.shop_view_screen(id);
                }
            }
            Screen::ShopView { id, .. } => {
                let id = id.clone();
                if active == 0 {
                    self.screen = Screen::Buy {
                        id,
                        menu: self.yes_no(),
                    };
                } else {
                    self.screen = self.shop_screen(self.shop_index(&id));
                }
            }
            Screen::Buy { id, .. } => {
                let id = id.clone();
                if active == 1 {
                    self.buy(&id)?;
                }
                self.screen = self.shop_view_screen(id);
            }
            Screen::Inventory { ids, .. } => {
                if let Some(id) = ids.get(active).cloned() {
                    self.equip(&id)?;
                    self.screen = self.inventory_screen(active);
                }
            }
            Screen::Settings(_) => {
                if active < SETTINGS_COUNT {
                    self.toggle_setting(active)?;
                    self.screen = self.settings_screen(active);
                }
            }
            Screen::Fight(_) | Screen::Crashed { .. } => {}
        }
        Ok(None)
    }

    fn back(&mut self) {
        self.screen = match &self.screen {
            Screen::Main(_) => Screen::ExitConfirm(self.yes_no()),
            Screen::ExitConfirm(_) => self.main_screen(MAIN_ENTRIES.len() - 1),
            Screen::Play(_) => self.main_screen(0),
            Screen::ConfirmFight { enemy, .. } => self.play_screen(*enemy),
            Screen::Shop { .. } => self.main_screen(1),
            Screen::ShopView { id, .. } => self.shop_screen(self.shop_index(id)),
            Screen::Buy { id, .. } => self.shop_view_screen(id.clone()),
            Screen::Inventory { .. } => self.main_screen(2),
            Screen::Settings(_) => self.main_screen(3),
            Screen::Fight(_) | Screen::Crashed { .. } => return,
        };
    }

    fn shop_index(&self, id: &str) -> usize {
        self.session
            .data
            .shop_weapons()
            .position(|w| w.id == id)
            .unwrap_or(0)
    }

    /// A battle that cannot be built goes to the crash handler like any
    /// other battle error.
    fn start_fight(&mut self, enemy: usize) -> Result<Option<Effect>> {
        let (fight, effect) = FightScreen::start(&mut self.session, enemy)
            .context("this battle cannot start")?;
        self.screen = Screen::Fight(Box::new(fight));
        Ok(Some(effect))
    }

    fn buy(&mut self, id: &str) -> Result<()> {
        let Some(weapon) = self.session.data.weapon(id).cloned() else {
            return Ok(());
        };
        match self.session.player.buy(&weapon) {
            Ok(()) => {
                self.session.save().context("saving a purchase")?;
                self.notice = Some(
                    StyledText::new("You bought ", Style::fg(colors::NOTICE))
                        .append(weapon.styled_name())
                        .push("!", Style::fg(colors::NOTICE)),
                );
            }
            Err(e) => {
                self.notice = Some(StyledText::new(&capitalize(&e.to_string()), Style::fg(colors::BAD)));
            }
        }
        Ok(())
    }

    fn equip(&mut self, id: &str) -> Result<()> {
        let Some(weapon) = self.session.data.weapon(id).cloned() else {
            return Ok(());
        };
        match self.session.player.equip(&weapon) {
            Ok(()) => {
                self.session.save().context("saving the equipped weapon")?;
                self.notice = Some(
                    StyledText::new("Equipped ", Style::fg(colors::NOTICE))
                        .append(weapon.styled_name()),
                );
            }
            Err(e) => {
                self.notice = Some(StyledText::new(&capitalize(&e.to_string()), Style::fg(colors::BAD)));
            }
        }
        Ok(())
    }

    fn toggle_setting(&mut self, index: usize) -> Result<()> {
        let s = &mut self.session.player.settings;
        match index {
            0 => s.display_controls = !s.display_controls,
            1 => s.use_arrow_keys = !s.use_arrow_keys,
            _ => s.faster_battle_logs = !s.faster_battle_logs,
        }
        self.session.save().context("saving settings")
    }

    /// Record the error, drop every screen and battle, reload from disk and
    /// show the apology.
    fn crash(&mut self, err: anyhow::Error) -> Option<Effect> {
        crash::report(&self.session.config.log_dir, &err);
        self.screen = Screen::Crashed { tag: 0 };
        self.notice = None;
        self.session.reload();
        let tag = self.session.next_tag();
        self.screen = Screen::Crashed { tag };
        Some(delay(tag, crash::NOTICE_TIME))
    }

    // -------------------------------------------------------------------
    // Drawing
    // -------------------------------------------------------------------

    fn draw_title(&self, frame: &mut Frame, title: &str) {
        frame.push(Line::from(&StyledText::new(title, colors::TITLE_STYLE)));
        frame.blank();
    }

    fn draw_status(&self, frame: &mut Frame) {
        let p = &self.session.player;
        let text = StyledText::text("Level ")
            .push(&p.level().to_string(), Style::fg(colors::XP))
            .push("   XP ", Style::default())
            .push(
                &format!("{}/{}", p.progress.xp, p.progress.xp_goal),
                Style::fg(colors::XP),
            )
            .push("   Balance ", Style::default())
            .push(&format!("${}", p.money), Style::fg(colors::MONEY))
            .push("   Health ", Style::default())
            .push(&p.health().to_string(), Style::fg(colors::OK));
        frame.push(Line::from(&text));
        frame.blank();
    }

    fn draw_menu(&self, frame: &mut Frame, menu: &Menu) {
        if menu.entries().is_empty() {
            frame.push(Line::from(&StyledText::new("Nothing here.", Style::fg(colors::MUTED))));
        }
        for line in menu.lines() {
            frame.push(line);
        }
        if let Some(notice) = &self.notice {
            frame.blank();
            frame.push(Line::from(notice));
        }
        if self.session.show_controls() {
            let nav = if self.session.player.settings.use_arrow_keys {
                "UP/DOWN"
            } else {
                "W/S"
            };
            frame.blank();
            frame.push(Line::from(&StyledText::new(
                &format!("{nav} to move, ENTER to select, ESC to go back"),
                colors::HINT_STYLE,
            )));
        }
    }

    fn draw_weapon(&self, frame: &mut Frame, id: &str) {
        let Some(w) = self.session.data.weapon(id) else {
            return;
        };
        let p = &self.session.player;
        frame.push(Line::from(&w.styled_name()));
        let width = frame.width.max(20) as usize;
        if !w.description.is_empty() {
            for line in StyledText::new(&w.description, Style::fg(colors::MUTED)).wrap(width) {
                frame.push(line);
            }
        }
        frame.blank();
        frame.push(Line::from(
            &StyledText::text("Price: ").push(&format!("${}", w.price), Style::fg(money_color(p.money, w.price))),
        ));
        frame.push(Line::from(&StyledText::text("Level requirement: ").push(
            &w.level_requirement.to_string(),
            Style::fg(level_color(p.level(), w.level_requirement)),
        )));
        frame.push(Line::from(&StyledText::text("Abilities:")));
        match resolve_abilities(w, &self.session.data.attacks) {
            Ok(abilities) => {
                for a in abilities {
                    let mut text = StyledText::text("  ")
                        .append(a.styled_name())
                        .push(
                            &format!("  {}-{} damage", a.min_damage, a.max_damage),
                            Style::fg(colors::MUTED),
                        );
                    if a.cooldown > 0 {
                        text = text.push(
                            &format!(", {} turn cooldown", a.cooldown),
                            Style::fg(colors::MUTED),
                        );
                    }
                    frame.push(Line::from(&text));
                }
            }
            Err(e) => frame.push(Line::from(&StyledText::new(
                &format!("  unusable: {e}"),
                Style::fg(colors::BAD),
            ))),
        }
        frame.blank();
    }
}

impl Model for DuelistModel {
    fn update(&mut self, msg: Msg) -> Option<Effect> {
        match msg {
            Msg::Quit => return Some(Effect::End),
            Msg::Init | Msg::Screen { .. } => return None,
            _ => {}
        }
        match self.handle(msg) {
            Ok(effect) => effect,
            Err(e) => self.crash(e),
        }
    }

    fn draw(&self, frame: &mut Frame) {
        match &self.screen {
            Screen::Main(menu) => {
                self.draw_title(frame, "DUELIST");
                self.draw_status(frame);
                self.draw_menu(frame, menu);
            }
            Screen::ExitConfirm(menu) => {
                self.draw_title(frame, "Are you sure you want to exit?");
                self.draw_menu(frame, menu);
            }
            Screen::Play(menu) => {
                self.draw_title(frame, "Choose your opponent");
                self.draw_menu(frame, menu);
            }
            Screen::ConfirmFight { enemy, menu } => {
                if let Some(e) = self.session.data.enemies.get(*enemy) {
                    frame.push(Line::from(
                        &StyledText::new("Fight ", colors::TITLE_STYLE)
                            .append(e.styled_name())
                            .push("?", colors::TITLE_STYLE),
                    ));
                    frame.blank();
                    frame.push(Line::from(&StyledText::textf(format!(
                        "Enemy: {} health, level {}",
                        e.health, e.level
                    ))));
                    let p = &self.session.player;
                    frame.push(Line::from(&StyledText::textf(format!(
                        "You:   {} health, level {}",
                        p.health(),
                        p.level()
                    ))));
                    frame.blank();
                }
                self.draw_menu(frame, menu);
            }
            Screen::Fight(fight) => fight.draw(frame),
            Screen::Shop { menu, .. } => {
                self.draw_title(frame, "Shop");
                self.draw_status(frame);
                self.draw_menu(frame, menu);
            }
            Screen::ShopView { id, menu } => {
                self.draw_title(frame, "Shop");
                self.draw_weapon(frame, id);
                self.draw_menu(frame, menu);
            }
            Screen::Buy { id, menu } => {
                if let Some(w) = self.session.data.weapon(id) {
                    frame.push(Line::from(
                        &StyledText::new("Buy ", colors::TITLE_STYLE)
                            .append(w.styled_name())
                            .push(&format!(" for ${}?", w.price), colors::TITLE_STYLE),
                    ));
                    frame.blank();
                    frame.push(Line::from(
                        &StyledText::text("Your balance: ")
                            .push(&format!("${}", self.session.player.money), Style::fg(colors::MONEY)),
                    ));
                    frame.blank();
                }
                self.draw_menu(frame, menu);
            }
            Screen::Inventory { menu, .. } => {
                self.draw_title(frame, "Inventory");
                self.draw_status(frame);
                self.draw_menu(frame, menu);
            }
            Screen::Settings(menu) => {
                self.draw_title(frame, "Settings");
                self.draw_menu(frame, menu);
            }
            Screen::Crashed { .. } => {
                frame.push(Line::from(&StyledText::new(
                    crash::APOLOGY,
                    Style::fg(colors::BAD),
                )));
                frame.blank();
                frame.push(Line::from(&StyledText::new(
                    "Returning to the main menu...",
                    Style::fg(colors::MUTED),
                )));
            }
        }
    }
}

fn money_color(balance: i64, price: i64) -> duelist_core::Color {
    if balance >= price { colors::MONEY } else { colors::BAD }
}

fn level_color(level: i32, required: i32) -> duelist_core::Color {
    if level >= required { colors::OK } else { colors::BAD }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
