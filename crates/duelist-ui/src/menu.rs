use duelist_core::{AttrMask, Key, Line, Msg, Span, Style};

use crate::StyledText;

/// A single entry in a menu.
#[derive(Debug, Clone)]
pub struct MenuEntry {
    /// Display text.
    pub text: StyledText,
    /// Whether the entry is disabled (cannot be invoked).
    pub disabled: bool,
    /// Shortcut keys that invoke this entry.
    pub keys: Vec<Key>,
}

impl MenuEntry {
    /// Create a new enabled entry with the given text and no shortcut keys.
    pub fn new(text: impl Into<StyledText>) -> Self {
        Self {
            text: text.into(),
            disabled: false,
            keys: Vec::new(),
        }
    }

    /// Add a shortcut key (builder).
    pub fn with_key(mut self, key: Key) -> Self {
        self.keys.push(key);
        self
    }

    /// Mark the entry as disabled (builder).
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Key bindings for menu navigation.
#[derive(Debug, Clone)]
pub struct MenuKeys {
    pub up: Vec<Key>,
    pub down: Vec<Key>,
    pub invoke: Vec<Key>,
    pub quit: Vec<Key>,
}

impl MenuKeys {
    /// Arrow-key navigation.
    pub fn arrows() -> Self {
        Self {
            up: vec![Key::ArrowUp],
            down: vec![Key::ArrowDown],
            invoke: vec![Key::Enter],
            quit: vec![Key::Escape],
        }
    }

    /// W/S navigation.
    pub fn wasd() -> Self {
        Self {
            up: vec![Key::Char('w'), Key::Char('W')],
            down: vec![Key::Char('s'), Key::Char('S')],
            invoke: vec![Key::Enter],
            quit: vec![Key::Escape],
        }
    }

    /// Pick a layout from the `useArrowKeys` preference.
    pub fn for_arrows(use_arrows: bool) -> Self {
        if use_arrows {
            Self::arrows()
        } else {
            Self::wasd()
        }
    }
}

impl Default for MenuKeys {
    fn default() -> Self {
        Self::arrows()
    }
}

/// Visual style for a menu.
#[derive(Debug, Clone, Copy)]
struct MenuStyle {
    /// Style layered over the active (highlighted) entry.
    active: Style,
    /// Style layered over disabled entries.
    disabled: Style,
}

impl Default for MenuStyle {
    fn default() -> Self {
        Self {
            active: Style::attrs(AttrMask::BOLD),
            disabled: Style::attrs(AttrMask::DIM),
        }
    }
}

/// Actions returned by [`Menu::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    /// No meaningful action occurred.
    Pass,
    /// The active entry changed.
    Move,
    /// The active entry was invoked.
    Invoke,
    /// The user requested to quit/close the menu.
    Quit,
}

/// An interactive vertical menu.
#[derive(Debug, Clone)]
pub struct Menu {
    entries: Vec<MenuEntry>,
    keys: MenuKeys,
    style: MenuStyle,
    active: usize,
    action: MenuAction,
}

impl Menu {
    /// Create a new menu.
    pub fn new(entries: Vec<MenuEntry>, keys: MenuKeys) -> Self {
        Self {
            entries,
            keys,
            style: MenuStyle::default(),
            active: 0,
            action: MenuAction::Pass,
        }
    }

    /// Process an input message and return the resulting action.
    pub fn update(&mut self, msg: &Msg) -> MenuAction {
        self.action = MenuAction::Pass;
        let Some(key) = msg.pressed() else {
            return MenuAction::Pass;
        };

        if self.keys.quit.contains(&key) {
            self.action = MenuAction::Quit;
            return self.action;
        }
        if self.entries.is_empty() {
            return MenuAction::Pass;
        }

        if self.keys.up.contains(&key) {
            self.move_active(-1);
            self.action = MenuAction::Move;
        } else if self.keys.down.contains(&key) {
            self.move_active(1);
            self.action = MenuAction::Move;
        } else if self.keys.invoke.contains(&key) {
            if !self.current_disabled() {
                self.action = MenuAction::Invoke;
            }
        } else if let Some(i) = self.entries.iter().position(|e| e.keys.contains(&key)) {
            // A shortcut on a disabled entry is swallowed.
            if !self.entries[i].disabled {
                self.active = i;
                self.action = MenuAction::Invoke;
            }
        }

        self.action
    }

    /// Render the entries as lines, marking the active one.
    pub fn lines(&self) -> Vec<Line> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let is_active = i == self.active;
                let mut over = Style::default();
                if is_active {
                    over = over.patch(self.style.active);
                }
                if entry.disabled {
                    over = over.patch(self.style.disabled);
                }
                let prefix = if is_active { "> " } else { "  " };
                let mut line = Line {
                    spans: vec![Span::new(prefix, over)],
                };
                for span in entry.text.spans() {
                    line.spans
                        .push(Span::new(span.text.clone(), span.style.patch(over)));
                }
                line
            })
            .collect()
    }

    /// Return the entries.
    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Replace the entries, keeping the active index in range.
    pub fn set_entries(&mut self, entries: Vec<MenuEntry>) {
        self.entries = entries;
        if self.active >= self.entries.len() {
            self.active = self.entries.len().saturating_sub(1);
        }
    }

    /// Replace the key bindings.
    pub fn set_keys(&mut self, keys: MenuKeys) {
        self.keys = keys;
    }

    /// Return the currently active (highlighted) entry index.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Set the active entry index.
    pub fn set_active(&mut self, i: usize) {
        if i < self.entries.len() {
            self.active = i;
        }
    }

    /// Return the last action.
    pub fn action(&self) -> MenuAction {
        self.action
    }

    // -- private helpers --

    fn move_active(&mut self, delta: i32) {
        let len = self.entries.len() as i32;
        if len == 0 {
            return;
        }
        let mut idx = self.active as i32 + delta;
        if idx < 0 {
            idx = len - 1;
        } else if idx >= len {
            idx = 0;
        }
        self.active = idx as usize;
    }

    fn current_disabled(&self) -> bool {
        self.entries.get(self.active).is_none_or(|e| e.disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> Menu {
        Menu::new(
            vec![
                MenuEntry::new("Slash").with_key(Key::Char('1')),
                MenuEntry::new("Parry")
                    .with_key(Key::Char('2'))
                    .disabled(true),
                MenuEntry::new("Flee"),
            ],
            MenuKeys::arrows(),
        )
    }

    #[test]
    fn navigation_wraps() {
        let mut m = menu();
        assert_eq!(m.update(&Msg::key(Key::ArrowUp)), MenuAction::Move);
        assert_eq!(m.active(), 2);
        assert_eq!(m.update(&Msg::key(Key::ArrowDown)), MenuAction::Move);
        assert_eq!(m.active(), 0);
    }

    #[test]
    fn disabled_entry_cannot_be_invoked() {
        let mut m = menu();
        m.set_active(1);
        assert_eq!(m.update(&Msg::key(Key::Enter)), MenuAction::Pass);
        assert_eq!(m.update(&Msg::key(Key::Char('2'))), MenuAction::Pass);
    }

    #[test]
    fn shortcut_invokes_and_moves() {
        let mut m = menu();
        m.set_active(2);
        assert_eq!(m.update(&Msg::key(Key::Char('1'))), MenuAction::Invoke);
        assert_eq!(m.active(), 0);
    }

    #[test]
    fn shortcut_on_disabled_entry_keeps_active() {
        let mut m = menu();
        m.set_active(2);
        m.update(&Msg::key(Key::Char('2')));
        assert_eq!(m.active(), 2);
    }

    #[test]
    fn wasd_layout() {
        let mut m = menu();
        m.set_keys(MenuKeys::wasd());
        assert_eq!(m.update(&Msg::key(Key::ArrowDown)), MenuAction::Pass);
        assert_eq!(m.update(&Msg::key(Key::Char('s'))), MenuAction::Move);
        assert_eq!(m.active(), 1);
    }

    #[test]
    fn quit_and_non_keys() {
        let mut m = menu();
        assert_eq!(m.update(&Msg::key(Key::Escape)), MenuAction::Quit);
        assert_eq!(m.update(&Msg::tick(1)), MenuAction::Pass);
        let mut empty = Menu::new(Vec::new(), MenuKeys::default());
        assert_eq!(empty.update(&Msg::key(Key::Enter)), MenuAction::Pass);
        assert_eq!(empty.update(&Msg::key(Key::Escape)), MenuAction::Quit);
    }

    #[test]
    fn lines_mark_active() {
        let m = menu();
        let lines = m.lines();
        assert_eq!(lines[0].plain(), "> Slash");
        assert_eq!(lines[1].plain(), "  Parry");
        assert!(lines[1].spans[1].style.attrs.contains(AttrMask::DIM));
    }

    #[test]
    fn set_entries_clamps_active() {
        let mut m = menu();
        m.set_active(2);
        m.set_entries(vec![MenuEntry::new("only")]);
        assert_eq!(m.active(), 0);
    }
}
