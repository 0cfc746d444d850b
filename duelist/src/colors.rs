//! Colour palette of the menus. Battle numbers use the colours in
//! [`duelist_combat::narration`].

use duelist_core::{AttrMask, Color, Style};

// -- Foregrounds --

/// Secondary text: hints, log markers, cooldown counters.
pub const MUTED: Color = Color::from_rgb(173, 173, 173);
/// Screen titles.
pub const TITLE: Color = Color::from_rgb(248, 248, 242);
/// Money amounts.
pub const MONEY: Color = Color::from_rgb(201, 237, 154);
/// Xp and level numbers.
pub const XP: Color = Color::from_rgb(139, 190, 255);
/// A requirement the player meets.
pub const OK: Color = Color::from_rgb(201, 237, 154);
/// A requirement the player does not meet, and errors.
pub const BAD: Color = Color::from_rgb(227, 104, 104);
/// Notices after an action (bought, equipped, saved).
pub const NOTICE: Color = Color::from_rgb(237, 198, 154);

// -- Styles --

pub const TITLE_STYLE: Style = Style::fg(TITLE).with_attrs(AttrMask::BOLD);
pub const HINT_STYLE: Style = Style::fg(MUTED).with_attrs(AttrMask::ITALIC);

