//! UI widgets for duelist: styled text and menus.

mod menu;
mod styled_text;

pub use menu::{Menu, MenuAction, MenuEntry, MenuKeys};
pub use styled_text::StyledText;
