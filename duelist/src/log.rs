//! The battle message log.

use duelist_core::{Line, Style};
use duelist_ui::StyledText;

use crate::colors;

const MAX_ENTRIES: usize = 500;

/// A single log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub text: StyledText,
    /// First entry of a new turn.
    pub tick: bool,
    pub dups: u32,
}

/// Narration of the current battle, oldest first.
#[derive(Debug, Clone, Default)]
pub struct BattleLog {
    pub entries: Vec<LogEntry>,
    next_tick: bool,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of a new turn (next entry gets a tick marker).
    pub fn new_turn(&mut self) {
        self.next_tick = true;
    }

    pub fn push(&mut self, text: StyledText) {
        if text.is_empty() {
            return;
        }
        // Dedup consecutive identical messages
        if let Some(last) = self.entries.last_mut() {
            if last.text == text && !self.next_tick {
                last.dups += 1;
                return;
            }
        }
        self.entries.push(LogEntry {
            text,
            tick: self.next_tick,
            dups: 0,
        });
        self.next_tick = false;

        if self.entries.len() > MAX_ENTRIES {
            self.entries.drain(0..MAX_ENTRIES / 10);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The newest entries wrapped to `width`, at most `max_lines` lines,
    /// in chronological order.
    pub fn recent_lines(&self, width: usize, max_lines: usize) -> Vec<Line> {
        let mut lines: Vec<Line> = Vec::new();
        for entry in self.entries.iter().rev() {
            let mut text = if entry.tick {
                StyledText::new("• ", Style::fg(colors::MUTED))
            } else {
                StyledText::text("  ")
            };
            text = text.append(entry.text.clone());
            if entry.dups > 0 {
                text = text.push(&format!(" ({}×)", entry.dups + 1), Style::fg(colors::MUTED));
            }
            let mut wrapped = text.wrap(width);
            wrapped.extend(lines);
            lines = wrapped;
            if lines.len() >= max_lines {
                break;
            }
        }
        let excess = lines.len().saturating_sub(max_lines);
        lines.drain(0..excess);
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedups_within_a_turn() {
        let mut log = BattleLog::new();
        log.new_turn();
        log.push("You wait.".into());
        log.push("You wait.".into());
        assert_eq!(log.entries.len(), 1);
        assert_eq!(log.entries[0].dups, 1);
        assert!(log.entries[0].tick);

        log.new_turn();
        log.push("You wait.".into());
        assert_eq!(log.entries.len(), 2);
    }

    #[test]
    fn empty_text_is_dropped() {
        let mut log = BattleLog::new();
        log.push(StyledText::default());
        assert!(log.is_empty());
    }

    #[test]
    fn recent_lines_keep_the_newest() {
        let mut log = BattleLog::new();
        for i in 0..10 {
            log.push(StyledText::textf(format!("line {i}")));
        }
        let lines = log.recent_lines(40, 3);
        let plain: Vec<String> = lines.iter().map(|l| l.plain()).collect();
        assert_eq!(plain, ["  line 7", "  line 8", "  line 9"]);
    }

    #[test]
    fn long_entries_wrap() {
        let mut log = BattleLog::new();
        log.push("one two three four five six".into());
        let lines = log.recent_lines(12, 10);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.width() <= 12));
    }
}
