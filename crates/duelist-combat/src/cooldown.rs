use std::collections::HashMap;

/// Per-ability cooldowns, keyed by attack id.
///
/// An ability is on cooldown while its remaining count is positive. Entries
/// are never removed; a spent entry (at or below zero) is simply refreshed
/// the next time the ability is triggered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cooldowns {
    remaining: HashMap<String, i32>,
}

impl Cooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the cooldown of `id` after it was used.
    ///
    /// Stores `length + 1` so the [`tick`](Self::tick) that closes the same
    /// turn leaves exactly `length` turns. Zero-length cooldowns are not
    /// tracked, and an entry still counting down is left alone.
    pub fn trigger(&mut self, id: &str, length: i32) {
        if length <= 0 {
            return;
        }
        match self.remaining.get_mut(id) {
            Some(left) if *left > 0 => {}
            Some(left) => *left = length + 1,
            None => {
                self.remaining.insert(id.to_string(), length + 1);
            }
        }
    }

    /// Count every running cooldown down by one turn.
    pub fn tick(&mut self) {
        for left in self.remaining.values_mut().filter(|l| **l > 0) {
            *left -= 1;
        }
    }

    /// The stored count for `id`, if it was ever triggered.
    pub fn remaining(&self, id: &str) -> Option<i32> {
        self.remaining.get(id).copied()
    }

    /// Turns left before `id` can be used, zero when ready.
    pub fn turns_left(&self, id: &str) -> i32 {
        self.remaining(id).unwrap_or(0).max(0)
    }

    pub fn is_ready(&self, id: &str) -> bool {
        self.turns_left(id) == 0
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}
