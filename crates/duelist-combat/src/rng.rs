//! Probability primitives shared by the resolver, the enemy turn and the
//! reward roll.

use rand::{Rng, RngExt};

/// A uniform roll in `[0, 100)`.
pub fn roll_percent(rng: &mut impl Rng) -> f64 {
    rng.random_range(0.0..100.0)
}

/// Whether an event with `percent`% probability happens. Fractional
/// percentages are honoured; anything at or above 100 always succeeds.
pub fn chance(rng: &mut impl Rng, percent: f64) -> bool {
    if percent >= 100.0 {
        return true;
    }
    if percent <= 0.0 {
        return false;
    }
    roll_percent(rng) < percent
}

/// A uniform integer in `[min, max]`. Reversed bounds are swapped.
pub fn roll_damage(rng: &mut impl Rng, min: i32, max: i32) -> i32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.random_range(lo..=hi)
}

/// A uniform integer in `[min, max]` for reward amounts.
pub fn roll_amount(rng: &mut impl Rng, min: i64, max: i64) -> i64 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.random_range(lo..=hi)
}

/// Pick an item with probability proportional to `weight`. Items with a
/// non-positive weight are never picked; returns `None` when nothing can be.
pub fn pick_weighted<'a, T>(
    rng: &mut impl Rng,
    items: &'a [T],
    weight: impl Fn(&T) -> f64,
) -> Option<&'a T> {
    let total: f64 = items.iter().map(|i| weight(i).max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    let mut r = rng.random_range(0.0..total);
    let mut last = None;
    for item in items {
        let w = weight(item);
        if w <= 0.0 {
            continue;
        }
        if r < w {
            return Some(item);
        }
        r -= w;
        last = Some(item);
    }
    // Floating point leftovers land on the last positive entry.
    last
}
