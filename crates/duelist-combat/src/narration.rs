//! Battle narration: built-in message pools and the colours of numbers.

use rand::Rng;

use duelist_core::{Color, Style};
use duelist_ui::StyledText;

use crate::record::Attack;
use crate::resolver::{Outcome, Strike};
use crate::template::render;

pub const CRIT_DAMAGE: Color = Color::from_rgb(252, 144, 3);
pub const NORMAL_DAMAGE: Color = Color::from_rgb(201, 237, 154);
pub const HEALTH_HIGH: Color = Color::from_rgb(201, 237, 154);
pub const HEALTH_MID: Color = Color::from_rgb(237, 198, 154);
pub const HEALTH_LOW: Color = Color::from_rgb(227, 104, 104);
pub const ON_COOLDOWN: Color = Color::from_rgb(173, 173, 173);

/// Said when the turn runs out without an ability.
pub const IDLE_MESSAGES: &[&str] = &[
    "The {enemy_name} watches your stillness, waiting for an opening.",
    "You tighten your grip on your {weapon_name}.",
    "Steel rings somewhere far away, but you do not move.",
    "The {enemy_name} grumbles, impatient for your next move.",
    "A gust of wind rolls a tuft of hay between you.",
    "Your stance holds, but the moment stretches on.",
    "A drop of sweat runs down onto your {weapon_name}.",
    "The smell of iron and dust hangs in the air.",
    "The {enemy_name} feints a lunge to test your nerve.",
    "Your muscles coil, yet the strike never comes.",
];

/// Used when an enemy attack carries no `hit` pool of its own.
pub const ENEMY_HIT_MESSAGES: &[&str] = &[
    "The {enemy_name} strikes with {attack_name}, dealing {damage} damage!",
    "With a guttural roar, the {enemy_name} lands {attack_name} for {damage} damage!",
    "The {enemy_name} lashes out with {attack_name}, inflicting {damage} damage!",
    "The {enemy_name} charges in with {attack_name}, causing {damage} damage!",
];

/// Used when an enemy attack carries no `crit` pool of its own.
pub const ENEMY_CRIT_MESSAGES: &[&str] = &[
    "A devastating {attack_name}! The {enemy_name} deals {damage} damage!",
    "Critical hit! The {enemy_name}'s {attack_name} hits for {damage} damage!",
    "The {enemy_name} finds a gap in your guard; {attack_name} deals {damage} damage!",
];

/// Used when an enemy attack carries no `miss` pool of its own.
pub const ENEMY_MISS_MESSAGES: &[&str] = &[
    "The {enemy_name} tries {attack_name}, but you slip away.",
    "You sidestep the {enemy_name}'s {attack_name} just in time.",
    "The {enemy_name}'s {attack_name} cuts only air.",
];

fn owned(pool: &[&str]) -> Vec<String> {
    pool.iter().map(|s| s.to_string()).collect()
}

/// Colour for a health value relative to its maximum: thirds of green,
/// orange and red.
pub fn health_color(current: i32, max: i32) -> Color {
    let ratio = if max > 0 {
        current as f64 / max as f64
    } else {
        0.0
    };
    if ratio > 2.0 / 3.0 {
        HEALTH_HIGH
    } else if ratio > 1.0 / 3.0 {
        HEALTH_MID
    } else {
        HEALTH_LOW
    }
}

/// Colour for the seconds left in a turn.
pub fn timer_color(left: u32) -> Color {
    match left {
        0..=3 => HEALTH_LOW,
        4..=6 => HEALTH_MID,
        _ => HEALTH_HIGH,
    }
}

/// `current/max` with the current value coloured by [`health_color`].
pub fn health_text(current: i32, max: i32) -> StyledText {
    StyledText::new(&current.to_string(), Style::fg(health_color(current, max)))
        .push("/", Style::default())
        .push(&max.to_string(), Style::fg(HEALTH_HIGH))
}

/// A damage number, orange for crits.
pub fn damage_text(strike: &Strike) -> StyledText {
    let color = if strike.outcome == Outcome::Crit {
        CRIT_DAMAGE
    } else {
        NORMAL_DAMAGE
    };
    StyledText::new(&strike.damage.to_string(), Style::fg(color))
}

/// Opening line of a player ability.
pub fn player_start(attack: &Attack, rng: &mut impl Rng) -> StyledText {
    render(
        &attack.messages.start,
        &[("attack_name", attack.styled_name())],
        rng,
    )
}

/// Closing line of a player ability.
pub fn player_result(
    attack: &Attack,
    strike: &Strike,
    enemy_name: &StyledText,
    rng: &mut impl Rng,
) -> StyledText {
    let pool = match strike.outcome {
        Outcome::Miss => &attack.messages.miss,
        Outcome::Normal => &attack.messages.hit,
        Outcome::Crit => &attack.messages.crit,
    };
    render(
        pool,
        &[
            ("attack_name", attack.styled_name()),
            ("enemy_name", enemy_name.clone()),
            ("damage", damage_text(strike)),
        ],
        rng,
    )
}

/// The idle line for a turn that timed out.
pub fn idle(enemy_name: &StyledText, weapon_name: &StyledText, rng: &mut impl Rng) -> StyledText {
    render(
        &owned(IDLE_MESSAGES),
        &[
            ("enemy_name", enemy_name.clone()),
            ("weapon_name", weapon_name.clone()),
        ],
        rng,
    )
}

/// The line for an enemy attack, preferring the attack's own pools.
pub fn enemy_result(
    attack: &Attack,
    strike: &Strike,
    enemy_name: &StyledText,
    rng: &mut impl Rng,
) -> StyledText {
    let (own, fallback) = match strike.outcome {
        Outcome::Miss => (&attack.messages.miss, ENEMY_MISS_MESSAGES),
        Outcome::Normal => (&attack.messages.hit, ENEMY_HIT_MESSAGES),
        Outcome::Crit => (&attack.messages.crit, ENEMY_CRIT_MESSAGES),
    };
    let pool = if own.is_empty() { owned(fallback) } else { own.clone() };
    render(
        &pool,
        &[
            ("attack_name", attack.styled_name()),
            ("enemy_name", enemy_name.clone()),
            ("damage", damage_text(strike)),
        ],
        rng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::tests::attack;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn health_thirds() {
        assert_eq!(health_color(100, 100), HEALTH_HIGH);
        assert_eq!(health_color(60, 100), HEALTH_MID);
        assert_eq!(health_color(30, 100), HEALTH_LOW);
        assert_eq!(health_color(0, 0), HEALTH_LOW);
        assert_eq!(health_text(60, 100).content(), "60/100");
    }

    #[test]
    fn timer_colours() {
        assert_eq!(timer_color(10), HEALTH_HIGH);
        assert_eq!(timer_color(5), HEALTH_MID);
        assert_eq!(timer_color(2), HEALTH_LOW);
    }

    #[test]
    fn enemy_falls_back_to_default_pools() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = attack("bite", 100.0, 0.0);
        let strike = Strike {
            outcome: Outcome::Crit,
            damage: 11,
            hit_chance: 100.0,
            crit_chance: 0.0,
        };
        let line = enemy_result(&a, &strike, &StyledText::text("Wolf"), &mut rng);
        let text = line.content();
        assert!(text.contains("11"), "{text}");
        assert!(text.contains("bite"), "{text}");
        let dmg = line.spans().iter().find(|s| s.text == "11").unwrap();
        assert_eq!(dmg.style.fg, CRIT_DAMAGE);
    }

    #[test]
    fn idle_mentions_no_placeholders() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..50 {
            let line = idle(
                &StyledText::text("Wolf"),
                &StyledText::text("Sword"),
                &mut rng,
            );
            assert!(!line.content().contains('{'));
        }
    }
}
