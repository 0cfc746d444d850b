//! Flavour text templates with `{name}` placeholders.

use rand::{Rng, RngExt};

use duelist_core::{AttrMask, Style};
use duelist_ui::StyledText;

/// Base style every battle message is rendered in.
pub const MESSAGE_STYLE: Style = Style::attrs(AttrMask::ITALIC);

/// Replace each `{name}` in `template` by its styled value, in the order
/// given. Placeholders without a value are left as written.
pub fn substitute(template: &str, subs: &[(&str, StyledText)]) -> StyledText {
    subs.iter()
        .fold(StyledText::text(template), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
}

/// Pick one template from `pool` and substitute into it. An empty pool
/// renders as empty text.
pub fn render(pool: &[String], subs: &[(&str, StyledText)], rng: &mut impl Rng) -> StyledText {
    if pool.is_empty() {
        return StyledText::default();
    }
    let template = &pool[rng.random_range(0..pool.len())];
    substitute(template, subs).with_style(MESSAGE_STYLE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use duelist_core::Color;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn orange(s: &str) -> StyledText {
        StyledText::new(s, Style::fg(Color::from_rgb(252, 144, 3)))
    }

    #[test]
    fn substitutes_and_keeps_unknown() {
        let out = substitute(
            "{enemy_name} takes {damage} from {weapon_name}",
            &[("enemy_name", StyledText::text("Goblin")), ("damage", orange("12"))],
        );
        assert_eq!(out.content(), "Goblin takes 12 from {weapon_name}");
        let dmg = out.spans().iter().find(|s| s.text == "12").unwrap();
        assert_eq!(dmg.style.fg, Color::from_rgb(252, 144, 3));
    }

    #[test]
    fn render_is_italic_and_keeps_colour() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = vec!["Hit for {damage}!".to_string()];
        let out = render(&pool, &[("damage", orange("7"))], &mut rng);
        assert_eq!(out.content(), "Hit for 7!");
        for span in out.spans() {
            assert!(span.style.attrs.contains(AttrMask::ITALIC));
        }
        assert_eq!(out.spans()[1].style.fg, Color::from_rgb(252, 144, 3));
    }

    #[test]
    fn render_picks_from_pool() {
        let mut rng = StdRng::seed_from_u64(2);
        let pool: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(render(&pool, &[], &mut rng).content());
        }
        assert_eq!(seen.len(), 3);
        assert!(render(&[], &[], &mut rng).is_empty());
    }
}
