//! Data records as stored in the JSON files, and their validated forms.
//!
//! Records keep every field optional so that a weapon ability can be laid
//! over its shared attack definition before anything is checked. Validation
//! happens once, when a battle is built ([`Attack::from_record`]).

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use duelist_core::{AttrMask, Color, Style};
use duelist_ui::StyledText;

use crate::error::CombatError;

/// Abilities past this count are ignored (keys 1-9 then 0).
pub const MAX_ABILITIES: usize = 10;

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// A colour as written in data files: an `[r, g, b]` triple or a name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Rgb([u8; 3]),
    Named(String),
}

impl ColorSpec {
    pub fn to_color(&self) -> Color {
        match self {
            ColorSpec::Rgb(rgb) => Color::from_triple(*rgb),
            ColorSpec::Named(name) => named_color(name),
        }
    }
}

fn named_color(name: &str) -> Color {
    match name.to_ascii_lowercase().as_str() {
        "black" => Color::from_rgb(0, 0, 0),
        "red" => Color::from_rgb(205, 49, 49),
        "green" => Color::from_rgb(13, 188, 121),
        "yellow" => Color::from_rgb(229, 229, 16),
        "blue" => Color::from_rgb(36, 114, 200),
        "magenta" | "purple" => Color::from_rgb(188, 63, 188),
        "cyan" => Color::from_rgb(17, 168, 205),
        "orange" => Color::from_rgb(252, 144, 3),
        "white" => Color::from_rgb(229, 229, 229),
        "grey" | "gray" => Color::from_rgb(173, 173, 173),
        _ => {
            log::debug!("unknown colour name {name:?}");
            Color::DEFAULT
        }
    }
}

/// The display style of a name: optional colour plus attribute words.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TitleStyle {
    #[serde(default)]
    pub color: Option<ColorSpec>,
    #[serde(default)]
    pub style: Option<String>,
}

impl TitleStyle {
    pub fn to_style(&self) -> Style {
        let mut st = Style::default();
        if let Some(c) = &self.color {
            st = st.with_fg(c.to_color());
        }
        if let Some(words) = &self.style {
            st = st.with_attrs(AttrMask::parse(words));
        }
        st
    }

    /// `text` in this style.
    pub fn paint(&self, text: &str) -> StyledText {
        StyledText::new(text, self.to_style())
    }
}

/// Flavour text pools for the phases of an attack.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessagePools {
    #[serde(default)]
    pub start: Vec<String>,
    #[serde(default)]
    pub miss: Vec<String>,
    #[serde(default)]
    pub hit: Vec<String>,
    #[serde(default)]
    pub crit: Vec<String>,
}

// ---------------------------------------------------------------------------
// Rewards
// ---------------------------------------------------------------------------

/// One entry of an enemy's weapon drop table.
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponDrop {
    pub id: String,
    /// Percent chance, fractions allowed.
    pub chance: f64,
}

/// What an enemy hands out on defeat.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rewards {
    #[serde(default)]
    pub min_xp: i64,
    #[serde(default)]
    pub max_xp: i64,
    #[serde(default)]
    pub min_money: i64,
    #[serde(default)]
    pub max_money: i64,
    /// Drops in document order; the order decides which drop wins.
    #[serde(default, deserialize_with = "ordered_drops")]
    pub weapons: Vec<WeaponDrop>,
}

/// Reads a `{ "weapon-id": chance, ... }` object keeping its order.
fn ordered_drops<'de, D>(deserializer: D) -> Result<Vec<WeaponDrop>, D::Error>
where
    D: Deserializer<'de>,
{
    struct DropsVisitor;

    impl<'de> Visitor<'de> for DropsVisitor {
        type Value = Vec<WeaponDrop>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of weapon id to drop chance")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut drops = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((id, chance)) = map.next_entry::<String, f64>()? {
                drops.push(WeaponDrop { id, chance });
            }
            Ok(drops)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(DropsVisitor)
}

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

/// An attack, ability override or enemy attack exactly as written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub title: Option<TitleStyle>,
    pub description: Option<String>,
    pub min_damage: Option<i32>,
    pub max_damage: Option<i32>,
    pub hit_chance: Option<f64>,
    pub crit_chance: Option<f64>,
    pub crit_multi: Option<f64>,
    pub cooldown: Option<i32>,
    pub messages: Option<MessagePools>,
    /// Relative weight of an enemy attack.
    pub attack_chance: Option<f64>,
}

impl AttackRecord {
    /// `over` laid on top of `self`: every field set in `over` wins.
    pub fn overlay(&self, over: &AttackRecord) -> AttackRecord {
        fn pick<T: Clone>(base: &Option<T>, over: &Option<T>) -> Option<T> {
            over.clone().or_else(|| base.clone())
        }
        AttackRecord {
            id: pick(&self.id, &over.id),
            name: pick(&self.name, &over.name),
            title: pick(&self.title, &over.title),
            description: pick(&self.description, &over.description),
            min_damage: pick(&self.min_damage, &over.min_damage),
            max_damage: pick(&self.max_damage, &over.max_damage),
            hit_chance: pick(&self.hit_chance, &over.hit_chance),
            crit_chance: pick(&self.crit_chance, &over.crit_chance),
            crit_multi: pick(&self.crit_multi, &over.crit_multi),
            cooldown: pick(&self.cooldown, &over.cooldown),
            messages: pick(&self.messages, &over.messages),
            attack_chance: pick(&self.attack_chance, &over.attack_chance),
        }
    }
}

/// A weapon file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: TitleStyle,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub level_requirement: i32,
    #[serde(default)]
    pub in_shop: bool,
    /// References to attacks by id, with optional per-weapon overrides.
    #[serde(default)]
    pub abilities: Vec<AttackRecord>,
}

impl WeaponRecord {
    pub fn styled_name(&self) -> StyledText {
        self.title.paint(&self.name)
    }
}

/// An enemy: `main.json` merged with the `attacks` of `attacks.json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyRecord {
    /// The directory name; filled in by the loader.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: TitleStyle,
    pub health: i32,
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub rewards: Rewards,
    #[serde(default)]
    pub attacks: Vec<AttackRecord>,
}

impl EnemyRecord {
    pub fn styled_name(&self) -> StyledText {
        self.title.paint(&self.name)
    }
}

/// The shape of an enemy's `attacks.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttacksFile {
    #[serde(default)]
    pub attacks: Vec<AttackRecord>,
}

// ---------------------------------------------------------------------------
// Validated forms
// ---------------------------------------------------------------------------

/// A fully specified attack, ready for the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct Attack {
    pub id: String,
    pub name: String,
    pub style: Style,
    pub min_damage: i32,
    pub max_damage: i32,
    pub hit_chance: f64,
    pub crit_chance: f64,
    pub crit_multi: f64,
    pub cooldown: i32,
    pub messages: MessagePools,
}

/// How strictly a record is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// Player abilities: every key is required.
    Ability,
    /// Enemy attacks: `hitChance` defaults to 100, `cooldown` to 0, and
    /// `title`/`messages` may be left out.
    EnemyAttack,
}

impl Attack {
    pub fn from_record(
        rec: &AttackRecord,
        owner: &str,
        strictness: Strictness,
    ) -> Result<Self, CombatError> {
        let missing = |field: &'static str| CombatError::MissingField {
            owner: owner.to_string(),
            field,
        };
        let lenient = strictness == Strictness::EnemyAttack;

        let name = rec.name.clone().ok_or_else(|| missing("name"))?;
        let title = match (&rec.title, lenient) {
            (Some(t), _) => t.clone(),
            (None, true) => TitleStyle::default(),
            (None, false) => return Err(missing("title")),
        };
        let id = rec.id.clone().ok_or_else(|| missing("id"))?;
        let messages = match (&rec.messages, lenient) {
            (Some(m), _) => m.clone(),
            (None, true) => MessagePools::default(),
            (None, false) => return Err(missing("messages")),
        };
        let min_damage = rec.min_damage.ok_or_else(|| missing("minDamage"))?;
        let max_damage = rec.max_damage.ok_or_else(|| missing("maxDamage"))?;
        let crit_multi = rec.crit_multi.ok_or_else(|| missing("critMulti"))?;
        let crit_chance = rec.crit_chance.ok_or_else(|| missing("critChance"))?;
        let hit_chance = match (rec.hit_chance, lenient) {
            (Some(h), _) => h,
            (None, true) => 100.0,
            (None, false) => return Err(missing("hitChance")),
        };
        let cooldown = match (rec.cooldown, lenient) {
            (Some(c), _) => c,
            (None, true) => 0,
            (None, false) => return Err(missing("cooldown")),
        };

        if min_damage < 0 || min_damage > max_damage {
            return Err(CombatError::InvalidDamage {
                owner: owner.to_string(),
                min: min_damage,
                max: max_damage,
            });
        }

        Ok(Self {
            id,
            name,
            style: title.to_style(),
            min_damage,
            max_damage,
            hit_chance: hit_chance.clamp(0.0, 100.0),
            crit_chance: crit_chance.clamp(0.0, 100.0),
            crit_multi,
            cooldown: cooldown.max(0),
            messages,
        })
    }

    /// The attack name in its display style.
    pub fn styled_name(&self) -> StyledText {
        StyledText::new(&self.name, self.style)
    }
}

/// An enemy attack with its selection weight.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyAttack {
    pub attack: Attack,
    pub weight: f64,
}

/// Resolve a weapon's abilities against the shared attack definitions.
///
/// Each ability entry is laid over the attack with the same id, then
/// validated. Entries past [`MAX_ABILITIES`] are dropped.
pub fn resolve_abilities(
    weapon: &WeaponRecord,
    attacks: &[AttackRecord],
) -> Result<Vec<Attack>, CombatError> {
    if weapon.abilities.len() > MAX_ABILITIES {
        log::warn!(
            "{} has {} abilities, only the first {MAX_ABILITIES} are usable",
            weapon.id,
            weapon.abilities.len()
        );
    }
    weapon
        .abilities
        .iter()
        .take(MAX_ABILITIES)
        .map(|ability| {
            let id = ability.id.as_deref().ok_or(CombatError::MissingField {
                owner: weapon.id.clone(),
                field: "id",
            })?;
            let base = attacks
                .iter()
                .find(|a| a.id.as_deref() == Some(id))
                .ok_or_else(|| CombatError::UnknownAttack {
                    owner: weapon.id.clone(),
                    id: id.to_string(),
                })?;
            let owner = format!("{} ability {id}", weapon.id);
            Attack::from_record(&base.overlay(ability), &owner, Strictness::Ability)
        })
        .collect()
}

/// Validate an enemy's attack table.
pub fn resolve_enemy_attacks(enemy: &EnemyRecord) -> Result<Vec<EnemyAttack>, CombatError> {
    let attacks = enemy
        .attacks
        .iter()
        .map(|rec| {
            let owner = format!(
                "{} attack {}",
                enemy.id,
                rec.id.as_deref().unwrap_or("?")
            );
            let weight = rec.attack_chance.ok_or(CombatError::MissingField {
                owner: owner.clone(),
                field: "attackChance",
            })?;
            Ok(EnemyAttack {
                attack: Attack::from_record(rec, &owner, Strictness::EnemyAttack)?,
                weight,
            })
        })
        .collect::<Result<Vec<_>, CombatError>>()?;

    if !attacks.iter().any(|a| a.weight > 0.0) {
        return Err(CombatError::NoEnemyAttacks {
            enemy: enemy.name.clone(),
        });
    }
    Ok(attacks)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn slash_json() -> &'static str {
        r#"{
            "id": "slash",
            "name": "Slash",
            "title": {"color": [200, 200, 200], "style": "bold"},
            "description": "A wide cut.",
            "minDamage": 4,
            "maxDamage": 8,
            "hitChance": 90,
            "critChance": 10,
            "critMulti": 0.5,
            "cooldown": 0,
            "messages": {
                "start": ["You swing your {attack_name}."],
                "miss": ["The {enemy_name} steps aside."],
                "hit": ["You cut the {enemy_name} for {damage}."],
                "crit": ["A perfect cut! {damage} damage."]
            }
        }"#
    }

    pub(crate) fn slash() -> AttackRecord {
        serde_json::from_str(slash_json()).unwrap()
    }

    pub(crate) fn weapon_with(abilities: Vec<AttackRecord>) -> WeaponRecord {
        WeaponRecord {
            id: "sword".into(),
            name: "Sword".into(),
            abilities,
            ..Default::default()
        }
    }

    fn ability_ref(id: &str) -> AttackRecord {
        AttackRecord {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    #[test]
    fn parse_attack_record() {
        let rec = slash();
        assert_eq!(rec.min_damage, Some(4));
        assert_eq!(rec.hit_chance, Some(90.0));
        let title = rec.title.unwrap();
        assert_eq!(title.to_style().fg, Color::from_rgb(200, 200, 200));
        assert!(title.to_style().attrs.contains(AttrMask::BOLD));
    }

    #[test]
    fn named_colours_parse() {
        let t: TitleStyle = serde_json::from_str(r#"{"color": "red"}"#).unwrap();
        assert!(!t.to_style().fg.is_default());
        let t: TitleStyle = serde_json::from_str(r#"{"color": "chartreuse"}"#).unwrap();
        assert!(t.to_style().fg.is_default());
    }

    #[test]
    fn drops_keep_document_order() {
        let r: Rewards = serde_json::from_str(
            r#"{"minXp": 1, "maxXp": 2, "minMoney": 3, "maxMoney": 4,
                "weapons": {"zweihander": 5, "axe": 12.5, "bow": 1}}"#,
        )
        .unwrap();
        let ids: Vec<&str> = r.weapons.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["zweihander", "axe", "bow"]);
        assert_eq!(r.weapons[1].chance, 12.5);
    }

    #[test]
    fn ability_override_wins() {
        let ability = AttackRecord {
            id: Some("slash".into()),
            max_damage: Some(12),
            ..Default::default()
        };
        let merged = slash().overlay(&ability);
        assert_eq!(merged.max_damage, Some(12));
        assert_eq!(merged.min_damage, Some(4));
        assert_eq!(merged.name.as_deref(), Some("Slash"));
    }

    #[test]
    fn abilities_are_truncated_to_ten() {
        let weapon = weapon_with((0..11).map(|_| ability_ref("slash")).collect());
        let abilities = resolve_abilities(&weapon, &[slash()]).unwrap();
        assert_eq!(abilities.len(), MAX_ABILITIES);
    }

    #[test]
    fn unknown_ability_is_rejected() {
        let weapon = weapon_with(vec![ability_ref("stab")]);
        let err = resolve_abilities(&weapon, &[slash()]).unwrap_err();
        assert!(matches!(err, CombatError::UnknownAttack { ref id, .. } if id == "stab"));
    }

    #[test]
    fn ability_requires_every_key() {
        for field in ["hitChance", "cooldown", "messages", "title", "critMulti"] {
            let mut v: serde_json::Value = serde_json::from_str(slash_json()).unwrap();
            v.as_object_mut().unwrap().remove(field);
            let rec: AttackRecord = serde_json::from_value(v).unwrap();
            let err = Attack::from_record(&rec, "sword", Strictness::Ability).unwrap_err();
            match err {
                CombatError::MissingField { field: f, .. } => assert_eq!(f, field),
                other => panic!("unexpected {other}"),
            }
        }
    }

    #[test]
    fn enemy_attack_defaults() {
        let rec = AttackRecord {
            id: Some("bite".into()),
            name: Some("Bite".into()),
            min_damage: Some(1),
            max_damage: Some(3),
            crit_chance: Some(5.0),
            crit_multi: Some(1.0),
            attack_chance: Some(1.0),
            ..Default::default()
        };
        let a = Attack::from_record(&rec, "wolf", Strictness::EnemyAttack).unwrap();
        assert_eq!(a.hit_chance, 100.0);
        assert_eq!(a.cooldown, 0);
        assert!(Attack::from_record(&rec, "wolf", Strictness::Ability).is_err());
    }

    #[test]
    fn reversed_damage_is_rejected() {
        let mut rec = slash();
        rec.min_damage = Some(9);
        let err = Attack::from_record(&rec, "sword", Strictness::Ability).unwrap_err();
        assert!(matches!(err, CombatError::InvalidDamage { min: 9, max: 8, .. }));
    }

    #[test]
    fn enemy_needs_a_weighted_attack() {
        let mut bite = slash();
        bite.attack_chance = Some(0.0);
        let enemy = EnemyRecord {
            id: "wolf".into(),
            name: "Wolf".into(),
            health: 10,
            attacks: vec![bite.clone()],
            ..Default::default()
        };
        assert!(matches!(
            resolve_enemy_attacks(&enemy),
            Err(CombatError::NoEnemyAttacks { .. })
        ));
        bite.attack_chance = None;
        let enemy = EnemyRecord {
            attacks: vec![bite],
            ..enemy
        };
        assert!(matches!(
            resolve_enemy_attacks(&enemy),
            Err(CombatError::MissingField {
                field: "attackChance",
                ..
            })
        ));
    }
}
