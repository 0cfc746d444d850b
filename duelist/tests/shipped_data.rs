use std::path::PathBuf;

use duelist_combat::record::{resolve_abilities, resolve_enemy_attacks};
use duelist_lib::data::GameData;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data")
}

#[test]
fn every_weapon_and_enemy_is_usable() {
    let data = GameData::load(&data_dir());
    assert!(data.weapon("default").is_some());
    assert!(!data.enemies.is_empty());

    for weapon in &data.weapons {
        let abilities = resolve_abilities(weapon, &data.attacks)
            .unwrap_or_else(|e| panic!("{}: {e}", weapon.id));
        assert!(!abilities.is_empty(), "{} has no abilities", weapon.id);
    }
    for enemy in &data.enemies {
        resolve_enemy_attacks(enemy).unwrap_or_else(|e| panic!("{}: {e}", enemy.id));
        for drop in &enemy.rewards.weapons {
            assert!(data.weapon(&drop.id).is_some(), "{} drops unknown {}", enemy.id, drop.id);
        }
    }
}

#[test]
fn lists_are_sorted() {
    let data = GameData::load(&data_dir());
    assert!(data.enemies.windows(2).all(|w| w[0].level <= w[1].level));
    assert!(
        data.weapons
            .windows(2)
            .all(|w| w[0].level_requirement <= w[1].level_requirement)
    );
}
