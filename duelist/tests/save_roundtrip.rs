use std::fs;

use duelist_lib::player::Player;
use duelist_lib::save::{SaveData, SaveError, SaveStore};
use tempfile::tempdir;

#[test]
fn save_then_load_reproduces_the_player() {
    let dir = tempdir().unwrap();
    let store = SaveStore::new(dir.path());

    let mut save = SaveData::default();
    save.level = 2;
    save.health = 120;
    save.xp.current = 40;
    save.xp.max = 335;
    save.money = 99;
    save.inventory.push("axe".into());
    save.equipped = "axe".into();
    save.settings.faster_battle_logs = true;
    save.settings
        .extra
        .insert("primarySortKeybind".into(), "q".into());

    let player = Player::from_save(save.clone());
    store.save(&player.to_save()).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded, save);
    assert_eq!(Player::from_save(loaded), player);
}

#[test]
fn missing_save_is_created_with_defaults() {
    let dir = tempdir().unwrap();
    let store = SaveStore::new(&dir.path().join("data"));

    let loaded = store.load().unwrap();
    assert_eq!(loaded, SaveData::default());
    assert!(store.path().exists());
}

#[test]
fn loading_backs_up_the_previous_file() {
    let dir = tempdir().unwrap();
    let store = SaveStore::new(dir.path());
    let mut save = SaveData::default();
    save.money = 7;
    store.save(&save).unwrap();

    store.load().unwrap();
    let backup: SaveData =
        serde_json::from_str(&fs::read_to_string(store.backup_path()).unwrap()).unwrap();
    assert_eq!(backup.money, 7);

    save.money = 8;
    store.save(&save).unwrap();
    let backup: SaveData =
        serde_json::from_str(&fs::read_to_string(store.backup_path()).unwrap()).unwrap();
    assert_eq!(backup.money, 7);
}

#[test]
fn corrupt_save_is_an_error_and_keeps_the_backup() {
    let dir = tempdir().unwrap();
    let store = SaveStore::new(dir.path());
    let mut save = SaveData::default();
    save.money = 3;
    store.save(&save).unwrap();
    store.load().unwrap();

    fs::write(store.path(), "{ broken").unwrap();
    assert!(matches!(store.load(), Err(SaveError::Parse { .. })));

    let backup: SaveData =
        serde_json::from_str(&fs::read_to_string(store.backup_path()).unwrap()).unwrap();
    assert_eq!(backup.money, 3);
}
