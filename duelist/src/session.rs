//! The game session: everything the screens share between battles.

use duelist_ui::MenuKeys;

use crate::config::{Config, Pacing};
use crate::data::GameData;
use crate::player::Player;
use crate::save::{SaveData, SaveError, SaveStore};

pub struct Session {
    pub config: Config,
    pub data: GameData,
    pub store: SaveStore,
    pub player: Player,
    tags: u64,
}

impl Session {
    /// Load the data files and the save. A save that cannot be read leaves
    /// the player at the defaults; the file itself is not touched until the
    /// next save.
    pub fn open(config: Config) -> Self {
        let data = GameData::load(&config.data_dir);
        let store = SaveStore::new(&config.data_dir);
        let player = load_player(&store, &data);
        Self {
            config,
            data,
            store,
            player,
            tags: 0,
        }
    }

    /// Throw away everything in memory and read it again from disk.
    pub fn reload(&mut self) {
        self.data = GameData::load(&self.config.data_dir);
        self.player = load_player(&self.store, &self.data);
    }

    pub fn save(&self) -> Result<(), SaveError> {
        self.store.save(&self.player.to_save())
    }

    /// A fresh tag for a countdown or a delayed message.
    pub fn next_tag(&mut self) -> u64 {
        self.tags += 1;
        self.tags
    }

    pub fn keys(&self) -> MenuKeys {
        MenuKeys::for_arrows(self.player.settings.use_arrow_keys)
    }

    pub fn pacing(&self) -> Pacing {
        self.config
            .pacing
            .select(self.player.settings.faster_battle_logs)
    }

    pub fn show_controls(&self) -> bool {
        self.player.settings.display_controls
    }
}

fn load_player(store: &SaveStore, data: &GameData) -> Player {
    let mut player = match store.load() {
        Ok(save) => Player::from_save(save),
        Err(e) => {
            log::error!("{e}; playing with a fresh save");
            Player::from_save(SaveData::default())
        }
    };
    if !player.prune_inventory(data).is_empty() {
        if let Err(e) = store.save(&player.to_save()) {
            log::error!("saving the pruned inventory: {e}");
        }
    }
    player
}
