//! Duelist: a turn-based terminal RPG.

use std::path::Path;

use anyhow::{Context, anyhow};

use duelist_core::{App, AppConfig};
use duelist_crossterm::CrosstermDriver;

use duelist_lib::config::CONFIG_FILE;
use duelist_lib::{Config, DuelistModel, crash, logging};

fn main() -> anyhow::Result<()> {
    let (config, warning) = Config::load_or_default(Path::new(CONFIG_FILE));
    let log_file = logging::init(&config).context("setting up logging")?;
    if let Some(warning) = warning {
        log::warn!("{warning}");
    }
    log::info!("logging to {}", log_file.display());
    crash::install_panic_hook(config.log_dir.clone());

    let model = DuelistModel::new(config);
    let (width, height) = CrosstermDriver::size();
    let mut app = App::new(AppConfig {
        model,
        driver: CrosstermDriver::new(),
        width,
        height,
    });
    app.run().map_err(|e| anyhow!("terminal error: {e}"))?;
    log::info!("bye");
    Ok(())
}
