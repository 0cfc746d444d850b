//! File logging. The terminal is in raw mode while the game runs, so every
//! log line goes to `debug.log` in the log directory instead of stderr.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Config;

pub const DEBUG_LOG: &str = "debug.log";

/// Install the global logger. `RUST_LOG`, when set, replaces the configured
/// level. Returns the path of the log file.
pub fn init(config: &Config) -> Result<PathBuf> {
    let path = open_log_dir(&config.log_dir)?.join(DEBUG_LOG);
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut builder = env_logger::Builder::new();
    builder.filter_level(config.level_filter());
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder.format(|fmt, record| {
        let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
    });
    builder.target(env_logger::Target::Pipe(Box::new(file)));
    builder
        .try_init()
        .context("a logger was already installed")?;
    Ok(path)
}

/// Create the log directory if needed.
pub fn open_log_dir(dir: &Path) -> Result<&Path> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(dir)
}
