//! Crash reporting. Errors that reach the model and panics are appended to
//! `crash.log`; the model then starts over from the main menu.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CRASH_LOG: &str = "crash.log";

/// How long the apology stays up before the main menu returns.
pub const NOTICE_TIME: Duration = Duration::from_secs(3);

pub const APOLOGY: &str = "Sorry, something went wrong. The details were written to the crash log.";

/// Append a timestamped report to the crash log.
pub fn record(log_dir: &Path, report: &str) {
    let path = log_dir.join(CRASH_LOG);
    let result = fs::create_dir_all(log_dir).and_then(|_| {
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "==== {ts} ====\n{report}\n")
    });
    if let Err(e) = result {
        log::error!("cannot write {}: {e}", path.display());
    }
}

/// Log a recoverable error with its whole chain.
pub fn report(log_dir: &Path, err: &anyhow::Error) {
    log::error!("recovering from error: {err:#}");
    record(log_dir, &format!("{err:?}"));
}

/// Restore the terminal and record the panic before the default hook runs.
pub fn install_panic_hook(log_dir: PathBuf) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        duelist_crossterm::restore_terminal();
        log::error!("panic: {info}");
        record(&log_dir, &format!("panic: {info}"));
        previous(info);
    }));
}
