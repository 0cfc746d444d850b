//! Duelist: a turn-based terminal RPG built on the duelist crates.

pub mod colors;
pub mod config;
pub mod crash;
pub mod data;
pub mod fight;
pub mod log;
pub mod logging;
pub mod model;
pub mod player;
pub mod save;
pub mod session;

pub use config::Config;
pub use model::DuelistModel;
