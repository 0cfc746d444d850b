//! **duelist-core**: core types for the duelist terminal RPG.
//!
//! This crate provides the foundational types used across the workspace:
//! input messages, text styles, line-based frames, and the Elm-architecture
//! application loop with its cooperative cancellation token.

pub mod app;
pub mod frame;
pub mod messages;
pub mod style;

pub use app::{App, AppConfig, Cmd, Context, Driver, Effect, Model, cmd, delay};
pub use frame::{Frame, Line, Span};
pub use messages::*;
pub use style::{AttrMask, Color, Style};
