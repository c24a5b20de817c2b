//! SezonTUI - terminal browser for a seasonal episode catalog
//!
//! # Modules
//!
//! - `catalog` - Catalog parsing and queries
//! - `models` - Playback state shared by the player and the UI
//! - `stream` - External player control (mpv IPC, plain launcher)
//! - `app` - Application state, navigation and key handling
//! - `ui` - TUI components
//! - `cli` / `commands` - Non-interactive subcommands
//! - `config` - Persistent settings

pub mod app;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod stream;
pub mod ui;

// Re-export commonly used types
pub use app::{Action, App, AppState, InputMode};
pub use catalog::{Catalog, CatalogError, Episode, Season};
pub use config::Config;
pub use models::{PlaybackState, PlaybackStatus};
pub use stream::{MediaTransport, PlayerError, PlayerType, Transport};
