//! Integration tests for sezontui
//!
//! Tests are organized by component:
//! - catalog_test: Catalog parsing, queries and loading from disk
//! - cli_test: Argument parsing, row builders and command handlers
//! - player_test: mpv IPC transport against a fake socket server
//! - ui_test: Screen rendering on a TestBackend
//! - e2e_test: Key-driven flows from the menu to playback
//! - bin_test: The built binary: log flushing, exit codes, first-run config

// Note: Each test file is a separate integration test crate
// Tests are run individually by cargo, not via mod.rs
