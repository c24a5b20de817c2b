//! CLI - Command Line Interface for sezontui
//!
//! Every catalog query the TUI offers is scriptable. Output is human-readable
//! on a terminal and JSON otherwise.
//!
//! # Examples
//!
//! ```bash
//! # List seasons and their episode counts
//! sezontui seasons
//!
//! # Everything in one season, numbered for `play`
//! sezontui episodes "SEZON 2"
//!
//! # Search by number or title, then play a hit
//! sezontui search wigilia --json
//! sezontui play 12 --player vlc
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::catalog::CatalogError;
use crate::stream::{PlayerError, PlayerType};

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Catalog file does not exist
    CatalogNotFound = 3,
    /// Catalog file could not be read
    CatalogReadError = 4,
    /// No seasons, or nothing matched the selection
    NothingToSelect = 5,
    /// Player could not be started or controlled
    PlayerFailed = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

impl From<&CatalogError> for ExitCode {
    fn from(err: &CatalogError) -> Self {
        match err {
            CatalogError::SourceNotFound(_) => ExitCode::CatalogNotFound,
            CatalogError::ReadError { .. } => ExitCode::CatalogReadError,
            CatalogError::EmptyCatalog => ExitCode::NothingToSelect,
        }
    }
}

impl From<&PlayerError> for ExitCode {
    fn from(_: &PlayerError) -> Self {
        ExitCode::PlayerFailed
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// sezontui - browse and play an episode catalog from the terminal
///
/// Run without arguments to launch interactive TUI.
/// Use subcommands for scriptable automation.
#[derive(Parser, Debug)]
#[command(
    name = "sezontui",
    version,
    about = "Terminal panel for a season/episode link catalog",
    long_about = "Reads a text catalog of seasons (\"SEZON n\" headers), episode \
                  titles and stream URLs, and plays episodes in mpv or VLC.\n\n\
                  Run without arguments to launch the interactive TUI.\n\
                  Use subcommands for automation and scripting.",
    after_help = "EXAMPLES:\n\
                  sezontui                          Launch interactive TUI\n\
                  sezontui seasons                  List seasons\n\
                  sezontui search 12                Episodes whose number contains 12\n\
                  sezontui random --play            Play a random episode"
)]
pub struct Cli {
    /// Catalog file (overrides SEZONTUI_CATALOG and the config file)
    #[arg(long, short = 'f', global = true)]
    pub catalog: Option<PathBuf>,

    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Player to use (overrides the config file)
    #[arg(long, short = 'p', global = true, value_enum)]
    pub player: Option<PlayerChoice>,

    /// Subcommand to run (omit for TUI mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if running in CLI mode (has subcommand)
    pub fn is_cli_mode(&self) -> bool {
        self.command.is_some()
    }

    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

/// Local player selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerChoice {
    /// mpv media player
    Mpv,
    /// VLC media player
    Vlc,
}

impl From<PlayerChoice> for PlayerType {
    fn from(choice: PlayerChoice) -> Self {
        match choice {
            PlayerChoice::Mpv => PlayerType::Mpv,
            PlayerChoice::Vlc => PlayerType::Vlc,
        }
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List seasons with their episode counts
    #[command(visible_alias = "ls")]
    Seasons(SeasonsCmd),

    /// List episodes, numbered across the whole catalog
    #[command(visible_alias = "ep")]
    Episodes(EpisodesCmd),

    /// Search episodes by number or title
    #[command(visible_alias = "s")]
    Search(SearchCmd),

    /// Pick a random episode
    #[command(visible_alias = "r")]
    Random(RandomCmd),

    /// Play the episode with the given number
    #[command(visible_alias = "p")]
    Play(PlayCmd),

    /// Parse the catalog and report what it contains
    Check(CheckCmd),
}

/// List seasons
#[derive(Args, Debug)]
pub struct SeasonsCmd {}

/// List episodes of one season, or of all seasons
#[derive(Args, Debug)]
pub struct EpisodesCmd {
    /// Season label ("SEZON 2") or 1-based season position; omit for all
    pub season: Option<String>,
}

/// Search episodes
#[derive(Args, Debug)]
pub struct SearchCmd {
    /// Matches episode numbers containing it, or titles containing it
    #[arg(required = true)]
    pub query: String,

    /// Maximum number of results
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

/// Pick a random episode
#[derive(Args, Debug)]
pub struct RandomCmd {
    /// Open the picked episode in the player
    #[arg(long)]
    pub play: bool,
}

/// Play an episode
#[derive(Args, Debug)]
pub struct PlayCmd {
    /// Episode number as printed by `episodes` and `search` (1-based)
    #[arg(required = true)]
    pub number: usize,
}

/// Validate the catalog
#[derive(Args, Debug)]
pub struct CheckCmd {}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero", default)]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// One line of `seasons`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRow {
    pub label: String,
    pub episodes: usize,
}

/// One line of `episodes`, `search` and `random`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRow {
    /// 1-based position across all seasons
    pub number: usize,
    pub season: String,
    pub title: String,
    pub url: String,
}

impl std::fmt::Display for EpisodeRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:>4}. {}", self.number, self.title)
    }
}

/// Result of `check`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub path: PathBuf,
    pub seasons: usize,
    pub episodes: usize,
    /// Seasons that ended up without any episode
    pub empty_seasons: Vec<String>,
}

/// Result of `play` and `random --play`
#[derive(Debug, Serialize, Deserialize)]
pub struct PlayResponse {
    pub status: &'static str,
    pub player: String,
    pub episode: EpisodeRow,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print `data` as JSON, or `lines` for a terminal
    pub fn print<T, I>(&self, data: &T, lines: I) -> anyhow::Result<()>
    where
        T: Serialize,
        I: IntoIterator,
        I::Item: std::fmt::Display,
    {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            for line in lines {
                println!("{}", line);
            }
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_args_is_tui_mode() {
        let cli = Cli::parse_from::<_, &str>([]);
        assert!(!cli.is_cli_mode());
    }

    #[test]
    fn test_search_command() {
        let cli = Cli::parse_from(["sezontui", "search", "wigilia"]);
        assert!(cli.is_cli_mode());
        if let Some(Command::Search(cmd)) = cli.command {
            assert_eq!(cmd.query, "wigilia");
            assert!(cmd.limit.is_none());
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "sezontui",
            "--json",
            "--quiet",
            "-f",
            "/tmp/links.txt",
            "--player",
            "vlc",
            "seasons",
        ]);
        assert!(cli.json);
        assert!(cli.quiet);
        assert_eq!(cli.catalog, Some(PathBuf::from("/tmp/links.txt")));
        assert_eq!(cli.player, Some(PlayerChoice::Vlc));
    }

    #[test]
    fn test_play_requires_number() {
        assert!(Cli::try_parse_from(["sezontui", "play"]).is_err());
        assert!(Cli::try_parse_from(["sezontui", "play", "abc"]).is_err());
    }

    #[test]
    fn test_catalog_error_exit_codes() {
        assert_eq!(
            ExitCode::from(&CatalogError::SourceNotFound("x".into())),
            ExitCode::CatalogNotFound
        );
        assert_eq!(
            ExitCode::from(&CatalogError::EmptyCatalog),
            ExitCode::NothingToSelect
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::Error), 1);
        assert_eq!(i32::from(ExitCode::InvalidArgs), 2);
        assert_eq!(i32::from(ExitCode::CatalogNotFound), 3);
        assert_eq!(i32::from(ExitCode::CatalogReadError), 4);
        assert_eq!(i32::from(ExitCode::NothingToSelect), 5);
        assert_eq!(i32::from(ExitCode::PlayerFailed), 6);
    }

    #[test]
    fn test_episode_row_display() {
        let row = EpisodeRow {
            number: 7,
            season: "SEZON 1".into(),
            title: "Spadek".into(),
            url: "https://x/7.mp4".into(),
        };
        assert_eq!(row.to_string(), "   7. Spadek");
    }
}
