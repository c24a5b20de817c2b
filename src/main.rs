//! SezonTUI - terminal browser for a seasonal episode catalog
//!
//! Reads a plain-text catalog of "SEZON n" headers, titles and links, and
//! plays episodes in an external player.
//!
//! # Usage
//!
//! ```bash
//! # Launch interactive TUI
//! sezontui
//!
//! # CLI mode (for scripts)
//! sezontui seasons
//! sezontui search wigilia --json
//! sezontui random --play
//! ```

use std::io::{stdout, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use sezontui::app::{self, App};
use sezontui::cli::{Cli, Command, ExitCode, Output};
use sezontui::commands::{self, Context};
use sezontui::stream::{MediaTransport, Transport};
use sezontui::ui;

/// Terminal type alias for convenience
type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Environment variable holding the log filter
const LOG_ENV: &str = "SEZONTUI_LOG";

#[tokio::main]
async fn main() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so logs always go to a file.
    // Returning from main drops the guard, which flushes the writer.
    let _guard = init_logging();

    if cli.is_cli_mode() {
        Ok(run_cli(cli).await.into())
    } else {
        let ctx = Context::from_cli(&cli);
        run_tui(ctx).await?;
        Ok(std::process::ExitCode::SUCCESS)
    }
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("sezontui")
        .join("logs")
}

/// Daily rolling log file; `None` when the directory can't be created
fn init_logging() -> Option<WorkerGuard> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir).ok()?;

    let file_appender = tracing_appender::rolling::daily(&dir, "sezontui.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("sezontui=info")),
        )
        .with_ansi(false)
        .with_target(false)
        .init();

    Some(guard)
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);
    let ctx = Context::from_cli(&cli);
    info!(catalog = %ctx.catalog_path.display(), player = %ctx.player, "cli mode");

    match cli.command {
        Some(Command::Seasons(cmd)) => commands::seasons_cmd(cmd, &ctx, &output).await,
        Some(Command::Episodes(cmd)) => commands::episodes_cmd(cmd, &ctx, &output).await,
        Some(Command::Search(cmd)) => commands::search_cmd(cmd, &ctx, &output).await,
        Some(Command::Random(cmd)) => commands::random_cmd(cmd, &ctx, &output).await,
        Some(Command::Play(cmd)) => commands::play_cmd(cmd, &ctx, &output).await,
        Some(Command::Check(cmd)) => commands::check_cmd(cmd, &ctx, &output).await,
        // Handled by the is_cli_mode check
        None => ExitCode::Success,
    }
}

// =============================================================================
// TUI Mode
// =============================================================================

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run interactive TUI
async fn run_tui(ctx: Context) -> Result<()> {
    info!(catalog = %ctx.catalog_path.display(), player = %ctx.player, "tui mode");

    let mut transport = Transport::for_player(ctx.player);
    let mut app = App::new(ctx.config, ctx.catalog_path);

    let mut terminal = init_terminal()?;
    let result = run_event_loop(&mut terminal, &mut app, &mut transport).await;

    // Never leave a player window behind
    if let Err(e) = transport.stop().await {
        warn!(error = %e, "player did not stop on exit");
    }

    // Always restore terminal, even on error
    restore_terminal(&mut terminal)?;

    result
}

/// Main event loop - handles input, drives the player, renders UI
async fn run_event_loop(terminal: &mut Tui, app: &mut App, transport: &mut Transport) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(100);

    let poll_every = app.config.poll_interval();
    let mut last_poll = Instant::now();

    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (ignore releases on Windows)
                if key.kind == KeyEventKind::Press {
                    let action = app.handle_key(key);
                    app::dispatch(action, app, transport).await;
                }
            }
        }

        if transport.is_active() && last_poll.elapsed() >= poll_every {
            last_poll = Instant::now();
            let status = transport.poll_status().await;
            app.update_status(status);
        }
    }

    Ok(())
}
