//! CLI Command Handlers
//!
//! Each handler loads the catalog through [`Context`], runs one query and
//! prints the result through [`Output`], returning the process exit code.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::cli::{
    CheckCmd, CheckReport, Cli, EpisodeRow, EpisodesCmd, ExitCode, Output, PlayCmd, PlayResponse,
    RandomCmd, SearchCmd, SeasonRow, SeasonsCmd,
};
use crate::config::Config;
use crate::models::PlaybackState;
use crate::stream::{MediaTransport, PlayerType, Transport};

// =============================================================================
// Shared Context
// =============================================================================

/// Settings resolved once from flags, environment and config file
#[derive(Debug, Clone)]
pub struct Context {
    pub catalog_path: PathBuf,
    pub player: PlayerType,
    pub config: Config,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        let config = match &cli.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        };
        Self::new(config, cli.catalog.as_deref(), cli.player.map(Into::into))
    }

    pub fn new(config: Config, catalog_flag: Option<&Path>, player: Option<PlayerType>) -> Self {
        Self {
            catalog_path: config.resolve_catalog_path(catalog_flag),
            player: player.unwrap_or_else(|| config.player_type()),
            config,
        }
    }

    /// Load the catalog, reporting failures through `output`
    fn load_catalog(&self, output: &Output) -> Result<Catalog, ExitCode> {
        Catalog::load(&self.catalog_path).map_err(|e| output.error(e.to_string(), (&e).into()))
    }
}

// =============================================================================
// Row Builders
// =============================================================================

/// Season labels with episode counts, in header order
pub fn season_rows(catalog: &Catalog) -> Vec<SeasonRow> {
    catalog
        .season_entries()
        .iter()
        .map(|s| SeasonRow {
            label: s.label().to_string(),
            episodes: s.episodes().len(),
        })
        .collect()
}

/// Every episode with its global number and season
pub fn episode_rows(catalog: &Catalog) -> Vec<EpisodeRow> {
    catalog
        .season_entries()
        .iter()
        .flat_map(|s| s.episodes().iter().map(move |ep| (s.label(), ep)))
        .enumerate()
        .map(|(i, (season, ep))| EpisodeRow {
            number: i + 1,
            season: season.to_string(),
            title: ep.title.clone(),
            url: ep.url.clone(),
        })
        .collect()
}

/// Uniformly random row over flattened positions; duplicated entries are
/// distinct picks with their own numbers
pub fn random_row_with<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Option<EpisodeRow> {
    episode_rows(catalog).choose(rng).cloned()
}

/// Resolve a season argument: exact label, then case-insensitive label,
/// then 1-based position
pub fn find_season<'a>(catalog: &'a Catalog, arg: &str) -> Option<&'a str> {
    let arg = arg.trim();
    let labels: Vec<&str> = catalog.seasons().collect();
    labels
        .iter()
        .find(|label| **label == arg)
        .or_else(|| {
            let wanted = arg.to_lowercase();
            labels.iter().find(|label| label.to_lowercase() == wanted)
        })
        .or_else(|| {
            arg.parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|idx| labels.get(idx))
        })
        .copied()
}

/// Search hits as rows, in catalog order
pub fn search_rows(catalog: &Catalog, query: &str, limit: Option<usize>) -> Vec<EpisodeRow> {
    let hits: HashSet<usize> = catalog
        .search_numbered(query)
        .into_iter()
        .map(|(number, _)| number)
        .collect();

    let mut rows: Vec<EpisodeRow> = episode_rows(catalog)
        .into_iter()
        .filter(|row| hits.contains(&row.number))
        .collect();
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}

pub fn check_report(path: &Path, catalog: &Catalog) -> CheckReport {
    CheckReport {
        path: path.to_path_buf(),
        seasons: catalog.season_count(),
        episodes: catalog.episode_count(),
        empty_seasons: catalog
            .season_entries()
            .iter()
            .filter(|s| s.episodes().is_empty())
            .map(|s| s.label().to_string())
            .collect(),
    }
}

fn print_or_fail<T, I>(output: &Output, data: &T, lines: I) -> ExitCode
where
    T: serde::Serialize,
    I: IntoIterator,
    I::Item: std::fmt::Display,
{
    match output.print(data, lines) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
    }
}

// =============================================================================
// Seasons / Episodes / Search
// =============================================================================

pub async fn seasons_cmd(_cmd: SeasonsCmd, ctx: &Context, output: &Output) -> ExitCode {
    let catalog = match ctx.load_catalog(output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let rows = season_rows(&catalog);
    let lines: Vec<String> = rows
        .iter()
        .map(|r| format!("{} ({})", r.label, r.episodes))
        .collect();
    print_or_fail(output, &rows, lines)
}

pub async fn episodes_cmd(cmd: EpisodesCmd, ctx: &Context, output: &Output) -> ExitCode {
    let catalog = match ctx.load_catalog(output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let mut rows = episode_rows(&catalog);
    if let Some(arg) = cmd.season.as_deref() {
        let Some(label) = find_season(&catalog, arg) else {
            return output.error(format!("Unknown season: {}", arg), ExitCode::InvalidArgs);
        };
        rows.retain(|row| row.season == label);
    }

    if rows.is_empty() {
        output.info("No episodes");
    }
    print_or_fail(output, &rows, &rows)
}

pub async fn search_cmd(cmd: SearchCmd, ctx: &Context, output: &Output) -> ExitCode {
    let catalog = match ctx.load_catalog(output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    output.info(format!("Searching for: {}", cmd.query));
    let rows = search_rows(&catalog, &cmd.query, cmd.limit);
    if rows.is_empty() {
        output.info("No results");
    }
    print_or_fail(output, &rows, &rows)
}

// =============================================================================
// Random / Play
// =============================================================================

pub async fn random_cmd(cmd: RandomCmd, ctx: &Context, output: &Output) -> ExitCode {
    let catalog = match ctx.load_catalog(output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let Some(row) = random_row_with(&catalog, &mut rand::rng()) else {
        return output.error("No episodes to pick from", ExitCode::NothingToSelect);
    };

    if cmd.play {
        play_row(row, ctx, output).await
    } else {
        let line = row.to_string();
        print_or_fail(output, &row, [line])
    }
}

pub async fn play_cmd(cmd: PlayCmd, ctx: &Context, output: &Output) -> ExitCode {
    let catalog = match ctx.load_catalog(output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let total = catalog.episode_count();
    let Some(row) = episode_rows(&catalog)
        .into_iter()
        .find(|row| row.number == cmd.number)
    else {
        return output.error(
            format!("No episode {} (catalog has {})", cmd.number, total),
            ExitCode::InvalidArgs,
        );
    };

    play_row(row, ctx, output).await
}

/// Open `row` in the configured player and wait for the window to close
async fn play_row(row: EpisodeRow, ctx: &Context, output: &Output) -> ExitCode {
    if !ctx.player.is_available().await {
        return output.error(
            format!("Player '{}' not found. Install it first.", ctx.player.command()),
            ExitCode::PlayerFailed,
        );
    }

    let mut transport = Transport::for_player(ctx.player);
    output.info(format!("Playing {} in {}...", row.title, ctx.player));
    if let Err(e) = transport.open(&row.url, &row.title).await {
        return output.error(format!("Failed to start player: {}", e), (&e).into());
    }
    info!(number = row.number, title = %row.title, "playing episode");

    let response = PlayResponse {
        status: "playing",
        player: ctx.player.to_string(),
        episode: row,
    };
    let line = format!("▶ {}", response.episode);
    let code = print_or_fail(output, &response, [line]);
    if code != ExitCode::Success {
        let _ = transport.stop().await;
        return code;
    }

    wait_until_closed(&mut transport, ctx.config.poll_interval(), output).await
}

/// Poll until the player exits; Ctrl+C closes it
async fn wait_until_closed(
    transport: &mut Transport,
    interval: Duration,
    output: &Output,
) -> ExitCode {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                if let Err(e) = transport.stop().await {
                    warn!(error = %e, "failed to stop player");
                }
                return ExitCode::Success;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        let status = transport.poll_status().await;
        if let PlaybackState::Error(msg) = &status.state {
            let _ = transport.stop().await;
            return output.error(msg.clone(), ExitCode::PlayerFailed);
        }
        if !transport.is_active() {
            output.info("Player closed");
            return ExitCode::Success;
        }
    }
}

// =============================================================================
// Check Command
// =============================================================================

pub async fn check_cmd(_cmd: CheckCmd, ctx: &Context, output: &Output) -> ExitCode {
    let catalog = match ctx.load_catalog(output) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let report = check_report(&ctx.catalog_path, &catalog);
    let mut lines = vec![
        format!("{}", report.path.display()),
        format!("  seasons:  {}", report.seasons),
        format!("  episodes: {}", report.episodes),
    ];
    for label in &report.empty_seasons {
        lines.push(format!("  warning: {} has no episodes", label));
    }
    print_or_fail(output, &report, lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::parse(
            "SEZON 1\nPilot\nhttps://x/1\nSpadek\nhttps://x/2\nSezon 2\nWigilia\nhttps://x/3\nSEZON 3\n",
        )
        .unwrap()
    }

    #[test]
    fn test_episode_rows_number_across_seasons() {
        let rows = episode_rows(&catalog());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].number, 3);
        assert_eq!(rows[2].season, "Sezon 2");
        assert_eq!(rows[2].title, "Wigilia");
    }

    #[test]
    fn test_find_season_by_label_case_and_position() {
        let catalog = catalog();
        assert_eq!(find_season(&catalog, "SEZON 1"), Some("SEZON 1"));
        assert_eq!(find_season(&catalog, "sezon 2"), Some("Sezon 2"));
        assert_eq!(find_season(&catalog, "3"), Some("SEZON 3"));
        assert_eq!(find_season(&catalog, "0"), None);
        assert_eq!(find_season(&catalog, "SEZON 9"), None);
    }

    #[test]
    fn test_check_report_lists_empty_seasons() {
        let report = check_report(Path::new("links.txt"), &catalog());
        assert_eq!(report.seasons, 3);
        assert_eq!(report.episodes, 3);
        assert_eq!(report.empty_seasons, vec!["SEZON 3".to_string()]);
    }

    #[test]
    fn test_context_player_override() {
        let ctx = Context::new(Config::default(), None, Some(PlayerType::Vlc));
        assert_eq!(ctx.player, PlayerType::Vlc);
        let ctx = Context::new(Config::default(), Some(Path::new("a.txt")), None);
        assert_eq!(ctx.player, PlayerType::Mpv);
        assert_eq!(ctx.catalog_path, PathBuf::from("a.txt"));
    }
}
