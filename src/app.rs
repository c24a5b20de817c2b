//! App state and core application logic
//!
//! Manages the screen state machine, the navigation stack and the lazily
//! loaded catalog. Key handling is synchronous: it mutates state and returns
//! an [`Action`] for the event loop to run against the media transport.

use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use crate::catalog::{Catalog, Episode};
use crate::config::Config;
use crate::models::{PlaybackState, PlaybackStatus};
use crate::stream::{MediaTransport, PlayerError};

/// Shown when the random pick has nothing to choose from
pub const NO_EPISODES_MSG: &str = "Brak odcinków do losowania.";

/// Shown in place of an empty search result
pub const NO_RESULTS_MSG: &str = "Brak wyników";

/// Prefix for the title of a randomly picked episode
pub const RANDOM_PREFIX: &str = "(Losowy) ";

// =============================================================================
// App State Enum
// =============================================================================

/// Application state enum representing current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Main menu
    #[default]
    Menu,
    /// Season list
    Seasons,
    /// Episodes of the season picked on the season list
    Episodes,
    /// Every episode, numbered across seasons
    AllEpisodes,
    /// Live search over numbers and titles
    Search,
    /// Now playing panel with transport controls
    Playing,
}

impl AppState {
    /// Screens that list catalog entries
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            AppState::Seasons | AppState::Episodes | AppState::AllEpisodes | AppState::Search
        )
    }
}

// =============================================================================
// Input Mode
// =============================================================================

/// Current input mode for keyboard handling
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Text input mode (search box focused)
    Editing,
}

// =============================================================================
// Main Menu
// =============================================================================

/// Entries of the main menu, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    AllEpisodes,
    Seasons,
    Random,
}

impl MenuItem {
    pub const ALL: [MenuItem; 3] = [MenuItem::AllEpisodes, MenuItem::Seasons, MenuItem::Random];

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::AllEpisodes => "WYBÓR ODCINKA",
            MenuItem::Seasons => "WYBÓR SEZONU",
            MenuItem::Random => "LOSOWY ODCINEK",
        }
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Side effect requested by a key press, executed by the event loop
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    /// Open a stream, replacing the current one
    Play { url: String, title: String },
    TogglePause,
    /// Close the current stream (no-op if nothing is open)
    Stop,
    /// Relative seek in seconds
    Seek(f64),
    /// Seek to a fraction of the stream
    SeekFraction(f64),
    /// Relative volume change in percent
    Volume(i16),
    ToggleFullscreen,
}

// =============================================================================
// Selection State (per-view)
// =============================================================================

/// Selection state for list views
#[derive(Debug, Clone, Default)]
pub struct ListState {
    /// Currently selected index
    pub selected: usize,
    /// Total number of items
    pub len: usize,
}

impl ListState {
    pub fn new(len: usize) -> Self {
        Self { selected: 0, len }
    }

    /// Move selection up
    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Move selection down
    pub fn down(&mut self) {
        if self.len > 0 && self.selected < self.len - 1 {
            self.selected += 1;
        }
    }

    /// Move selection up by a page
    pub fn page_up(&mut self, page_size: usize) {
        self.selected = self.selected.saturating_sub(page_size);
    }

    /// Move selection down by a page
    pub fn page_down(&mut self, page_size: usize) {
        if self.len > 0 {
            self.selected = (self.selected + page_size).min(self.len - 1);
        }
    }

    /// Jump to first item
    pub fn first(&mut self) {
        self.selected = 0;
    }

    /// Jump to last item
    pub fn last(&mut self) {
        if self.len > 0 {
            self.selected = self.len - 1;
        }
    }

    /// First row to draw so that the selection fits in `height` rows
    pub fn offset(&self, height: usize) -> usize {
        if height == 0 {
            return self.selected;
        }
        (self.selected + 1).saturating_sub(height)
    }

    /// Reset to a new item count with the first item selected
    pub fn reset(&mut self, len: usize) {
        self.selected = 0;
        self.len = len;
    }

    fn handle_nav_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.up(),
            KeyCode::Down | KeyCode::Char('j') => self.down(),
            KeyCode::PageUp => self.page_up(10),
            KeyCode::PageDown => self.page_down(10),
            KeyCode::Home => self.first(),
            KeyCode::End => self.last(),
            _ => return false,
        }
        true
    }
}

// =============================================================================
// View-Specific State
// =============================================================================

/// Search view state
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// Search query
    pub query: String,
    /// Cursor position in query, in characters
    pub cursor: usize,
    /// Flattened episode numbers of the hits
    pub results: Vec<usize>,
    /// Results list state
    pub list: ListState,
}

impl SearchState {
    fn byte_index(&self, char_idx: usize) -> usize {
        self.query
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.query.len())
    }

    fn char_len(&self) -> usize {
        self.query.chars().count()
    }

    /// Insert character at cursor
    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.query.insert(at, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.query.remove(at);
        }
    }

    /// Delete character at cursor
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.query.remove(at);
        }
    }

    /// Move cursor left
    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right
    pub fn cursor_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Move cursor to start
    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to end
    pub fn cursor_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Clear query
    pub fn clear(&mut self) {
        self.query.clear();
        self.cursor = 0;
    }

    /// Query split at the cursor, for drawing
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.query.split_at(self.byte_index(self.cursor))
    }

    /// Set results and update list state
    pub fn set_results(&mut self, results: Vec<usize>) {
        self.list.reset(results.len());
        self.results = results;
    }

    /// Episode number of the selected hit
    pub fn selected_number(&self) -> Option<usize> {
        self.results.get(self.list.selected).copied()
    }
}

/// Now playing state
#[derive(Debug, Clone)]
pub struct PlayingState {
    /// Title as shown, including the random prefix
    pub title: String,
    pub url: String,
    /// Last polled player status
    pub status: PlaybackStatus,
    /// Last key press, for hiding the controls in fullscreen
    pub last_activity: Instant,
}

impl Default for PlayingState {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            status: PlaybackStatus::default(),
            last_activity: Instant::now(),
        }
    }
}

// =============================================================================
// Main Application State
// =============================================================================

/// Main application state
#[derive(Debug)]
pub struct App {
    /// Current state/screen
    pub state: AppState,
    /// Navigation history stack
    pub nav_stack: Vec<AppState>,
    /// Whether the app is running
    pub running: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Global error message
    pub error: Option<String>,

    /// Where the catalog is read from
    pub catalog_path: PathBuf,
    /// Loaded on first use; stays `None` after a failed load
    pub catalog: Option<Catalog>,
    pub config: Config,

    // View-specific states
    pub menu: ListState,
    pub seasons: ListState,
    /// Label of the season shown on the episode screen
    pub current_season: Option<String>,
    pub episodes: ListState,
    pub all_episodes: ListState,
    pub search: SearchState,
    pub playing: PlayingState,
}

impl App {
    /// Create an app that reads `catalog_path` on first use
    pub fn new(config: Config, catalog_path: PathBuf) -> Self {
        Self {
            state: AppState::Menu,
            nav_stack: Vec::new(),
            running: true,
            input_mode: InputMode::Normal,
            error: None,

            catalog_path,
            catalog: None,
            config,

            menu: ListState::new(MenuItem::ALL.len()),
            seasons: ListState::default(),
            current_season: None,
            episodes: ListState::default(),
            all_episodes: ListState::default(),
            search: SearchState::default(),
            playing: PlayingState::default(),
        }
    }

    /// Create an app around an already parsed catalog
    pub fn with_catalog(catalog: Catalog) -> Self {
        let mut app = Self::new(Config::default(), PathBuf::new());
        app.catalog = Some(catalog);
        app
    }

    /// Load the catalog if it is not loaded yet.
    ///
    /// Failures are shown as an error and leave the catalog unloaded, so the
    /// next call tries again.
    pub fn ensure_catalog(&mut self) -> bool {
        if self.catalog.is_some() {
            return true;
        }
        match Catalog::load(&self.catalog_path) {
            Ok(catalog) => {
                self.catalog = Some(catalog);
                true
            }
            Err(e) => {
                warn!(error = %e, "catalog load failed");
                self.set_error(e.to_string());
                false
            }
        }
    }

    /// Navigate to a new state, pushing current to stack
    pub fn navigate(&mut self, state: AppState) {
        // Don't push if going to same state
        if self.state != state {
            self.nav_stack.push(self.state);
            self.state = state;
        }
        self.input_mode = InputMode::Normal;
    }

    /// Go back to previous state
    pub fn back(&mut self) -> Action {
        // If in editing mode, exit editing first
        if self.input_mode == InputMode::Editing {
            self.input_mode = InputMode::Normal;
            return Action::None;
        }

        let leaving_player = self.state == AppState::Playing;
        if let Some(prev) = self.nav_stack.pop() {
            self.state = prev;
        }
        if leaving_player {
            Action::Stop
        } else {
            Action::None
        }
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Clear error message
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Set error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error = Some(msg.into());
    }

    // -------------------------------------------------------------------------
    // Catalog views
    // -------------------------------------------------------------------------

    /// Episodes of `season` with their flattened numbers
    pub fn season_episodes(&self, season: &str) -> Vec<(usize, &Episode)> {
        let Some(catalog) = &self.catalog else {
            return Vec::new();
        };
        let mut first = 1;
        for entry in catalog.season_entries() {
            if entry.label() == season {
                return entry
                    .episodes()
                    .iter()
                    .enumerate()
                    .map(|(i, ep)| (first + i, ep))
                    .collect();
            }
            first += entry.episodes().len();
        }
        Vec::new()
    }

    /// Rows of the current list screen with their flattened numbers
    pub fn visible_episodes(&self) -> Vec<(usize, &Episode)> {
        let Some(catalog) = &self.catalog else {
            return Vec::new();
        };
        match self.state {
            AppState::Episodes => self
                .current_season
                .as_deref()
                .map(|s| self.season_episodes(s))
                .unwrap_or_default(),
            AppState::AllEpisodes => catalog.numbered().collect(),
            AppState::Search => self
                .search
                .results
                .iter()
                .filter_map(|&n| catalog.episode_at(n).map(|ep| (n, ep)))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn episode_list_mut(&mut self) -> Option<&mut ListState> {
        match self.state {
            AppState::Episodes => Some(&mut self.episodes),
            AppState::AllEpisodes => Some(&mut self.all_episodes),
            AppState::Search => Some(&mut self.search.list),
            _ => None,
        }
    }

    fn selected_episode(&self) -> Option<&Episode> {
        let selected = match self.state {
            AppState::Episodes => self.episodes.selected,
            AppState::AllEpisodes => self.all_episodes.selected,
            AppState::Search => self.search.list.selected,
            _ => return None,
        };
        self.visible_episodes()
            .into_iter()
            .nth(selected)
            .map(|(_, ep)| ep)
    }

    /// Re-run the search for the current query
    pub fn refresh_search(&mut self) {
        let results = self
            .catalog
            .as_ref()
            .map(|c| {
                c.search_numbered(&self.search.query)
                    .into_iter()
                    .map(|(n, _)| n)
                    .collect()
            })
            .unwrap_or_default();
        self.search.set_results(results);
    }

    // -------------------------------------------------------------------------
    // Screen transitions
    // -------------------------------------------------------------------------

    /// Go to a list screen; any playback stops
    fn open_list(&mut self, state: AppState) -> Action {
        if !self.ensure_catalog() {
            return Action::None;
        }
        let len = match state {
            AppState::Seasons => self.catalog.as_ref().map(Catalog::season_count),
            AppState::AllEpisodes => self.catalog.as_ref().map(Catalog::episode_count),
            AppState::Episodes => Some(
                self.current_season
                    .as_deref()
                    .map(|s| self.season_episodes(s).len())
                    .unwrap_or(0),
            ),
            _ => None,
        };
        match state {
            AppState::Seasons => self.seasons.reset(len.unwrap_or(0)),
            AppState::AllEpisodes => self.all_episodes.reset(len.unwrap_or(0)),
            AppState::Episodes => self.episodes.reset(len.unwrap_or(0)),
            _ => {}
        }
        self.navigate(state);
        Action::Stop
    }

    /// Focus the search box, opening the search screen if needed
    pub fn focus_search(&mut self) -> Action {
        if !self.ensure_catalog() {
            return Action::None;
        }
        let action = if self.state != AppState::Search {
            self.navigate(AppState::Search);
            self.refresh_search();
            Action::Stop
        } else {
            Action::None
        };
        self.input_mode = InputMode::Editing;
        action
    }

    /// Switch to the player screen for `episode`
    fn play(&mut self, title: String, url: String) -> Action {
        info!(%title, %url, "play requested");
        self.playing = PlayingState {
            title: title.clone(),
            url: url.clone(),
            status: PlaybackStatus::loading(title.clone()),
            last_activity: Instant::now(),
        };
        self.navigate(AppState::Playing);
        Action::Play { url, title }
    }

    fn play_random(&mut self) -> Action {
        if !self.ensure_catalog() {
            return Action::None;
        }
        let picked = self
            .catalog
            .as_ref()
            .and_then(|c| c.random_episode())
            .cloned();
        match picked {
            Some(ep) => self.play(format!("{}{}", RANDOM_PREFIX, ep.title), ep.url),
            None => {
                self.set_error(NO_EPISODES_MSG);
                Action::None
            }
        }
    }

    // -------------------------------------------------------------------------
    // Playback feedback from the event loop
    // -------------------------------------------------------------------------

    /// Store a freshly polled status
    pub fn update_status(&mut self, status: PlaybackStatus) {
        self.playing.status = status;
    }

    /// The transport refused to open the stream
    pub fn playback_failed(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        self.playing.status.state = PlaybackState::Error(msg.clone());
        self.set_error(msg);
    }

    /// Whether the controls hint should be drawn at `now`
    pub fn controls_visible(&self, now: Instant) -> bool {
        !self.playing.status.fullscreen
            || now.duration_since(self.playing.last_activity) < self.config.overlay_timeout()
    }

    // -------------------------------------------------------------------------
    // Keyboard Event Handling
    // -------------------------------------------------------------------------

    /// Handle keyboard event, returning the side effect to run
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        // Clear error on any keypress
        self.error = None;
        self.playing.last_activity = Instant::now();

        // Global quit shortcut (Ctrl+C or q in normal mode)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return Action::None;
        }

        if self.input_mode == InputMode::Editing {
            self.handle_editing_key(key)
        } else {
            self.handle_normal_key(key)
        }
    }

    /// Handle keys in editing (text input) mode; every edit re-runs the search
    fn handle_editing_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                return Action::None;
            }
            KeyCode::Up => {
                self.search.list.up();
                return Action::None;
            }
            KeyCode::Down => {
                self.search.list.down();
                return Action::None;
            }
            KeyCode::Char(c) => self.search.insert(c),
            KeyCode::Backspace => self.search.backspace(),
            KeyCode::Delete => self.search.delete(),
            KeyCode::Left => self.search.cursor_left(),
            KeyCode::Right => self.search.cursor_right(),
            KeyCode::Home => self.search.cursor_home(),
            KeyCode::End => self.search.cursor_end(),
            _ => return Action::None,
        }
        self.refresh_search();
        Action::None
    }

    /// Handle keys in normal navigation mode
    fn handle_normal_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') => {
                self.quit();
                return Action::None;
            }
            KeyCode::Char('/') if self.state != AppState::Playing => {
                return self.focus_search();
            }
            KeyCode::Esc | KeyCode::Backspace => {
                return self.back();
            }
            _ => {}
        }

        match self.state {
            AppState::Menu => self.handle_menu_key(key),
            AppState::Seasons => self.handle_seasons_key(key),
            AppState::Episodes | AppState::AllEpisodes | AppState::Search => {
                self.handle_episode_list_key(key)
            }
            AppState::Playing => self.handle_playing_key(key),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> Action {
        if self.menu.handle_nav_key(key.code) {
            return Action::None;
        }
        let item = match key.code {
            KeyCode::Enter => MenuItem::ALL[self.menu.selected],
            KeyCode::Char('1') => MenuItem::AllEpisodes,
            KeyCode::Char('2') => MenuItem::Seasons,
            KeyCode::Char('3') | KeyCode::Char('r') => MenuItem::Random,
            _ => return Action::None,
        };
        match item {
            MenuItem::AllEpisodes => self.open_list(AppState::AllEpisodes),
            MenuItem::Seasons => self.open_list(AppState::Seasons),
            MenuItem::Random => self.play_random(),
        }
    }

    fn handle_seasons_key(&mut self, key: KeyEvent) -> Action {
        if self.seasons.handle_nav_key(key.code) {
            return Action::None;
        }
        match key.code {
            KeyCode::Enter => {
                let label = self
                    .catalog
                    .as_ref()
                    .and_then(|c| c.seasons().nth(self.seasons.selected))
                    .map(str::to_string);
                match label {
                    Some(label) => {
                        self.current_season = Some(label);
                        self.open_list(AppState::Episodes)
                    }
                    None => Action::None,
                }
            }
            KeyCode::Char('r') => self.play_random(),
            _ => Action::None,
        }
    }

    fn handle_episode_list_key(&mut self, key: KeyEvent) -> Action {
        if let Some(list) = self.episode_list_mut() {
            if list.handle_nav_key(key.code) {
                return Action::None;
            }
        }
        match key.code {
            KeyCode::Enter => match self.selected_episode().cloned() {
                Some(ep) => self.play(ep.title, ep.url),
                None => Action::None,
            },
            KeyCode::Char('r') => self.play_random(),
            _ => Action::None,
        }
    }

    fn handle_playing_key(&mut self, key: KeyEvent) -> Action {
        let seek = self.config.seek_step_secs;
        let volume = self.config.volume_step;
        match key.code {
            KeyCode::Char(' ') | KeyCode::Char('p') => Action::TogglePause,
            KeyCode::Char('s') => Action::Stop,
            KeyCode::Left => Action::Seek(-seek),
            KeyCode::Right => Action::Seek(seek),
            KeyCode::Up => Action::Volume(volume),
            KeyCode::Down => Action::Volume(-volume),
            KeyCode::Char('f') => Action::ToggleFullscreen,
            KeyCode::Char(c @ '0'..='9') => {
                let tenth = c.to_digit(10).unwrap_or(0);
                Action::SeekFraction(f64::from(tenth) / 10.0)
            }
            KeyCode::Char('r') => self.play_random(),
            _ => Action::None,
        }
    }
}

// =============================================================================
// Action Dispatch
// =============================================================================

/// Run `action` against the player and fold the outcome back into `app`
pub async fn dispatch<T: MediaTransport>(action: Action, app: &mut App, transport: &mut T) {
    let opening = matches!(action, Action::Play { .. });
    let result = match action {
        Action::None => return,
        Action::Play { url, title } => transport.open(&url, &title).await,
        Action::TogglePause => transport.toggle_pause().await,
        Action::Stop => transport.stop().await,
        Action::Seek(secs) => transport.seek_relative(secs).await,
        Action::SeekFraction(fraction) => transport.seek_fraction(fraction).await,
        Action::Volume(delta) => transport.adjust_volume(delta).await,
        Action::ToggleFullscreen => transport.toggle_fullscreen().await,
    };

    match result {
        Ok(()) => {
            let status = transport.poll_status().await;
            app.update_status(status);
        }
        // Controls pressed after the player closed
        Err(PlayerError::NotPlaying) => {}
        Err(e) if opening => {
            warn!(error = %e, "could not open stream");
            app.playback_failed(e.to_string());
        }
        Err(e) => {
            warn!(error = %e, "player command failed");
            app.set_error(e.to_string());
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
