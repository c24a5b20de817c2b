//! Terminal UI components
//!
//! Built with ratatui. Every screen is a free function drawing from `&App`,
//! so rendering never mutates state.

pub mod browser;
pub mod player;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, InputMode};

/// Main render function - dispatches to view-specific renderers
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    frame.render_widget(Clear, area);
    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .style(Theme::panel()),
        area,
    );
    let inner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };

    // Main layout: header, content, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(inner);

    render_header(frame, chunks[0]);
    render_content(frame, chunks[1], app);
    render_status_bar(frame, chunks[2], app);

    if let Some(ref error) = app.error {
        render_error_popup(frame, area, error);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let logo = Paragraph::new(Line::from(vec![
        Span::styled(
            "SEZON",
            Style::default()
                .fg(Theme::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "TUI",
            Style::default()
                .fg(Theme::HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border()),
    );
    frame.render_widget(logo, area);
}

fn render_content(frame: &mut Frame, area: Rect, app: &App) {
    match app.state {
        AppState::Menu => browser::render_menu(frame, area, app),
        AppState::Seasons => browser::render_seasons(frame, area, app),
        AppState::Episodes | AppState::AllEpisodes => browser::render_episodes(frame, area, app),
        AppState::Search => browser::render_search(frame, area, app),
        AppState::Playing => player::render_playing(frame, area, app),
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mode_indicator = match app.input_mode {
        InputMode::Normal => Span::styled(
            " NORMAL ",
            Style::default().fg(Theme::BACKGROUND).bg(Theme::PRIMARY),
        ),
        InputMode::Editing => Span::styled(
            " SZUKAJ ",
            Style::default().fg(Theme::BACKGROUND).bg(Theme::HIGHLIGHT),
        ),
    };

    let state_indicator = Span::styled(
        format!(" {} ", format!("{:?}", app.state).to_uppercase()),
        Style::default().fg(Theme::HIGHLIGHT),
    );

    let catalog_indicator = match &app.catalog {
        Some(c) => Span::styled(
            format!(" {} sez. / {} odc. ", c.season_count(), c.episode_count()),
            Theme::status_bar(),
        ),
        None => Span::styled(" katalog nie wczytany ", Theme::status_bar()),
    };

    let help = if app.state.is_list() {
        " q:wyjście  /:szukaj  ↵:odtwórz  r:losowy  ESC:wstecz "
    } else {
        " q:wyjście  /:szukaj  ESC:wstecz "
    };

    let status_line = Line::from(vec![
        mode_indicator,
        state_indicator,
        catalog_indicator,
        Span::raw(" │ "),
        Span::styled(help, Theme::status_bar()),
    ]);

    let status = Paragraph::new(status_line).style(Theme::status_bar());
    frame.render_widget(status, area);
}

/// Render error popup overlay
fn render_error_popup(frame: &mut Frame, area: Rect, error: &str) {
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 6.min(area.height);

    let popup_area = Rect {
        x: area.x + (area.width.saturating_sub(popup_width)) / 2,
        y: area.y + (area.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let error_block = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(error.to_string(), Theme::error())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Theme::error())
            .title(Span::styled(" ✗ BŁĄD ", Theme::error()))
            .style(Style::default().bg(Theme::BACKGROUND)),
    );

    frame.render_widget(error_block, popup_area);
}
