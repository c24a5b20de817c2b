//! Now Playing panel
//!
//! Title, player state, seek bar, volume and the controls hint. In fullscreen
//! the hint hides after a few seconds without input.

use std::time::Instant;

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
};

use crate::app::App;
use crate::models::{PlaybackState, VOLUME_MAX};
use crate::ui::Theme;

fn state_style(state: &PlaybackState) -> Style {
    match state {
        PlaybackState::Error(_) => Theme::error(),
        PlaybackState::Playing => Theme::title(),
        _ => Theme::text(),
    }
}

/// Controls hint, one line
pub fn controls_hint() -> Line<'static> {
    Line::from(vec![
        Span::styled(" SPACE ", Theme::keybind()),
        Span::styled("pauza  ", Theme::dimmed()),
        Span::styled(" S ", Theme::keybind()),
        Span::styled("stop  ", Theme::dimmed()),
        Span::styled(" ←→ ", Theme::keybind()),
        Span::styled("przewiń  ", Theme::dimmed()),
        Span::styled(" ↑↓ ", Theme::keybind()),
        Span::styled("głośność  ", Theme::dimmed()),
        Span::styled(" F ", Theme::keybind()),
        Span::styled("pełny ekran  ", Theme::dimmed()),
        Span::styled(" 0-9 ", Theme::keybind()),
        Span::styled("skok  ", Theme::dimmed()),
        Span::styled(" ESC ", Theme::keybind()),
        Span::styled("lista", Theme::dimmed()),
    ])
}

pub fn render_playing(frame: &mut Frame, area: Rect, app: &App) {
    render_playing_at(frame, area, app, Instant::now());
}

/// [`render_playing`] with an explicit clock for the overlay timeout
pub fn render_playing_at(frame: &mut Frame, area: Rect, app: &App, now: Instant) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border_focused())
        .title(Span::styled(" ▶ ODTWARZANIE ", Theme::title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let status = &app.playing.status;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // padding
            Constraint::Length(1), // title
            Constraint::Length(1), // state
            Constraint::Length(1), // padding
            Constraint::Length(1), // seek bar
            Constraint::Length(1), // time + volume
            Constraint::Min(0),
            Constraint::Length(1), // controls
        ])
        .split(inner);

    let title = Paragraph::new(Span::styled(app.playing.title.clone(), Theme::title()))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[1]);

    let mut state_line = vec![Span::styled(status.state.to_string(), state_style(&status.state))];
    if status.fullscreen {
        state_line.push(Span::styled("  [pełny ekran]", Theme::dimmed()));
    }
    frame.render_widget(
        Paragraph::new(Line::from(state_line)).alignment(Alignment::Center),
        chunks[2],
    );

    let gauge = Gauge::default()
        .gauge_style(Theme::progress_bar())
        .ratio(status.progress())
        .label(Span::styled(
            format!("{:.0}%", status.progress() * 100.0),
            Theme::title(),
        ));
    frame.render_widget(gauge, chunks[4]);

    let time = Line::from(vec![
        Span::styled(
            format!("{} / {}", status.format_position(), status.format_duration()),
            Theme::text(),
        ),
        Span::styled(
            format!("   głośność {} / {}%", status.format_volume(), VOLUME_MAX),
            Theme::dimmed(),
        ),
    ]);
    frame.render_widget(Paragraph::new(time).alignment(Alignment::Center), chunks[5]);

    if app.controls_visible(now) {
        frame.render_widget(
            Paragraph::new(controls_hint()).alignment(Alignment::Center),
            chunks[7],
        );
    }
}
