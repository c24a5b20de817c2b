//! Catalog browser views
//!
//! Main menu, season list, episode lists and the live search box.

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
};

use crate::app::{App, AppState, InputMode, ListState, MenuItem, NO_RESULTS_MSG};
use crate::catalog::Episode;
use crate::ui::Theme;

/// Bordered block with a styled title
fn framed(title: String, focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        })
        .title(Span::styled(title, Theme::title()))
}

fn marker_line(is_selected: bool, mut spans: Vec<Span<'static>>) -> Line<'static> {
    let marker = if is_selected { "▸ " } else { "  " };
    spans.insert(
        0,
        Span::styled(
            marker,
            if is_selected {
                Theme::selected()
            } else {
                Theme::dimmed()
            },
        ),
    );
    Line::from(spans)
}

/// Draw `rows` inside `area`, scrolled so the selection stays visible
fn render_rows(frame: &mut Frame, area: Rect, list: &ListState, rows: Vec<Line<'static>>) {
    let height = area.height as usize;
    let items: Vec<ListItem> = rows
        .into_iter()
        .skip(list.offset(height))
        .take(height)
        .map(ListItem::new)
        .collect();
    frame.render_widget(List::new(items).style(Theme::text()), area);
}

fn render_empty(frame: &mut Frame, area: Rect, msg: &str) {
    let empty = Paragraph::new(msg.to_string())
        .style(Theme::dimmed())
        .alignment(Alignment::Center);
    frame.render_widget(empty, area);
}

/// Main menu: three centered buttons
pub fn render_menu(frame: &mut Frame, area: Rect, app: &App) {
    let block = framed(" MENU ".to_string(), true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from("")];
    for (i, item) in MenuItem::ALL.iter().enumerate() {
        let is_selected = i == app.menu.selected;
        let label = format!("  {}  ", item.label());
        lines.push(Line::from(Span::styled(
            label,
            if is_selected {
                Theme::highlighted()
            } else {
                Theme::text()
            },
        )));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(vec![
        Span::styled(" ↑↓ ", Theme::keybind()),
        Span::styled("wybór  ", Theme::dimmed()),
        Span::styled(" ↵ ", Theme::keybind()),
        Span::styled("otwórz  ", Theme::dimmed()),
        Span::styled(" / ", Theme::keybind()),
        Span::styled("szukaj", Theme::dimmed()),
    ]));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

/// Season labels with their episode counts
pub fn render_seasons(frame: &mut Frame, area: Rect, app: &App) {
    let entries = app
        .catalog
        .as_ref()
        .map(|c| c.season_entries())
        .unwrap_or(&[]);

    let block = framed(format!(" SEZONY ({}) ", entries.len()), true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if entries.is_empty() {
        render_empty(frame, inner, NO_RESULTS_MSG);
        return;
    }

    let rows = entries
        .iter()
        .enumerate()
        .map(|(i, season)| {
            let is_selected = i == app.seasons.selected;
            marker_line(
                is_selected,
                vec![
                    Span::styled(
                        season.label().to_string(),
                        if is_selected {
                            Theme::selected()
                        } else {
                            Theme::text()
                        },
                    ),
                    Span::styled(format!("  ({})", season.episodes().len()), Theme::dimmed()),
                ],
            )
        })
        .collect();
    render_rows(frame, inner, &app.seasons, rows);
}

fn episode_row(number: usize, episode: &Episode, is_selected: bool) -> Line<'static> {
    marker_line(
        is_selected,
        vec![
            Span::styled(format!("{:>4}. ", number), Theme::number()),
            Span::styled(
                episode.title.clone(),
                if is_selected {
                    Theme::selected()
                } else {
                    Theme::text()
                },
            ),
        ],
    )
}

/// One season's episodes, or every episode
pub fn render_episodes(frame: &mut Frame, area: Rect, app: &App) {
    let (title, list) = match app.state {
        AppState::Episodes => (
            app.current_season.clone().unwrap_or_default(),
            &app.episodes,
        ),
        _ => ("WSZYSTKIE ODCINKI".to_string(), &app.all_episodes),
    };
    let episodes = app.visible_episodes();

    let block = framed(format!(" {} ({}) ", title, episodes.len()), true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if episodes.is_empty() {
        render_empty(frame, inner, NO_RESULTS_MSG);
        return;
    }

    let rows = episodes
        .iter()
        .enumerate()
        .map(|(i, (number, ep))| episode_row(*number, ep, i == list.selected))
        .collect();
    render_rows(frame, inner, list, rows);
}

/// "Szukaj:" box above the live results
pub fn render_search(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let editing = app.input_mode == InputMode::Editing;
    let text = if editing {
        let (before, after) = app.search.split_at_cursor();
        format!("Szukaj: {}│{}", before, after)
    } else {
        format!("Szukaj: {}", app.search.query)
    };
    let search_box = Paragraph::new(text)
        .style(Theme::input())
        .block(framed(" SZUKAJ ".to_string(), editing));
    frame.render_widget(search_box, chunks[0]);

    let episodes = app.visible_episodes();
    let block = framed(format!(" WYNIKI ({}) ", episodes.len()), !editing);
    let inner = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);

    if episodes.is_empty() {
        render_empty(frame, inner, NO_RESULTS_MSG);
        return;
    }

    let rows = episodes
        .iter()
        .enumerate()
        .map(|(i, (number, ep))| episode_row(*number, ep, i == app.search.list.selected))
        .collect();
    render_rows(frame, inner, &app.search.list, rows);
}
