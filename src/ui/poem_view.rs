//! Poem screen rendering
//!
//! Shows the current poem centered on screen with a one-line status bar for
//! loading, errors and where the poem came from.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use dailypoetry::cache::today;
use dailypoetry::{Poem, PoemOrigin, PoetryState};

/// Renders the poem view for the given state
pub fn render(frame: &mut Frame, state: &PoetryState, scroll_offset: u16) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    render_poem(frame, chunks[0], state, scroll_offset);
    frame.render_widget(status_line(state), chunks[1]);
}

fn render_poem(frame: &mut Frame, area: Rect, state: &PoetryState, scroll_offset: u16) {
    let block = Block::default()
        .title(" 每日诗词 ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines = match &state.content {
        Some(poem) => poem_lines(poem),
        None if state.is_loading => vec![Line::from(Span::styled(
            "Loading poem...",
            Style::default().fg(Color::Cyan),
        ))],
        None => vec![Line::from(Span::styled(
            "No poem yet. Press r to try again.",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    // Vertically center short poems
    let inner_height = area.height.saturating_sub(2);
    let padding = inner_height.saturating_sub(lines.len() as u16) / 2;
    let mut padded = vec![Line::from(""); padding as usize];
    padded.extend(lines);

    let paragraph = Paragraph::new(padded)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .scroll((scroll_offset, 0));

    frame.render_widget(paragraph, area);
}

/// Builds the display lines for a poem
fn poem_lines(poem: &Poem) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(title) = poem.title() {
        lines.push(Line::from(Span::styled(
            format!("《{}》", title),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(attribution) = poem.attribution() {
        lines.push(Line::from(Span::styled(
            attribution,
            Style::default().fg(Color::Gray),
        )));
    }
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }

    let body = poem.lines();
    if body.is_empty() {
        let text = poem
            .content()
            .map(str::to_string)
            .unwrap_or_else(|| poem.as_value().to_string());
        lines.push(Line::from(text));
    } else {
        lines.extend(body.into_iter().map(|l| Line::from(l.to_string())));
    }

    lines
}

/// Builds the status bar line
fn status_line(state: &PoetryState) -> Paragraph<'static> {
    let (text, color) = if state.is_loading {
        ("Loading...".to_string(), Color::Cyan)
    } else if let Some(ref message) = state.error_message {
        (format!("Error: {}", message), Color::Red)
    } else {
        let origin = match state.origin {
            Some(PoemOrigin::Cache) => "Cached today",
            Some(PoemOrigin::Network) => "Fetched just now",
            None => "",
        };
        (origin.to_string(), Color::Green)
    };

    Paragraph::new(Line::from(vec![
        Span::styled(format!(" {}", text), Style::default().fg(color)),
        Span::styled(
            format!("  {}  ? for help ", today().format("%Y-%m-%d")),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
}
