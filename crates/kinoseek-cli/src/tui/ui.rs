//! TUI rendering logic for the movie browser.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap};

use kinoseek_api::tmdb::Movie;

use super::state::{InputMode, SearchSession, ToastKind};

/// Draws the movie browser UI.
#[allow(clippy::indexing_slicing)]
pub fn draw(frame: &mut Frame, state: &mut SearchSession) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(5),    // result list
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], state);
    draw_results(frame, chunks[1], state);
    draw_footer(frame, chunks[2], state);

    if state.selected_movie().is_some() {
        draw_detail_overlay(frame, state);
    }
    draw_toast(frame, state);
}

/// Draws the header with the search box and result counters.
#[allow(clippy::indexing_slicing)]
fn draw_header(frame: &mut Frame, area: Rect, state: &SearchSession) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let search_style = if state.input_mode == InputMode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let search_text = if state.input_mode == InputMode::Search {
        format!("{}\u{2590}", state.input)
    } else {
        state.input.clone()
    };

    let search = Paragraph::new(search_text)
        .style(search_style)
        .block(Block::default().borders(Borders::ALL).title(" Search: / "));
    frame.render_widget(search, header_chunks[0]);

    let status_text = if state.has_results() {
        format!(
            "found {} movies  page {}/{}",
            state.total_results(),
            state.page(),
            state.total_pages(),
        )
    } else if state.is_loading() {
        String::from("searching...")
    } else {
        String::from("type / to search")
    };
    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title(" kinoseek "));
    frame.render_widget(status, header_chunks[1]);
}

/// Draws the result table (or a placeholder when there is nothing to show).
fn draw_results(frame: &mut Frame, area: Rect, state: &mut SearchSession) {
    let (title, border_style) = if state.is_error() {
        (
            " Results (error) ",
            Style::default().fg(Color::Red),
        )
    } else if state.is_stale() {
        (
            " Results (updating...) ",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (" Results ", Style::default())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    if state.movies().is_empty() {
        let placeholder = if state.is_loading() {
            Paragraph::new("Loading...").style(Style::default().fg(Color::Yellow))
        } else if state.is_error() {
            Paragraph::new("There was an error, please try again...")
                .style(Style::default().fg(Color::Red))
        } else if state.query().is_empty() {
            Paragraph::new("Search for movies to get started.")
                .style(Style::default().fg(Color::DarkGray))
        } else {
            Paragraph::new("No movies to display.").style(Style::default().fg(Color::DarkGray))
        };
        frame.render_widget(placeholder.block(block), area);
        return;
    }

    // Previous page stays visible but dimmed while a newer fetch is pending.
    let row_style = if state.is_stale() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let header = Row::new(vec!["Title", "Release", "Rating", "Overview"])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(1);

    let rows: Vec<Row> = state
        .movies()
        .iter()
        .map(|m| {
            Row::new(vec![
                m.title.clone(),
                m.release_date.clone().unwrap_or_else(|| String::from("--")),
                format!("{:.1}", m.vote_average),
                snippet(&m.overview, 60),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Min(24),
        Constraint::Length(12),
        Constraint::Length(7),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("\u{25b8} ");

    frame.render_stateful_widget(table, area, &mut state.table_state);
}

/// Draws the footer with key hints.
fn draw_footer(frame: &mut Frame, area: Rect, state: &SearchSession) {
    let help_text = if state.selected_movie().is_some() {
        "Esc/q: close  o: open in browser"
    } else if state.input_mode == InputMode::Search {
        "Type your query | Enter: search | Esc: cancel"
    } else {
        "/: search  \u{2191}\u{2193}/j/k: move  \u{2190}\u{2192}/h/l: page  Enter: details  o: open  q: quit"
    };

    let footer = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

/// Draws the transient toast overlay (top center).
fn draw_toast(frame: &mut Frame, state: &SearchSession) {
    let Some(toast) = state.toast() else {
        return;
    };

    let color = match toast.kind {
        ToastKind::Success => Color::Green,
        ToastKind::Error => Color::Red,
        ToastKind::Warning => Color::Yellow,
    };

    let area = frame.area();
    let width = u16::try_from(toast.message.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(4)
        .min(area.width);
    let x = area.width.saturating_sub(width) / 2;
    let toast_area = Rect {
        x,
        y: area.y.saturating_add(1),
        width,
        height: 3.min(area.height),
    };

    let widget = Paragraph::new(toast.message.clone()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    frame.render_widget(Clear, toast_area);
    frame.render_widget(widget, toast_area);
}

/// Draws the movie detail overlay.
fn draw_detail_overlay(frame: &mut Frame, state: &SearchSession) {
    let Some(movie) = state.selected_movie() else {
        return;
    };

    let area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", movie.title));

    let lines = detail_lines(movie);
    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(detail, area);
}

/// Builds the text content of the detail overlay.
fn detail_lines(movie: &Movie) -> Vec<Line<'_>> {
    let mut lines = vec![Line::from(movie.overview.clone()), Line::from("")];
    lines.push(Line::from(format!(
        "Release Date: {}",
        movie.release_date.as_deref().unwrap_or("--"),
    )));
    lines.push(Line::from(format!("Rating: {:.1}/10", movie.vote_average)));
    lines.push(Line::from(format!(
        "Poster: {}",
        movie
            .poster_url()
            .unwrap_or_else(|| String::from("(none)")),
    )));
    lines.push(Line::from(format!("TMDB: {}", movie.detail_url())));
    lines
}

/// Truncates text to `max` characters, appending an ellipsis when cut.
fn snippet(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return String::from(text);
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}\u{2026}")
}

/// Returns a centered rect occupying the given percentages of `area`.
#[allow(clippy::indexing_slicing)]
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
