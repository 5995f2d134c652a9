//! Movie browser TUI main loop.
//!
//! Uses `ratatui` + `crossterm` for rendering. Fetches run as tokio tasks
//! reporting back over a channel; the loop drains completions every tick and
//! lets the session discard any that arrive for a superseded key.

/// Search session state types.
pub mod state;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use self::state::{FetchKey, InputMode, Notice, SearchSession, SubmitOutcome, ToastKind};
use kinoseek_api::tmdb::{LocalMovieSearchApi, SearchMovieParams, SearchMovieResponse, TmdbClient};

/// Warning raised when the search box is submitted empty.
const EMPTY_QUERY_MESSAGE: &str = "Please enter your search query.";

/// Message raised when a query matches nothing.
const NO_RESULTS_MESSAGE: &str = "No movies found for your request.";

/// A fetch completion reported back to the event loop.
type FetchCompletion = (FetchKey, Result<SearchMovieResponse, String>);

/// Search options carried from config/CLI into the TUI.
#[derive(Debug, Clone)]
pub struct BrowseOptions {
    /// Response language passed to TMDB.
    pub language: String,
    /// Include adult titles in results.
    pub include_adult: bool,
    /// Query submitted on startup, if any.
    pub initial_query: Option<String>,
}

/// Runs the movie browser TUI.
///
/// Must be called within a tokio runtime; fetches are spawned as tasks.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails.
pub fn run_movie_browser(client: Arc<TmdbClient>, options: &BrowseOptions) -> Result<()> {
    let mut state = SearchSession::new();
    if let Some(query) = options.initial_query.as_deref() {
        state.input = String::from(query);
        submit_from_input(&mut state);
    }

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut state, &client, options);

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    result
}

/// Main event loop.
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut SearchSession,
    client: &Arc<TmdbClient>,
    options: &BrowseOptions,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<FetchCompletion>();

    loop {
        state.expire_toast(Instant::now());

        if let Some(key) = state.take_due() {
            spawn_fetch(Arc::clone(client), key, options, tx.clone());
        }

        while let Ok((key, result)) = rx.try_recv() {
            if let Some(notice) = state.resolve_fetch(&key, result) {
                raise_notice(state, notice);
            }
        }

        terminal
            .draw(|frame| ui::draw(frame, state))
            .context("failed to draw TUI")?;

        if event::poll(std::time::Duration::from_millis(100)).context("failed to poll events")?
            && let Event::Key(key) = event::read().context("failed to read event")?
            && key.kind == KeyEventKind::Press
        {
            // The overlay owns all key input for exactly its open lifetime.
            if state.selected_movie().is_some() {
                handle_overlay_input(state, key.code);
            } else {
                match state.input_mode {
                    InputMode::Search => {
                        if handle_search_input(state, key.code, key.modifiers) {
                            return Ok(());
                        }
                    }
                    InputMode::Normal => {
                        if handle_normal_input(state, key.code, key.modifiers) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

/// Issues the fetch for `key` as a detached task.
fn spawn_fetch(
    client: Arc<TmdbClient>,
    key: FetchKey,
    options: &BrowseOptions,
    tx: mpsc::UnboundedSender<FetchCompletion>,
) {
    let params = SearchMovieParams::new(&key.query)
        .page(key.page)
        .language(&options.language)
        .include_adult(options.include_adult);

    tokio::spawn(async move {
        let result = client
            .search_movies(&params)
            .await
            .map_err(|e| format!("{e:#}"));
        // Receiver gone means the TUI already exited.
        let _ = tx.send((key, result));
    });
}

/// Turns a session notice into a toast.
fn raise_notice(state: &mut SearchSession, notice: Notice) {
    match notice {
        Notice::NoResults => state.set_toast(ToastKind::Error, NO_RESULTS_MESSAGE),
        Notice::Found(n) => state.set_toast(ToastKind::Success, format!("found {n} movies")),
        Notice::FetchFailed(message) => state.set_toast(ToastKind::Error, message),
    }
}

/// Submits the search box content to the session.
fn submit_from_input(state: &mut SearchSession) {
    let input = state.input.clone();
    match state.submit_query(&input) {
        SubmitOutcome::Accepted => state.input_mode = InputMode::Normal,
        SubmitOutcome::EmptyQuery => state.set_toast(ToastKind::Warning, EMPTY_QUERY_MESSAGE),
    }
}

/// Handles key input while the detail overlay is open.
fn handle_overlay_input(state: &mut SearchSession, key: KeyCode) {
    match key {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => state.deselect(),
        KeyCode::Char('o') => {
            if let Some(movie) = state.selected_movie() {
                let _ = open::that(movie.detail_url());
            }
        }
        _ => {}
    }
}

/// Handles key input in search mode. Returns `true` to exit.
fn handle_search_input(state: &mut SearchSession, key: KeyCode, modifiers: KeyModifiers) -> bool {
    match key {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Esc => {
            state.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => submit_from_input(state),
        KeyCode::Backspace => state.input_pop(),
        KeyCode::Char(c) => state.input_push(c),
        _ => {}
    }
    false
}

/// Handles key input in normal mode. Returns `true` to exit.
fn handle_normal_input(state: &mut SearchSession, key: KeyCode, modifiers: KeyModifiers) -> bool {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('/') => {
            state.input_mode = InputMode::Search;
        }
        KeyCode::Up | KeyCode::Char('k') => state.move_up(),
        KeyCode::Down | KeyCode::Char('j') => state.move_down(),
        KeyCode::Left | KeyCode::Char('h') => {
            state.prev_page();
        }
        KeyCode::Right | KeyCode::Char('l') => {
            state.next_page();
        }
        KeyCode::Enter => {
            state.select_current();
        }
        KeyCode::Char('o') => {
            if let Some(movie) = state.movie_under_cursor() {
                let _ = open::that(movie.detail_url());
            }
        }
        _ => {}
    }
    false
}
