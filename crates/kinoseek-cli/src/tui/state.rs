//! Movie search session state management.
//!
//! `SearchSession` owns the query text, the current page, and the derived
//! loading/stale/error flags. It decides when a fetch is due and applies
//! last-key-wins when completions arrive, so a superseded response can never
//! overwrite fresher state.

use std::time::{Duration, Instant};

use ratatui::widgets::TableState;

use kinoseek_api::tmdb::{Movie, SearchMovieResponse};

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(3);

/// Identifies one fetch: a (query, page) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchKey {
    /// Trimmed query text.
    pub query: String,
    /// Page number (1-based).
    pub page: u32,
}

/// Outcome of a query submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Query accepted, a fetch for page 1 is now due.
    Accepted,
    /// Input was empty after trimming; nothing changed.
    EmptyQuery,
}

/// One-shot notification produced by a fetch resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// First successful fetch for this query found nothing.
    NoResults,
    /// First successful fetch for this query found this many movies.
    Found(u64),
    /// The fetch failed with this message.
    FetchFailed(String),
}

/// Input mode for the browser TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode.
    Normal,
    /// Query text input mode.
    Search,
}

/// Visual category of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Green: operation succeeded.
    Success,
    /// Red: operation failed.
    Error,
    /// Yellow: user input problem.
    Warning,
}

/// A transient on-screen notification.
#[derive(Debug, Clone)]
pub struct Toast {
    /// Visual category.
    pub kind: ToastKind,
    /// Message text.
    pub message: String,
    /// When the toast was raised.
    shown_at: Instant,
}

impl Toast {
    /// Creates a toast raised now.
    fn new(kind: ToastKind, message: String) -> Self {
        Self {
            kind,
            message,
            shown_at: Instant::now(),
        }
    }

    /// Whether the toast has outlived its display time.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= TOAST_TTL
    }
}

/// State for one search session.
///
/// The session lives for the TUI's lifetime. The previously successful result
/// page is retained while a fetch for a different key is in flight; the view
/// renders it dimmed instead of blanking the grid.
pub struct SearchSession {
    /// Search box text buffer.
    pub input: String,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Table state for the result list (handles selection and scroll).
    pub table_state: TableState,
    /// Active query (trimmed, empty until the first submission).
    query: String,
    /// Current page number (1-based).
    page: u32,
    /// Key of the fetch that should be issued next, if any.
    due: Option<FetchKey>,
    /// Key of the fetch currently in flight, if any.
    in_flight: Option<FetchKey>,
    /// Last successful result page, tagged with the key it answers.
    results: Option<(FetchKey, SearchMovieResponse)>,
    /// Whether the most recent fetch for the current key failed.
    is_error: bool,
    /// Message of the most recent failure.
    last_error: Option<String>,
    /// Whether the first-success notification for this query is still owed.
    first_success_pending: bool,
    /// Movie shown in the detail overlay, if open.
    selected: Option<Movie>,
    /// Active toast, if any.
    toast: Option<Toast>,
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("query", &self.query)
            .field("page", &self.page)
            .field("due", &self.due)
            .field("in_flight", &self.in_flight)
            .field("is_error", &self.is_error)
            .finish_non_exhaustive()
    }
}

impl SearchSession {
    /// Creates an idle session with no query and nothing displayed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            input: String::new(),
            input_mode: InputMode::Search,
            table_state: TableState::default(),
            query: String::new(),
            page: 1,
            due: None,
            in_flight: None,
            results: None,
            is_error: false,
            last_error: None,
            first_success_pending: false,
            selected: None,
            toast: None,
        }
    }

    /// Returns the active query text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the current page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the key for the current (query, page) pair.
    #[must_use]
    pub fn current_key(&self) -> FetchKey {
        FetchKey {
            query: self.query.clone(),
            page: self.page,
        }
    }

    /// Submits raw query text.
    ///
    /// Whitespace-only input is rejected without touching any state. Otherwise
    /// the query is replaced, the page resets to 1, the first-success
    /// notification is re-armed, and a fetch becomes due.
    pub fn submit_query(&mut self, raw: &str) -> SubmitOutcome {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return SubmitOutcome::EmptyQuery;
        }

        self.query = trimmed.to_owned();
        self.page = 1;
        self.first_success_pending = true;
        self.mark_due();
        SubmitOutcome::Accepted
    }

    /// Moves to page `n` and marks a fetch due.
    ///
    /// Only honored for `n` within `[1, total_pages]` of the most recent
    /// result page and different from the current page; anything else is a
    /// no-op that never fetches.
    pub fn change_page(&mut self, n: u32) -> bool {
        if self.query.is_empty() || n == 0 || n > self.total_pages() || n == self.page {
            return false;
        }
        self.page = n;
        self.mark_due();
        true
    }

    /// Advances to the next page, if there is one.
    pub fn next_page(&mut self) -> bool {
        self.change_page(self.page.saturating_add(1))
    }

    /// Goes back to the previous page, if there is one.
    pub fn prev_page(&mut self) -> bool {
        self.page > 1 && self.change_page(self.page.saturating_sub(1))
    }

    /// Records the new current key as due and resets the error flag.
    fn mark_due(&mut self) {
        self.is_error = false;
        self.last_error = None;
        self.due = Some(self.current_key());
    }

    /// Hands out the due fetch key, at most once, and records it in flight.
    pub fn take_due(&mut self) -> Option<FetchKey> {
        let key = self.due.take()?;
        self.in_flight = Some(key.clone());
        Some(key)
    }

    /// Applies a fetch completion.
    ///
    /// A completion whose key no longer matches the current (query, page) key
    /// is discarded (last-key-wins). Returns a notice to surface to the user,
    /// if one is owed.
    pub fn resolve_fetch(
        &mut self,
        key: &FetchKey,
        result: Result<SearchMovieResponse, String>,
    ) -> Option<Notice> {
        if self.in_flight.as_ref() == Some(key) {
            self.in_flight = None;
        }
        if *key != self.current_key() {
            tracing::debug!(?key, "discarding completion for superseded key");
            return None;
        }

        match result {
            Ok(page) => {
                self.is_error = false;
                self.last_error = None;
                let total_results = page.total_results;
                self.results = Some((key.clone(), page));
                self.clamp_cursor();
                if self.first_success_pending {
                    self.first_success_pending = false;
                    if total_results == 0 {
                        return Some(Notice::NoResults);
                    }
                    return Some(Notice::Found(total_results));
                }
                None
            }
            Err(message) => {
                self.is_error = true;
                self.last_error = Some(message.clone());
                Some(Notice::FetchFailed(message))
            }
        }
    }

    /// Whether a fetch is due or in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.due.is_some() || self.in_flight.is_some()
    }

    /// Whether the displayed result page no longer matches the current key.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.results
            .as_ref()
            .is_some_and(|(key, _)| *key != self.current_key())
    }

    /// Whether the most recent fetch for the current key failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.is_error
    }

    /// Returns the message of the most recent failure.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns the movies of the displayed result page.
    #[must_use]
    pub fn movies(&self) -> &[Movie] {
        self.results
            .as_ref()
            .map_or(&[], |(_, r)| r.results.as_slice())
    }

    /// Returns the server-reported total page count (0 before any success).
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.results.as_ref().map_or(0, |(_, r)| r.total_pages)
    }

    /// Returns the server-reported total result count (0 before any success).
    #[must_use]
    pub fn total_results(&self) -> u64 {
        self.results.as_ref().map_or(0, |(_, r)| r.total_results)
    }

    /// Whether any result page is displayed.
    #[must_use]
    pub const fn has_results(&self) -> bool {
        self.results.is_some()
    }

    /// Returns the cursor position in the result list.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    /// Returns the movie under the cursor, if any.
    #[must_use]
    pub fn movie_under_cursor(&self) -> Option<&Movie> {
        self.movies().get(self.cursor())
    }

    /// Moves the cursor up.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn move_up(&mut self) {
        let current = self.cursor();
        if current > 0 {
            self.table_state.select(Some(current - 1));
        }
    }

    /// Moves the cursor down.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn move_down(&mut self) {
        let current = self.cursor();
        if current + 1 < self.movies().len() {
            self.table_state.select(Some(current + 1));
        }
    }

    /// Keeps the cursor within the displayed result list.
    fn clamp_cursor(&mut self) {
        let len = self.movies().len();
        if len == 0 {
            self.table_state.select(None);
        } else {
            let cursor = self.cursor().min(len.saturating_sub(1));
            self.table_state.select(Some(cursor));
        }
    }

    /// Opens the detail overlay for the movie under the cursor.
    pub fn select_current(&mut self) -> bool {
        if let Some(movie) = self.movie_under_cursor().cloned() {
            self.selected = Some(movie);
            return true;
        }
        false
    }

    /// Closes the detail overlay.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Returns the movie shown in the detail overlay, if open.
    #[must_use]
    pub const fn selected_movie(&self) -> Option<&Movie> {
        self.selected.as_ref()
    }

    /// Raises a toast, replacing any active one.
    pub fn set_toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.toast = Some(Toast::new(kind, message.into()));
    }

    /// Returns the active toast, if any.
    #[must_use]
    pub const fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    /// Drops the active toast once its display time is over.
    pub fn expire_toast(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
        }
    }

    /// Appends a character to the search box.
    pub fn input_push(&mut self, ch: char) {
        self.input.push(ch);
    }

    /// Removes the last character from the search box.
    pub fn input_pop(&mut self) {
        self.input.pop();
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    fn make_movie(id: u64, title: &str) -> Movie {
        Movie {
            id,
            title: String::from(title),
            poster_path: Some(format!("/poster-{id}.jpg")),
            overview: String::from("overview"),
            release_date: Some(String::from("1989-06-21")),
            vote_average: 7.2,
        }
    }

    fn make_page(count: usize, total_pages: u32, total_results: u64) -> SearchMovieResponse {
        let results = (0..count)
            .map(|i| make_movie(u64::try_from(i).unwrap() + 1, &format!("Movie {i}")))
            .collect();
        SearchMovieResponse {
            page: 1,
            results,
            total_pages,
            total_results,
        }
    }

    #[test]
    fn test_submit_resets_page_and_marks_due() {
        // Arrange
        let mut session = SearchSession::new();

        // Act
        let outcome = session.submit_query("batman");

        // Assert
        assert_eq!(outcome, SubmitOutcome::Accepted);
        assert_eq!(session.query(), "batman");
        assert_eq!(session.page(), 1);
        let due = session.take_due().unwrap();
        assert_eq!(due.query, "batman");
        assert_eq!(due.page, 1);
    }

    #[test]
    fn test_submit_trims_input() {
        // Arrange
        let mut session = SearchSession::new();

        // Act
        let outcome = session.submit_query("  batman  ");

        // Assert
        assert_eq!(outcome, SubmitOutcome::Accepted);
        assert_eq!(session.query(), "batman");
    }

    #[test]
    fn test_empty_submit_never_fetches_or_mutates() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        session.take_due();

        // Act
        let empty = session.submit_query("");
        let blank = session.submit_query("   ");

        // Assert
        assert_eq!(empty, SubmitOutcome::EmptyQuery);
        assert_eq!(blank, SubmitOutcome::EmptyQuery);
        assert_eq!(session.query(), "batman");
        assert_eq!(session.page(), 1);
        assert!(session.take_due().is_none());
    }

    #[test]
    fn test_resubmit_resets_page_to_one() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        let key = session.take_due().unwrap();
        session.resolve_fetch(&key, Ok(make_page(2, 5, 100)));
        session.change_page(3);
        session.take_due();

        // Act
        session.submit_query("superman");

        // Assert
        assert_eq!(session.page(), 1);
        let due = session.take_due().unwrap();
        assert_eq!(due.query, "superman");
        assert_eq!(due.page, 1);
    }

    #[test]
    fn test_change_page_within_bounds_marks_due() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        let key = session.take_due().unwrap();
        session.resolve_fetch(&key, Ok(make_page(2, 3, 50)));

        // Act
        let changed = session.change_page(2);

        // Assert
        assert!(changed);
        assert_eq!(session.page(), 2);
        let due = session.take_due().unwrap();
        assert_eq!(due.page, 2);
    }

    #[test]
    fn test_change_page_out_of_range_never_fetches() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        let key = session.take_due().unwrap();
        session.resolve_fetch(&key, Ok(make_page(2, 3, 50)));

        // Act & Assert
        assert!(!session.change_page(0));
        assert!(!session.change_page(4));
        assert_eq!(session.page(), 1);
        assert!(session.take_due().is_none());
    }

    #[test]
    fn test_change_page_before_any_result_is_noop() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        session.take_due();

        // Act & Assert - total_pages unknown, no paging yet
        assert!(!session.change_page(2));
    }

    #[test]
    fn test_pagination_keeps_previous_results_stale_until_resolution() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        let key1 = session.take_due().unwrap();
        session.resolve_fetch(&key1, Ok(make_page(2, 3, 50)));

        // Act
        session.change_page(2);
        let key2 = session.take_due().unwrap();

        // Assert - page-1 rows still visible, flagged stale, loading set
        assert_eq!(session.movies().len(), 2);
        assert!(session.is_stale());
        assert!(session.is_loading());

        // Act - page 2 arrives
        session.resolve_fetch(&key2, Ok(make_page(1, 3, 50)));

        // Assert
        assert_eq!(session.movies().len(), 1);
        assert!(!session.is_stale());
        assert!(!session.is_loading());
    }

    #[test]
    fn test_first_success_notice_fires_once_per_query() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        let key1 = session.take_due().unwrap();

        // Act
        let first = session.resolve_fetch(&key1, Ok(make_page(2, 3, 42)));
        session.change_page(2);
        let key2 = session.take_due().unwrap();
        let second = session.resolve_fetch(&key2, Ok(make_page(2, 3, 42)));

        // Assert - only the first success for this query notifies
        assert_eq!(first, Some(Notice::Found(42)));
        assert_eq!(second, None);
    }

    #[test]
    fn test_first_success_notice_rearms_on_new_query() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        let key1 = session.take_due().unwrap();
        session.resolve_fetch(&key1, Ok(make_page(2, 1, 2)));

        // Act
        session.submit_query("superman");
        let key2 = session.take_due().unwrap();
        let notice = session.resolve_fetch(&key2, Ok(make_page(3, 1, 3)));

        // Assert
        assert_eq!(notice, Some(Notice::Found(3)));
    }

    #[test]
    fn test_zero_results_notice() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("zzzqqqnomatch");
        let key = session.take_due().unwrap();

        // Act
        let notice = session.resolve_fetch(&key, Ok(make_page(0, 1, 0)));

        // Assert - empty grid, no-results notice, no error state
        assert_eq!(notice, Some(Notice::NoResults));
        assert!(session.movies().is_empty());
        assert!(!session.is_error());
    }

    #[test]
    fn test_fetch_failure_sets_error_and_retains_results() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        let key1 = session.take_due().unwrap();
        session.resolve_fetch(&key1, Ok(make_page(2, 3, 50)));
        session.change_page(2);
        let key2 = session.take_due().unwrap();

        // Act
        let notice = session.resolve_fetch(&key2, Err(String::from("connection refused")));

        // Assert - error surfaced once, loading cleared, page-1 rows retained
        assert_eq!(
            notice,
            Some(Notice::FetchFailed(String::from("connection refused")))
        );
        assert!(session.is_error());
        assert!(!session.is_loading());
        assert_eq!(session.last_error(), Some("connection refused"));
        assert_eq!(session.movies().len(), 2);
        assert!(session.is_stale());
    }

    #[test]
    fn test_superseded_completion_is_discarded() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        let stale_key = session.take_due().unwrap();
        session.submit_query("superman");
        let fresh_key = session.take_due().unwrap();

        // Act - the fetch for the old query resolves late
        let stale_notice = session.resolve_fetch(&stale_key, Ok(make_page(5, 1, 5)));

        // Assert - discarded wholesale, fresh fetch still pending
        assert_eq!(stale_notice, None);
        assert!(session.movies().is_empty());
        assert!(session.is_loading());

        // Act - the fresh fetch resolves
        let fresh_notice = session.resolve_fetch(&fresh_key, Ok(make_page(3, 1, 3)));

        // Assert
        assert_eq!(fresh_notice, Some(Notice::Found(3)));
        assert_eq!(session.movies().len(), 3);
    }

    #[test]
    fn test_superseded_failure_is_discarded() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        let stale_key = session.take_due().unwrap();
        session.submit_query("superman");

        // Act
        let notice = session.resolve_fetch(&stale_key, Err(String::from("timeout")));

        // Assert - no error state from a fetch nobody is waiting for
        assert_eq!(notice, None);
        assert!(!session.is_error());
    }

    #[test]
    fn test_error_clears_on_next_successful_fetch() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        let key1 = session.take_due().unwrap();
        session.resolve_fetch(&key1, Err(String::from("boom")));
        assert!(session.is_error());

        // Act - user retries the same search
        session.submit_query("batman");
        let key2 = session.take_due().unwrap();
        session.resolve_fetch(&key2, Ok(make_page(1, 1, 1)));

        // Assert
        assert!(!session.is_error());
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_select_and_deselect() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        let key = session.take_due().unwrap();
        session.resolve_fetch(&key, Ok(make_page(2, 1, 2)));

        // Act
        let selected = session.select_current();

        // Assert
        assert!(selected);
        assert_eq!(session.selected_movie().unwrap().title, "Movie 0");

        // Act
        session.deselect();

        // Assert
        assert!(session.selected_movie().is_none());
    }

    #[test]
    fn test_select_with_no_results_is_noop() {
        // Arrange
        let mut session = SearchSession::new();

        // Act & Assert
        assert!(!session.select_current());
        assert!(session.selected_movie().is_none());
    }

    #[test]
    fn test_cursor_movement_clamps_to_results() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        let key = session.take_due().unwrap();
        session.resolve_fetch(&key, Ok(make_page(3, 1, 3)));

        // Act & Assert
        session.move_down();
        session.move_down();
        assert_eq!(session.cursor(), 2);
        session.move_down(); // should stay at 2
        assert_eq!(session.cursor(), 2);
        session.move_up();
        assert_eq!(session.cursor(), 1);
    }

    #[test]
    fn test_cursor_clamped_when_next_page_is_shorter() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        let key1 = session.take_due().unwrap();
        session.resolve_fetch(&key1, Ok(make_page(3, 2, 23)));
        session.move_down();
        session.move_down();

        // Act
        session.change_page(2);
        let key2 = session.take_due().unwrap();
        session.resolve_fetch(&key2, Ok(make_page(1, 2, 23)));

        // Assert
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn test_next_and_prev_page() {
        // Arrange
        let mut session = SearchSession::new();
        session.submit_query("batman");
        let key = session.take_due().unwrap();
        session.resolve_fetch(&key, Ok(make_page(2, 2, 25)));

        // Act & Assert
        assert!(session.next_page());
        assert_eq!(session.page(), 2);
        assert!(!session.next_page()); // past the last page
        assert!(session.prev_page());
        assert_eq!(session.page(), 1);
        assert!(!session.prev_page()); // before the first page
    }

    #[test]
    fn test_toast_expiry() {
        // Arrange
        let mut session = SearchSession::new();
        session.set_toast(ToastKind::Success, "found 2 movies");

        // Act & Assert - still fresh
        session.expire_toast(Instant::now());
        assert!(session.toast().is_some());

        // Act & Assert - past its TTL
        session.expire_toast(Instant::now() + TOAST_TTL + Duration::from_millis(1));
        assert!(session.toast().is_none());
    }

    #[test]
    fn test_idle_session_is_not_loading() {
        // Arrange & Act
        let session = SearchSession::new();

        // Assert
        assert!(!session.is_loading());
        assert!(!session.is_stale());
        assert!(!session.is_error());
        assert!(!session.has_results());
    }
}
