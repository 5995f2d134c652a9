//! TMDB API request/response types.

use serde::Deserialize;

/// Base URL for TMDB poster images (w500 rendition).
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Base URL for TMDB movie detail pages.
pub const TMDB_MOVIE_URL: &str = "https://www.themoviedb.org/movie";

/// A single movie search result.
///
/// Unknown response fields are ignored; only the fields the application
/// consumes are modeled.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Movie {
    /// TMDB movie ID.
    pub id: u64,
    /// Display title.
    pub title: String,
    /// Poster image path (nullable, relative to the image base URL).
    pub poster_path: Option<String>,
    /// Plot overview.
    #[serde(default)]
    pub overview: String,
    /// Release date (`YYYY-MM-DD`, may be absent or empty).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Average vote on a 0-10 scale.
    #[serde(default)]
    pub vote_average: f64,
}

impl Movie {
    /// Returns the full poster URL, if the movie has a poster.
    #[must_use]
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_ref()
            .map(|p| format!("{POSTER_BASE_URL}{p}"))
    }

    /// Returns the TMDB detail page URL for this movie.
    #[must_use]
    pub fn detail_url(&self) -> String {
        format!("{}/{}", TMDB_MOVIE_URL, self.id)
    }
}

/// Response body for `search/movie`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchMovieResponse {
    /// Page number of this response (1-based).
    pub page: u32,
    /// Movies on this page.
    pub results: Vec<Movie>,
    /// Total number of pages for the query.
    pub total_pages: u32,
    /// Total number of results for the query.
    pub total_results: u64,
}

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB-internal status code.
    pub status_code: u32,
    /// Human-readable message.
    pub status_message: String,
    /// Always `false` on errors.
    #[serde(default)]
    pub success: bool,
}

/// Request parameters for `search/movie`.
#[derive(Debug, Clone)]
pub struct SearchMovieParams {
    /// Search query text.
    pub query: String,
    /// Page number (1-based).
    pub page: u32,
    /// Response language (e.g. "en-US").
    pub language: String,
    /// Include adult titles.
    pub include_adult: bool,
    /// Filter by release year.
    pub year: Option<u32>,
}

impl SearchMovieParams {
    /// Creates parameters for a query with defaults (page 1, "en-US").
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            language: String::from("en-US"),
            include_adult: false,
            year: None,
        }
    }

    /// Sets the page number.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets whether adult titles are included.
    #[must_use]
    pub const fn include_adult(mut self, include_adult: bool) -> Self {
        self.include_adult = include_adult;
        self
    }

    /// Sets the release year filter.
    #[must_use]
    pub const fn year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }
}
