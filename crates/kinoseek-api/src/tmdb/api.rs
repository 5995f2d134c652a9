//! `MovieSearchApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::{SearchMovieParams, SearchMovieResponse};

/// Movie search API trait.
///
/// Abstracts the remote call for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[trait_variant::make(MovieSearchApi: Send)]
pub trait LocalMovieSearchApi {
    /// Searches for movies matching the given parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    async fn search_movies(&self, params: &SearchMovieParams) -> Result<SearchMovieResponse>;
}
