//! TMDB API client module.

mod api;
mod client;
mod types;

pub use api::{LocalMovieSearchApi, MovieSearchApi};
pub use client::{TmdbClient, TmdbClientBuilder};
pub use types::{
    Movie, POSTER_BASE_URL, SearchMovieParams, SearchMovieResponse, TMDB_MOVIE_URL,
    TmdbErrorResponse,
};
