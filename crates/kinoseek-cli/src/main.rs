//! kinoseek - terminal movie search for TMDB.

/// Application configuration (TOML).
mod config;
/// Terminal UI components.
mod tui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;

use crate::config::{AppConfig, resolve_config_path};
use crate::tui::{BrowseOptions, run_movie_browser};
use kinoseek_api::tmdb::{LocalMovieSearchApi, SearchMovieParams, TmdbClient};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// One-shot movie search, printed to the log.
    Search(SearchArgs),
    /// Interactive movie browser TUI.
    Browse(BrowseArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search query (e.g. "batman").
    #[arg(long, required = true)]
    query: String,
    /// Page number (1-based).
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Response language (falls back to config, then "en-US").
    #[arg(long)]
    language: Option<String>,
    /// Filter by release year.
    #[arg(long)]
    year: Option<u32>,
}

/// Arguments for the `browse` subcommand.
#[derive(clap::Args)]
struct BrowseArgs {
    /// Query submitted on startup.
    #[arg(long)]
    query: Option<String>,
    /// Response language (falls back to config, then "en-US").
    #[arg(long)]
    language: Option<String>,
    /// Include adult titles (overrides config when set).
    #[arg(long)]
    include_adult: bool,
}

/// Arguments for the `completions` subcommand.
#[derive(clap::Args)]
struct CompletionsArgs {
    /// Target shell.
    shell: clap_complete::Shell,
}

/// Builds a `TmdbClient` from the `TMDB_API_TOKEN` environment variable.
///
/// # Errors
///
/// Returns an error if `TMDB_API_TOKEN` is not set or the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client() -> Result<TmdbClient> {
    let api_token = std::env::var("TMDB_API_TOKEN")
        .context("TMDB_API_TOKEN environment variable is required")?;

    TmdbClient::builder()
        .api_token(api_token)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .context("failed to build TMDB client")
}

/// Loads the app config for the given directory override.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    AppConfig::load(&config_path).context("failed to load config")
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_tmdb_client()?;

    let language = args
        .language
        .clone()
        .unwrap_or(config.search.language);
    let mut params = SearchMovieParams::new(&args.query)
        .page(args.page)
        .language(language)
        .include_adult(config.search.include_adult);
    if let Some(year) = args.year {
        params = params.year(year);
    }

    let response = client
        .search_movies(&params)
        .await
        .context("TMDB search/movie request failed")?;

    tracing::info!(
        "Total results: {} (page {}/{})",
        response.total_results,
        response.page,
        response.total_pages,
    );
    tracing::info!("ID\tTitle\t\t\tRating\tReleaseDate");
    for movie in &response.results {
        tracing::info!(
            "{}\t{}\t{:.1}\t{}",
            movie.id,
            movie.title,
            movie.vote_average,
            movie.release_date.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if the TMDB client fails to build or the TUI fails.
#[instrument(skip_all)]
async fn run_browse(args: &BrowseArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = Arc::new(build_tmdb_client()?);

    let options = BrowseOptions {
        language: args
            .language
            .clone()
            .unwrap_or(config.search.language),
        include_adult: args.include_adult || config.search.include_adult,
        initial_query: args.query.clone(),
    };

    run_movie_browser(client, &options).context("movie browser TUI failed")
}

/// Runs the `completions` subcommand.
fn run_completions(args: &CompletionsArgs) {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "kinoseek", &mut io::stdout());
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Search(args) => run_search(&args, cli.dir.as_ref()).await,
        Commands::Browse(args) => run_browse(&args, cli.dir.as_ref()).await,
        Commands::Completions(args) => {
            run_completions(&args);
            Ok(())
        }
    }
}
