//! marquee - IMDb chart browser with local favorites.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use marquee_api::{CatalogApi, CatalogClient, CatalogError, Chart, Item};
use marquee_core::{Catalog, Category, KindFilter, ViewState};
use marquee_db::FavoritesDb;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, resolve_config_path};

/// Environment variable holding the RapidAPI key.
const API_KEY_ENV: &str = "MARQUEE_API_KEY";

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List a category (top-movies, popular-movies, top-series, popular-series, favorites).
    Browse(BrowseArgs),
    /// Show one title with its favorite flag and IMDb link.
    Show(LookupArgs),
    /// Add a title to favorites, or remove it if already there.
    Favorite(LookupArgs),
    /// List favorites.
    Favorites(FavoritesArgs),
    /// Inspect the configuration file.
    Config(ConfigCommand),
}

/// Arguments for the `browse` subcommand.
#[derive(clap::Args)]
struct BrowseArgs {
    /// Category name or tab index (0-4).
    category: Category,

    /// Only keep titles containing this text (case-insensitive).
    #[arg(long)]
    search: Option<String>,

    /// Favorites kind filter: all, movie or series.
    #[arg(long)]
    kind: Option<KindFilter>,
}

/// Arguments for the `show` and `favorite` subcommands.
#[derive(clap::Args)]
struct LookupArgs {
    /// IMDb title id (e.g. tt0111161).
    id: String,

    /// Categories to load before the lookup. Repeatable.
    #[arg(long = "category")]
    categories: Vec<Category>,
}

/// Arguments for the `favorites` subcommand.
#[derive(clap::Args)]
struct FavoritesArgs {
    /// Kind filter: all, movie or series.
    #[arg(long)]
    kind: Option<KindFilter>,

    /// Only keep titles containing this text (case-insensitive).
    #[arg(long)]
    search: Option<String>,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Print the effective configuration.
    Show,
    /// Print the config file path.
    Path,
    /// Write the default configuration if no file exists yet.
    Init,
}

/// Chart source used by the CLI.
///
/// Commands that only touch favorites run without an API key.
enum Remote {
    /// Authenticated RapidAPI client.
    Client(CatalogClient),
    /// No API key available.
    Offline,
}

impl CatalogApi for Remote {
    async fn fetch_chart(&self, chart: Chart) -> Result<Vec<Item>, CatalogError> {
        match self {
            Self::Client(client) => client.fetch_chart(chart).await,
            Self::Offline => Err(CatalogError::Config(format!(
                "{API_KEY_ENV} environment variable is required"
            ))),
        }
    }
}

/// Builds the chart source from config and the environment.
///
/// # Errors
///
/// Returns an error if `required` and `MARQUEE_API_KEY` is not set, or if the
/// client fails to build.
#[instrument(skip_all)]
fn build_remote(config: &AppConfig, required: bool) -> Result<Remote> {
    let Ok(api_key) = std::env::var(API_KEY_ENV) else {
        if required {
            bail!("{API_KEY_ENV} environment variable is required");
        }
        return Ok(Remote::Offline);
    };

    let mut builder = CatalogClient::builder()
        .api_key(api_key)
        .api_host(config.api.host.as_str())
        .min_interval(config.api.min_interval())
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
    if let Some(url) = config.api.base_url()? {
        builder = builder.base_url(url);
    }
    if let Some(timeout) = config.api.timeout() {
        builder = builder.timeout(timeout);
    }

    let client = builder.build().context("failed to build catalog client")?;
    Ok(Remote::Client(client))
}

/// Loads config and opens the favorites database.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the database cannot be opened.
fn load_context(dir: Option<&PathBuf>) -> Result<(AppConfig, FavoritesDb)> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    let store = FavoritesDb::open(dir).context("failed to open favorites database")?;
    Ok((config, store))
}

/// Whether any of `categories` needs the remote API.
fn needs_remote(categories: &[Category]) -> bool {
    categories.iter().any(|c| c.chart().is_some())
}

/// Prints a view state as a tab-separated listing.
fn print_state(state: &ViewState) {
    if let Some(error) = &state.error {
        tracing::warn!("{error}");
    }
    if state.items.is_empty() {
        return;
    }
    tracing::info!("ID\t\tRating\tYear\tKind\t\tTitle");
    for item in &state.items {
        tracing::info!(
            "{}\t{}\t{}\t{}\t{}",
            item.id,
            item.rating.map_or_else(|| String::from("-"), |r| format!("{r:.1}")),
            item.year.map_or_else(|| String::from("-"), |y| y.to_string()),
            item.kind.as_str(),
            item.title,
        );
    }
    tracing::info!("{} titles", state.items.len());
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if config, database, or client setup fails.
#[instrument(skip_all)]
async fn run_browse(args: &BrowseArgs, dir: Option<&PathBuf>) -> Result<()> {
    let (config, store) = load_context(dir)?;
    let remote = build_remote(&config, needs_remote(&[args.category]))?;
    let kind = args.kind.unwrap_or(config.favorites.default_filter);

    let catalog = Catalog::with_kind_filter(remote, store, kind);
    catalog.select_category(args.category).await;
    if let Some(query) = &args.search {
        catalog.on_search_change(query);
    }

    tracing::info!("Category: {}", args.category);
    print_state(&catalog.current_state());
    Ok(())
}

/// Runs the `favorites` subcommand.
///
/// # Errors
///
/// Returns an error if config or database setup fails.
#[instrument(skip_all)]
async fn run_favorites(args: &FavoritesArgs, dir: Option<&PathBuf>) -> Result<()> {
    let (config, store) = load_context(dir)?;
    let kind = args.kind.unwrap_or(config.favorites.default_filter);

    let catalog = Catalog::with_kind_filter(Remote::Offline, store, kind);
    catalog.select_category(Category::Favorites).await;
    if let Some(query) = &args.search {
        catalog.on_search_change(query);
    }

    tracing::info!("Favorites ({kind}):");
    print_state(&catalog.current_state());
    Ok(())
}

/// Loads the requested categories, then resolves `id` through the cache and
/// the favorites store.
///
/// # Errors
///
/// Returns an error if setup fails or the item cannot be found.
async fn resolve_item(
    args: &LookupArgs,
    dir: Option<&PathBuf>,
) -> Result<(Catalog<Remote, FavoritesDb>, Item)> {
    let (config, store) = load_context(dir)?;
    let remote = build_remote(&config, needs_remote(&args.categories))?;
    let catalog = Catalog::with_kind_filter(remote, store, config.favorites.default_filter);

    for category in &args.categories {
        catalog.select_category(*category).await;
        if let Some(error) = catalog.current_state().error {
            tracing::warn!("{category}: {error}");
        }
    }

    let item = catalog
        .get_item_by_id(&args.id)
        .await
        .with_context(|| format!("title {} not found in loaded categories or favorites", args.id))?;
    Ok((catalog, item))
}

/// Runs the `show` subcommand.
///
/// # Errors
///
/// Returns an error if setup fails or the item cannot be found.
#[instrument(skip_all)]
async fn run_show(args: &LookupArgs, dir: Option<&PathBuf>) -> Result<()> {
    let (catalog, item) = resolve_item(args, dir).await?;
    let favorite = *catalog.is_favorite().borrow();

    tracing::info!("{} ({})", item.title, item.id);
    if !item.original_title.is_empty() && item.original_title != item.title {
        tracing::info!("  Original title: {}", item.original_title);
    }
    tracing::info!("  Kind:     {}", item.kind.as_str());
    if let Some(year) = item.year {
        tracing::info!("  Year:     {year}");
    }
    if let Some(rating) = item.rating {
        tracing::info!("  Rating:   {rating:.1}");
    }
    if let Some(poster) = &item.poster_url {
        tracing::info!("  Poster:   {poster}");
    }
    tracing::info!("  Favorite: {}", if favorite { "yes" } else { "no" });
    tracing::info!("  IMDb:     {}", item.imdb_url());
    if let Some(description) = item.description.as_deref().filter(|d| !d.is_empty()) {
        tracing::info!("");
        tracing::info!("{description}");
    }
    tracing::info!("");
    tracing::info!("{}", item.share_text());
    Ok(())
}

/// Runs the `favorite` subcommand.
///
/// # Errors
///
/// Returns an error if setup fails or the item cannot be found.
#[instrument(skip_all)]
async fn run_favorite(args: &LookupArgs, dir: Option<&PathBuf>) -> Result<()> {
    let (catalog, item) = resolve_item(args, dir).await?;
    let before = *catalog.is_favorite().borrow();
    let after = catalog.toggle_favorite(&item).await;

    if before == after {
        bail!("failed to update favorites for {}", item.id);
    }
    if after {
        tracing::info!("Added to favorites: {} ({})", item.title, item.id);
    } else {
        tracing::info!("Removed from favorites: {} ({})", item.title, item.id);
    }
    Ok(())
}

/// Runs the `config` subcommands.
///
/// # Errors
///
/// Returns an error if the config path cannot be resolved or the file cannot
/// be read or written.
#[instrument(skip_all)]
fn run_config(command: &ConfigSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    match command {
        ConfigSubcommands::Path => {
            tracing::info!("{}", config_path.display());
        }
        ConfigSubcommands::Show => {
            let config = AppConfig::load(&config_path).context("failed to load config")?;
            tracing::info!("# {}", config_path.display());
            for line in config.to_toml()?.lines() {
                tracing::info!("{line}");
            }
            let key_state = if std::env::var_os(API_KEY_ENV).is_some() {
                "set"
            } else {
                "not set"
            };
            tracing::info!("# {API_KEY_ENV}: {key_state}");
        }
        ConfigSubcommands::Init => {
            if config_path.exists() {
                tracing::info!("Config already exists: {}", config_path.display());
                return Ok(());
            }
            AppConfig::default()
                .save(&config_path)
                .context("failed to write default config")?;
            tracing::info!("Wrote default config to {}", config_path.display());
        }
    }
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let dir = cli.dir.as_ref();
    match cli.command {
        Commands::Browse(args) => run_browse(&args, dir).await,
        Commands::Show(args) => run_show(&args, dir).await,
        Commands::Favorite(args) => run_favorite(&args, dir).await,
        Commands::Favorites(args) => run_favorites(&args, dir).await,
        Commands::Config(cmd) => run_config(&cmd.command, dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_remote_only_for_charts() {
        // Arrange & Act & Assert
        assert!(!needs_remote(&[]));
        assert!(!needs_remote(&[Category::Favorites]));
        assert!(needs_remote(&[Category::Favorites, Category::TopSeries]));
    }

    #[test]
    fn test_cli_parses_repeated_categories() {
        // Arrange & Act
        let cli = Cli::parse_from([
            "marquee",
            "show",
            "tt0111161",
            "--category",
            "top-movies",
            "--category",
            "3",
        ]);

        // Assert
        let Commands::Show(args) = cli.command else {
            panic!("expected show command");
        };
        assert_eq!(args.id, "tt0111161");
        assert_eq!(
            args.categories,
            vec![Category::TopMovies, Category::PopularSeries]
        );
    }
}
