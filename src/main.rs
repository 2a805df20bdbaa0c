mod cli;
mod color;
mod utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use cli::{list::list_cmd, refresh::refresh_cmd, resolve::resolve_cmd};
use color::ColorMode;
use modelcat::config::read_config;
use modelcat::models::ModelType;
use modelcat::registry::populate::populated_registry;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "MODELCAT_LOG";

#[derive(Default, Clone, Copy, ValueEnum, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum RequestedColorMode {
    #[default]
    Auto,
    On,
    Off,
}

/// Output formats
#[derive(ValueEnum, Default, Clone, Copy, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum ListingFormat {
    /// Format the output as a table
    #[default]
    Table,
    /// Format the output as JSON
    Json,
    /// Format the output as a table without a header
    HeaderlessTable,
}

#[derive(Parser)]
#[command(name = "modelcat")]
#[command(about = "Query a catalog of AI model metadata", version = "0.0.1")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(long, global = true, default_value_t = RequestedColorMode::default())]
    color: RequestedColorMode,
    /// Output with the specified format
    #[arg(short, long, global = true, default_value_t = ListingFormat::default())]
    format: ListingFormat,
    /// Read the configuration from this file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Only use the saved snapshot, never contact a source
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List models or providers
    List(ListArgs),
    /// Resolve a model spec to a single model
    Resolve(ResolveArgs),
    /// Fetch every source and rebuild the snapshot
    Refresh(RefreshArgs),
}

/// Possible listings
#[derive(Subcommand)]
pub(crate) enum ListObject {
    /// Known models
    Models(ListModelArgs),
    /// Providers
    Providers,
}

#[derive(Parser)]
pub(crate) struct ListArgs {
    /// List the specified object
    #[command(subcommand)]
    object: ListObject,
}

#[derive(Parser, Default)]
pub(crate) struct ListModelArgs {
    /// Limit listing to the specified provider
    #[arg(short, long)]
    provider: Option<String>,
    /// Limit listing to the specified family
    #[arg(long)]
    family: Option<String>,
    /// Limit listing to models of a type (chat, embedding, image, audio)
    #[arg(short = 't', long = "type")]
    model_type: Option<ModelType>,
}

#[derive(Parser)]
pub(crate) struct ResolveArgs {
    /// A model id, optionally prefixed with a provider ("ollama/llama3")
    spec: String,
    /// Scope resolution to the specified provider
    #[arg(short, long)]
    provider: Option<String>,
    /// Describe an unknown model instead of failing
    #[arg(long)]
    assume_exists: bool,
    /// Require an active provider that can serve the model
    #[arg(long)]
    dispatch: bool,
}

#[derive(Parser)]
pub(crate) struct RefreshArgs {
    /// Save the new snapshot to the configured path
    #[arg(short, long)]
    save: bool,
}

fn init_tracing(color: ColorMode) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(matches!(color, ColorMode::On))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let color = ColorMode::resolve(cli.color);
    color::configure_color(color);
    init_tracing(color);

    let config = match read_config(cli.config.clone()) {
        Ok(config) => config,
        Err(err) => die!("{}", err),
    };

    let registry = match populated_registry(&config) {
        Ok(registry) => registry.with_offline(cli.offline),
        Err(err) => die!("{}", err),
    };

    match &cli.command {
        Commands::List(args) => list_cmd(&registry, args, cli.format).await,
        Commands::Resolve(args) => resolve_cmd(&registry, args, cli.format).await,
        Commands::Refresh(args) => refresh_cmd(&registry, args, cli.format).await,
    }
}
