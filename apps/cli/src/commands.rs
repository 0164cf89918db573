//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use linksorter_api::AppState;
use linksorter_core::Categorizer;
use linksorter_shared::{
    AppConfig, api_key, config_file_path, init_config, init_config_at, load_config,
    load_config_from, validate_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// linksorter: sort links into categories chosen by an LLM.
#[derive(Parser)]
#[command(
    name = "linksorter",
    version,
    about = "Categorize web links with an LLM and keep them in named groups.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file to use instead of ~/.linksorter/linksorter.toml.
    #[arg(long, env = "LINKSORTER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the HTTP service.
    Serve {
        /// Address to bind, overriding [server] bind.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Categorize one URL and print the resulting category map.
    Add {
        /// Page URL to categorize.
        url: String,
    },

    /// Print the configured starting categories.
    Categories,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "linksorter=info,tower_http=info",
        1 => "linksorter=debug,tower_http=debug",
        _ => "linksorter=trace,tower_http=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Serve { bind } => cmd_serve(config_path, bind).await,
        Command::Add { url } => cmd_add(config_path, &url).await,
        Command::Categories => cmd_categories(config_path),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

fn build_categorizer(config: &AppConfig) -> Result<Categorizer> {
    validate_api_key(config)?;
    Ok(Categorizer::from_config(config, api_key(config))?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_serve(config_path: Option<&Path>, bind: Option<String>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let categorizer = build_categorizer(&config)?;
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());

    info!(
        provider = %config.oracle.provider,
        model = %config.oracle.model,
        categories = config.categories.len(),
        "starting linksorter"
    );

    linksorter_api::serve(&bind, AppState::new(categorizer)).await?;
    Ok(())
}

async fn cmd_add(config_path: Option<&Path>, url: &str) -> Result<()> {
    let config = resolve_config(config_path)?;
    let categorizer = build_categorizer(&config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("categorizing {url}"));

    let result = categorizer.add_link(url).await;
    spinner.finish_and_clear();

    let map = result?;
    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(())
}

fn cmd_categories(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config.categories)?);
    Ok(())
}

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => {
            init_config_at(path)?;
            path.to_path_buf()
        }
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let source = match config_path {
        Some(path) => path.to_path_buf(),
        None => config_file_path()?,
    };
    println!("# {}", source.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
