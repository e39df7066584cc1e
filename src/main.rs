mod cli;
mod commands;

use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};
use unit_price_trends::config::{load_config, AppConfig};
use unit_price_trends::source::source_for;
use unit_price_trends::storage::DataStore;

const DEFAULT_CONFIG: &str = "config.json";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let config_path = cli
        .config
        .clone()
        .or_else(|| Path::new(DEFAULT_CONFIG).exists().then(|| DEFAULT_CONFIG.into()));
    let mut config = match config_path {
        Some(path) => match load_config(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("Config load error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => AppConfig::default(),
    };
    if let Some(dataset) = &cli.dataset {
        config.dataset = dataset.clone();
    }

    let source = match source_for(&config.dataset, config.request_timeout()) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to set up data source: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Loading dataset from {}", source.describe());
    let store = match DataStore::load(source.as_ref(), &config).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to load dataset: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = match &cli.command {
        Commands::List { all, query } => commands::cmd_list(&store, &config, *all, query.as_deref()),
        Commands::Search { query } => commands::cmd_search(&store, query),
        Commands::Analyze { args, json } => commands::cmd_analyze(&store, &config, args, *json),
        Commands::Chart { args } => commands::cmd_chart(&store, &config, args),
        Commands::Export {
            item,
            regions,
            out,
            print,
        } => commands::cmd_export(&store, item, regions.as_deref(), out.as_deref(), *print),
        Commands::Report { args, out, print } => {
            commands::cmd_report(&store, &config, args, out.as_deref(), *print)
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
