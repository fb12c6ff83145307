//! Main entry point for the price resolver service.
//!
//! Loads the configuration, wires the configured price sources into a
//! resolver and serves it over HTTP.

use clap::Parser;
use resolver_config::Config;
use resolver_core::HistoryGenerator;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod factory_registry;
mod server;

use factory_registry::build_resolver_from_config;

/// Command-line arguments for the price resolver service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config/resolver.toml", env = "RESOLVER_CONFIG")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the price resolver service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the resolver with the configured sources
/// 5. Serves the API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started price resolver");

	let config_path = args
		.config
		.to_str()
		.ok_or_else(|| format!("Config path is not valid UTF-8: {}", args.config.display()))?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let history = HistoryGenerator::from_config(&config.history);
	let api_config = config.enabled_api().cloned();

	let resolver = Arc::new(build_resolver_from_config(config)?);
	tracing::info!(sources = ?resolver.source_names(), "Built price resolver");

	match api_config {
		Some(api_config) => {
			let state = server::AppState { resolver, history };
			server::start_server(api_config, state).await?;
		},
		None => {
			tracing::warn!("API server disabled in configuration; nothing to serve");
		},
	}

	tracing::info!("Stopped price resolver");
	Ok(())
}
