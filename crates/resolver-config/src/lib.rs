//! Configuration module for the price resolver.
//!
//! Configuration is loaded from TOML. String values may reference
//! environment variables as `${VAR}` or `${VAR:-default}`, and a file may
//! pull in other files with `include = ["sources.toml"]` as long as every
//! top-level section is defined exactly once across all files.
//!
//! The token tables (`[tokens]`) are independent of the
//! per-source routing tables under `[sources.implementations]`: the
//! resolver's fallback prices and denylist never reach the sources, and a
//! source's asset ids or contract addresses never reach the resolver.

mod loader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only, the full error echoes the whole input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the price resolver.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this service instance.
	pub service: ServiceConfig,
	/// Alias, denylist and fallback tables used by the resolver.
	#[serde(default)]
	pub tokens: TokensConfig,
	/// Synthetic history settings.
	#[serde(default)]
	pub history: HistoryConfig,
	/// Price sources and their cascade order.
	pub sources: SourcesConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this instance, used in logs.
	pub id: String,
}

/// Static token tables injected into the resolver.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokensConfig {
	/// Symbols the market-data API does not list.
	#[serde(default = "default_unsupported")]
	pub unsupported: Vec<String>,
	/// Symbol aliases applied after uppercasing (`USDC` -> `USDCE`).
	#[serde(default = "default_aliases")]
	pub aliases: HashMap<String, String>,
	/// Static USD prices returned when no live source succeeds.
	#[serde(default = "default_fallback_prices")]
	pub fallback_prices: HashMap<String, f64>,
	/// Price for symbols missing from `fallback_prices`.
	#[serde(default)]
	pub default_price: f64,
}

impl Default for TokensConfig {
	fn default() -> Self {
		Self {
			unsupported: default_unsupported(),
			aliases: default_aliases(),
			fallback_prices: default_fallback_prices(),
			default_price: 0.0,
		}
	}
}

fn default_unsupported() -> Vec<String> {
	["TPF", "DNA", "WDD", "CASH"]
		.iter()
		.map(|s| s.to_string())
		.collect()
}

fn default_aliases() -> HashMap<String, String> {
	HashMap::from([
		("USDC".to_string(), "USDCE".to_string()),
		("USDC.E".to_string(), "USDCE".to_string()),
	])
}

fn default_fallback_prices() -> HashMap<String, f64> {
	HashMap::from([
		("WLD".to_string(), 2.35),
		("TPF".to_string(), 0.02),
		("DNA".to_string(), 0.25),
		("WDD".to_string(), 0.1),
		("CASH".to_string(), 0.05),
		("USDCE".to_string(), 1.0),
		("WETH".to_string(), 2500.0),
	])
}

/// Synthetic history settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
	/// Half-width of the uniform perturbation band, as a fraction of the price.
	#[serde(default = "default_volatility")]
	pub volatility: f64,
}

impl Default for HistoryConfig {
	fn default() -> Self {
		Self {
			volatility: default_volatility(),
		}
	}
}

fn default_volatility() -> f64 {
	0.05
}

/// Price sources and their cascade order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
	/// Source names in the order they are attempted.
	pub order: Vec<String>,
	/// Map of source implementation names to their raw configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// CORS configuration; permissive when absent.
	pub cors: Option<CorsConfig>,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
	/// Allowed origins for CORS.
	pub allowed_origins: Vec<String>,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}. Substituted
/// values are not scanned again.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

/// Parses raw TOML text and resolves environment references inside its
/// string values. Comments and keys are left alone.
pub(crate) fn parse_document(input: &str) -> Result<toml::Value, ConfigError> {
	// Reject oversized input before parsing
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let mut document: toml::Value = toml::from_str(input)?;
	resolve_value_env_vars(&mut document)?;
	Ok(document)
}

fn resolve_value_env_vars(value: &mut toml::Value) -> Result<(), ConfigError> {
	match value {
		toml::Value::String(s) => *s = resolve_env_vars(s)?,
		toml::Value::Array(items) => {
			for item in items.iter_mut() {
				resolve_value_env_vars(item)?;
			}
		},
		toml::Value::Table(table) => {
			for (_, item) in table.iter_mut() {
				resolve_value_env_vars(item)?;
			}
		},
		_ => {},
	}
	Ok(())
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Deserializes and validates a document whose environment references
	/// are already resolved.
	pub(crate) fn from_resolved(document: toml::Value) -> Result<Self, ConfigError> {
		let config: Config = document.try_into()?;
		config.validate()?;
		Ok(config)
	}

	/// Returns the API config when the server is enabled.
	pub fn enabled_api(&self) -> Option<&ApiConfig> {
		self.api.as_ref().filter(|api| api.enabled)
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// Per-source settings are validated later by each source's own schema;
	/// this pass only checks what the resolver itself depends on.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.trim().is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		// An empty order is legal and serves fallback prices only
		let mut seen = HashSet::new();
		for name in &self.sources.order {
			if !seen.insert(name) {
				return Err(ConfigError::Validation(format!(
					"Source '{}' appears more than once in sources.order",
					name
				)));
			}
			if !self.sources.implementations.contains_key(name) {
				return Err(ConfigError::Validation(format!(
					"Source '{}' in sources.order not found in sources.implementations",
					name
				)));
			}
		}

		// Tokens
		for (symbol, price) in &self.tokens.fallback_prices {
			if !price.is_finite() || *price < 0.0 {
				return Err(ConfigError::Validation(format!(
					"Fallback price for '{}' must be a finite non-negative number",
					symbol
				)));
			}
		}
		if !self.tokens.default_price.is_finite() || self.tokens.default_price < 0.0 {
			return Err(ConfigError::Validation(
				"tokens.default_price must be a finite non-negative number".into(),
			));
		}
		for (alias, target) in &self.tokens.aliases {
			if alias.trim().is_empty() || target.trim().is_empty() {
				return Err(ConfigError::Validation(
					"Token aliases must map a non-empty symbol to a non-empty symbol".into(),
				));
			}
		}

		// History
		let volatility = self.history.volatility;
		if !volatility.is_finite() || !(0.0..1.0).contains(&volatility) {
			return Err(ConfigError::Validation(format!(
				"history.volatility must be in [0, 1), got {}",
				volatility
			)));
		}

		// API
		if let Some(api) = self.enabled_api() {
			if api.port == 0 {
				return Err(ConfigError::Validation("api.port cannot be 0".into()));
			}
			if let Some(cors) = &api.cors {
				if cors.allowed_origins.is_empty() {
					return Err(ConfigError::Validation(
						"api.cors.allowed_origins cannot be empty when [api.cors] is present"
							.into(),
					));
				}
			}
		}

		Ok(())
	}
}

/// Parses a TOML string, resolving environment variables and validating
/// the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Config::from_resolved(parse_document(s)?)
	}
}
