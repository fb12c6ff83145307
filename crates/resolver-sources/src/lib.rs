//! Price source module for the price resolver.
//!
//! This module provides the strategy interface every upstream price API
//! implements, plus the concrete sources: the CoinGecko market-data
//! endpoint, the Worldcoin app price endpoint and the DexScreener DEX
//! aggregator. Sources follow the same trait-and-registry pattern so the
//! resolver can assemble its cascade purely from configuration.

use async_trait::async_trait;
use resolver_types::{ConfigSchema, ImplementationRegistry, PriceQuote, QuoteSource, TokenSymbol};
use std::time::Duration;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod coingecko;
	pub mod dexscreener;
	pub mod worldcoin;
}

/// Errors that can occur while fetching a price from an upstream source.
#[derive(Debug, Error)]
pub enum PriceSourceError {
	/// Error that occurs during network communication with the upstream.
	#[error("Network error: {0}")]
	Network(String),
	/// Upstream answered with a non-success status.
	#[error("Upstream returned HTTP {0}")]
	Http(u16),
	/// Upstream body could not be parsed or lacked the expected fields.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	/// Upstream answered but had no price for the token.
	#[error("Price data unavailable: {0}")]
	PriceUnavailable(String),
	/// The source has no route for the symbol.
	#[error("Token not supported: {0}")]
	TokenNotSupported(String),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait implemented by every upstream price source.
///
/// Sources are strategies in the resolver's cascade. `fetch_price` reports
/// precisely why a lookup failed; `try_quote` is the uniform capability the
/// cascade iterates over, logging the failure and yielding `None`.
#[async_trait]
pub trait PriceSourceInterface: Send + Sync {
	/// Returns the configuration schema for this source.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Provenance tag attached to prices from this source.
	fn source(&self) -> QuoteSource;

	/// Whether the source has a route (asset id, contract address, listed
	/// symbol) for the symbol. Unsupported symbols are never sent upstream.
	fn supports(&self, symbol: &TokenSymbol) -> bool;

	/// Fetches the USD price of a token.
	async fn fetch_price(&self, symbol: &TokenSymbol) -> Result<f64, PriceSourceError>;

	/// Fetches a quote, converting any failure into `None`.
	async fn try_quote(&self, symbol: &TokenSymbol) -> Option<PriceQuote> {
		match self.fetch_price(symbol).await {
			Ok(price) => Some(PriceQuote::new(price, self.source())),
			Err(e) => {
				tracing::warn!(source = %self.source(), symbol = %symbol, error = %e, "Price source failed");
				None
			},
		}
	}
}

/// Type alias for price source factory functions.
pub type PriceSourceFactory =
	fn(&toml::Value) -> Result<Box<dyn PriceSourceInterface>, PriceSourceError>;

/// Registry trait for price source implementations.
pub trait PriceSourceRegistry: ImplementationRegistry<Factory = PriceSourceFactory> {}

/// Get all registered price source implementations.
///
/// Returns a vector of (name, factory) tuples. The names are the keys used
/// under `[sources.implementations]`.
pub fn get_all_implementations() -> Vec<(&'static str, PriceSourceFactory)> {
	use implementations::{coingecko, dexscreener, worldcoin};

	vec![
		(coingecko::Registry::NAME, coingecko::Registry::factory()),
		(dexscreener::Registry::NAME, dexscreener::Registry::factory()),
		(worldcoin::Registry::NAME, worldcoin::Registry::factory()),
	]
}

/// Rejects prices that cannot be shown to a user.
pub(crate) fn validate_price(price: f64) -> Result<f64, PriceSourceError> {
	if price.is_finite() && price >= 0.0 {
		Ok(price)
	} else {
		Err(PriceSourceError::InvalidResponse(format!(
			"price {} is not a finite non-negative number",
			price
		)))
	}
}

/// Builds the HTTP client a source uses. Without a timeout the client
/// default applies.
pub(crate) fn build_http_client(
	timeout_seconds: Option<u64>,
) -> Result<reqwest::Client, PriceSourceError> {
	let mut builder = reqwest::Client::builder()
		.pool_idle_timeout(Duration::from_secs(90))
		.pool_max_idle_per_host(10);
	if let Some(seconds) = timeout_seconds {
		builder = builder.timeout(Duration::from_secs(seconds));
	}
	builder
		.build()
		.map_err(|e| PriceSourceError::Configuration(format!("HTTP client: {}", e)))
}

/// Deserializes and schema-checks a source's TOML block.
pub(crate) fn parse_config<T: serde::de::DeserializeOwned>(
	name: &str,
	config: &toml::Value,
	schema: &dyn ConfigSchema,
) -> Result<T, PriceSourceError> {
	schema
		.validate(config)
		.map_err(|e| PriceSourceError::Configuration(format!("Invalid {} config: {}", name, e)))?;
	config
		.clone()
		.try_into()
		.map_err(|e| PriceSourceError::Configuration(format!("Invalid {} config: {}", name, e)))
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_all_implementations_registered() {
		let names: Vec<_> = get_all_implementations()
			.into_iter()
			.map(|(name, _)| name)
			.collect();
		assert_eq!(names, vec!["coingecko", "dexscreener", "worldcoin_api"]);
	}

	#[test]
	fn test_validate_price() {
		assert_eq!(validate_price(0.02).unwrap(), 0.02);
		assert_eq!(validate_price(0.0).unwrap(), 0.0);
		assert!(validate_price(-0.5).is_err());
		assert!(validate_price(f64::INFINITY).is_err());
		assert!(validate_price(f64::NAN).is_err());
	}

	#[test]
	fn test_factories_accept_empty_tables() {
		let empty = toml::Value::Table(toml::map::Map::new());
		for (name, factory) in get_all_implementations() {
			let source = factory(&empty);
			assert!(source.is_ok(), "{} rejected defaults: {:?}", name, source.err());
		}
	}
}
