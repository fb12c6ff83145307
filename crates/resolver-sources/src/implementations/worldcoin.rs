//! Worldcoin app price source.
//!
//! The World App backend publishes fiat prices for the assets a mini-app can
//! hold. Amounts are fixed-point integers with an explicit decimal count:
//!
//! ```json
//! { "result": { "prices": { "WLD": { "USD": { "amount": "1510763", "decimals": 6 } } } } }
//! ```

use crate::{
	build_http_client, parse_config, validate_price, PriceSourceError, PriceSourceFactory,
	PriceSourceInterface, PriceSourceRegistry,
};
use async_trait::async_trait;
use resolver_types::{
	format_token_amount, validate_http_url, ConfigSchema, Field, FieldType,
	ImplementationRegistry, QuoteSource, Schema, TokenSymbol, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const FIAT: &str = "USD";

/// Configuration for the Worldcoin app price source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldcoinConfig {
	#[serde(default = "default_base_url")]
	pub base_url: String,
	/// Symbols the endpoint is asked about.
	#[serde(default = "default_symbols")]
	pub symbols: Vec<String>,
	/// Request timeout; the HTTP client default applies when unset.
	#[serde(default)]
	pub timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
	"https://app-backend.worldcoin.dev".to_string()
}

fn default_symbols() -> Vec<String> {
	vec!["WLD".to_string()]
}

impl Default for WorldcoinConfig {
	fn default() -> Self {
		Self {
			base_url: default_base_url(),
			symbols: default_symbols(),
			timeout_seconds: None,
		}
	}
}

/// Configuration schema for the Worldcoin app price source.
pub struct WorldcoinSchema;

impl ConfigSchema for WorldcoinSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("base_url", FieldType::String).with_validator(validate_http_url),
				Field::new("symbols", FieldType::Array(Box::new(FieldType::String))),
				Field::new(
					"timeout_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(300),
					},
				),
			],
		);
		schema.validate(config)
	}
}

#[derive(Debug, Deserialize)]
struct PricesEnvelope {
	result: PricesResult,
}

#[derive(Debug, Deserialize)]
struct PricesResult {
	prices: HashMap<String, HashMap<String, FixedAmount>>,
}

#[derive(Debug, Deserialize)]
struct FixedAmount {
	amount: String,
	decimals: u8,
}

/// Worldcoin app price source.
pub struct WorldcoinSource {
	client: reqwest::Client,
	base_url: String,
	symbols: HashSet<TokenSymbol>,
}

impl WorldcoinSource {
	pub fn new(config: WorldcoinConfig) -> Result<Self, PriceSourceError> {
		Ok(Self {
			client: build_http_client(config.timeout_seconds)?,
			base_url: config.base_url.trim_end_matches('/').to_string(),
			symbols: config.symbols.into_iter().map(TokenSymbol::new).collect(),
		})
	}
}

#[async_trait]
impl PriceSourceInterface for WorldcoinSource {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(WorldcoinSchema)
	}

	fn source(&self) -> QuoteSource {
		QuoteSource::WorldcoinApi
	}

	fn supports(&self, symbol: &TokenSymbol) -> bool {
		self.symbols.contains(symbol)
	}

	async fn fetch_price(&self, symbol: &TokenSymbol) -> Result<f64, PriceSourceError> {
		if !self.supports(symbol) {
			return Err(PriceSourceError::TokenNotSupported(symbol.to_string()));
		}

		let response = self
			.client
			.get(format!("{}/public/v1/miniapps/prices", self.base_url))
			.query(&[("cryptoCurrencies", symbol.as_str()), ("fiatCurrencies", FIAT)])
			.header("accept", "application/json")
			.send()
			.await
			.map_err(|e| PriceSourceError::Network(e.to_string()))?;

		if !response.status().is_success() {
			return Err(PriceSourceError::Http(response.status().as_u16()));
		}

		let body: PricesEnvelope = response
			.json()
			.await
			.map_err(|e| PriceSourceError::InvalidResponse(e.to_string()))?;

		let fixed = body
			.result
			.prices
			.get(symbol.as_str())
			.and_then(|fiat| fiat.get(FIAT))
			.ok_or_else(|| {
				PriceSourceError::PriceUnavailable(format!("no {} price for {}", FIAT, symbol))
			})?;

		let price = format_token_amount(&fixed.amount, fixed.decimals)
			.and_then(|decimal| decimal.parse::<f64>().ok())
			.ok_or_else(|| {
				PriceSourceError::InvalidResponse(format!(
					"amount '{}' is not a fixed-point integer",
					fixed.amount
				))
			})?;

		tracing::debug!(symbol = %symbol, price, "Worldcoin app price");
		validate_price(price)
	}
}

/// Registry for the Worldcoin app price source.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "worldcoin_api";
	type Factory = PriceSourceFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl PriceSourceRegistry for Registry {}

/// Factory function to create the Worldcoin app price source.
pub fn create_source(
	config: &toml::Value,
) -> Result<Box<dyn PriceSourceInterface>, PriceSourceError> {
	let config: WorldcoinConfig = parse_config(Registry::NAME, config, &WorldcoinSchema)?;
	Ok(Box::new(WorldcoinSource::new(config)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::serve;
	use axum::{extract::Query, routing::get, Json, Router};
	use serde_json::json;

	fn source_for(base_url: String) -> WorldcoinSource {
		WorldcoinSource::new(WorldcoinConfig {
			base_url,
			..WorldcoinConfig::default()
		})
		.unwrap()
	}

	#[tokio::test]
	async fn test_fixed_point_price() {
		let router = Router::new().route(
			"/public/v1/miniapps/prices",
			get(|Query(params): Query<HashMap<String, String>>| async move {
				assert_eq!(params.get("cryptoCurrencies").map(String::as_str), Some("WLD"));
				Json(json!({
					"result": { "prices": { "WLD": { "USD": {
						"asset": "USD", "amount": "1510763", "decimals": 6, "symbol": "USD"
					} } } }
				}))
			}),
		);
		let source = source_for(serve(router).await);

		let quote = source.try_quote(&TokenSymbol::new("WLD")).await.unwrap();
		assert_eq!(quote.price, 1.510763);
		assert_eq!(quote.source, QuoteSource::WorldcoinApi);
	}

	#[tokio::test]
	async fn test_missing_symbol_in_response() {
		let router = Router::new().route(
			"/public/v1/miniapps/prices",
			get(|| async { Json(json!({ "result": { "prices": {} } })) }),
		);
		let source = source_for(serve(router).await);

		let result = source.fetch_price(&TokenSymbol::new("WLD")).await;
		assert!(matches!(result, Err(PriceSourceError::PriceUnavailable(_))));
	}

	#[tokio::test]
	async fn test_malformed_amount() {
		let router = Router::new().route(
			"/public/v1/miniapps/prices",
			get(|| async {
				Json(json!({
					"result": { "prices": { "WLD": { "USD": { "amount": "1.5", "decimals": 6 } } } }
				}))
			}),
		);
		let source = source_for(serve(router).await);

		let result = source.fetch_price(&TokenSymbol::new("WLD")).await;
		assert!(matches!(result, Err(PriceSourceError::InvalidResponse(_))));
	}

	#[test]
	fn test_supports_configured_symbols() {
		let config: toml::Value = toml::from_str("symbols = [\"wld\", \"usdce\"]").unwrap();
		let source = create_source(&config).unwrap();
		assert!(source.supports(&TokenSymbol::new("USDCE")));
		assert!(!source.supports(&TokenSymbol::new("TPF")));
	}
}
