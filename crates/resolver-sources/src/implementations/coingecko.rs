//! CoinGecko market-data price source.
//!
//! Queries `/simple/price` for one asset id at a time. Only symbols with an
//! entry in the `asset_ids` table are routed here; by default that is WLD,
//! because the tokens traded only on World Chain are not listed.

use crate::{
	build_http_client, parse_config, validate_price, PriceSourceError, PriceSourceFactory,
	PriceSourceInterface, PriceSourceRegistry,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use resolver_types::{
	validate_http_url, ConfigSchema, Field, FieldType, ImplementationRegistry, QuoteSource, Schema,
	TokenSymbol, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for the CoinGecko source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoingeckoConfig {
	/// API root, without the `/simple/price` suffix.
	#[serde(default = "default_base_url")]
	pub base_url: String,
	/// Optional demo API key, sent as `x-cg-demo-api-key`. Blank means none.
	#[serde(default)]
	pub api_key: Option<String>,
	/// Symbol -> CoinGecko asset id.
	#[serde(default = "default_asset_ids")]
	pub asset_ids: HashMap<String, String>,
	/// Request timeout; the HTTP client default applies when unset.
	#[serde(default)]
	pub timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
	"https://api.coingecko.com/api/v3".to_string()
}

fn default_asset_ids() -> HashMap<String, String> {
	HashMap::from([("WLD".to_string(), "worldcoin".to_string())])
}

impl Default for CoingeckoConfig {
	fn default() -> Self {
		Self {
			base_url: default_base_url(),
			api_key: None,
			asset_ids: default_asset_ids(),
			timeout_seconds: None,
		}
	}
}

/// Configuration schema for the CoinGecko source.
pub struct CoingeckoSchema;

impl ConfigSchema for CoingeckoSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("base_url", FieldType::String).with_validator(validate_http_url),
				Field::new("api_key", FieldType::String),
				Field::new("asset_ids", FieldType::Map(Box::new(FieldType::String))),
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

/// CoinGecko-backed price source.
pub struct CoingeckoSource {
	client: reqwest::Client,
	base_url: String,
	api_key: Option<String>,
	asset_ids: HashMap<TokenSymbol, String>,
}

impl CoingeckoSource {
	pub fn new(config: CoingeckoConfig) -> Result<Self, PriceSourceError> {
		let client = build_http_client(config.timeout_seconds)?;
		let asset_ids = config
			.asset_ids
			.into_iter()
			.map(|(symbol, id)| (TokenSymbol::new(symbol), id))
			.collect();

		Ok(Self {
			client,
			base_url: config.base_url.trim_end_matches('/').to_string(),
			api_key: config.api_key.filter(|key| !key.trim().is_empty()),
			asset_ids,
		})
	}
}

#[async_trait]
impl PriceSourceInterface for CoingeckoSource {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(CoingeckoSchema)
	}

	fn source(&self) -> QuoteSource {
		QuoteSource::Coingecko
	}

	fn supports(&self, symbol: &TokenSymbol) -> bool {
		self.asset_ids.contains_key(symbol)
	}

	async fn fetch_price(&self, symbol: &TokenSymbol) -> Result<f64, PriceSourceError> {
		let asset_id = self
			.asset_ids
			.get(symbol)
			.ok_or_else(|| PriceSourceError::TokenNotSupported(symbol.to_string()))?;

		let mut request = self
			.client
			.get(format!("{}/simple/price", self.base_url))
			.query(&[("ids", asset_id.as_str()), ("vs_currencies", "usd")])
			.header("accept", "application/json");
		if let Some(key) = &self.api_key {
			request = request.header("x-cg-demo-api-key", key);
		}

		let response = request
			.send()
			.await
			.map_err(|e| PriceSourceError::Network(e.to_string()))?;

		// Anything but 200 counts the same as a missing field
		if response.status() != StatusCode::OK {
			return Err(PriceSourceError::Http(response.status().as_u16()));
		}

		// { "<asset_id>": { "usd": 2.5 } }
		let body: serde_json::Value = response
			.json()
			.await
			.map_err(|e| PriceSourceError::InvalidResponse(e.to_string()))?;

		let price = body
			.get(asset_id)
			.and_then(|record| record.get("usd"))
			.and_then(serde_json::Value::as_f64)
			.ok_or_else(|| {
				PriceSourceError::InvalidResponse(format!("no numeric usd price for {}", asset_id))
			})?;

		tracing::debug!(symbol = %symbol, asset_id = %asset_id, price, "CoinGecko price");
		validate_price(price)
	}
}

/// Registry for the CoinGecko source.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "coingecko";
	type Factory = PriceSourceFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl PriceSourceRegistry for Registry {}

/// Factory function to create the CoinGecko source from configuration.
///
/// Configuration parameters (all optional):
/// - `base_url`: API root
/// - `api_key`: demo API key
/// - `asset_ids`: symbol -> asset id table
/// - `timeout_seconds`: request timeout
pub fn create_source(
	config: &toml::Value,
) -> Result<Box<dyn PriceSourceInterface>, PriceSourceError> {
	let config: CoingeckoConfig = parse_config(Registry::NAME, config, &CoingeckoSchema)?;
	Ok(Box::new(CoingeckoSource::new(config)?))
}
