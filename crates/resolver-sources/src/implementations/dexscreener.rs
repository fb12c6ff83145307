//! DexScreener DEX aggregator price source.
//!
//! Looks up the trading pairs of a token contract on the configured chain
//! and takes the USD price of the first pair returned. The aggregator's
//! ordering is authoritative; no liquidity weighting is applied.

use crate::{
	build_http_client, parse_config, validate_price, PriceSourceError, PriceSourceFactory,
	PriceSourceInterface, PriceSourceRegistry,
};
use async_trait::async_trait;
use resolver_types::{
	validate_http_url, with_0x_prefix, ConfigSchema, Field, FieldType, ImplementationRegistry,
	QuoteSource, Schema, TokenSymbol, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for the DexScreener source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexscreenerConfig {
	#[serde(default = "default_base_url")]
	pub base_url: String,
	/// DexScreener chain id the token contracts live on.
	#[serde(default = "default_chain")]
	pub chain: String,
	/// Symbol -> token contract address on `chain`.
	#[serde(default)]
	pub tokens: HashMap<String, String>,
	/// Request timeout; the HTTP client default applies when unset.
	#[serde(default)]
	pub timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
	"https://api.dexscreener.com".to_string()
}

fn default_chain() -> String {
	"worldchain".to_string()
}

impl Default for DexscreenerConfig {
	fn default() -> Self {
		Self {
			base_url: default_base_url(),
			chain: default_chain(),
			tokens: HashMap::new(),
			timeout_seconds: None,
		}
	}
}

/// Configuration schema for the DexScreener source.
pub struct DexscreenerSchema;

impl ConfigSchema for DexscreenerSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("base_url", FieldType::String).with_validator(validate_http_url),
				Field::new("chain", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(chain) if !chain.trim().is_empty() => Ok(()),
						_ => Err("chain cannot be empty".to_string()),
					}
				}),
				Field::new("tokens", FieldType::Map(Box::new(FieldType::String))),
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
#[serde(rename_all = "camelCase")]
struct Pair {
	price_usd: Option<String>,
}

/// DexScreener-backed price source.
pub struct DexscreenerSource {
	client: reqwest::Client,
	base_url: String,
	chain: String,
	tokens: HashMap<TokenSymbol, String>,
}

impl DexscreenerSource {
	pub fn new(config: DexscreenerConfig) -> Result<Self, PriceSourceError> {
		let client = build_http_client(config.timeout_seconds)?;
		let tokens = config
			.tokens
			.into_iter()
			.map(|(symbol, address)| (TokenSymbol::new(symbol), with_0x_prefix(address.trim())))
			.collect();

		Ok(Self {
			client,
			base_url: config.base_url.trim_end_matches('/').to_string(),
			chain: config.chain,
			tokens,
		})
	}
}

#[async_trait]
impl PriceSourceInterface for DexscreenerSource {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(DexscreenerSchema)
	}

	fn source(&self) -> QuoteSource {
		QuoteSource::Dexscreener
	}

	fn supports(&self, symbol: &TokenSymbol) -> bool {
		self.tokens.contains_key(symbol)
	}

	async fn fetch_price(&self, symbol: &TokenSymbol) -> Result<f64, PriceSourceError> {
		let address = self
			.tokens
			.get(symbol)
			.ok_or_else(|| PriceSourceError::TokenNotSupported(symbol.to_string()))?;

		let response = self
			.client
			.get(format!(
				"{}/token-pairs/v1/{}/{}",
				self.base_url, self.chain, address
			))
			.header("accept", "application/json")
			.send()
			.await
			.map_err(|e| PriceSourceError::Network(e.to_string()))?;

		if !response.status().is_success() {
			return Err(PriceSourceError::Http(response.status().as_u16()));
		}

		// A token with no pools comes back as `[]` or `null`
		let pairs: Option<Vec<Pair>> = response
			.json()
			.await
			.map_err(|e| PriceSourceError::InvalidResponse(e.to_string()))?;

		let pairs = pairs.unwrap_or_default();
		let pair = pairs.first().ok_or_else(|| {
			PriceSourceError::PriceUnavailable(format!(
				"no {} pair for {} ({})",
				self.chain, symbol, address
			))
		})?;

		let price_usd = pair.price_usd.as_deref().ok_or_else(|| {
			PriceSourceError::InvalidResponse(format!("pair for {} has no priceUsd", symbol))
		})?;
		let price: f64 = price_usd.trim().parse().map_err(|_| {
			PriceSourceError::InvalidResponse(format!("priceUsd '{}' is not a number", price_usd))
		})?;

		tracing::debug!(symbol = %symbol, chain = %self.chain, pairs = pairs.len(), price, "DexScreener price");
		validate_price(price)
	}
}

/// Registry for the DexScreener source.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "dexscreener";
	type Factory = PriceSourceFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl PriceSourceRegistry for Registry {}

/// Factory function to create the DexScreener source from configuration.
///
/// Configuration parameters (all optional):
/// - `base_url`: API root
/// - `chain`: chain id the token contracts live on, default `worldchain`
/// - `tokens`: symbol -> token contract address table
/// - `timeout_seconds`: request timeout
pub fn create_source(
	config: &toml::Value,
) -> Result<Box<dyn PriceSourceInterface>, PriceSourceError> {
	let config: DexscreenerConfig = parse_config(Registry::NAME, config, &DexscreenerSchema)?;
	Ok(Box::new(DexscreenerSource::new(config)?))
}
