//! Price quotes and provenance tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which branch of the resolution cascade produced a price.
///
/// Callers display this tag, so it must always name the branch that
/// actually produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSource {
	/// Market-data endpoint (CoinGecko simple price).
	Coingecko,
	/// DEX aggregator pair price.
	Dexscreener,
	/// Worldcoin app price endpoint.
	WorldcoinApi,
	/// Static table price after every live source failed.
	Fallback,
	/// Static table price for a symbol on the unsupported list.
	FallbackUnsupported,
	/// Static table price after the cascade itself broke down.
	FallbackError,
}

impl QuoteSource {
	/// Returns the wire tag for this source.
	pub fn as_str(&self) -> &'static str {
		match self {
			QuoteSource::Coingecko => "coingecko",
			QuoteSource::Dexscreener => "dexscreener",
			QuoteSource::WorldcoinApi => "worldcoin_api",
			QuoteSource::Fallback => "fallback",
			QuoteSource::FallbackUnsupported => "fallback_unsupported",
			QuoteSource::FallbackError => "fallback_error",
		}
	}

	/// Returns true for the static-table tags.
	pub fn is_fallback(&self) -> bool {
		matches!(
			self,
			QuoteSource::Fallback | QuoteSource::FallbackUnsupported | QuoteSource::FallbackError
		)
	}
}

impl fmt::Display for QuoteSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A USD price together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
	/// Non-negative USD price; 0 means unknown.
	pub price: f64,
	/// Branch that produced the price.
	pub source: QuoteSource,
}

impl PriceQuote {
	/// Creates a quote, clamping invalid prices to 0.
	pub fn new(price: f64, source: QuoteSource) -> Self {
		let price = if price.is_finite() && price > 0.0 {
			price
		} else {
			0.0
		};
		Self { price, source }
	}
}
