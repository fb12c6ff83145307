//! Static token tables: aliases, the market-data denylist and fallback prices.

use resolver_config::TokensConfig;
use resolver_types::TokenSymbol;
use std::collections::{HashMap, HashSet};

/// Lookup tables the resolver consults around the live sources.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
	aliases: HashMap<TokenSymbol, TokenSymbol>,
	unsupported: HashSet<TokenSymbol>,
	fallback_prices: HashMap<TokenSymbol, f64>,
	default_price: f64,
}

impl TokenTable {
	pub fn from_config(config: &TokensConfig) -> Self {
		Self {
			aliases: config
				.aliases
				.iter()
				.map(|(from, to)| (TokenSymbol::new(from), TokenSymbol::new(to)))
				.collect(),
			unsupported: config.unsupported.iter().map(TokenSymbol::new).collect(),
			fallback_prices: config
				.fallback_prices
				.iter()
				.map(|(symbol, price)| (TokenSymbol::new(symbol), *price))
				.collect(),
			default_price: config.default_price,
		}
	}

	/// Normalizes a raw request symbol and applies a single alias hop.
	pub fn canonical(&self, raw: &str) -> TokenSymbol {
		let symbol = TokenSymbol::new(raw);
		match self.aliases.get(&symbol) {
			Some(target) => target.clone(),
			None => symbol,
		}
	}

	/// Whether the market-data API is known not to list the symbol.
	pub fn is_unsupported(&self, symbol: &TokenSymbol) -> bool {
		self.unsupported.contains(symbol)
	}

	pub fn fallback_price(&self, symbol: &TokenSymbol) -> f64 {
		self.fallback_prices
			.get(symbol)
			.copied()
			.unwrap_or(self.default_price)
	}
}
