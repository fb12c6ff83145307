//! Price resolution cascade.
//!
//! A resolution normalizes the symbol, walks the configured sources that
//! have a route for it, and falls back to the static price table when none
//! answers. It never fails: every outcome is a `PriceQuote` whose tag tells
//! the caller where the number came from.

use crate::tokens::TokenTable;
use futures::future::join_all;
use futures::FutureExt;
use resolver_sources::PriceSourceInterface;
use resolver_types::{PriceQuote, QuoteSource, TokenSymbol};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Resolves token symbols to USD prices.
///
/// Immutable after construction; share it behind an `Arc`.
pub struct PriceResolver {
	sources: Vec<Arc<dyn PriceSourceInterface>>,
	tokens: TokenTable,
}

impl PriceResolver {
	/// Creates a resolver that tries `sources` in the given order.
	pub fn new(sources: Vec<Arc<dyn PriceSourceInterface>>, tokens: TokenTable) -> Self {
		Self { sources, tokens }
	}

	pub fn tokens(&self) -> &TokenTable {
		&self.tokens
	}

	/// Provenance tags of the configured sources, in cascade order.
	pub fn source_names(&self) -> Vec<String> {
		self.sources
			.iter()
			.map(|source| source.source().to_string())
			.collect()
	}

	/// Normalizes `raw` and resolves it.
	pub async fn resolve(&self, raw: &str) -> PriceQuote {
		let symbol = self.tokens.canonical(raw);
		self.resolve_symbol(&symbol).await
	}

	/// Resolves an already canonical symbol.
	///
	/// A panic anywhere in the cascade is contained here and answered with
	/// the fallback price tagged `fallback_error`.
	pub async fn resolve_symbol(&self, symbol: &TokenSymbol) -> PriceQuote {
		match AssertUnwindSafe(self.cascade(symbol)).catch_unwind().await {
			Ok(quote) => quote,
			Err(panic) => {
				let reason = panic
					.downcast_ref::<&str>()
					.map(|s| s.to_string())
					.or_else(|| panic.downcast_ref::<String>().cloned())
					.unwrap_or_else(|| "unknown panic".to_string());
				tracing::error!(symbol = %symbol, reason = %reason, "Price resolution panicked");
				self.fallback(symbol, QuoteSource::FallbackError)
			},
		}
	}

	/// Resolves several raw symbols concurrently, preserving input order.
	pub async fn resolve_many<S: AsRef<str>>(&self, raw: &[S]) -> Vec<(TokenSymbol, PriceQuote)> {
		let quotes = join_all(raw.iter().map(|item| async move {
			let symbol = self.tokens.canonical(item.as_ref());
			let quote = self.resolve_symbol(&symbol).await;
			(symbol, quote)
		}))
		.await;

		let fallbacks = quotes.iter().filter(|(_, q)| q.source.is_fallback()).count();
		tracing::debug!(count = quotes.len(), fallbacks, "Resolved batch");
		quotes
	}

	async fn cascade(&self, symbol: &TokenSymbol) -> PriceQuote {
		let miss = if self.tokens.is_unsupported(symbol) {
			QuoteSource::FallbackUnsupported
		} else {
			QuoteSource::Fallback
		};

		let mut attempted = 0usize;
		for source in self.sources.iter().filter(|s| s.supports(symbol)) {
			attempted += 1;
			if let Some(quote) = source.try_quote(symbol).await {
				tracing::debug!(symbol = %symbol, source = %quote.source, price = quote.price, "Resolved");
				return quote;
			}
		}

		tracing::debug!(symbol = %symbol, attempted, tag = %miss, "No live price, using fallback");
		self.fallback(symbol, miss)
	}

	fn fallback(&self, symbol: &TokenSymbol, tag: QuoteSource) -> PriceQuote {
		PriceQuote::new(self.tokens.fallback_price(symbol), tag)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use resolver_config::TokensConfig;
	use resolver_sources::PriceSourceError;
	use resolver_types::{ConfigSchema, Schema, ValidationError};
	use std::sync::atomic::{AtomicUsize, Ordering};

	struct EmptySchema;

	impl ConfigSchema for EmptySchema {
		fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
			Schema::new(vec![], vec![]).validate(config)
		}
	}

	enum Behavior {
		Price(f64),
		Fail,
		Panic,
	}

	/// Source stub that answers for a fixed symbol list and counts calls.
	struct StubSource {
		tag: QuoteSource,
		symbols: Vec<&'static str>,
		behavior: Behavior,
		calls: Arc<AtomicUsize>,
	}

	impl StubSource {
		fn new(tag: QuoteSource, symbols: Vec<&'static str>, behavior: Behavior) -> Self {
			Self {
				tag,
				symbols,
				behavior,
				calls: Arc::new(AtomicUsize::new(0)),
			}
		}

		fn counter(&self) -> Arc<AtomicUsize> {
			self.calls.clone()
		}
	}

	#[async_trait]
	impl PriceSourceInterface for StubSource {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(EmptySchema)
		}

		fn source(&self) -> QuoteSource {
			self.tag
		}

		fn supports(&self, symbol: &TokenSymbol) -> bool {
			self.symbols.contains(&symbol.as_str())
		}

		async fn fetch_price(&self, symbol: &TokenSymbol) -> Result<f64, PriceSourceError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			match self.behavior {
				Behavior::Price(price) => Ok(price),
				Behavior::Fail => Err(PriceSourceError::Http(503)),
				Behavior::Panic => panic!("stub exploded on {}", symbol),
			}
		}
	}

	fn default_tokens() -> TokenTable {
		TokenTable::from_config(&TokensConfig::default())
	}

	fn resolver(sources: Vec<StubSource>) -> PriceResolver {
		PriceResolver::new(
			sources
				.into_iter()
				.map(|s| Arc::new(s) as Arc<dyn PriceSourceInterface>)
				.collect(),
			default_tokens(),
		)
	}

	#[tokio::test]
	async fn test_market_data_price_wins() {
		let market = StubSource::new(QuoteSource::Coingecko, vec!["WLD"], Behavior::Price(2.5));
		let resolver = resolver(vec![market]);

		let quote = resolver.resolve("wld").await;
		assert_eq!(quote, PriceQuote::new(2.5, QuoteSource::Coingecko));
	}

	#[tokio::test]
	async fn test_failed_source_moves_to_next() {
		let market = StubSource::new(QuoteSource::Coingecko, vec!["WLD"], Behavior::Fail);
		let app = StubSource::new(QuoteSource::WorldcoinApi, vec!["WLD"], Behavior::Price(1.51));
		let (market_calls, app_calls) = (market.counter(), app.counter());
		let resolver = resolver(vec![market, app]);

		let quote = resolver.resolve("WLD").await;
		assert_eq!(quote.source, QuoteSource::WorldcoinApi);
		assert_eq!(quote.price, 1.51);
		assert_eq!(market_calls.load(Ordering::SeqCst), 1);
		assert_eq!(app_calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_all_sources_failing_uses_fallback() {
		let market = StubSource::new(QuoteSource::Coingecko, vec!["WLD"], Behavior::Fail);
		let resolver = resolver(vec![market]);

		let quote = resolver.resolve("WLD").await;
		assert_eq!(quote, PriceQuote::new(2.35, QuoteSource::Fallback));
	}

	#[tokio::test]
	async fn test_denylisted_symbol_makes_no_calls() {
		let market = StubSource::new(QuoteSource::Coingecko, vec!["WLD"], Behavior::Price(2.5));
		let dex = StubSource::new(QuoteSource::Dexscreener, vec!["TPF"], Behavior::Price(0.02));
		let (market_calls, dex_calls) = (market.counter(), dex.counter());
		let resolver = resolver(vec![market, dex]);

		let quote = resolver.resolve("DNA").await;
		assert_eq!(quote, PriceQuote::new(0.25, QuoteSource::FallbackUnsupported));
		assert_eq!(market_calls.load(Ordering::SeqCst), 0);
		assert_eq!(dex_calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_denylisted_symbol_with_dex_route() {
		let market = StubSource::new(QuoteSource::Coingecko, vec!["WLD"], Behavior::Price(2.5));
		let dex = StubSource::new(QuoteSource::Dexscreener, vec!["TPF"], Behavior::Price(0.02));
		let market_calls = market.counter();
		let resolver = resolver(vec![market, dex]);

		let quote = resolver.resolve("tpf").await;
		assert_eq!(quote, PriceQuote::new(0.02, QuoteSource::Dexscreener));
		assert_eq!(market_calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_denylisted_symbol_with_failing_dex() {
		let dex = StubSource::new(QuoteSource::Dexscreener, vec!["TPF"], Behavior::Fail);
		let resolver = resolver(vec![dex]);

		let quote = resolver.resolve("TPF").await;
		assert_eq!(quote, PriceQuote::new(0.02, QuoteSource::FallbackUnsupported));
	}

	#[tokio::test]
	async fn test_unknown_symbol() {
		let market = StubSource::new(QuoteSource::Coingecko, vec!["WLD"], Behavior::Price(2.5));
		let calls = market.counter();
		let resolver = resolver(vec![market]);

		let quote = resolver.resolve("UNKNOWN").await;
		assert_eq!(quote, PriceQuote::new(0.0, QuoteSource::Fallback));
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_alias_resolves_to_canonical_route() {
		let dex = StubSource::new(QuoteSource::Dexscreener, vec!["USDCE"], Behavior::Price(0.9998));
		let resolver = resolver(vec![dex]);

		let quote = resolver.resolve("usdc").await;
		assert_eq!(quote, PriceQuote::new(0.9998, QuoteSource::Dexscreener));
	}

	#[tokio::test]
	async fn test_panicking_source_yields_fallback_error() {
		let market = StubSource::new(QuoteSource::Coingecko, vec!["WLD"], Behavior::Panic);
		let resolver = resolver(vec![market]);

		let quote = resolver.resolve("WLD").await;
		assert_eq!(quote, PriceQuote::new(2.35, QuoteSource::FallbackError));
	}

	#[tokio::test]
	async fn test_resolution_is_idempotent() {
		let resolver = resolver(vec![]);
		let first = resolver.resolve("WETH").await;
		let second = resolver.resolve("WETH").await;
		assert_eq!(first, second);
		assert_eq!(first, PriceQuote::new(2500.0, QuoteSource::Fallback));
	}

	#[tokio::test]
	async fn test_live_resolution_is_idempotent() {
		let market = StubSource::new(QuoteSource::Coingecko, vec!["WLD"], Behavior::Fail);
		let dex = StubSource::new(QuoteSource::Dexscreener, vec!["WLD", "TPF"], Behavior::Price(2.41));
		let (market_calls, dex_calls) = (market.counter(), dex.counter());
		let resolver = resolver(vec![market, dex]);

		for raw in ["WLD", "TPF"] {
			let first = resolver.resolve(raw).await;
			let second = resolver.resolve(raw).await;
			assert_eq!(first, second, "{}", raw);
			assert_eq!(first, PriceQuote::new(2.41, QuoteSource::Dexscreener));
			assert!(!first.source.is_fallback());
		}
		assert_eq!(market_calls.load(Ordering::SeqCst), 2);
		assert_eq!(dex_calls.load(Ordering::SeqCst), 4);
	}

	#[tokio::test]
	async fn test_resolve_many_preserves_order() {
		let market = StubSource::new(QuoteSource::Coingecko, vec!["WLD"], Behavior::Price(2.5));
		let resolver = resolver(vec![market]);

		let quotes = resolver.resolve_many(&["DNA", "wld", "usdc"]).await;
		let symbols: Vec<_> = quotes.iter().map(|(s, _)| s.as_str()).collect();
		assert_eq!(symbols, vec!["DNA", "WLD", "USDCE"]);
		assert_eq!(quotes[0].1.source, QuoteSource::FallbackUnsupported);
		assert_eq!(quotes[1].1, PriceQuote::new(2.5, QuoteSource::Coingecko));
		assert_eq!(quotes[2].1, PriceQuote::new(1.0, QuoteSource::Fallback));
	}

	#[test]
	fn test_source_names_follow_order() {
		let resolver = resolver(vec![
			StubSource::new(QuoteSource::Dexscreener, vec![], Behavior::Fail),
			StubSource::new(QuoteSource::Coingecko, vec![], Behavior::Fail),
		]);
		assert_eq!(resolver.source_names(), vec!["dexscreener", "coingecko"]);
	}
}
