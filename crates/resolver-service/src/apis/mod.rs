//! Request handlers for the `/api` routes.

pub mod health;
pub mod price;

#[cfg(test)]
pub(crate) mod test_support {
	use crate::server::{build_router, AppState};
	use async_trait::async_trait;
	use axum::{body::Body, http::Request, Router};
	use resolver_config::TokensConfig;
	use resolver_core::{HistoryGenerator, PriceResolver, TokenTable};
	use resolver_sources::{PriceSourceError, PriceSourceInterface};
	use resolver_types::{ConfigSchema, QuoteSource, Schema, TokenSymbol, ValidationError};
	use serde_json::Value;
	use std::sync::Arc;
	use tower::ServiceExt;
	use tower_http::cors::CorsLayer;

	struct NoSchema;

	impl ConfigSchema for NoSchema {
		fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
			Schema::new(vec![], vec![]).validate(config)
		}
	}

	/// Source answering a fixed price for a fixed symbol list.
	pub struct FixedSource {
		pub tag: QuoteSource,
		pub symbols: Vec<&'static str>,
		pub price: Option<f64>,
	}

	#[async_trait]
	impl PriceSourceInterface for FixedSource {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(NoSchema)
		}

		fn source(&self) -> QuoteSource {
			self.tag
		}

		fn supports(&self, symbol: &TokenSymbol) -> bool {
			self.symbols.contains(&symbol.as_str())
		}

		async fn fetch_price(&self, symbol: &TokenSymbol) -> Result<f64, PriceSourceError> {
			self.price
				.ok_or_else(|| PriceSourceError::PriceUnavailable(symbol.to_string()))
		}
	}

	/// Router over a resolver with WLD priced by the market-data stub and
	/// TPF by the DEX stub.
	pub fn router() -> Router {
		let sources: Vec<Arc<dyn PriceSourceInterface>> = vec![
			Arc::new(FixedSource {
				tag: QuoteSource::Coingecko,
				symbols: vec!["WLD"],
				price: Some(2.5),
			}),
			Arc::new(FixedSource {
				tag: QuoteSource::Dexscreener,
				symbols: vec!["TPF"],
				price: Some(0.02),
			}),
		];
		let resolver = PriceResolver::new(sources, TokenTable::from_config(&TokensConfig::default()));
		let state = AppState {
			resolver: Arc::new(resolver),
			history: HistoryGenerator::new(0.05),
		};
		build_router(state, CorsLayer::permissive())
	}

	/// Issues a GET against the router and returns status and JSON body.
	pub async fn get_json(router: Router, uri: &str) -> (u16, Value) {
		let response = router
			.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
			.await
			.unwrap();
		let status = response.status().as_u16();
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		(status, serde_json::from_slice(&bytes).unwrap())
	}
}
