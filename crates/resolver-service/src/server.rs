//! HTTP server for the price resolver API.
//!
//! Routes are nested under `/api`; CORS is permissive unless the
//! configuration lists allowed origins.

use crate::apis;
use axum::{
	http::{HeaderValue, Method},
	routing::get,
	Router,
};
use resolver_config::ApiConfig;
use resolver_core::{HistoryGenerator, PriceResolver};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
	cors::{AllowOrigin, Any, CorsLayer},
	trace::TraceLayer,
};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Resolver shared by every request.
	pub resolver: Arc<PriceResolver>,
	/// Synthetic history generator bound to the configured volatility.
	pub history: HistoryGenerator,
}

/// Builds the CORS layer from the API configuration.
pub fn cors_layer(api_config: &ApiConfig) -> Result<CorsLayer, Box<dyn std::error::Error>> {
	let Some(cors) = &api_config.cors else {
		return Ok(CorsLayer::permissive());
	};

	let origins = cors
		.allowed_origins
		.iter()
		.map(|origin| {
			origin
				.parse::<HeaderValue>()
				.map_err(|e| format!("Invalid CORS origin '{}': {}", origin, e))
		})
		.collect::<Result<Vec<_>, _>>()?;

	Ok(CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods([Method::GET, Method::OPTIONS])
		.allow_headers(Any))
}

/// Builds the router with the `/api` base path.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/price", get(apis::price::get_price))
				.route("/prices", get(apis::price::get_prices))
				.route("/health", get(apis::health::get_health)),
		)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(cors),
		)
		.with_state(state)
}

/// Starts the HTTP server for the API.
///
/// Runs until the process receives Ctrl-C.
pub async fn start_server(
	api_config: ApiConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = build_router(state, cors_layer(&api_config)?);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address)
		.await
		.map_err(|e| format!("Failed to bind address {}: {}", bind_address, e))?;

	tracing::info!("Price resolver API server starting on {}", bind_address);

	axum::serve(listener, app)
		.with_graceful_shutdown(async {
			if let Err(e) = tokio::signal::ctrl_c().await {
				tracing::error!("Failed to listen for shutdown signal: {}", e);
			}
			tracing::info!("Shutting down API server");
		})
		.await?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use resolver_config::CorsConfig;

	fn api_config(cors: Option<CorsConfig>) -> ApiConfig {
		ApiConfig {
			enabled: true,
			host: "127.0.0.1".to_string(),
			port: 3000,
			cors,
		}
	}

	#[test]
	fn test_cors_defaults_to_permissive() {
		assert!(cors_layer(&api_config(None)).is_ok());
	}

	#[test]
	fn test_cors_rejects_invalid_origin() {
		let config = api_config(Some(CorsConfig {
			allowed_origins: vec!["https://wallet.example\n".to_string()],
		}));
		assert!(cors_layer(&config).is_err());
	}
}
