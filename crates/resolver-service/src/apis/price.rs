//! Price endpoints.
//!
//! Resolution runs on its own task so that a failure the resolver does not
//! contain surfaces as a 500 error body instead of a dropped connection.

use crate::server::AppState;
use axum::{
	extract::{Query, State},
	Json,
};
use resolver_types::{
	current_timestamp_millis, APIError, BatchPriceQuery, BatchPriceResponse, PriceQuery,
	PriceResponse, Timeframe, TokenSymbol,
};
use tokio::task::JoinError;

/// Upper bound on symbols accepted by one batch request.
pub const MAX_BATCH_SYMBOLS: usize = 50;

/// Handles GET /api/price requests.
///
/// Resolves one symbol. When `timeframe` is present a synthetic history
/// series is attached; unknown timeframe labels use the hourly bucket.
pub async fn get_price(
	State(state): State<AppState>,
	Query(query): Query<PriceQuery>,
) -> Result<Json<PriceResponse>, APIError> {
	let symbol = state
		.resolver
		.tokens()
		.canonical(query.symbol.as_deref().unwrap_or_default());
	if symbol.is_empty() {
		tracing::warn!("Price request without symbol");
		return Err(APIError::BadRequest {
			message: "Missing required query parameter: symbol".to_string(),
			symbol: None,
		});
	}

	let resolver = state.resolver.clone();
	let task_symbol = symbol.clone();
	let quote = tokio::spawn(async move { resolver.resolve_symbol(&task_symbol).await })
		.await
		.map_err(|e| resolution_failed(e, Some(&symbol)))?;

	let mut response = PriceResponse::from_quote(symbol, quote, current_timestamp_millis());
	if let Some(timeframe) = query.timeframe.as_deref().map(Timeframe::parse) {
		response = response.with_history(state.history.generate(quote.price, timeframe));
	}

	tracing::debug!(symbol = %response.symbol, price = response.price, source = %response.source, "Served price");
	Ok(Json(response))
}

/// Handles GET /api/prices requests.
///
/// Resolves a comma separated symbol list concurrently. Entries come back
/// in request order; blank entries are ignored.
pub async fn get_prices(
	State(state): State<AppState>,
	Query(query): Query<BatchPriceQuery>,
) -> Result<Json<BatchPriceResponse>, APIError> {
	let symbols: Vec<String> = query
		.symbols
		.as_deref()
		.unwrap_or_default()
		.split(',')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect();

	if symbols.is_empty() {
		tracing::warn!("Batch price request without symbols");
		return Err(APIError::BadRequest {
			message: "Missing required query parameter: symbols".to_string(),
			symbol: None,
		});
	}
	if symbols.len() > MAX_BATCH_SYMBOLS {
		tracing::warn!(count = symbols.len(), "Batch price request over limit");
		return Err(APIError::BadRequest {
			message: format!(
				"At most {} symbols per request, got {}",
				MAX_BATCH_SYMBOLS,
				symbols.len()
			),
			symbol: None,
		});
	}

	let resolver = state.resolver.clone();
	let quotes = tokio::spawn(async move { resolver.resolve_many(&symbols).await })
		.await
		.map_err(|e| resolution_failed(e, None))?;

	let timestamp = current_timestamp_millis();
	let prices = quotes
		.into_iter()
		.map(|(symbol, quote)| PriceResponse::from_quote(symbol, quote, timestamp))
		.collect();

	Ok(Json(BatchPriceResponse { prices, timestamp }))
}

fn resolution_failed(err: JoinError, symbol: Option<&TokenSymbol>) -> APIError {
	tracing::error!(symbol = ?symbol.map(TokenSymbol::as_str), error = %err, "Price resolution task failed");
	APIError::InternalServerError {
		message: format!("Price resolution failed: {}", err),
		symbol: symbol.map(ToString::to_string),
	}
}
