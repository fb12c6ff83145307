//! API types for the price resolver HTTP API.
//!
//! This module defines the query, response and error payloads served under
//! `/api`.

use crate::{PriceHistoryPoint, PriceQuote, QuoteSource, TokenSymbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Query string of `GET /api/price`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceQuery {
	/// Token symbol to resolve.
	pub symbol: Option<String>,
	/// Optional chart bucket; when present a synthetic history is attached.
	pub timeframe: Option<String>,
}

/// Query string of `GET /api/prices`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchPriceQuery {
	/// Comma separated token symbols.
	pub symbols: Option<String>,
}

/// Successful price response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceResponse {
	/// Normalized symbol that was resolved.
	pub symbol: TokenSymbol,
	/// USD price.
	pub price: f64,
	/// Provenance of the price.
	pub source: QuoteSource,
	/// Synthetic history, only when a timeframe was requested.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub history: Option<Vec<PriceHistoryPoint>>,
	/// Unix timestamp in milliseconds.
	pub timestamp: i64,
}

impl PriceResponse {
	/// Builds a response from a resolved quote.
	pub fn from_quote(symbol: TokenSymbol, quote: PriceQuote, timestamp: i64) -> Self {
		Self {
			symbol,
			price: quote.price,
			source: quote.source,
			history: None,
			timestamp,
		}
	}

	pub fn with_history(mut self, history: Vec<PriceHistoryPoint>) -> Self {
		self.history = Some(history);
		self
	}
}

/// Response of `GET /api/prices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPriceResponse {
	/// One entry per requested symbol, in request order.
	pub prices: Vec<PriceResponse>,
	/// Unix timestamp in milliseconds.
	pub timestamp: i64,
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
	pub status: String,
	/// Configured sources in cascade order.
	pub sources: Vec<String>,
}

/// API error response.
///
/// `price` is always serialized as `null` and `source` as `"error"` so
/// clients can treat the error body like a degenerate quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Human-readable description
	pub error: String,
	/// Symbol the request was about, if any.
	pub symbol: Option<String>,
	pub price: Option<f64>,
	pub source: String,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Bad request with validation errors (400)
	BadRequest {
		message: String,
		symbol: Option<String>,
	},
	/// Internal server error (500)
	InternalServerError {
		message: String,
		symbol: Option<String>,
	},
}

impl APIError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			APIError::BadRequest { .. } => 400,
			APIError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let (message, symbol) = match self {
			APIError::BadRequest { message, symbol } => (message, symbol),
			APIError::InternalServerError { message, symbol } => (message, symbol),
		};
		ErrorResponse {
			error: message.clone(),
			symbol: symbol.clone(),
			price: None,
			source: "error".to_string(),
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			APIError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = match self.status_code() {
			400 => StatusCode::BAD_REQUEST,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};

		let error_response = self.to_error_response();
		(status, Json(error_response)).into_response()
	}
}
