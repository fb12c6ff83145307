//! Liveness endpoint.

use crate::server::AppState;
use axum::{extract::State, Json};
use resolver_types::HealthResponse;

/// Handles GET /api/health requests.
///
/// Reports the configured sources in cascade order. No upstream is
/// contacted.
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok".to_string(),
		sources: state.resolver.source_names(),
	})
}

#[cfg(test)]
mod tests {
	use crate::apis::test_support::{get_json, router};
	use serde_json::json;

	#[tokio::test]
	async fn test_health_lists_sources() {
		let (status, body) = get_json(router(), "/api/health").await;
		assert_eq!(status, 200);
		assert_eq!(body, json!({ "status": "ok", "sources": ["coingecko", "dexscreener"] }));
	}
}
