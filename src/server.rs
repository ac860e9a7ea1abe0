//! Inbound HTTP surface.
//!
//! | Route | Success | Failure |
//! |---|---|---|
//! | `GET /search_food?food=<term>` | 200, upstream JSON | 500 envelope |
//! | `GET /get_food_details?food_id=<id>` | 200, upstream JSON | 400 or 500 envelope |
//! | `GET /health` | 200, `{"status":"ok"}` | none |
//!
//! Every failure renders as `{"error": <message>}`.

// crates.io
use axum::{
	Json, Router,
	extract::{Query, State},
	http::{StatusCode, header::CONTENT_TYPE},
	response::{IntoResponse, Response},
	routing::get,
};
use serde_json::json;
use tokio::{
	net::TcpListener,
	signal::{self, ctrl_c},
};
use tower_http::trace::TraceLayer;
// self
use crate::{
	_prelude::*,
	config::Config,
	error::ConfigError,
	relay::{FoodRelay, RelayBody},
};

/// Raw query string pairs, in request order. Repeated keys are kept.
type QueryPairs = Vec<(String, String)>;

/// Builds the router around a shared relay.
pub fn router(relay: Arc<FoodRelay>) -> Router {
	Router::new()
		.route("/search_food", get(search_food_handler))
		.route("/get_food_details", get(get_food_details_handler))
		.route("/health", get(health_handler))
		.layer(TraceLayer::new_for_http())
		.with_state(relay)
}

/// Serves the relay described by `config` until Ctrl+C or SIGTERM.
pub async fn serve(config: Config) -> Result<()> {
	let relay = Arc::new(FoodRelay::from_config(&config)?);
	let address = config.bind_address();

	tracing::info!("Binding to {address}");

	let listener = TcpListener::bind(&address)
		.await
		.map_err(|source| ConfigError::Bind { address: address.clone(), source })?;

	serve_on(listener, relay).await
}

/// Serves `relay` on an already bound listener until Ctrl+C or SIGTERM.
pub async fn serve_on(listener: TcpListener, relay: Arc<FoodRelay>) -> Result<()> {
	let local_address = listener.local_addr()?;

	tracing::info!("Food relay listening on {local_address}");

	axum::serve(listener, router(relay)).with_graceful_shutdown(shutdown_signal()).await?;

	tracing::info!("Food relay shut down");

	Ok(())
}

async fn search_food_handler(
	State(relay): State<Arc<FoodRelay>>,
	Query(params): Query<QueryPairs>,
) -> Result<RelayBody> {
	relay.search_food(first_value(&params, "food")).await
}

async fn get_food_details_handler(
	State(relay): State<Arc<FoodRelay>>,
	Query(params): Query<QueryPairs>,
) -> Result<RelayBody> {
	relay.get_food_details(first_value(&params, "food_id")).await
}

/// First value supplied for `key`; later repeats are ignored.
fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
	pairs.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
}

async fn health_handler() -> Json<serde_json::Value> {
	Json(json!({ "status": "ok" }))
}

impl IntoResponse for RelayBody {
	fn into_response(self) -> Response {
		(StatusCode::OK, [(CONTENT_TYPE, "application/json")], String::from(self)).into_response()
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = if self.is_client_error() {
			StatusCode::BAD_REQUEST
		} else {
			StatusCode::INTERNAL_SERVER_ERROR
		};

		(status, Json(json!({ "error": self.chain_message() }))).into_response()
	}
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = ctrl_c().await {
			tracing::error!("Failed to install Ctrl+C handler: {e}");
			std::future::pending::<()>().await;
		}

		tracing::info!("Received Ctrl+C, shutting down");
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;

				tracing::info!("Received terminate signal, shutting down");
			},
			Err(e) => {
				tracing::error!("Failed to install terminate handler: {e}");
				std::future::pending::<()>().await;
			},
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
