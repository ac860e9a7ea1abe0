//! Query relay: food search and food lookup against the nutrition data API.
//!
//! Both operations share one shape. They get a bearer token from the [`TokenCache`] and POST a
//! form with `method`, the operation parameter, and `format=json`. The JSON answer comes back
//! unchanged, whatever the upstream status.

pub mod body;

pub use body::RelayBody;

// self
use crate::{
	_prelude::*,
	auth::Secret,
	cache::TokenCache,
	config::{Config, DEFAULT_SEARCH_TERM},
	error::{ConfigError, UpstreamError, ValidationError},
	http::ReqwestHttpClient,
	oauth::TokenEndpoint,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Data endpoint operations selected through the `method` form field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiMethod {
	/// Free-text food search.
	FoodsSearch,
	/// Food detail lookup by identifier.
	FoodGetV4,
}
impl ApiMethod {
	/// Returns the wire name of the method.
	pub const fn as_str(self) -> &'static str {
		match self {
			ApiMethod::FoodsSearch => "foods.search",
			ApiMethod::FoodGetV4 => "food.get.v4",
		}
	}
}
impl Display for ApiMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Relays food queries on behalf of callers that never see the bearer token.
#[derive(Clone, Debug)]
pub struct FoodRelay {
	cache: Arc<TokenCache>,
	http_client: ReqwestHttpClient,
	api_endpoint: Url,
	default_search_term: String,
}
impl FoodRelay {
	/// Creates a relay that authenticates through `cache` and calls `api_endpoint`.
	pub fn new(cache: Arc<TokenCache>, http_client: ReqwestHttpClient, api_endpoint: Url) -> Self {
		Self { cache, http_client, api_endpoint, default_search_term: DEFAULT_SEARCH_TERM.into() }
	}

	/// Wires the transport, identity endpoint, token cache, and relay described by `config`.
	///
	/// One reqwest client is shared by the identity and data endpoints.
	pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
		let http_client = ReqwestHttpClient::with_timeout(config.http_timeout)?;
		let endpoint = TokenEndpoint::new(
			http_client.clone(),
			config.token_endpoint.clone(),
			config.credentials.clone(),
		);
		let cache = Arc::new(TokenCache::new(endpoint).with_expiry_margin(config.expiry_margin));

		Ok(Self::new(cache, http_client, config.api_endpoint.clone())
			.with_default_search_term(config.default_search_term.clone()))
	}

	/// Overrides the search term used when callers omit one.
	pub fn with_default_search_term(mut self, term: impl Into<String>) -> Self {
		self.default_search_term = term.into();

		self
	}

	/// Token cache shared by both operations.
	pub fn token_cache(&self) -> &Arc<TokenCache> {
		&self.cache
	}

	/// Search term used when callers omit one.
	pub fn default_search_term(&self) -> &str {
		&self.default_search_term
	}

	/// Relays `foods.search`, falling back to the default term when `food_term` is absent or
	/// empty.
	pub async fn search_food(&self, food_term: Option<&str>) -> Result<RelayBody> {
		let term = non_empty(food_term).unwrap_or(self.default_search_term.as_str());

		self.call(CallKind::FoodSearch, ApiMethod::FoodsSearch, ("search_expression", term)).await
	}

	/// Relays `food.get.v4`. A missing `food_id` fails before any token or network work.
	pub async fn get_food_details(&self, food_id: Option<&str>) -> Result<RelayBody> {
		let food_id =
			non_empty(food_id).ok_or(ValidationError::MissingParameter { name: "food_id" })?;

		self.call(CallKind::FoodDetails, ApiMethod::FoodGetV4, ("food_id", food_id)).await
	}

	async fn call(
		&self,
		kind: CallKind,
		method: ApiMethod,
		param: (&str, &str),
	) -> Result<RelayBody> {
		let span = CallSpan::new(kind, method.as_str());

		obs::record_call_outcome(kind, CallOutcome::Attempt);

		let result: Result<RelayBody> = span
			.instrument(async move {
				let token = self.cache.acquire_token().await?;
				let authorization = Secret::new(format!("Bearer {}", token.expose()));
				let form = [("method", method.as_str()), param, ("format", "json")];
				let response = self
					.http_client
					.post_form(&self.api_endpoint, &authorization, &form)
					.await
					.map_err(|source| UpstreamError::Network { source })?;

				if !response.is_success() {
					tracing::warn!(
						status = response.status,
						body = %response.body_preview(),
						"Food API answered with a non-success status; relaying its body."
					);
				}

				let body = RelayBody::from_slice(&response.body).map_err(|source| {
					UpstreamError::MalformedBody { status: response.status, source }
				})?;

				Ok(body)
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(kind, CallOutcome::Success),
			Err(e) => {
				tracing::warn!(error = %e.chain_message(), "Relay call failed.");

				obs::record_call_outcome(kind, CallOutcome::Failure);
			},
		}

		result
	}
}

fn non_empty(value: Option<&str>) -> Option<&str> {
	value.filter(|value| !value.is_empty())
}
