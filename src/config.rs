//! Process configuration, read once at startup.
//!
//! [`Config::from_env`] reads the variables below. Both credentials are required and startup
//! fails fast without them; everything else falls back to a logged default.
//!
//! | Variable | Default |
//! |---|---|
//! | `FATSECRET_CLIENT_ID` | required |
//! | `FATSECRET_CLIENT_SECRET` | required |
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `3000` |
//! | `FATSECRET_TOKEN_URL` | `https://oauth.fatsecret.com/connect/token` |
//! | `FATSECRET_API_URL` | `https://platform.fatsecret.com/rest/server.api` |
//! | `FOOD_RELAY_DEFAULT_SEARCH` | `Poulet` |
//! | `FOOD_RELAY_EXPIRY_MARGIN_SECS` | `60` |
//! | `FOOD_RELAY_HTTP_TIMEOUT_SECS` | `30` |

// std
use std::{env, time::Duration as StdDuration};
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, DEFAULT_EXPIRY_MARGIN, Secret},
	error::ConfigError,
	http::DEFAULT_TIMEOUT,
};

/// Client identifier variable.
pub const CLIENT_ID_VAR: &str = "FATSECRET_CLIENT_ID";
/// Client secret variable.
pub const CLIENT_SECRET_VAR: &str = "FATSECRET_CLIENT_SECRET";
/// Listen host variable.
pub const HOST_VAR: &str = "HOST";
/// Listen port variable.
pub const PORT_VAR: &str = "PORT";
/// Identity endpoint variable.
pub const TOKEN_URL_VAR: &str = "FATSECRET_TOKEN_URL";
/// Data endpoint variable.
pub const API_URL_VAR: &str = "FATSECRET_API_URL";
/// Fallback search term variable.
pub const DEFAULT_SEARCH_VAR: &str = "FOOD_RELAY_DEFAULT_SEARCH";
/// Expiry margin variable, in seconds.
pub const EXPIRY_MARGIN_VAR: &str = "FOOD_RELAY_EXPIRY_MARGIN_SECS";
/// Outbound timeout variable, in seconds.
pub const HTTP_TIMEOUT_VAR: &str = "FOOD_RELAY_HTTP_TIMEOUT_SECS";

/// Default listen host.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default identity endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth.fatsecret.com/connect/token";
/// Default data endpoint.
pub const DEFAULT_API_URL: &str = "https://platform.fatsecret.com/rest/server.api";
/// Search term used when the caller omits one.
pub const DEFAULT_SEARCH_TERM: &str = "Poulet";

/// Immutable relay configuration.
#[derive(Clone, Debug)]
pub struct Config {
	/// Credentials used against the identity endpoint.
	pub credentials: ClientCredentials,
	/// Listen host.
	pub host: String,
	/// Listen port.
	pub port: u16,
	/// OAuth 2.0 token endpoint.
	pub token_endpoint: Url,
	/// Nutrition data endpoint.
	pub api_endpoint: Url,
	/// Search term used when the caller omits one.
	pub default_search_term: String,
	/// Safety margin subtracted from each token lifetime.
	pub expiry_margin: Duration,
	/// Outbound request timeout.
	pub http_timeout: StdDuration,
}
impl Config {
	/// Creates a builder seeded with the required credentials.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<Secret>,
	) -> ConfigBuilder {
		ConfigBuilder::new(ClientCredentials::new(client_id, client_secret))
	}

	/// Loads configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Loads configuration through `lookup`, which maps a variable name to its value.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |key: &'static str| lookup(key).filter(|value| !value.trim().is_empty());
		let client_id = var(CLIENT_ID_VAR).ok_or(ConfigError::MissingVar { key: CLIENT_ID_VAR })?;
		let client_secret =
			var(CLIENT_SECRET_VAR).ok_or(ConfigError::MissingVar { key: CLIENT_SECRET_VAR })?;
		let mut builder = Self::builder(client_id.trim(), client_secret.trim());

		if let Some(host) = var(HOST_VAR) {
			builder = builder.host(host.trim());
		}
		if let Some(port) = var(PORT_VAR) {
			builder = builder.port(parse_var(PORT_VAR, &port)?);
		}
		if let Some(url) = var(TOKEN_URL_VAR) {
			builder = builder.token_endpoint(parse_url(TOKEN_URL_VAR, &url)?);
		}
		if let Some(url) = var(API_URL_VAR) {
			builder = builder.api_endpoint(parse_url(API_URL_VAR, &url)?);
		}
		if let Some(term) = var(DEFAULT_SEARCH_VAR) {
			builder = builder.default_search_term(term);
		}
		if let Some(secs) = var(EXPIRY_MARGIN_VAR) {
			builder = builder.expiry_margin(Duration::seconds(parse_var(EXPIRY_MARGIN_VAR, &secs)?));
		}
		if let Some(secs) = var(HTTP_TIMEOUT_VAR) {
			builder =
				builder.http_timeout(StdDuration::from_secs(parse_var(HTTP_TIMEOUT_VAR, &secs)?));
		}

		builder.build()
	}

	/// `host:port` string handed to the listener.
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}

/// Builder for [`Config`] values.
#[derive(Debug)]
pub struct ConfigBuilder {
	credentials: ClientCredentials,
	host: Option<String>,
	port: Option<u16>,
	token_endpoint: Option<Url>,
	api_endpoint: Option<Url>,
	default_search_term: Option<String>,
	expiry_margin: Option<Duration>,
	http_timeout: Option<StdDuration>,
}
impl ConfigBuilder {
	fn new(credentials: ClientCredentials) -> Self {
		Self {
			credentials,
			host: None,
			port: None,
			token_endpoint: None,
			api_endpoint: None,
			default_search_term: None,
			expiry_margin: None,
			http_timeout: None,
		}
	}

	/// Sets the listen host.
	pub fn host(mut self, host: impl Into<String>) -> Self {
		self.host = Some(host.into());

		self
	}

	/// Sets the listen port.
	pub fn port(mut self, port: u16) -> Self {
		self.port = Some(port);

		self
	}

	/// Sets the OAuth 2.0 token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the nutrition data endpoint.
	pub fn api_endpoint(mut self, url: Url) -> Self {
		self.api_endpoint = Some(url);

		self
	}

	/// Sets the fallback search term.
	pub fn default_search_term(mut self, term: impl Into<String>) -> Self {
		self.default_search_term = Some(term.into());

		self
	}

	/// Sets the token expiry margin. Negative values are clamped to zero.
	pub fn expiry_margin(mut self, margin: Duration) -> Self {
		self.expiry_margin = Some(if margin.is_negative() { Duration::ZERO } else { margin });

		self
	}

	/// Sets the outbound request timeout.
	pub fn http_timeout(mut self, timeout: StdDuration) -> Self {
		self.http_timeout = Some(timeout);

		self
	}

	/// Validates the credentials and fills unset fields with logged defaults.
	pub fn build(self) -> Result<Config, ConfigError> {
		if self.credentials.client_id.trim().is_empty() {
			return Err(ConfigError::MissingVar { key: CLIENT_ID_VAR });
		}
		if self.credentials.client_secret.is_blank() {
			return Err(ConfigError::MissingVar { key: CLIENT_SECRET_VAR });
		}

		let token_endpoint = match self.token_endpoint {
			Some(url) => url,
			None => default_url(TOKEN_URL_VAR, DEFAULT_TOKEN_URL)?,
		};
		let api_endpoint = match self.api_endpoint {
			Some(url) => url,
			None => default_url(API_URL_VAR, DEFAULT_API_URL)?,
		};

		for (name, url) in [("token", &token_endpoint), ("api", &api_endpoint)] {
			if url.scheme() != "https" {
				tracing::warn!(endpoint = name, %url, "Endpoint does not use HTTPS.");
			}
		}

		Ok(Config {
			credentials: self.credentials,
			host: self.host.unwrap_or_else(|| defaulted(HOST_VAR, DEFAULT_HOST.to_owned())),
			port: self.port.unwrap_or_else(|| defaulted(PORT_VAR, DEFAULT_PORT)),
			token_endpoint,
			api_endpoint,
			default_search_term: self
				.default_search_term
				.unwrap_or_else(|| defaulted(DEFAULT_SEARCH_VAR, DEFAULT_SEARCH_TERM.to_owned())),
			expiry_margin: self
				.expiry_margin
				.unwrap_or_else(|| defaulted(EXPIRY_MARGIN_VAR, DEFAULT_EXPIRY_MARGIN)),
			http_timeout: self
				.http_timeout
				.unwrap_or_else(|| defaulted(HTTP_TIMEOUT_VAR, DEFAULT_TIMEOUT)),
		})
	}
}

fn defaulted<T>(key: &str, default: T) -> T
where
	T: Debug,
{
	tracing::info!("{key} not set, using default: {default:?}");

	default
}

fn default_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
	tracing::info!("{key} not set, using default: {raw}");

	parse_url(key, raw)
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { key, source })
}

fn parse_var<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
	T: FromStr,
	T::Err: Display,
{
	raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidVar {
		key,
		value: raw.to_owned(),
		reason: e.to_string(),
	})
}
