//! Shared fixtures for integration tests: credentials, mock endpoints, and relay wiring.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::{Mock, prelude::*};
use url::Url;
// self
use food_relay::{
	auth::ClientCredentials,
	cache::TokenCache,
	config::Config,
	http::ReqwestHttpClient,
	oauth::TokenEndpoint,
	relay::FoodRelay,
};

pub const CLIENT_ID: &str = "relay-client";
pub const CLIENT_SECRET: &str = "relay-secret";
/// `Basic base64("relay-client:relay-secret")`.
pub const BASIC_AUTHORIZATION: &str = "Basic cmVsYXktY2xpZW50OnJlbGF5LXNlY3JldA==";
pub const TOKEN_PATH: &str = "/connect/token";
pub const API_PATH: &str = "/rest/server.api";

pub fn token_url(server: &MockServer) -> Url {
	Url::parse(&server.url(TOKEN_PATH)).expect("Mock token endpoint should parse successfully.")
}

pub fn api_url(server: &MockServer) -> Url {
	Url::parse(&server.url(API_PATH)).expect("Mock API endpoint should parse successfully.")
}

pub fn config(server: &MockServer) -> Config {
	Config::builder(CLIENT_ID, CLIENT_SECRET)
		.host("127.0.0.1")
		.port(0)
		.token_endpoint(token_url(server))
		.api_endpoint(api_url(server))
		.build()
		.expect("Test configuration should build successfully.")
}

pub fn token_cache(server: &MockServer) -> TokenCache {
	let endpoint = TokenEndpoint::new(
		ReqwestHttpClient::default(),
		token_url(server),
		ClientCredentials::new(CLIENT_ID, CLIENT_SECRET),
	);

	TokenCache::new(endpoint)
}

pub fn relay(server: &MockServer) -> Arc<FoodRelay> {
	Arc::new(FoodRelay::from_config(&config(server)).expect("Relay should build from config."))
}

pub fn token_body(access_token: &str, expires_in: i64) -> String {
	format!(
		"{{\"access_token\":\"{access_token}\",\"token_type\":\"Bearer\",\"expires_in\":{expires_in},\"scope\":\"basic\"}}"
	)
}

/// Token endpoint stub that only answers well-formed client-credentials requests.
pub async fn mock_token<'a>(server: &'a MockServer, access_token: &str, expires_in: i64) -> Mock<'a> {
	let body = token_body(access_token, expires_in);

	server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("authorization", BASIC_AUTHORIZATION)
				.form_urlencoded_tuple("grant_type", "client_credentials");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}
