mod common;

// crates.io
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
// self
use common::*;
use food_relay::{
	auth::ClientCredentials, cache::TokenCache, error::AuthError, http::ReqwestHttpClient,
	oauth::TokenEndpoint, url::Url,
};

#[tokio::test]
async fn empty_cache_fetches_exactly_once() {
	let server = MockServer::start_async().await;
	let mock = mock_token(&server, "first-token", 86_400).await;
	let cache = token_cache(&server);

	assert!(cache.cached().is_none());

	let token = cache.acquire_token().await.expect("Initial token request should succeed.");

	assert_eq!(token.expose(), "first-token");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn valid_token_is_served_without_network() {
	let server = MockServer::start_async().await;
	let mock = mock_token(&server, "cached-token", 3_600).await;
	let cache = token_cache(&server);
	let first = cache.acquire_token().await.expect("Initial token request should succeed.");
	let second = cache.acquire_token().await.expect("Cached token request should succeed.");
	let third = cache.acquire_token().await.expect("Cached token request should succeed.");

	assert_eq!(first.expose(), "cached-token");
	assert_eq!(second.expose(), "cached-token");
	assert_eq!(third.expose(), "cached-token");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn expiry_is_margined_and_strict() {
	const LIFETIME: i64 = 3_600;

	let server = MockServer::start_async().await;
	let mock = mock_token(&server, "margined-token", LIFETIME).await;
	let cache = token_cache(&server);
	let fetched_at = OffsetDateTime::now_utc();

	cache.acquire_token_at(fetched_at).await.expect("Initial token request should succeed.");

	let record = cache.cached().expect("Successful refresh should populate the slot.");

	assert_eq!(record.issued_at, fetched_at);
	assert_eq!(record.expires_at, fetched_at + Duration::seconds(LIFETIME - 60));

	cache
		.acquire_token_at(fetched_at + Duration::seconds(LIFETIME - 61))
		.await
		.expect("Token should still be served before the margined expiry.");

	mock.assert_calls_async(1).await;

	cache
		.acquire_token_at(fetched_at + Duration::seconds(LIFETIME - 59))
		.await
		.expect("Refresh after the margined expiry should succeed.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn concurrent_misses_share_one_refresh() {
	let server = MockServer::start_async().await;
	let mock = mock_token(&server, "shared-token", 900).await;
	let cache = token_cache(&server);
	let (first, second, third) =
		tokio::join!(cache.acquire_token(), cache.acquire_token(), cache.acquire_token());

	for token in [first, second, third] {
		assert_eq!(token.expect("Concurrent call should succeed.").expose(), "shared-token");
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn queued_caller_rechecks_expiry_after_waiting() {
	let server = MockServer::start_async().await;
	// 61 seconds minus the 60 second margin leaves one second of validity, which lapses while
	// the slow exchange is still in flight.
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.delay(std::time::Duration::from_millis(1_500))
				.body(token_body("short-lived", 61));
		})
		.await;
	let cache = token_cache(&server);
	let started_at = OffsetDateTime::now_utc();
	let (first, second) = tokio::join!(cache.acquire_token(), cache.acquire_token());

	first.expect("First caller should succeed.");
	second.expect("Queued caller should succeed.");
	mock.assert_calls_async(2).await;

	let record = cache.cached().expect("Slot should hold the latest token.");

	assert!(record.issued_at >= started_at + Duration::seconds(1));
}

#[tokio::test]
async fn missing_access_token_keeps_previous_token() {
	let server = MockServer::start_async().await;
	let mut good = mock_token(&server, "old-token", 3_600).await;
	let cache = token_cache(&server);
	let fetched_at = OffsetDateTime::now_utc();

	cache.acquire_token_at(fetched_at).await.expect("Initial token request should succeed.");
	good.assert_calls_async(1).await;
	good.delete_async().await;

	let broken = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"token_type\":\"Bearer\",\"expires_in\":3600}");
		})
		.await;
	let err = cache
		.acquire_token_at(fetched_at + Duration::hours(1))
		.await
		.expect_err("A response without access_token must fail.");

	assert!(matches!(err, AuthError::MissingAccessToken));

	broken.assert_calls_async(1).await;

	let kept = cache.cached().expect("Failed refresh must not clear the slot.");

	assert_eq!(kept.access_token.expose(), "old-token");
	assert_eq!(kept.issued_at, fetched_at);

	let token = cache
		.acquire_token_at(fetched_at + Duration::seconds(10))
		.await
		.expect("Previous token should still be served while valid.");

	assert_eq!(token.expose(), "old-token");

	broken.assert_calls_async(1).await;
}

#[tokio::test]
async fn failures_cache_nothing() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\",\"error_description\":\"Unknown client\"}");
		})
		.await;
	let cache = token_cache(&server);
	let err = cache.acquire_token().await.expect_err("A 401 must fail.");

	assert!(matches!(err, AuthError::Rejected { status: 401, .. }));
	assert!(err.to_string().contains("invalid_client"));
	assert!(cache.cached().is_none());

	let _ = cache.acquire_token().await.expect_err("Failures are not cached either.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
	let closed = std::net::TcpListener::bind("127.0.0.1:0").expect("Ephemeral port should bind.");
	let address = closed.local_addr().expect("Bound listener should expose its address.");

	drop(closed);

	let url = Url::parse(&format!("http://{address}{TOKEN_PATH}"))
		.expect("Closed endpoint URL should parse successfully.");
	let cache = TokenCache::new(TokenEndpoint::new(
		ReqwestHttpClient::default(),
		url,
		ClientCredentials::new(CLIENT_ID, CLIENT_SECRET),
	));
	let err = cache.acquire_token().await.expect_err("A closed port must fail.");

	assert!(matches!(err, AuthError::Network { .. }));
	assert!(cache.cached().is_none());
}

#[tokio::test]
async fn custom_margin_shifts_expiry() {
	let server = MockServer::start_async().await;
	let _mock = mock_token(&server, "margin-token", 600).await;
	let cache = token_cache(&server).with_expiry_margin(Duration::minutes(5));
	let fetched_at = OffsetDateTime::now_utc();

	cache.acquire_token_at(fetched_at).await.expect("Initial token request should succeed.");

	assert_eq!(cache.expiry_margin(), Duration::minutes(5));
	assert_eq!(
		cache.cached().expect("Slot should be populated.").expires_at,
		fetched_at + Duration::minutes(5)
	);
}
