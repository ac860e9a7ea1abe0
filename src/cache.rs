//! Single-slot bearer token cache with lazy, singleflight refresh.
//!
//! [`TokenCache::acquire_token`] serves the cached token while the evaluation instant is
//! strictly before its margined expiry. Otherwise it calls the identity endpoint once and
//! overwrites the slot. Callers that miss at the same time queue on an async guard and re-check
//! the slot once they get through, so at most one identity call is in flight per cache. The slot
//! lock itself is never held across an `.await`.
//!
//! A failed refresh caches nothing and leaves the previous slot contents untouched.

// self
use crate::{
	_prelude::*,
	auth::{CachedToken, DEFAULT_EXPIRY_MARGIN, Secret},
	error::AuthError,
	oauth::TokenEndpoint,
	obs::{self, CacheLookup, CallKind, CallOutcome, CallSpan},
};

/// Process-lifetime holder of at most one bearer token.
pub struct TokenCache {
	endpoint: TokenEndpoint,
	expiry_margin: Duration,
	slot: RwLock<Option<CachedToken>>,
	refresh_guard: AsyncMutex<()>,
}
impl TokenCache {
	/// Creates an empty cache backed by `endpoint` with the default 60 second margin.
	pub fn new(endpoint: TokenEndpoint) -> Self {
		Self {
			endpoint,
			expiry_margin: DEFAULT_EXPIRY_MARGIN,
			slot: RwLock::new(None),
			refresh_guard: AsyncMutex::new(()),
		}
	}

	/// Overrides the safety margin subtracted from each reported lifetime.
	pub fn with_expiry_margin(mut self, margin: Duration) -> Self {
		self.expiry_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Safety margin subtracted from each reported lifetime.
	pub fn expiry_margin(&self) -> Duration {
		self.expiry_margin
	}

	/// Returns a snapshot of the slot, valid or not.
	pub fn cached(&self) -> Option<CachedToken> {
		self.slot.read().clone()
	}

	/// Returns a token that is valid right now, refreshing it first if needed.
	///
	/// The clock is read again once the refresh guard is held, so a caller that queued behind
	/// another refresh judges the slot at the instant it actually gets through.
	pub async fn acquire_token(&self) -> Result<Secret, AuthError> {
		self.acquire_with(OffsetDateTime::now_utc).await
	}

	/// Returns a token that is valid at `now`, refreshing it first if needed.
	///
	/// A refreshed token is recorded as issued at `now`.
	pub async fn acquire_token_at(&self, now: OffsetDateTime) -> Result<Secret, AuthError> {
		self.acquire_with(|| now).await
	}

	async fn acquire_with<F>(&self, clock: F) -> Result<Secret, AuthError>
	where
		F: Fn() -> OffsetDateTime,
	{
		if let Some(token) = self.valid_token_at(clock()) {
			tracing::debug!("Serving the cached bearer token.");
			obs::record_cache_lookup(CacheLookup::Hit);

			return Ok(token);
		}

		obs::record_cache_lookup(CacheLookup::Miss);

		let _singleflight = self.refresh_guard.lock().await;
		let now = clock();

		// Another caller may have refreshed the slot while this one queued.
		if let Some(token) = self.valid_token_at(now) {
			return Ok(token);
		}

		self.refresh_at(now).await
	}

	fn valid_token_at(&self, now: OffsetDateTime) -> Option<Secret> {
		self.slot
			.read()
			.as_ref()
			.filter(|record| record.is_valid_at(now))
			.map(|record| record.access_token.clone())
	}

	async fn refresh_at(&self, now: OffsetDateTime) -> Result<Secret, AuthError> {
		const KIND: CallKind = CallKind::TokenRefresh;

		let span = CallSpan::new(KIND, "acquire_token");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result: Result<Secret, AuthError> = span
			.instrument(async move {
				tracing::debug!(
					endpoint = %self.endpoint.url(),
					client_id = self.endpoint.client_id(),
					"Requesting a new bearer token."
				);

				let grant = self.endpoint.exchange_client_credentials().await?;
				let record =
					CachedToken::issue(grant.access_token, now, grant.expires_in, self.expiry_margin);
				let token = record.access_token.clone();

				tracing::info!(
					expires_in = grant.expires_in.whole_seconds(),
					expires_at = %record.expires_at,
					"Cached a new bearer token."
				);

				*self.slot.write() = Some(record);

				Ok(token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(e) => {
				tracing::warn!(error = %e, "Token refresh failed; the cache slot is unchanged.");

				obs::record_call_outcome(KIND, CallOutcome::Failure);
			},
		}

		result
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("endpoint", &self.endpoint)
			.field("expiry_margin", &self.expiry_margin)
			.field("cached", &self.slot.read().is_some())
			.finish()
	}
}
