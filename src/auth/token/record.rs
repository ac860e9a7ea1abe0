//! Cached bearer token and its safety-margined expiry.

// self
use crate::{_prelude::*, auth::Secret};

/// Safety margin subtracted from the provider-reported lifetime.
pub const DEFAULT_EXPIRY_MARGIN: Duration = Duration::seconds(60);

/// Lifecycle status of a cached token at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenStatus {
	/// Token may be handed out.
	Active,
	/// Token reached its margined expiry and must be refreshed.
	Expired,
}

/// Bearer token plus the instant after which the cache stops handing it out.
///
/// `expires_at` already has the safety margin applied, so the cache never serves a token
/// within the margin of its real expiry.
#[derive(Clone)]
pub struct CachedToken {
	/// Bearer token; callers must avoid logging it.
	pub access_token: Secret,
	/// Instant the identity endpoint was called.
	pub issued_at: OffsetDateTime,
	/// Margined expiry instant.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Builds a record from a token issued at `issued_at` with a reported lifetime.
	///
	/// The stored expiry is `issued_at + expires_in - margin`. A lifetime shorter than the
	/// margin yields a record that is already expired, so the token is used once and never
	/// reused.
	pub fn issue(
		access_token: Secret,
		issued_at: OffsetDateTime,
		expires_in: Duration,
		margin: Duration,
	) -> Self {
		let expires_at = issued_at.saturating_add(expires_in).saturating_sub(margin);

		Self { access_token, issued_at, expires_at }
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if instant < self.expires_at { TokenStatus::Active } else { TokenStatus::Expired }
	}

	/// Returns `true` if the record may be handed out at `instant`.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Active)
	}
}
impl Debug for CachedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedToken")
			.field("access_token", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
