//! Observability helpers for relay calls.
//!
//! # Spans
//!
//! Every token refresh and relayed query runs inside a `food_relay.call` span carrying the
//! `call` kind and the `stage` (call site).
//!
//! # Feature Flags
//!
//! - Enable `metrics` to increment `food_relay_call_total` for every attempt/success/failure,
//!   labeled by `call` + `outcome`, and `food_relay_token_cache_total`, labeled by `lookup`.

mod counter;
mod span;

pub use counter::*;
pub use span::*;

// crates.io
use tracing_subscriber::{EnvFilter, fmt};
// self
use crate::_prelude::*;

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global `tracing` subscriber, honoring `RUST_LOG`.
///
/// Subsequent calls are ignored, so tests and embedders may call this freely.
pub fn init_tracing() {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
	let _ = fmt().with_env_filter(filter).try_init();
}

/// Relay calls observed by spans and counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Client-credentials exchange against the identity endpoint.
	TokenRefresh,
	/// `foods.search` relay.
	FoodSearch,
	/// `food.get.v4` relay.
	FoodDetails,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::TokenRefresh => "token_refresh",
			CallKind::FoodSearch => "food_search",
			CallKind::FoodDetails => "food_details",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a relay helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Result of consulting the token cache slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheLookup {
	/// A valid token was served without a network call.
	Hit,
	/// The slot was empty or expired and a refresh was needed.
	Miss,
}
impl CacheLookup {
	/// Returns a stable label suitable for metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheLookup::Hit => "hit",
			CacheLookup::Miss => "miss",
		}
	}
}
