// self
use crate::obs::{CacheLookup, CallKind, CallOutcome};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"food_relay_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a token cache lookup via the global metrics recorder (when enabled).
pub fn record_cache_lookup(lookup: CacheLookup) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("food_relay_token_cache_total", "lookup" => lookup.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = lookup;
	}
}
