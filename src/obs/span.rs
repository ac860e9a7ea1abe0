// crates.io
use tracing::{Instrument, instrument::Instrumented};
// self
use crate::{_prelude::*, obs::CallKind};

/// A span builder used by relay calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		let span = tracing::info_span!("food_relay.call", call = kind.as_str(), stage);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}
