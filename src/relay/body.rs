//! Opaque JSON body relayed from the data endpoint.

// crates.io
use serde_json::value::RawValue;
// self
use crate::_prelude::*;

/// Upstream JSON, checked for well-formedness and otherwise forwarded byte for byte.
///
/// The relay never inspects the payload's shape, so no schema is modeled here.
#[derive(Clone, Debug)]
pub struct RelayBody(Box<RawValue>);
impl RelayBody {
	/// Validates `bytes` as a single JSON document.
	pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
		serde_json::from_slice::<Box<RawValue>>(bytes).map(Self)
	}

	/// Returns the JSON text exactly as the upstream sent it.
	pub fn as_str(&self) -> &str {
		self.0.get()
	}

	/// Parses the body into an owned [`serde_json::Value`] for inspection.
	pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
		serde_json::from_str(self.as_str())
	}
}
impl Display for RelayBody {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl From<RelayBody> for String {
	fn from(body: RelayBody) -> Self {
		body.0.get().to_owned()
	}
}
