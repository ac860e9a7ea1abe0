//! OAuth 2.0 client credentials used for the identity endpoint's Basic authentication.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::Secret};

/// Client identifier and secret pair; read once at startup and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: Secret,
}
impl ClientCredentials {
	/// Builds a credential pair.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret>) -> Self {
		Self { client_id: client_id.into(), client_secret: client_secret.into() }
	}

	/// Returns the `Authorization` header value for `client_secret_basic`.
	///
	/// The value is `Basic base64(client_id:client_secret)` with standard padding.
	pub fn basic_authorization(&self) -> Secret {
		let raw = format!("{}:{}", self.client_id, self.client_secret.expose());

		Secret::new(format!("Basic {}", STANDARD.encode(raw)))
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.finish()
	}
}
