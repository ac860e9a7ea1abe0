//! Outbound transport shared by the identity endpoint and the data endpoint.
//!
//! Both endpoints take form-encoded POSTs with an `Authorization` header, so the relay only
//! needs [`ReqwestHttpClient::post_form`]. The response body is buffered in full and handed
//! back with its status; classifying that status is left to the caller.

// std
use std::time::Duration as StdDuration;
// crates.io
use reqwest::{
	header::{ACCEPT, AUTHORIZATION},
	redirect::Policy,
};
// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Default outbound request timeout.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Redirects are never followed. Both endpoints answer directly, and following a redirect
/// would replay the `Authorization` header against another host.
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Builds a client with redirects disabled and the provided request timeout.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, ConfigError> {
		ReqwestClient::builder()
			.redirect(Policy::none())
			.timeout(timeout)
			.build()
			.map(Self)
			.map_err(|source| ConfigError::HttpClientBuild { source })
	}

	/// POSTs `form` as `application/x-www-form-urlencoded` and buffers the response.
	pub async fn post_form(
		&self,
		url: &Url,
		authorization: &Secret,
		form: &[(&str, &str)],
	) -> Result<FormResponse, ReqwestError> {
		let response = self
			.0
			.post(url.clone())
			.header(AUTHORIZATION, authorization.expose())
			.header(ACCEPT, "application/json")
			.form(form)
			.send()
			.await?;
		let status = response.status().as_u16();
		let body = response.bytes().await?.to_vec();

		Ok(FormResponse { status, body })
	}
}

/// Buffered response returned by [`ReqwestHttpClient::post_form`].
#[derive(Clone, Debug)]
pub struct FormResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl FormResponse {
	const PREVIEW_LEN: usize = 256;

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns a lossy UTF-8 prefix of the body for log lines.
	pub fn body_preview(&self) -> String {
		let end = self.body.len().min(Self::PREVIEW_LEN);

		String::from_utf8_lossy(&self.body[..end]).into_owned()
	}
}
