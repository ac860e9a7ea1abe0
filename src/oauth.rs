//! Client-credentials exchange against the identity endpoint.
//!
//! The request authenticates with HTTP Basic (`client_secret_basic`) and sends
//! `grant_type=client_credentials` as a form body. A usable response carries `access_token` and
//! `expires_in`; anything else is classified into an [`AuthError`].

// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, Secret},
	error::AuthError,
	http::{FormResponse, ReqwestHttpClient},
};

/// `grant_type` value for the client-credentials grant.
pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

/// Identity endpoint bound to a credential pair.
#[derive(Clone, Debug)]
pub struct TokenEndpoint {
	http_client: ReqwestHttpClient,
	url: Url,
	credentials: ClientCredentials,
}
impl TokenEndpoint {
	/// Creates an endpoint that authenticates as `credentials`.
	pub fn new(http_client: ReqwestHttpClient, url: Url, credentials: ClientCredentials) -> Self {
		Self { http_client, url, credentials }
	}

	/// Token endpoint URL.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Client identifier used for Basic authentication.
	pub fn client_id(&self) -> &str {
		&self.credentials.client_id
	}

	/// Performs one client-credentials exchange. Nothing is retried.
	pub async fn exchange_client_credentials(&self) -> Result<TokenGrant, AuthError> {
		let authorization = self.credentials.basic_authorization();
		let response = self
			.http_client
			.post_form(&self.url, &authorization, &[("grant_type", CLIENT_CREDENTIALS_GRANT)])
			.await
			.map_err(|source| AuthError::Network { source })?;

		parse_token_response(&response)
	}
}

/// Token issued by the identity endpoint, before any expiry margin is applied.
#[derive(Clone, Debug)]
pub struct TokenGrant {
	/// Bearer token.
	pub access_token: Secret,
	/// Provider-reported lifetime.
	pub expires_in: Duration,
}

#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
	access_token: Option<String>,
	expires_in: Option<i64>,
	error: Option<String>,
	error_description: Option<String>,
}

fn parse_token_response(response: &FormResponse) -> Result<TokenGrant, AuthError> {
	if !response.is_success() {
		// Error bodies are best-effort; a non-JSON body still yields the status.
		let body = serde_json::from_slice::<TokenResponse>(&response.body).unwrap_or_default();

		return Err(AuthError::Rejected {
			status: response.status,
			error: body.error,
			description: body.error_description,
		});
	}

	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
	let body: TokenResponse = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| AuthError::MalformedResponse { status: response.status, source })?;
	let access_token = body
		.access_token
		.filter(|token| !token.is_empty())
		.map(Secret::new)
		.ok_or(AuthError::MissingAccessToken)?;
	let expires_in = body.expires_in.ok_or(AuthError::MissingExpiresIn)?;

	if expires_in < 0 {
		return Err(AuthError::NegativeExpiresIn { expires_in });
	}

	Ok(TokenGrant { access_token, expires_in: Duration::seconds(expires_in) })
}
