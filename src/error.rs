//! Relay-level error types shared by the token cache, the relay, and the HTTP surface.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical relay error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Startup configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller supplied an incomplete request.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Bearer token could not be obtained.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Data endpoint failed or answered with something other than JSON.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Serve loop I/O failure.
	#[error("Server I/O failure.")]
	Io(#[from] std::io::Error),
}
impl Error {
	/// Returns `true` when the caller, not the relay or upstream, is at fault.
	pub fn is_client_error(&self) -> bool {
		matches!(self, Self::Validation(_))
	}

	/// Renders the error and its `source()` chain as a single line.
	///
	/// This is the message carried by the JSON error envelope.
	pub fn chain_message(&self) -> String {
		let mut message = self.to_string();
		let mut source = StdError::source(self);

		while let Some(cause) = source {
			let cause_message = cause.to_string();

			// `#[error(transparent)]` forwards `source()`, so skip causes already rendered.
			if !message.ends_with(&cause_message) {
				if message.ends_with('.') {
					message.pop();
				}

				message.push_str(": ");
				message.push_str(&cause_message);
			}

			source = cause.source();
		}

		message
	}
}

/// Configuration and startup failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Required environment variable is unset or blank.
	#[error("Environment variable `{key}` is required.")]
	MissingVar {
		/// Variable name.
		key: &'static str,
	},
	/// Environment variable is set but cannot be parsed.
	#[error("Environment variable `{key}` has an invalid value `{value}`: {reason}.")]
	InvalidVar {
		/// Variable name.
		key: &'static str,
		/// Raw value that failed to parse.
		value: String,
		/// Parser message.
		reason: String,
	},
	/// Endpoint URL cannot be parsed.
	#[error("Environment variable `{key}` is not a valid URL.")]
	InvalidUrl {
		/// Variable name.
		key: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying builder failure.
		#[source]
		source: ReqwestError,
	},
	/// Listener could not bind the configured address.
	#[error("Failed to bind {address}.")]
	Bind {
		/// Address the server tried to bind.
		address: String,
		/// Underlying socket failure.
		#[source]
		source: std::io::Error,
	},
}

/// Client input failures; reported with a 4xx status before any network call.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// A required query parameter is absent or empty.
	#[error("{name} is required")]
	MissingParameter {
		/// Query parameter name.
		name: &'static str,
	},
}

/// Identity endpoint failures raised while acquiring a bearer token.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Identity endpoint could not be reached.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport failure.
		#[source]
		source: ReqwestError,
	},
	/// Identity endpoint answered with a non-success status.
	#[error("Token endpoint rejected the request with status {status}{}.", describe_oauth_error(.error.as_deref(), .description.as_deref()))]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// OAuth `error` code, when the body carried one.
		error: Option<String>,
		/// OAuth `error_description`, when the body carried one.
		description: Option<String>,
	},
	/// Identity endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON (status {status}).")]
	MalformedResponse {
		/// HTTP status code.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token response did not carry an access token.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// Token response did not carry a lifetime.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token response carried a negative lifetime.
	#[error("The expires_in value must not be negative, got {expires_in}.")]
	NegativeExpiresIn {
		/// Reported lifetime in seconds.
		expires_in: i64,
	},
}

/// Data endpoint failures raised while relaying a query.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Data endpoint could not be reached or the body could not be read.
	#[error("Network error occurred while calling the food API.")]
	Network {
		/// Transport failure.
		#[source]
		source: ReqwestError,
	},
	/// Data endpoint body is not JSON.
	#[error("Food API returned a non-JSON body (status {status}).")]
	MalformedBody {
		/// HTTP status code.
		status: u16,
		/// Parsing failure.
		#[source]
		source: serde_json::Error,
	},
}

fn describe_oauth_error(error: Option<&str>, description: Option<&str>) -> String {
	match (error, description) {
		(Some(error), Some(description)) => format!(" ({error}: {description})"),
		(Some(error), None) => format!(" ({error})"),
		(None, Some(description)) => format!(" ({description})"),
		(None, None) => String::new(),
	}
}
