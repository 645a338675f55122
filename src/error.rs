//! Client-level error types shared by the token cache, the request executor, and operations.

// self
use crate::{_prelude::*, auth::ScopeValidationError};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or request assembly problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Request input was rejected before any network call.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// The credential exchange could not produce a usable token.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),
	/// Transport faults exhausted the retry budget.
	#[error(transparent)]
	Transient(#[from] TransientError),

	/// Remote service answered with a non-success status.
	#[error("Remote service rejected the call with status {status}: {body}.")]
	Domain {
		/// HTTP status code returned by the service.
		status: u16,
		/// Raw response body, kept for caller inspection.
		body: String,
	},
	/// Successful response body did not match the expected schema.
	#[error("Response body with status {status} could not be decoded.")]
	Decode {
		/// HTTP status code of the response.
		status: u16,
		/// Structured decoding failure carrying the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Response decoded but violated a protocol invariant.
	#[error("Response with status {status} is invalid: {reason}.")]
	InvalidResponse {
		/// HTTP status code of the response.
		status: u16,
		/// Description of the violated invariant.
		reason: String,
	},
}
impl Error {
	/// HTTP status carried by the error, when the remote service answered.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Domain { status, .. }
			| Self::Decode { status, .. }
			| Self::InvalidResponse { status, .. } => Some(*status),
			Self::Authentication(AuthenticationError::Rejected { status, .. }) => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` when the remote service rejected the bearer token.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Domain { status: 401, .. })
	}
}

/// Configuration and request assembly failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Endpoint URL could not be derived from the base URL.
	#[error("Endpoint `{path}` cannot be joined onto the base URL.")]
	InvalidEndpoint {
		/// Relative path that failed to join.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Client identity material could not be read.
	#[error("Client identity file `{path}` could not be read.")]
	IdentityRead {
		/// Offending file path.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Client settings failed validation.
	#[error(transparent)]
	Settings(#[from] crate::config::ConfigBuildError),
	/// Scope strings cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] ScopeValidationError),
	/// Request payload could not be serialized.
	#[error("Request body could not be encoded.")]
	RequestEncode {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Input rejected before any request left the process.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// A required field was absent or blank.
	#[error("Required field `{field}` is missing.")]
	MissingField {
		/// Wire name of the field.
		field: &'static str,
	},
	/// Monetary amounts must be strictly positive.
	#[error("Field `{field}` must be greater than zero.")]
	NonPositiveAmount {
		/// Wire name of the field.
		field: &'static str,
	},
	/// A text field exceeded its maximum length.
	#[error("Field `{field}` exceeds {max} characters.")]
	TooLong {
		/// Wire name of the field.
		field: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// A numeric field fell outside its permitted range.
	#[error("Field `{field}` must be between {min} and {max}.")]
	OutOfRange {
		/// Wire name of the field.
		field: &'static str,
		/// Inclusive lower bound.
		min: i64,
		/// Inclusive upper bound.
		max: i64,
	},
	/// Webhook targets must be served over HTTPS.
	#[error("Webhook URL must use HTTPS: {url}.")]
	InsecureWebhookUrl {
		/// Rejected URL.
		url: String,
	},
	/// Charge identifier failed validation.
	#[error(transparent)]
	RequestCode(#[from] crate::auth::IdentifierError),
}

/// Failures while obtaining a bearer token.
#[derive(Debug, ThisError)]
pub enum AuthenticationError {
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint rejected the exchange with status {status}: {reason}.")]
	Rejected {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// OAuth error description, error code, or body preview.
		reason: String,
	},
	/// Token endpoint body could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token endpoint response omitted `access_token`.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Granted scope string could not be normalized.
	#[error("Token endpoint granted an invalid scope string.")]
	InvalidGrantedScope(#[source] ScopeValidationError),
	/// Granted scopes do not cover the requested ones.
	#[error("Token grants `{granted}` but `{requested}` was requested.")]
	InsufficientScope {
		/// Normalized requested scopes.
		requested: String,
		/// Normalized granted scopes.
		granted: String,
	},
	/// Token endpoint stayed unreachable after every retry.
	#[error("Token endpoint is unreachable.")]
	Unreachable(#[source] TransientError),
}

/// Temporary failure variants (safe to retry later).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Every attempt ended in a transport fault.
	#[error("Call `{call}` failed after {attempts} attempt(s).")]
	Exhausted {
		/// Stable label of the call that failed.
		call: &'static str,
		/// Number of attempts performed.
		attempts: u32,
		/// Fault observed on the final attempt.
		#[source]
		source: TransportError,
	},
}
impl TransientError {
	/// Number of attempts performed before giving up.
	pub fn attempts(&self) -> u32 {
		match self {
			Self::Exhausted { attempts, .. } => *attempts,
		}
	}
}

/// Transport-level failures (network, TLS, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the remote service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the remote service.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
