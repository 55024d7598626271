//! Client-level error types shared across the token manager, transport, and orchestrator.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem, raised at construction time.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Access token could not be obtained.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Temporary upstream failure; retried inside the transport before surfacing.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS) that is not a timeout.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Quotes endpoint rejected the request with a non-retryable status.
	#[error("Quotes endpoint rejected the request with HTTP {status}: {body}")]
	Rejected {
		/// HTTP status code returned upstream.
		status: u16,
		/// Response body, truncated for diagnostics.
		body: String,
	},
	/// Caller deadline elapsed before the operation completed.
	#[error("Quote request was cancelled because its deadline elapsed.")]
	Cancelled,
}
impl Error {
	/// Returns `true` when another attempt may succeed.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Transient(_))
	}
}

/// Configuration and validation failures raised while building the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required setting was not supplied.
	#[error("Missing required setting `{field}`.")]
	MissingField {
		/// Setting name.
		field: &'static str,
	},
	/// An endpoint URL cannot be used.
	#[error("The {field} URL is invalid: {url}.")]
	InvalidUrl {
		/// Setting name.
		field: &'static str,
		/// Offending URL.
		url: String,
	},
	/// A numeric or duration setting is out of range.
	#[error("The `{field}` setting is out of range: {reason}.")]
	OutOfRange {
		/// Setting name.
		field: &'static str,
		/// Human-readable constraint.
		reason: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token endpoint failures.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Token endpoint answered with an OAuth error or a non-success status.
	#[error("Token endpoint rejected the client credentials: {message}.")]
	Rejected {
		/// Provider- or client-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint could not be reached.
	#[error("Token endpoint is unreachable.")]
	Unreachable {
		/// Underlying transport failure.
		#[source]
		source: TransportError,
	},
	/// Token endpoint responded with a body that could not be parsed.
	#[error("Token endpoint returned a malformed response.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned a non-positive or oversized `expires_in`.
	#[error("The expires_in value is out of range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned an empty access token.
	#[error("Token endpoint returned an empty access token.")]
	EmptyAccessToken,
	/// Token request could not be constructed.
	#[error("Token request could not be constructed.")]
	Request(#[from] oauth2::http::Error),
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Request did not complete in time.
	#[error("Request to the quotes endpoint timed out.")]
	Timeout {
		/// Underlying timeout, if the transport reported one.
		#[source]
		source: Option<TransportError>,
	},
	/// Quotes endpoint returned a retryable status (5xx, 408, 429).
	#[error("Quotes endpoint returned retryable HTTP {status}: {body}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body, truncated for diagnostics.
		body: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Quotes endpoint responded with JSON that could not be decoded.
	#[error("Quotes endpoint returned a body that could not be decoded.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code.
		status: u16,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Transport gave up waiting for the upstream.
	#[error("Network timeout occurred while calling the upstream.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the upstream.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Outgoing request could not be built by the transport.
	#[error("Outgoing request could not be built.")]
	Request {
		/// Transport-specific builder error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the upstream.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific timeout.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a request construction failure.
	pub fn request(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Request { source: Box::new(src) }
	}

	/// Returns `true` when the failure is a timeout.
	pub fn is_timeout(&self) -> bool {
		match self {
			Self::Timeout { .. } => true,
			Self::Io(e) => e.kind() == std::io::ErrorKind::TimedOut,
			_ => false,
		}
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() {
			Self::timeout(e)
		} else if e.is_builder() {
			Self::request(e)
		} else {
			Self::network(e)
		}
	}
}
