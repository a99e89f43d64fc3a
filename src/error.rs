//! Adapter-level error types shared by the client flows and the resource-server path.

// self
use crate::{_prelude::*, response::ParsedResponse};

/// Adapter-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Message surfaced whenever an inbound request cannot be authorized.
pub const ACCESS_DENIED_MESSAGE: &str = "Access denied for this resource";
/// HTTP status paired with [`ACCESS_DENIED_MESSAGE`].
pub const ACCESS_DENIED_STATUS: u16 = 401;

/// Canonical adapter error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; raised before any network activity.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// A required token-request parameter is absent or empty.
	#[error("Required parameter `{name}` is missing.")]
	MissingParameter {
		/// Name of the first missing parameter.
		name: String,
	},
	/// A body that was declared or expected to be JSON could not be used.
	#[error(transparent)]
	MalformedJson(#[from] MalformedJsonError),
	/// HTTP 500 whose body could not be parsed.
	#[error("An OAuth server error was encountered that did not contain a JSON body.")]
	ServerErrorNoBody {
		/// JSON failure raised while reading the body.
		#[source]
		source: serde_json::Error,
	},
	/// Identity provider answered with an error status or could not be reached.
	#[error(transparent)]
	IdentityProvider(#[from] IdentityProviderError),
	/// No bearer token was found on the inbound request.
	#[error("Access denied for this resource")]
	MissingToken,
	/// The introspection endpoint refused the token.
	#[error("Access denied for this resource")]
	IntrospectionDenied {
		/// Status returned by the introspection endpoint.
		status: u16,
	},
	/// The `state` returned by the authorization redirect does not match the issued one.
	#[error("Authorization state mismatch.")]
	StateMismatch,
}
impl Error {
	/// Returns `true` for the failures that map onto the fixed 401 access-denied shape.
	pub fn is_access_denied(&self) -> bool {
		matches!(self, Self::MissingToken | Self::IntrospectionDenied { .. })
	}

	/// HTTP status associated with the error, when one is known.
	///
	/// Access-denied failures always report [`ACCESS_DENIED_STATUS`]; provider errors report the
	/// upstream status.
	pub fn status_code(&self) -> Option<u16> {
		match self {
			Self::MissingToken | Self::IntrospectionDenied { .. } => Some(ACCESS_DENIED_STATUS),
			Self::IdentityProvider(e) => e.status,
			Self::ServerErrorNoBody { .. } => Some(500),
			_ => None,
		}
	}
}
impl From<TransportError> for Error {
	fn from(e: TransportError) -> Self {
		IdentityProviderError::transport(e).into()
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Base URL was not supplied.
	#[error("Cidaas base url is not specified.")]
	MissingBaseUrl,
	/// Base URL cannot be parsed or does not use HTTP(S).
	#[error("Cidaas base url `{url}` is invalid.")]
	InvalidBaseUrl {
		/// Offending value.
		url: String,
		/// Underlying parsing failure, when the value did not parse at all.
		#[source]
		source: Option<url::ParseError>,
	},
	/// Client identifier was not supplied.
	#[error("Client id is not specified.")]
	MissingClientId,
	/// Configuration document contains unknown or mistyped keys.
	#[error("Configuration is invalid at `{path}`.")]
	InvalidDocument {
		/// Path of the offending key.
		path: String,
		/// Underlying deserialization failure.
		#[source]
		source: serde_json::Error,
	},
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
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<serde_path_to_error::Error<serde_json::Error>> for ConfigError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::InvalidDocument { path, source: e.into_inner() }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised while reading or producing JSON payloads.
#[derive(Debug, ThisError)]
pub enum MalformedJsonError {
	/// Body declared as JSON could not be parsed.
	#[error("Failed to parse JSON response: {source}.")]
	Json {
		/// Structured parsing failure.
		#[source]
		source: serde_json::Error,
		/// HTTP status of the response.
		status: u16,
	},
	/// Token response parsed, but its fields do not have the expected shape.
	#[error("Token response is malformed at `{path}`.", path = .source.path())]
	TokenShape {
		/// Path-aware deserialization failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A JSON object was required but the body was something else.
	#[error("Expected a JSON object in the {context} response.")]
	NotAnObject {
		/// Which response was being read.
		context: &'static str,
	},
	/// Request payload could not be serialized.
	#[error("Failed to serialize the request payload.")]
	Serialize {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
}

/// Error response (or unreachable endpoint) reported by the identity provider.
///
/// Transport failures use the same type with `status` left empty and the cause in `source`, so
/// callers can branch on [`IdentityProviderError::is_transport`].
#[derive(Debug, ThisError)]
#[error("Identity provider request failed: {message}.")]
pub struct IdentityProviderError {
	/// Provider `error` field, HTTP reason phrase, or a generic message.
	pub message: String,
	/// HTTP status code, when a response was received.
	pub status: Option<u16>,
	/// Provider `error_description` field, when present.
	pub description: Option<String>,
	/// Parsed response body, when a response was received.
	pub body: Option<ParsedResponse>,
	/// Retry-After hint from upstream, if supplied.
	pub retry_after: Option<Duration>,
	/// Transport failure that prevented a response.
	#[source]
	pub source: Option<TransportError>,
}
impl IdentityProviderError {
	/// Builds an error from an HTTP-level failure.
	pub fn response(message: impl Into<String>, status: u16, body: ParsedResponse) -> Self {
		Self {
			message: message.into(),
			status: Some(status),
			description: None,
			body: Some(body),
			retry_after: None,
			source: None,
		}
	}

	/// Builds an error from a transport failure.
	pub fn transport(source: TransportError) -> Self {
		Self {
			message: "the identity provider could not be reached".into(),
			status: None,
			description: None,
			body: None,
			retry_after: None,
			source: Some(source),
		}
	}

	/// Attaches the provider `error_description`.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());

		self
	}

	/// Attaches a Retry-After hint.
	pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
		self.retry_after = retry_after;

		self
	}

	/// Returns `true` when no HTTP response was received.
	pub fn is_transport(&self) -> bool {
		self.source.is_some()
	}
}

/// Transport-level failures (network, timeout, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the identity provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request exceeded its deadline.
	#[error("Request timed out while calling the identity provider.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the identity provider.")]
	Io(#[from] std::io::Error),
	/// Any other transport failure reported as text.
	#[error("HTTP client error occurred while calling the identity provider: {message}.")]
	Other {
		/// Transport-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}
