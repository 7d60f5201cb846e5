//! Crate-level error types shared by the dispatcher, query builder, and log adapter.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller supplied mutually exclusive query parameters.
	#[error(transparent)]
	Query(#[from] crate::query::QueryError),
	/// Backend answered with a status other than the expected one.
	#[error(transparent)]
	RequestFailed(#[from] RequestFailedError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded into the requested type.
	#[error(transparent)]
	Decode(#[from] DecodeError),
}
impl Error {
	/// Returns the HTTP status attached to the error, if the backend produced one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::RequestFailed(e) => Some(e.status),
			Self::Decode(e) => Some(e.status),
			_ => None,
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Base URL, endpoint, and item identifier do not compose into an absolute URL.
	#[error("Request URL `{url}` is invalid.")]
	InvalidUrl {
		/// Composed URL that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Global log subscriber could not be installed.
	#[error("Log subscriber could not be installed.")]
	LoggerInstall {
		/// Underlying subscriber failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Wraps a subscriber installation failure inside [`ConfigError`].
	pub fn logger_install(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::LoggerInstall { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// The transport succeeded but the response status did not match the expected one.
///
/// The message is rendered as `"<status>: <reason>"`.
#[derive(Clone, Debug, PartialEq, ThisError)]
#[error("{status}: {reason}")]
pub struct RequestFailedError {
	/// HTTP status code returned by the backend.
	pub status: u16,
	/// Reason phrase for the status, empty when unknown.
	pub reason: String,
	/// Best-effort JSON decoding of the error body.
	pub body: Option<Value>,
}

/// Transport-level failures (network, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client gave up waiting for the backend.
	#[error("Request to the backend timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
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

/// Response body could not be decoded into the caller's type.
#[derive(Debug, ThisError)]
#[error("Response body with status {status} does not match the expected shape.")]
pub struct DecodeError {
	/// HTTP status of the decoded response.
	pub status: u16,
	/// Structured parsing failure, including the JSON path.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
}
