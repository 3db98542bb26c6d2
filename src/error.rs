//! Guard-level error types shared across the pipeline, auth client, and stores.

// self
use crate::_prelude::*;

/// Guard-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// HTTP status signalling an expired or missing access credential.
pub const UNAUTHORIZED: u16 = 401;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Access credential claims could not be read.
	#[error(transparent)]
	Claims(#[from] crate::auth::ClaimsError),

	/// Upstream answered with a non-success HTTP status.
	#[error("Request failed with HTTP status {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body preview.
		body: String,
	},
	/// Refreshing the access credential failed; the session must re-authenticate.
	#[error("Access credential refresh failed.")]
	Refresh {
		/// Failure reported by the auth endpoint.
		#[source]
		source: Box<Error>,
	},
	/// Response body could not be decoded into the expected shape.
	#[error("Response body is malformed.")]
	Decode {
		/// Structured parsing failure naming the offending field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status of the response that carried the body.
		status: u16,
	},
}
impl Error {
	/// Wraps an auth endpoint failure so callers can tell it apart from the original request
	/// failure.
	pub fn refresh(source: Error) -> Self {
		Self::Refresh { source: Box::new(source) }
	}

	/// HTTP status attached to the failure, if any.
	///
	/// Refresh failures report the status of the failed refresh call.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } | Self::Decode { status, .. } => Some(*status),
			Self::Refresh { source } => source.status(),
			_ => None,
		}
	}

	/// Returns `true` for a plain `401` answer from the upstream API.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Status { status: UNAUTHORIZED, .. })
	}

	/// Returns `true` when the session can no longer be recovered without a new login.
	pub fn requires_reauthentication(&self) -> bool {
		matches!(self, Self::Refresh { .. }) || self.is_unauthorized()
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A credential cannot be encoded as a header value.
	#[error("Credential cannot be used as an HTTP header value.")]
	InvalidHeader(#[from] http::header::InvalidHeaderValue),
	/// Request body could not be serialized.
	#[error("Request body could not be encoded.")]
	RequestBody(#[source] serde_json::Error),
	/// API descriptor is invalid.
	#[error(transparent)]
	Descriptor(#[from] crate::descriptor::DescriptorError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn refresh_failures_expose_the_refresh_status() {
		let err = Error::refresh(Error::Status { status: 401, body: String::new() });

		assert_eq!(err.status(), Some(401));
		assert!(!err.is_unauthorized());
		assert!(err.requires_reauthentication());

		let source = StdError::source(&err).expect("Refresh errors should expose their source.");

		assert_eq!(source.to_string(), "Request failed with HTTP status 401.");
	}

	#[test]
	fn non_auth_failures_do_not_require_reauthentication() {
		let server = Error::Status { status: 500, body: "boom".into() };
		let network = Error::from(TransportError::Io(std::io::Error::other("reset")));

		assert_eq!(server.status(), Some(500));
		assert!(!server.requires_reauthentication());
		assert_eq!(network.status(), None);
		assert!(!network.requires_reauthentication());
	}
}
