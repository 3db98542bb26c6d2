//! Request descriptors, responses, and the dispatch contract every pipeline stage builds on.
//!
//! [`Dispatch`] is the continuation a middleware hands a request to. It makes no assumption about
//! the transport beyond one rule: a non-success answer surfaces as [`Error::Status`] so callers can
//! compare the numeric status. [`ReqwestDispatcher`] is the default transport.

// crates.io
use http::{
	HeaderMap, HeaderValue, Method, StatusCode,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};
#[cfg(feature = "reqwest")] use crate::error::TransportError;

/// Boxed future returned by [`Dispatch::dispatch`].
pub type DispatchFuture<'a> = Pin<Box<dyn Future<Output = Result<ApiResponse>> + 'a + Send>>;

/// Continuation that actually performs a request.
pub trait Dispatch
where
	Self: Send + Sync,
{
	/// Sends `request` and resolves to its response, or to a failure carrying the HTTP status.
	fn dispatch(&self, request: ApiRequest) -> DispatchFuture<'_>;
}
impl<D> Dispatch for Arc<D>
where
	D: ?Sized + Dispatch,
{
	fn dispatch(&self, request: ApiRequest) -> DispatchFuture<'_> {
		(**self).dispatch(request)
	}
}

/// Outgoing request descriptor.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Request headers.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a request without headers or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: None }
	}

	/// Shorthand for a `GET` request.
	pub fn get(url: Url) -> Self {
		Self::new(Method::GET, url)
	}

	/// Builds a `POST` request carrying `payload` as JSON.
	pub fn post_json<T>(url: Url, payload: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(payload).map_err(ConfigError::RequestBody)?;
		let mut request = Self::new(Method::POST, url);

		request.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		request.body = Some(body);

		Ok(request)
	}

	/// Sets `Authorization: Bearer <secret>`, replacing any existing authorization header.
	pub fn bearer_auth(&mut self, secret: &TokenSecret) -> Result<()> {
		let mut value = HeaderValue::from_str(&secret.bearer()).map_err(ConfigError::from)?;

		value.set_sensitive(true);
		self.headers.insert(AUTHORIZATION, value);

		Ok(())
	}

	/// Consuming variant of [`ApiRequest::bearer_auth`].
	pub fn with_bearer(mut self, secret: &TokenSecret) -> Result<Self> {
		self.bearer_auth(secret)?;

		Ok(self)
	}

	/// Current `Authorization` header value, if it is valid UTF-8.
	pub fn authorization(&self) -> Option<&str> {
		self.headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
	}

	/// Path component of the request URL.
	pub fn path(&self) -> &str {
		self.url.path()
	}
}

/// Successful response returned by a [`Dispatch`] implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response without headers.
	pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: HeaderMap::new(), body: body.into() }
	}

	/// Decodes the body as JSON, reporting the failing field path on error.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| Error::Decode { source, status: self.status.as_u16() })
	}
}

/// Maximum number of characters kept from an error response body.
pub const BODY_PREVIEW_LIMIT: usize = 256;

/// Truncates an error body for inclusion in [`Error::Status`].
pub fn body_preview(body: &[u8]) -> String {
	String::from_utf8_lossy(body).chars().take(BODY_PREVIEW_LIMIT).collect()
}

/// Thin wrapper around [`ReqwestClient`] that speaks the [`Dispatch`] contract.
///
/// API calls are not expected to redirect, so clients built by
/// [`ReqwestDispatcher::new`] never follow redirects. A custom client passed to
/// [`ReqwestDispatcher::with_client`] should be configured the same way.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestDispatcher(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestDispatcher {
	/// Builds a dispatcher with redirects disabled.
	pub fn new() -> Result<Self> {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
		let mut builder =
			self.0.request(request.method, request.url.as_str()).headers(request.headers);

		if let Some(body) = request.body {
			builder = builder.body(body);
		}

		let response = builder.send().await.map_err(TransportError::from)?;
		let status = response.status();
		let headers = response.headers().to_owned();
		let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

		if !status.is_success() {
			return Err(Error::Status { status: status.as_u16(), body: body_preview(&body) });
		}

		Ok(ApiResponse { status, headers, body })
	}
}
#[cfg(feature = "reqwest")]
impl Dispatch for ReqwestDispatcher {
	fn dispatch(&self, request: ApiRequest) -> DispatchFuture<'_> {
		Box::pin(self.execute(request))
	}
}
