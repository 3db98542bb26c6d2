//! Auth endpoint contract and the HTTP client that speaks it.
//!
//! [`AuthClient`] sends its calls straight to the dispatcher it was built with. It must never sit
//! behind a [`SessionGuard`](crate::guard::SessionGuard): a failing refresh would otherwise try to
//! refresh itself.

// self
use crate::{
	_prelude::*,
	auth::{RefreshedCredentials, TokenPair, TokenSecret},
	descriptor::ApiDescriptor,
	error::ConfigError,
	http::{ApiRequest, Dispatch},
};

/// Boxed future returned by [`AuthEndpoint`] operations.
pub type AuthFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// External service that mints access credentials from a refresh credential.
pub trait AuthEndpoint
where
	Self: Send + Sync,
{
	/// Exchanges `refresh` for a new access credential.
	///
	/// An invalid or expired refresh credential resolves to a failure whose
	/// [`Error::status`] is `401`.
	fn refresh<'a>(&'a self, refresh: &'a TokenSecret) -> AuthFuture<'a, RefreshedCredentials>;
}

/// Account registration payload.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
	/// Display name of the account.
	pub name: String,
	/// Login email.
	pub email: String,
	/// Login password.
	pub password: String,
	/// Signing provider API token bound to the account.
	pub api_token: String,
}
impl Debug for RegisterRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RegisterRequest")
			.field("name", &self.name)
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.field("api_token", &"<redacted>")
			.finish()
	}
}

/// Account profile returned by registration and the profile endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
	/// Account identifier.
	pub id: u64,
	/// Display name.
	pub name: String,
	/// Login email.
	pub email: String,
}

#[derive(Serialize)]
struct LoginBody<'a> {
	email: &'a str,
	password: &'a str,
}

#[derive(Serialize)]
struct RefreshBody<'a> {
	refresh: &'a str,
}

/// HTTP implementation of the auth endpoint.
#[derive(Clone)]
pub struct AuthClient {
	descriptor: Arc<ApiDescriptor>,
	dispatcher: Arc<dyn Dispatch>,
}
impl AuthClient {
	/// Creates a client that sends auth calls through `dispatcher`.
	pub fn new(descriptor: Arc<ApiDescriptor>, dispatcher: Arc<dyn Dispatch>) -> Self {
		Self { descriptor, dispatcher }
	}

	/// Descriptor the client resolves routes against.
	pub fn descriptor(&self) -> &ApiDescriptor {
		&self.descriptor
	}

	/// Exchanges email + password for a credential pair.
	pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
		let url = self.descriptor.login_url().map_err(ConfigError::from)?;
		let request = ApiRequest::post_json(url, &LoginBody { email, password })?;

		self.dispatcher.dispatch(request).await?.json()
	}

	/// Creates a new account. No credential is issued.
	pub async fn register(&self, registration: &RegisterRequest) -> Result<AccountProfile> {
		let url = self.descriptor.register_url().map_err(ConfigError::from)?;
		let request = ApiRequest::post_json(url, registration)?;

		self.dispatcher.dispatch(request).await?.json()
	}

	async fn refresh_now(&self, refresh: &TokenSecret) -> Result<RefreshedCredentials> {
		let url = self.descriptor.refresh_url().map_err(ConfigError::from)?;
		let request = ApiRequest::post_json(url, &RefreshBody { refresh: refresh.expose() })?;

		self.dispatcher.dispatch(request).await?.json()
	}
}
impl AuthEndpoint for AuthClient {
	fn refresh<'a>(&'a self, refresh: &'a TokenSecret) -> AuthFuture<'a, RefreshedCredentials> {
		Box::pin(self.refresh_now(refresh))
	}
}
impl Debug for AuthClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthClient").field("descriptor", &self.descriptor).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn register_request_debug_redacts_secrets() {
		let request = RegisterRequest {
			name: "Acme".into(),
			email: "ops@acme.test".into(),
			password: "hunter2".into(),
			api_token: "zs-123".into(),
		};
		let rendered = format!("{request:?}");

		assert!(rendered.contains("ops@acme.test"));
		assert!(!rendered.contains("hunter2"));
		assert!(!rendered.contains("zs-123"));
	}
}
