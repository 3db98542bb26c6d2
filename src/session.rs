//! Authenticated session facade: login, logout, and guarded API calls over one token store.
//!
//! A [`Session`] owns two request paths. Auth calls (login, registration, refresh) go straight to
//! the dispatcher. Every other call goes through a [`Pipeline`] fronted by a [`SessionGuard`], so
//! it carries the stored access credential and survives one credential expiry.

// self
use crate::{
	_prelude::*,
	auth::{AccessClaims, TokenPair, TokenSecret},
	client::{AccountProfile, AuthClient, RegisterRequest},
	descriptor::ApiDescriptor,
	error::ConfigError,
	guard::{RefreshMetrics, SessionGuard},
	http::{ApiRequest, ApiResponse, Dispatch},
	pipeline::Pipeline,
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestDispatcher;

/// Session bound to one API descriptor and one token store.
#[derive(Clone)]
pub struct Session {
	store: Arc<dyn TokenStore>,
	descriptor: Arc<ApiDescriptor>,
	auth: AuthClient,
	pipeline: Pipeline,
	metrics: Arc<RefreshMetrics>,
}
impl Session {
	/// Creates a session that sends requests through `dispatcher`.
	pub fn with_dispatcher(
		store: Arc<dyn TokenStore>,
		descriptor: ApiDescriptor,
		dispatcher: Arc<dyn Dispatch>,
	) -> Self {
		let descriptor = Arc::new(descriptor);
		let auth = AuthClient::new(descriptor.clone(), dispatcher.clone());
		let guard = SessionGuard::new(store.clone(), Arc::new(auth.clone()))
			.with_descriptor(descriptor.clone());
		let metrics = guard.metrics().clone();
		let pipeline = Pipeline::new(dispatcher).with(guard);

		Self { store, descriptor, auth, pipeline, metrics }
	}

	/// Descriptor the session resolves routes against.
	pub fn descriptor(&self) -> &ApiDescriptor {
		&self.descriptor
	}

	/// Backing token store.
	pub fn store(&self) -> &Arc<dyn TokenStore> {
		&self.store
	}

	/// Refresh counters of the session's guard.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Unauthenticated auth endpoint client.
	pub fn auth_client(&self) -> &AuthClient {
		&self.auth
	}

	/// Resolves `route` against the API base URL.
	pub fn url(&self, route: &str) -> Result<Url> {
		Ok(self.descriptor.endpoint(route).map_err(ConfigError::from)?)
	}

	/// Logs in and stores both credentials.
	pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
		let pair = self.auth.login(email, password).await?;

		self.set_tokens(pair.access.clone(), Some(pair.refresh.clone())).await?;

		Ok(pair)
	}

	/// Registers a new account; the session stays logged out.
	pub async fn register(&self, registration: &RegisterRequest) -> Result<AccountProfile> {
		self.auth.register(registration).await
	}

	/// Fetches the authenticated account profile.
	pub async fn me(&self) -> Result<AccountProfile> {
		let url = self.descriptor.me_url().map_err(ConfigError::from)?;

		self.send(ApiRequest::get(url)).await?.json()
	}

	/// Sends any request through the guarded pipeline.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		self.pipeline.dispatch(request).await
	}

	/// Removes both credentials.
	pub async fn logout(&self) -> Result<()> {
		self.store.remove(&self.descriptor.keys.access).await?;
		self.store.remove(&self.descriptor.keys.refresh).await?;

		Ok(())
	}

	/// Stored access credential.
	pub async fn access_token(&self) -> Result<Option<TokenSecret>> {
		Ok(self.store.get(&self.descriptor.keys.access).await?)
	}

	/// Stored refresh credential.
	pub async fn refresh_token(&self) -> Result<Option<TokenSecret>> {
		Ok(self.store.get(&self.descriptor.keys.refresh).await?)
	}

	/// Returns `true` while an access credential is stored.
	pub async fn is_authenticated(&self) -> Result<bool> {
		Ok(self.access_token().await?.is_some())
	}

	/// Stores `access` and, when given, `refresh`; an existing refresh credential is kept
	/// otherwise.
	pub async fn set_tokens(&self, access: TokenSecret, refresh: Option<TokenSecret>) -> Result<()> {
		self.store.set(&self.descriptor.keys.access, access).await?;

		if let Some(refresh) = refresh {
			self.store.set(&self.descriptor.keys.refresh, refresh).await?;
		}

		Ok(())
	}

	/// Claims of the stored access credential, if one is stored.
	pub async fn access_claims(&self) -> Result<Option<AccessClaims>> {
		match self.access_token().await? {
			Some(access) => Ok(Some(AccessClaims::decode(&access)?)),
			None => Ok(None),
		}
	}

	/// Ends the session when `err` means it cannot be recovered without a new login.
	///
	/// Returns `true` when the credentials were cleared and the caller should send the user back
	/// to the login screen.
	pub async fn handle_failure(&self, err: &Error) -> Result<bool> {
		if !err.requires_reauthentication() {
			return Ok(false);
		}

		#[cfg(feature = "tracing")]
		tracing::info!(status = ?err.status(), "session requires re-authentication");

		self.logout().await?;

		Ok(true)
	}
}
#[cfg(feature = "reqwest")]
impl Session {
	/// Creates a session over a reqwest transport that does not follow redirects.
	pub fn new(store: Arc<dyn TokenStore>, descriptor: ApiDescriptor) -> Result<Self> {
		let dispatcher = ReqwestDispatcher::new()?;

		Ok(Self::with_dispatcher(store, descriptor, Arc::new(dispatcher)))
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("descriptor", &self.descriptor)
			.field("pipeline", &self.pipeline)
			.field("metrics", &self.metrics)
			.finish()
	}
}
