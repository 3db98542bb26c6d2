//! Bearer-credential middleware with a single refresh-and-retry on `401`.
//!
//! [`SessionGuard`] attaches the stored access credential to every request it sees. When the
//! upstream answers `401` and a refresh credential is stored, the guard exchanges it for a new
//! access credential, persists the result, and re-dispatches the original request exactly once. The
//! retry goes through the [`Next`] handle, which no longer contains the guard, so a request that
//! keeps failing with `401` is returned to the caller instead of looping.
//!
//! Refreshes are single-flight: concurrent requests that fail together wait on one refresh call
//! and reuse its credential. The new access credential is written with
//! [`TokenStore::compare_and_swap`] so a fresher credential stored by another writer is never
//! overwritten. A rotated refresh credential is stored only when that swap won and the stored
//! refresh credential is still the one that was exchanged, so a logout during the refresh call
//! stays a logout.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{CredentialKeys, TokenSecret},
	client::AuthEndpoint,
	descriptor::ApiDescriptor,
	http::{ApiRequest, ApiResponse, DispatchFuture},
	obs::{self, GuardSpan, GuardStage, StageOutcome},
	pipeline::{Middleware, Next},
	store::{CompareAndSwapOutcome, TokenStore},
};

/// Request middleware that keeps the session's access credential attached and fresh.
#[derive(Clone)]
pub struct SessionGuard {
	store: Arc<dyn TokenStore>,
	endpoint: Arc<dyn AuthEndpoint>,
	keys: CredentialKeys,
	descriptor: Option<Arc<ApiDescriptor>>,
	refresh_lock: Arc<AsyncMutex<()>>,
	metrics: Arc<RefreshMetrics>,
}
impl SessionGuard {
	/// Creates a guard that reads credentials under the default store keys and guards every
	/// request.
	pub fn new(store: Arc<dyn TokenStore>, endpoint: Arc<dyn AuthEndpoint>) -> Self {
		Self {
			store,
			endpoint,
			keys: CredentialKeys::default(),
			descriptor: None,
			refresh_lock: Default::default(),
			metrics: Default::default(),
		}
	}

	/// Uses the descriptor's store keys and skips the descriptor's exempt routes.
	pub fn with_descriptor(mut self, descriptor: Arc<ApiDescriptor>) -> Self {
		self.keys = descriptor.keys.clone();
		self.descriptor = Some(descriptor);

		self
	}

	/// Overrides the store keys.
	pub fn with_keys(mut self, keys: CredentialKeys) -> Self {
		self.keys = keys;

		self
	}

	/// Shares refresh counters with the caller.
	pub fn with_metrics(mut self, metrics: Arc<RefreshMetrics>) -> Self {
		self.metrics = metrics;

		self
	}

	/// Refresh counters recorded by this guard.
	pub fn metrics(&self) -> &Arc<RefreshMetrics> {
		&self.metrics
	}

	fn is_exempt(&self, request: &ApiRequest) -> bool {
		self.descriptor.as_ref().is_some_and(|descriptor| descriptor.is_exempt(&request.url))
	}

	async fn guard<'a>(&'a self, request: ApiRequest, next: Next<'a>) -> Result<ApiResponse> {
		let sent = self.store.get(&self.keys.access).await?;
		let outgoing = match &sent {
			Some(access) => request.clone().with_bearer(access)?,
			None => request.clone(),
		};
		let result = self.dispatch_stage(GuardStage::Dispatch, outgoing, next).await;
		let err = match result {
			Err(err) if err.is_unauthorized() => err,
			other => return other,
		};

		if self.store.get(&self.keys.refresh).await?.is_none() {
			return Err(err);
		}

		let Some(access) = self.renew(sent.as_ref()).await? else {
			return Err(err);
		};

		self.metrics.record_retry();
		self.dispatch_stage(GuardStage::Retry, request.with_bearer(&access)?, next).await
	}

	/// Produces the access credential for the retry, or `None` when the session ended while
	/// waiting for the refresh lock.
	async fn renew(&self, sent: Option<&TokenSecret>) -> Result<Option<TokenSecret>> {
		let _singleflight = self.refresh_lock.lock().await;
		let current = self.store.get(&self.keys.access).await?;

		if let Some(stored) = current.as_ref().filter(|stored| Some(*stored) != sent) {
			#[cfg(feature = "tracing")]
			tracing::debug!("access credential already refreshed by a concurrent request");

			return Ok(Some(stored.clone()));
		}

		let Some(refresh) = self.store.get(&self.keys.refresh).await? else {
			return Ok(None);
		};

		obs::record_stage_outcome(GuardStage::Refresh, StageOutcome::Attempt);
		self.metrics.record_attempt();

		let refreshed = match self.endpoint.refresh(&refresh).await {
			Ok(refreshed) => refreshed,
			Err(err) => {
				obs::record_stage_outcome(GuardStage::Refresh, StageOutcome::Failure);
				self.metrics.record_failure();

				return Err(Error::refresh(err));
			},
		};
		let swapped = self
			.store
			.compare_and_swap(
				&self.keys.access,
				current.as_ref().map(TokenSecret::expose),
				refreshed.access.clone(),
			)
			.await?;

		if swapped == CompareAndSwapOutcome::Updated {
			if let Some(rotated) = refreshed.refresh {
				self.rotate(&refresh, rotated).await?;
			}
		} else {
			#[cfg(feature = "tracing")]
			tracing::debug!(outcome = ?swapped, "kept concurrently stored access credential");

			obs::record_lost_swap();
			self.metrics.record_lost_swap();
		}

		obs::record_stage_outcome(GuardStage::Refresh, StageOutcome::Success);
		self.metrics.record_success();

		Ok(Some(refreshed.access))
	}

	/// Replaces the refresh credential only if it is still the one that was just exchanged.
	async fn rotate(&self, exchanged: &TokenSecret, rotated: TokenSecret) -> Result<()> {
		let outcome = self
			.store
			.compare_and_swap(&self.keys.refresh, Some(exchanged.expose()), rotated)
			.await?;

		if outcome != CompareAndSwapOutcome::Updated {
			#[cfg(feature = "tracing")]
			tracing::debug!(?outcome, "dropped rotated refresh credential");

			obs::record_lost_swap();
			self.metrics.record_lost_swap();
		}

		Ok(())
	}

	async fn dispatch_stage(
		&self,
		stage: GuardStage,
		request: ApiRequest,
		next: Next<'_>,
	) -> Result<ApiResponse> {
		let span = GuardSpan::new(stage, &request);

		obs::record_stage_outcome(stage, StageOutcome::Attempt);

		let result = span.instrument(next.run(request)).await;

		span.record_result(&result);
		obs::record_stage_outcome(stage, StageOutcome::of(&result));

		result
	}
}
impl Middleware for SessionGuard {
	fn handle<'a>(&'a self, request: ApiRequest, next: Next<'a>) -> DispatchFuture<'a> {
		if self.is_exempt(&request) {
			return next.run(request);
		}

		Box::pin(self.guard(request, next))
	}
}
impl Debug for SessionGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionGuard")
			.field("keys", &self.keys)
			.field("exempt_paths", &self.descriptor.as_ref().map(|d| &d.exempt_paths))
			.field("metrics", &self.metrics)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use http::StatusCode;
	// self
	use super::*;
	use crate::{
		auth::RefreshedCredentials,
		client::AuthFuture,
		http::Dispatch,
		pipeline::Pipeline,
		store::MemoryStore,
	};

	struct AlwaysUnauthorized(Mutex<Vec<Option<String>>>);
	impl Dispatch for AlwaysUnauthorized {
		fn dispatch(&self, request: ApiRequest) -> DispatchFuture<'_> {
			self.0.lock().push(request.authorization().map(str::to_owned));

			Box::pin(async { Err(Error::Status { status: 401, body: String::new() }) })
		}
	}

	struct Issuing(&'static str);
	impl AuthEndpoint for Issuing {
		fn refresh<'a>(&'a self, _: &'a TokenSecret) -> AuthFuture<'a, RefreshedCredentials> {
			let access = TokenSecret::new(self.0);

			Box::pin(async move { Ok(RefreshedCredentials { access, refresh: None }) })
		}
	}

	struct Ok200;
	impl Dispatch for Ok200 {
		fn dispatch(&self, request: ApiRequest) -> DispatchFuture<'_> {
			let auth = request.authorization().map(|v| v.as_bytes().to_vec()).unwrap_or_default();

			Box::pin(async move { Ok(ApiResponse::new(StatusCode::OK, auth)) })
		}
	}

	async fn seeded_store() -> Arc<MemoryStore> {
		let store = Arc::new(MemoryStore::default());

		store.set("access_token", TokenSecret::new("tok-a")).await.expect("Seeding should work.");
		store.set("refresh_token", TokenSecret::new("tok-r")).await.expect("Seeding should work.");

		store
	}

	#[tokio::test]
	async fn persistent_unauthorized_retries_exactly_once() {
		let store = seeded_store().await;
		let dispatcher = Arc::new(AlwaysUnauthorized(Mutex::new(Vec::new())));
		let guard = SessionGuard::new(store.clone(), Arc::new(Issuing("tok-b")));
		let metrics = guard.metrics().clone();
		let pipeline = Pipeline::new(dispatcher.clone()).with(guard);
		let url = Url::parse("https://api.example.com/documents").expect("URL should parse.");
		let err = pipeline
			.dispatch(ApiRequest::get(url))
			.await
			.expect_err("A retried 401 should reach the caller.");

		assert!(err.is_unauthorized());
		assert_eq!(
			*dispatcher.0.lock(),
			vec![Some("Bearer tok-a".to_owned()), Some("Bearer tok-b".to_owned())],
		);
		assert_eq!(metrics.attempts(), 1);
		assert_eq!(metrics.successes(), 1);
		assert_eq!(metrics.retries(), 1);
	}

	#[tokio::test]
	async fn exempt_routes_pass_through_unmodified() {
		let store = seeded_store().await;
		let descriptor = Arc::new(
			ApiDescriptor::builder(
				Url::parse("https://api.example.com/api/").expect("URL should parse."),
			)
			.build()
			.expect("Descriptor should build."),
		);
		let login = descriptor.login_url().expect("Login route should resolve.");
		let documents = descriptor.endpoint("documents").expect("Route should resolve.");
		let guard =
			SessionGuard::new(store, Arc::new(Issuing("tok-b"))).with_descriptor(descriptor);
		let pipeline = Pipeline::new(Arc::new(Ok200)).with(guard);
		let exempt = pipeline
			.dispatch(ApiRequest::get(login))
			.await
			.expect("Exempt requests should succeed.");
		let guarded = pipeline
			.dispatch(ApiRequest::get(documents))
			.await
			.expect("Guarded requests should succeed.");

		assert!(exempt.body.is_empty());
		assert_eq!(guarded.body, b"Bearer tok-a");
	}
}
