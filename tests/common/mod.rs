//! Scripted collaborators shared by the integration tests.

#![allow(dead_code)]

// std
use std::{collections::VecDeque, sync::Arc};
// crates.io
use parking_lot::Mutex;
// self
use session_guard::{
	auth::{RefreshedCredentials, TokenSecret},
	client::{AuthEndpoint, AuthFuture},
	error::Error,
	http::{ApiRequest, ApiResponse, Dispatch, DispatchFuture},
	store::{MemoryStore, TokenStore},
	url::Url,
};
#[cfg(feature = "reqwest")]
use session_guard::{
	http::ReqwestDispatcher,
	reqwest::{Client as ReqwestClient, redirect::Policy},
};

/// Scripted [`Dispatch`] that replays queued outcomes and records every request it receives.
///
/// Once the script is exhausted every further call succeeds with an empty `200` response.
#[derive(Debug, Default)]
pub struct ScriptedDispatcher {
	script: Mutex<VecDeque<Result<ApiResponse, Error>>>,
	requests: Mutex<Vec<ApiRequest>>,
}
impl ScriptedDispatcher {
	/// Queues a successful response carrying `body` as JSON.
	pub fn respond_json(self, body: serde_json::Value) -> Self {
		let bytes = serde_json::to_vec(&body).expect("Test JSON body should serialize.");

		self.script.lock().push_back(Ok(ApiResponse::new(http::StatusCode::OK, bytes)));

		self
	}

	/// Queues a failure with the provided HTTP status.
	pub fn fail_with(self, status: u16) -> Self {
		self.script.lock().push_back(Err(Error::Status { status, body: String::new() }));

		self
	}

	/// Snapshot of every request dispatched so far.
	pub fn requests(&self) -> Vec<ApiRequest> {
		self.requests.lock().clone()
	}

	/// `Authorization` header of every dispatched request, in call order.
	pub fn authorizations(&self) -> Vec<Option<String>> {
		self.requests.lock().iter().map(|r| r.authorization().map(str::to_owned)).collect()
	}

	/// Number of dispatch calls observed.
	pub fn calls(&self) -> usize {
		self.requests.lock().len()
	}
}
impl Dispatch for ScriptedDispatcher {
	fn dispatch(&self, request: ApiRequest) -> DispatchFuture<'_> {
		self.requests.lock().push(request);

		let outcome = self
			.script
			.lock()
			.pop_front()
			.unwrap_or_else(|| Ok(ApiResponse::new(http::StatusCode::OK, Vec::new())));

		Box::pin(async move { outcome })
	}
}

/// Scripted [`AuthEndpoint`] recording the refresh credentials it was called with.
#[derive(Debug)]
pub struct ScriptedAuthEndpoint {
	outcome: Result<RefreshedCredentials, u16>,
	calls: Mutex<Vec<String>>,
}
impl ScriptedAuthEndpoint {
	/// Refresh calls succeed with `access` and no rotated refresh credential.
	pub fn issuing(access: &str) -> Self {
		Self::scripted(Ok(RefreshedCredentials { access: TokenSecret::new(access), refresh: None }))
	}

	/// Refresh calls succeed with `access` and rotate the refresh credential to `refresh`.
	pub fn rotating(access: &str, refresh: &str) -> Self {
		Self::scripted(Ok(RefreshedCredentials {
			access: TokenSecret::new(access),
			refresh: Some(TokenSecret::new(refresh)),
		}))
	}

	/// Refresh calls fail with the provided HTTP status.
	pub fn rejecting(status: u16) -> Self {
		Self::scripted(Err(status))
	}

	/// Refresh credentials received so far, in call order.
	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().clone()
	}

	fn scripted(outcome: Result<RefreshedCredentials, u16>) -> Self {
		Self { outcome, calls: Mutex::new(Vec::new()) }
	}
}
impl AuthEndpoint for ScriptedAuthEndpoint {
	fn refresh<'a>(&'a self, refresh: &'a TokenSecret) -> AuthFuture<'a, RefreshedCredentials> {
		self.calls.lock().push(refresh.expose().to_owned());

		let outcome = self
			.outcome
			.clone()
			.map_err(|status| Error::Status { status, body: "refresh rejected".into() });

		Box::pin(async move { outcome })
	}
}

/// Builds an in-memory store holding the provided credentials under the default keys.
pub async fn store_with(access: Option<&str>, refresh: Option<&str>) -> Arc<MemoryStore> {
	let store = Arc::new(MemoryStore::default());

	if let Some(access) = access {
		store.set("access_token", TokenSecret::new(access)).await.expect("Seeding should work.");
	}
	if let Some(refresh) = refresh {
		store.set("refresh_token", TokenSecret::new(refresh)).await.expect("Seeding should work.");
	}

	store
}

/// Reads a credential back from the store as a plain string.
pub async fn stored(store: &MemoryStore, key: &str) -> Option<String> {
	store
		.get(key)
		.await
		.expect("Memory store reads should not fail.")
		.map(|secret| secret.expose().to_owned())
}

/// Parses a test URL.
pub fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse test URL.")
}

/// Builds a reqwest dispatcher that accepts the self-signed certificates produced by `httpmock`.
#[cfg(feature = "reqwest")]
pub fn test_dispatcher() -> Arc<ReqwestDispatcher> {
	let client = ReqwestClient::builder()
		.redirect(Policy::none())
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	Arc::new(ReqwestDispatcher::with_client(client))
}
