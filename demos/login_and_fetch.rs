//! Demonstrates a session against a mock API: log in, let the guard recover from an expired access
//! token, then log out.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use session_guard::{
	descriptor::ApiDescriptor,
	http::ReqwestDispatcher,
	reqwest::{Client, redirect::Policy},
	session::Session,
	store::{MemoryStore, TokenStore},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/login");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "access": "demo-expired", "refresh": "demo-refresh" }));
		})
		.await;
	let expired_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/me").header("authorization", "Bearer demo-expired");
			then.status(401);
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh").json_body(json!({ "refresh": "demo-refresh" }));
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "access": "demo-fresh" }));
		})
		.await;
	let me_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/me").header("authorization", "Bearer demo-fresh");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "id": 1, "name": "Demo Co", "email": "demo@example.com" }));
		})
		.await;
	let descriptor = ApiDescriptor::builder(Url::parse(&server.url("/api/"))?).build()?;
	let dispatcher = ReqwestDispatcher::with_client(
		Client::builder()
			.redirect(Policy::none())
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let store = Arc::new(MemoryStore::default());
	let session = Session::with_dispatcher(store.clone(), descriptor, Arc::new(dispatcher));

	session.login("demo@example.com", "demo-password").await?;

	let profile = session.me().await?;

	println!("Signed in as {} <{}>.", profile.name, profile.email);
	println!("Refreshes performed: {}.", session.metrics().successes());

	session.logout().await?;

	println!("Session cleared: {}.", store.get("access_token").await?.is_none());

	login_mock.assert_async().await;
	expired_mock.assert_async().await;
	refresh_mock.assert_async().await;
	me_mock.assert_async().await;

	Ok(())
}
