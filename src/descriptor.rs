//! API descriptor: where the auth routes live, which store keys hold the session, and which requests
//! travel without a credential.
//!
//! Login and registration calls are exempt from credential attachment by default; call
//! [`ApiDescriptorBuilder::attach_to_auth_routes`] to opt back into guarding every route.

/// Builder API for assembling API descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::CredentialKeys};

/// Auth endpoint routes, relative to the descriptor's base URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRoutes {
	/// Exchanges email + password for a credential pair.
	pub login: String,
	/// Creates a new account.
	pub register: String,
	/// Exchanges a refresh credential for a new access credential.
	pub refresh: String,
	/// Returns the authenticated account profile.
	pub me: String,
}
impl Default for AuthRoutes {
	fn default() -> Self {
		Self {
			login: "auth/login".into(),
			register: "auth/register".into(),
			refresh: "auth/refresh".into(),
			me: "auth/me".into(),
		}
	}
}

/// Immutable, validated API descriptor.
///
/// Deserializing runs the same validation as [`ApiDescriptorBuilder::build`]: the base URL is
/// normalized to end with `/`, plain HTTP is limited to loopback hosts, and every route must
/// resolve. Stored `exempt_paths` are kept as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ApiDescriptor {
	/// Base URL every route is joined onto; always ends with `/`.
	pub base_url: Url,
	/// Auth endpoint routes.
	pub routes: AuthRoutes,
	/// Store keys for the session credentials.
	pub keys: CredentialKeys,
	/// Absolute request paths that never carry a credential and are never retried.
	pub exempt_paths: Vec<String>,
}
impl ApiDescriptor {
	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> ApiDescriptorBuilder {
		ApiDescriptorBuilder::new(base_url)
	}

	/// Resolves `route` against the base URL.
	pub fn endpoint(&self, route: &str) -> Result<Url, DescriptorError> {
		self.base_url
			.join(route.trim_start_matches('/'))
			.map_err(|source| DescriptorError::InvalidRoute { route: route.to_owned(), source })
	}

	/// Login endpoint URL.
	pub fn login_url(&self) -> Result<Url, DescriptorError> {
		self.endpoint(&self.routes.login)
	}

	/// Registration endpoint URL.
	pub fn register_url(&self) -> Result<Url, DescriptorError> {
		self.endpoint(&self.routes.register)
	}

	/// Refresh endpoint URL.
	pub fn refresh_url(&self) -> Result<Url, DescriptorError> {
		self.endpoint(&self.routes.refresh)
	}

	/// Profile endpoint URL.
	pub fn me_url(&self) -> Result<Url, DescriptorError> {
		self.endpoint(&self.routes.me)
	}

	/// Returns `true` when `url` targets an exempt route on this API's origin.
	pub fn is_exempt(&self, url: &Url) -> bool {
		if url.origin() != self.base_url.origin() {
			return false;
		}

		let path = normalize_path(url.path());

		self.exempt_paths.iter().any(|exempt| normalize_path(exempt) == path)
	}
}

impl<'de> Deserialize<'de> for ApiDescriptor {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		#[derive(Deserialize)]
		struct Stored {
			base_url: Url,
			#[serde(default)]
			routes: AuthRoutes,
			#[serde(default)]
			keys: CredentialKeys,
			#[serde(default)]
			exempt_paths: Vec<String>,
		}

		let stored = Stored::deserialize(deserializer)?;
		let mut descriptor = ApiDescriptorBuilder::new(stored.base_url)
			.routes(stored.routes)
			.credential_keys(stored.keys)
			.attach_to_auth_routes()
			.build()
			.map_err(serde::de::Error::custom)?;

		descriptor.exempt_paths = stored.exempt_paths;

		Ok(descriptor)
	}
}

fn normalize_path(path: &str) -> &str {
	match path.trim_end_matches('/') {
		"" => "/",
		trimmed => trimmed,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn descriptor() -> ApiDescriptor {
		ApiDescriptor::builder(Url::parse("https://api.example.com/api").expect("URL should parse."))
			.build()
			.expect("Default descriptor should build.")
	}

	#[test]
	fn routes_join_under_the_base_path() {
		let descriptor = descriptor();

		assert_eq!(descriptor.base_url.as_str(), "https://api.example.com/api/");
		assert_eq!(
			descriptor.login_url().expect("Login route should join.").as_str(),
			"https://api.example.com/api/auth/login",
		);
		assert_eq!(
			descriptor.endpoint("/documents/").expect("Leading slashes should be ignored.").as_str(),
			"https://api.example.com/api/documents/",
		);
	}

	#[test]
	fn deserialization_validates_like_the_builder() {
		let descriptor: ApiDescriptor = serde_json::from_str(
			r#"{"base_url":"https://api.example.com/api","exempt_paths":["/api/auth/login"]}"#,
		)
		.expect("Stored descriptor should deserialize.");

		assert_eq!(descriptor.base_url.as_str(), "https://api.example.com/api/");
		assert_eq!(
			descriptor.me_url().expect("Profile route should join.").as_str(),
			"https://api.example.com/api/auth/me",
		);
		assert_eq!(descriptor.exempt_paths, vec!["/api/auth/login".to_owned()]);

		let round_trip: ApiDescriptor = serde_json::from_value(
			serde_json::to_value(self::descriptor()).expect("Descriptor should serialize."),
		)
		.expect("Serialized descriptor should deserialize.");

		assert_eq!(round_trip, self::descriptor());

		let insecure = serde_json::from_str::<ApiDescriptor>(r#"{"base_url":"http://api.example.com/"}"#)
			.expect_err("Plain HTTP on public hosts should be rejected.");

		assert!(insecure.to_string().contains("HTTPS"));

		serde_json::from_str::<ApiDescriptor>(
			r#"{"base_url":"https://api.example.com/","keys":{"access":"k","refresh":"k"}}"#,
		)
		.expect_err("Identical credential keys should be rejected.");
	}

	#[test]
	fn exemption_matches_path_and_origin() {
		let descriptor = descriptor();
		let login = Url::parse("https://api.example.com/api/auth/login/").expect("URL should parse.");
		let other_origin =
			Url::parse("https://evil.example.com/api/auth/login").expect("URL should parse.");
		let documents =
			Url::parse("https://api.example.com/api/documents").expect("URL should parse.");
		let refresh =
			Url::parse("https://api.example.com/api/auth/refresh").expect("URL should parse.");

		assert!(descriptor.is_exempt(&login));
		assert!(!descriptor.is_exempt(&other_origin));
		assert!(!descriptor.is_exempt(&documents));
		assert!(!descriptor.is_exempt(&refresh));
	}
}
