//! Credential kinds, store keys, and the payloads exchanged with the auth endpoint.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// The two credentials a session holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialKind {
	/// Short-lived bearer token attached to API requests.
	Access,
	/// Longer-lived token exchanged for a new access credential.
	Refresh,
}
impl CredentialKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialKind::Access => "access",
			CredentialKind::Refresh => "refresh",
		}
	}
}
impl Display for CredentialKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Store keys under which the session credentials are persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialKeys {
	/// Key holding the access credential.
	pub access: String,
	/// Key holding the refresh credential.
	pub refresh: String,
}
impl CredentialKeys {
	/// Default key for the access credential.
	pub const ACCESS: &str = "access_token";
	/// Default key for the refresh credential.
	pub const REFRESH: &str = "refresh_token";

	/// Returns the key for the provided credential kind.
	pub fn key(&self, kind: CredentialKind) -> &str {
		match kind {
			CredentialKind::Access => &self.access,
			CredentialKind::Refresh => &self.refresh,
		}
	}
}
impl Default for CredentialKeys {
	fn default() -> Self {
		Self { access: Self::ACCESS.into(), refresh: Self::REFRESH.into() }
	}
}

/// Credentials issued by a successful login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
	/// Access credential.
	pub access: TokenSecret,
	/// Refresh credential.
	pub refresh: TokenSecret,
}

/// Credentials returned by the refresh operation.
///
/// A `refresh` value means the endpoint rotated the refresh credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshedCredentials {
	/// Newly minted access credential.
	pub access: TokenSecret,
	/// Rotated refresh credential, if the endpoint issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh: Option<TokenSecret>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_keys_match_the_conventional_names() {
		let keys = CredentialKeys::default();

		assert_eq!(keys.key(CredentialKind::Access), "access_token");
		assert_eq!(keys.key(CredentialKind::Refresh), "refresh_token");
	}

	#[test]
	fn refresh_response_without_rotation_decodes() {
		let refreshed: RefreshedCredentials = serde_json::from_str(r#"{"access":"tok-b"}"#)
			.expect("Refresh response without a refresh field should decode.");

		assert_eq!(refreshed.access.expose(), "tok-b");
		assert!(refreshed.refresh.is_none());

		let rotated: RefreshedCredentials =
			serde_json::from_str(r#"{"access":"tok-b","refresh":"tok-r2"}"#)
				.expect("Rotating refresh response should decode.");

		assert_eq!(rotated.refresh.as_ref().map(TokenSecret::expose), Some("tok-r2"));
	}
}
