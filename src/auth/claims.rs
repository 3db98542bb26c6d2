//! Unverified view of the claims carried by JWT-shaped access credentials.
//!
//! The signature is never checked; the API server remains the authority on validity. Claims are
//! only read to show who the session belongs to and when the credential lapses.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Errors raised while decoding access credential claims.
#[derive(Debug, ThisError)]
pub enum ClaimsError {
	/// Credential does not have the `header.payload.signature` shape.
	#[error("Credential is not a JWT.")]
	NotAJwt,
	/// Payload segment is not valid base64url.
	#[error("Credential payload is not valid base64url.")]
	Encoding(#[from] base64::DecodeError),
	/// Payload segment is not a JSON claims object.
	#[error("Credential payload is not a JSON claims object.")]
	Payload(#[from] serde_json::Error),
	/// `exp` claim is outside the representable range.
	#[error("Credential expiry is out of range.")]
	ExpiryOutOfRange,
}

/// Claims the API server embeds in access credentials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
	/// Expiry as a unix timestamp.
	#[serde(default)]
	pub exp: Option<i64>,
	/// Issued-at as a unix timestamp.
	#[serde(default)]
	pub iat: Option<i64>,
	/// Account the credential was issued for.
	#[serde(default)]
	pub company_id: Option<u64>,
	/// Account email.
	#[serde(default)]
	pub email: Option<String>,
}
impl AccessClaims {
	/// Decodes the payload segment of `secret`.
	pub fn decode(secret: &TokenSecret) -> Result<Self, ClaimsError> {
		let mut segments = secret.expose().split('.');
		let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
			(Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
			_ => return Err(ClaimsError::NotAJwt),
		};
		let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;

		Ok(serde_json::from_slice(&bytes)?)
	}

	/// Expiry instant, when the credential carries one.
	pub fn expires_at(&self) -> Result<Option<OffsetDateTime>, ClaimsError> {
		self.exp
			.map(|exp| {
				OffsetDateTime::from_unix_timestamp(exp).map_err(|_| ClaimsError::ExpiryOutOfRange)
			})
			.transpose()
	}

	/// Returns `true` if the credential has lapsed at `instant`.
	///
	/// Credentials without an `exp` claim never lapse locally.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.expires_at(), Ok(Some(expiry)) if instant >= expiry)
	}
}
