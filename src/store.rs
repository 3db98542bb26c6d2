//! Token store contract and built-in store implementations for session credentials.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Key/value holder for the session's access and refresh credentials.
///
/// Stores are injected wherever they are needed so tests can substitute an in-memory fake.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Fetches the credential stored under `key`, if present.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<TokenSecret>>;

	/// Persists or replaces the credential stored under `key`.
	fn set<'a>(&'a self, key: &'a str, value: TokenSecret) -> StoreFuture<'a, ()>;

	/// Deletes the credential stored under `key`; absent keys are not an error.
	fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;

	/// Atomically replaces the credential under `key` if it still equals `expected`.
	///
	/// `expected = None` matches an absent key.
	fn compare_and_swap<'a>(
		&'a self,
		key: &'a str,
		expected: Option<&'a str>,
		replacement: TokenSecret,
	) -> StoreFuture<'a, CompareAndSwapOutcome>;
}

/// Result of a compare-and-swap attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareAndSwapOutcome {
	/// The current value matched the expected value and was replaced.
	Updated,
	/// A different value is stored; nothing was written.
	Mismatch,
	/// A value was expected but the key is absent; nothing was written.
	Missing,
}
impl CompareAndSwapOutcome {
	/// Evaluates a swap of `current` against `expected`.
	pub fn evaluate(current: Option<&TokenSecret>, expected: Option<&str>) -> Self {
		match (current.map(TokenSecret::expose), expected) {
			(None, None) => Self::Updated,
			(Some(cur), Some(exp)) if cur == exp => Self::Updated,
			(None, Some(_)) => Self::Missing,
			_ => Self::Mismatch,
		}
	}
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
