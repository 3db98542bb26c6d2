//! Credential model: redacted secrets, store keys, and auth endpoint payloads.

pub mod claims;
pub mod credentials;
pub mod secret;

pub use claims::*;
pub use credentials::*;
pub use secret::*;
