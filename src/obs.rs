//! Optional observability helpers for guarded requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `session_guard.request` with the `stage`
//!   (pipeline step), `method`, `path`, and resolved `status` fields.
//! - Enable `metrics` to increment the `session_guard_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`, and `session_guard_lost_swap_total`
//!   whenever a refreshed credential yields to a concurrent store write.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Steps a guarded request passes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GuardStage {
	/// First dispatch carrying the stored access credential.
	Dispatch,
	/// Exchange of the refresh credential for a new access credential.
	Refresh,
	/// Single re-dispatch carrying the refreshed access credential.
	Retry,
}
impl GuardStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GuardStage::Dispatch => "dispatch",
			GuardStage::Refresh => "refresh",
			GuardStage::Retry => "retry",
		}
	}
}
impl Display for GuardStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}

	/// Maps a result onto its outcome label.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { StageOutcome::Success } else { StageOutcome::Failure }
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
