// self
use crate::obs::{GuardStage, StageOutcome};

/// Increments `session_guard_stage_total{stage, outcome}` (when enabled).
pub fn record_stage_outcome(stage: GuardStage, outcome: StageOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"session_guard_stage_total",
		"stage" => stage.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (stage, outcome);
}

/// Increments `session_guard_lost_swap_total` when a refreshed credential was not stored because
/// the store changed during the refresh call.
pub fn record_lost_swap() {
	#[cfg(feature = "metrics")]
	metrics::counter!("session_guard_lost_swap_total").increment(1);
}
