// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for refresh-and-retry cycles.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	retries: AtomicU64,
	lost_swaps: AtomicU64,
}
impl RefreshMetrics {
	/// Returns the number of refresh calls made against the auth endpoint.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh calls that produced a new access credential.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed refresh calls.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of requests re-dispatched after a `401`, including those that reused a
	/// concurrently refreshed credential.
	pub fn retries(&self) -> u64 {
		self.retries.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshed credentials that were not stored because another writer
	/// replaced the access credential first.
	pub fn lost_swaps(&self) -> u64 {
		self.lost_swaps.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_retry(&self) {
		self.retries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_lost_swap(&self) {
		self.lost_swaps.fetch_add(1, Ordering::Relaxed);
	}
}
