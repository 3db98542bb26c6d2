// self
use crate::{
	_prelude::*,
	http::{ApiRequest, ApiResponse},
	obs::GuardStage,
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedStage<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStage<F> = F;

/// Span covering one dispatch of a guarded request.
///
/// Fields: `stage`, `method`, `path`, and `status` once the dispatch resolved. Query strings are
/// never recorded.
#[derive(Clone, Debug)]
pub struct GuardSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl GuardSpan {
	/// Opens a span for `request` at `stage`.
	pub fn new(stage: GuardStage, request: &ApiRequest) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"session_guard.request",
				stage = stage.as_str(),
				method = request.method.as_str(),
				path = request.path(),
				status = tracing::field::Empty,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, request);

			Self {}
		}
	}

	/// Records the HTTP status the dispatch resolved to, when one is known.
	pub fn record_result(&self, result: &Result<ApiResponse>) {
		let status = match result {
			Ok(response) => Some(response.status.as_u16()),
			Err(err) => err.status(),
		};

		#[cfg(feature = "tracing")]
		if let Some(status) = status {
			self.span.record("status", status);
		}
		#[cfg(not(feature = "tracing"))]
		let _ = status;
	}

	/// Instruments a dispatch future without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStage<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}
