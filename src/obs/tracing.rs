// self
use crate::{_prelude::*, config::Endpoint, obs::Operation};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// A span builder used by adapter operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a span for `operation` against `endpoint`; `stage` names the calling entry point.
	pub fn new(operation: Operation, endpoint: Endpoint, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"cidaas_oauth2.operation",
				operation = operation.as_str(),
				endpoint = endpoint.as_str(),
				stage
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, endpoint, stage);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> OperationSpanGuard {
		#[cfg(feature = "tracing")]
		{
			OperationSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			OperationSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
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

/// RAII guard returned by [`OperationSpan::entered`].
pub struct OperationSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for OperationSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OperationSpanGuard(..)")
	}
}
