// self
use crate::{_prelude::*, obs::OpKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("parcel_quotes.op", op = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
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

/// Logs a transient failure that is about to be retried.
pub fn trace_retry(kind: OpKind, attempt: u32, error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(op = kind.as_str(), attempt, error = %error, "Retrying after transient failure.");
	#[cfg(not(feature = "tracing"))]
	let _ = (kind, attempt, error);
}

/// Logs a quote cache hit.
pub fn trace_cache_hit(fingerprint: &str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(fingerprint, "Serving quotes from cache.");
	#[cfg(not(feature = "tracing"))]
	let _ = fingerprint;
}

/// Logs a completed token refresh; the secret itself is never logged.
pub fn trace_token_refreshed(expires_at: OffsetDateTime) {
	#[cfg(feature = "tracing")]
	tracing::debug!(%expires_at, "Access token refreshed.");
	#[cfg(not(feature = "tracing"))]
	let _ = expires_at;
}
