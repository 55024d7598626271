//! Optional observability helpers for client operations.
//!
//! # Feature Flags
//!
//! - `tracing` (default) emits structured spans named `parcel_quotes.op` with the `op` and
//!   `stage` fields, plus events for cache hits, token refreshes, and retried attempts.
//! - `metrics` increments the `parcel_quotes_op_total` counter for every outcome, labeled by
//!   `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Public quote lookup, cache included.
	GetQuotes,
	/// Retry-aware call to the quotes endpoint.
	FetchQuotes,
	/// Client-credentials exchange against the token endpoint.
	TokenRefresh,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::GetQuotes => "get_quotes",
			OpKind::FetchQuotes => "fetch_quotes",
			OpKind::TokenRefresh => "token_refresh",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Answered from the quote cache.
	CacheHit,
	/// Transient failure absorbed by another attempt.
	Retry,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
			OpOutcome::CacheHit => "cache_hit",
			OpOutcome::Retry => "retry",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
