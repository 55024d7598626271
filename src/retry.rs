//! Bounded retry policy and the classification of quote attempts.
//!
//! Every attempt ends in an [`AttemptOutcome`]. [`classify_response`] is the one place that
//! decides what is transient: timeouts, 5xx/408/429 statuses, and undecodable bodies are
//! retried; other network failures and statuses fail immediately. [`RetryPolicy::run`] then
//! loops over outcomes without any special cases of its own.

// crates.io
use serde::de::DeserializeOwned;
use tokio::time::Instant;
// self
use crate::{
	_prelude::*,
	error::{TransientError, TransportError},
	http::{HttpResponse, parse_retry_after},
	obs::{self, OpKind, OpOutcome},
};

/// Upper bound of response body bytes kept in error messages.
pub const MAX_ERROR_BODY_BYTES: usize = 4096;

/// Tagged result of a single attempt.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
	/// Attempt succeeded.
	Success(T),
	/// Attempt failed but another one may succeed.
	Retryable(Error),
	/// Attempt failed for good.
	Permanent(Error),
}
impl<T> AttemptOutcome<T> {
	/// Sorts an already-built error by its retryability.
	pub fn from_error(error: Error) -> Self {
		if error.is_retryable() { Self::Retryable(error) } else { Self::Permanent(error) }
	}
}

/// Fixed-backoff retry policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Total attempts, the first one included. Never zero.
	pub attempts: u32,
	/// Sleep between consecutive attempts.
	pub backoff: Duration,
}
impl RetryPolicy {
	/// Creates a policy; an attempt budget of zero is raised to one.
	pub fn new(attempts: u32, backoff: Duration) -> Self {
		Self { attempts: attempts.max(1), backoff }
	}

	/// Runs `attempt` until it succeeds, fails permanently, or the budget is spent.
	///
	/// `attempt` receives the 1-based attempt number. When `deadline` is set, each attempt is
	/// cut off at the deadline (which counts as a timeout). Once the deadline has elapsed, or
	/// would elapse during the backoff, the loop stops with [`Error::Cancelled`] instead of
	/// sleeping or retrying.
	pub async fn run<T, F, Fut>(&self, kind: OpKind, deadline: Option<Instant>, mut attempt: F) -> Result<T>
	where
		F: FnMut(u32) -> Fut,
		Fut: Future<Output = AttemptOutcome<T>>,
	{
		let mut number = 1;

		loop {
			if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
				return Err(Error::Cancelled);
			}

			let outcome = match deadline {
				Some(deadline) => tokio::time::timeout_at(deadline, attempt(number))
					.await
					.unwrap_or_else(|_| {
						AttemptOutcome::Retryable(TransientError::Timeout { source: None }.into())
					}),
				None => attempt(number).await,
			};
			let error = match outcome {
				AttemptOutcome::Success(value) => return Ok(value),
				AttemptOutcome::Permanent(error) => return Err(error),
				AttemptOutcome::Retryable(error) => error,
			};

			if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
				return Err(Error::Cancelled);
			}
			if number >= self.attempts {
				return Err(error);
			}

			let backoff = self.backoff.unsigned_abs();

			// A retry that could only start after the deadline is never attempted.
			if deadline.is_some_and(|deadline| Instant::now() + backoff >= deadline) {
				return Err(Error::Cancelled);
			}

			obs::record_op_outcome(kind, OpOutcome::Retry);
			obs::trace_retry(kind, number, &error);

			tokio::time::sleep(backoff).await;

			number += 1;
		}
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(
			crate::config::QuoteClientConfig::DEFAULT_RETRY_ATTEMPTS,
			crate::config::QuoteClientConfig::DEFAULT_RETRY_BACKOFF,
		)
	}
}

/// Returns `true` for statuses worth another attempt: 5xx, 408, and 429.
pub fn is_retryable_status(status: u16) -> bool {
	matches!(status, 408 | 429 | 500..=599)
}

/// Classifies the transport result of one quotes call.
pub fn classify_response<T>(result: Result<HttpResponse, TransportError>) -> AttemptOutcome<T>
where
	T: DeserializeOwned,
{
	let response = match result {
		Ok(response) => response,
		Err(error) if error.is_timeout() =>
			return AttemptOutcome::Retryable(TransientError::Timeout { source: Some(error) }.into()),
		Err(error) => return AttemptOutcome::Permanent(error.into()),
	};
	let status = response.status().as_u16();

	if !response.status().is_success() {
		let body = truncate_body(response.body());

		return if is_retryable_status(status) {
			AttemptOutcome::Retryable(
				TransientError::Status {
					status,
					body,
					retry_after: parse_retry_after(response.headers()),
				}
				.into(),
			)
		} else {
			AttemptOutcome::Permanent(Error::Rejected { status, body })
		};
	}

	let mut deserializer = serde_json::Deserializer::from_slice(response.body());

	match serde_path_to_error::deserialize(&mut deserializer) {
		Ok(value) => AttemptOutcome::Success(value),
		Err(source) => AttemptOutcome::Retryable(TransientError::Decode { source, status }.into()),
	}
}

/// Lossily decodes at most [`MAX_ERROR_BODY_BYTES`] of `body`, cutting on a char boundary.
pub fn truncate_body(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.len() <= MAX_ERROR_BODY_BYTES {
		return text.into_owned();
	}

	let mut end = MAX_ERROR_BODY_BYTES;

	while !text.is_char_boundary(end) {
		end -= 1;
	}

	text[..end].to_owned()
}
