//! Retry-aware call to the quotes endpoint.

// crates.io
use oauth2::http::{
	Method, Request,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
};
use tokio::time::Instant;
// self
use crate::{
	_prelude::*,
	client::QuoteClient,
	error::TransportError,
	http::HttpTransport,
	obs::{self, OpKind, OpOutcome, OpSpan},
	quote::{ProviderQuote, QuoteRequest},
	retry::{self, AttemptOutcome},
};

const JSON: &str = "application/json";

impl<T> QuoteClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Posts `request` to the quotes endpoint under the configured retry policy.
	///
	/// A token is requested from the manager before every attempt, so one that went stale
	/// between attempts is refreshed. Only the final outcome is returned.
	pub async fn fetch_quotes(
		&self,
		request: &QuoteRequest,
		deadline: Option<Instant>,
	) -> Result<Vec<ProviderQuote>> {
		const KIND: OpKind = OpKind::FetchQuotes;

		let span = OpSpan::new(KIND, "fetch_quotes");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let body = serde_json::to_vec(request).map_err(TransportError::request)?;
				let url = self.config.quotes_url();
				let url = url.as_str();
				let body = body.as_slice();

				self.retry.run(KIND, deadline, |_| self.attempt(url, body.to_vec())).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	async fn attempt(&self, url: &str, body: Vec<u8>) -> AttemptOutcome<Vec<ProviderQuote>> {
		let token = match self.tokens.token(self.transport.as_ref()).await {
			Ok(token) => token,
			Err(error) => return AttemptOutcome::from_error(error),
		};
		let request = match Request::builder()
			.method(Method::POST)
			.uri(url)
			.header(AUTHORIZATION, token.bearer())
			.header(USER_AGENT, self.config.user_agent.as_str())
			.header(ACCEPT, JSON)
			.header(CONTENT_TYPE, JSON)
			.body(body)
		{
			Ok(request) => request,
			Err(error) => return AttemptOutcome::Permanent(TransportError::request(error).into()),
		};
		let outcome = retry::classify_response(self.transport.execute(request).await);

		// The upstream no longer accepts this token; drop it so the next call refreshes.
		if matches!(outcome, AttemptOutcome::Permanent(Error::Rejected { status: 401, .. })) {
			self.tokens.invalidate();
		}

		outcome
	}
}
