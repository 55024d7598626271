//! Public quote client composing the request builder, cache, token manager, and transport.

mod fetch;

// crates.io
use tokio::time::Instant;
// self
use crate::{
	_prelude::*,
	auth::TokenManager,
	cache::QuoteCache,
	config::QuoteClientConfig,
	http::{HttpTransport, ReqwestHttpClient},
	obs::{self, OpKind, OpOutcome, OpSpan},
	quote::{QuoteQuery, QuoteRequest, ShippingOption, map_quotes},
	retry::RetryPolicy,
};

/// Resilient client for the upstream quotes API.
///
/// The client owns the transport, the shared access token, and the quote cache; clones share
/// all three, so one instance can serve any number of concurrent callers.
pub struct QuoteClient<T = ReqwestHttpClient>
where
	T: ?Sized + HttpTransport,
{
	/// Validated configuration.
	pub config: Arc<QuoteClientConfig>,
	/// Transport used for both the token and the quotes endpoints.
	pub transport: Arc<T>,
	/// Shared access token manager.
	pub tokens: Arc<TokenManager>,
	/// Shared quote cache.
	pub cache: Arc<QuoteCache>,
	retry: RetryPolicy,
}
impl QuoteClient<ReqwestHttpClient> {
	/// Creates a client backed by a pooled reqwest transport built from `config`.
	pub fn new(config: QuoteClientConfig) -> Result<Self> {
		let transport = ReqwestHttpClient::from_config(&config)?;

		Ok(Self::with_transport(config, transport))
	}
}
impl<T> QuoteClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(config: QuoteClientConfig, transport: impl Into<Arc<T>>) -> Self {
		let tokens = TokenManager::new(&config);
		let cache = QuoteCache::new(config.cache_ttl);
		let retry = RetryPolicy::new(config.retry_attempts, config.retry_backoff);

		Self {
			config: Arc::new(config),
			transport: transport.into(),
			tokens: Arc::new(tokens),
			cache: Arc::new(cache),
			retry,
		}
	}

	/// Returns filtered shipping options for `query`, serving repeated lookups from cache.
	///
	/// Failures are never cached, so a later call retries the upstream.
	pub async fn get_quotes(&self, query: &QuoteQuery) -> Result<Vec<ShippingOption>> {
		const KIND: OpKind = OpKind::GetQuotes;

		let span = OpSpan::new(KIND, "get_quotes");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = QuoteRequest::build(
					&query.origin,
					&query.destination,
					&query.parcels,
					query.insured_value,
					&self.config.services,
				);
				let fingerprint = request.fingerprint();

				if let Some(cached) = self.cache.get(&fingerprint) {
					obs::record_op_outcome(KIND, OpOutcome::CacheHit);
					obs::trace_cache_hit(&fingerprint);

					return Ok(cached);
				}

				let deadline = query.deadline.map(|budget| Instant::now() + budget.unsigned_abs());
				let items = self.fetch_quotes(&request, deadline).await?;
				let options = map_quotes(items);

				self.cache.set(fingerprint, options.clone());

				Ok(options)
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	/// Retry policy derived from the configuration.
	pub fn retry_policy(&self) -> RetryPolicy {
		self.retry
	}
}
impl<T> Clone for QuoteClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			transport: self.transport.clone(),
			tokens: self.tokens.clone(),
			cache: self.cache.clone(),
			retry: self.retry,
		}
	}
}
impl<T> Debug for QuoteClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("QuoteClient")
			.field("config", &self.config)
			.field("tokens", &self.tokens)
			.field("cached_entries", &self.cache.len())
			.field("retry", &self.retry)
			.finish()
	}
}
