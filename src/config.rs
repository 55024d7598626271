//! Immutable client configuration and its validating builder.

mod builder;

pub use builder::*;

// self
use crate::_prelude::*;

/// Validated settings consumed by [`QuoteClient`](crate::client::QuoteClient).
///
/// Values are produced by [`QuoteClientConfigBuilder::build`], which rejects missing
/// credentials or endpoints up front so runtime calls never fail on configuration.
#[derive(Clone)]
pub struct QuoteClientConfig {
	/// Base URL of the quotes API; the quotes path is appended to it.
	pub base_url: Url,
	/// OAuth 2.0 token endpoint.
	pub token_url: Url,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: String,
	/// Path of the quotes endpoint relative to the base URL.
	pub quotes_path: String,
	/// Value sent in the `User-Agent` header.
	pub user_agent: String,
	/// Optional service filter forwarded to the upstream (e.g. `"1,2,17"`).
	pub services: String,
	/// Per-request HTTP timeout.
	pub request_timeout: Duration,
	/// Freshness window of cached quote results.
	pub cache_ttl: Duration,
	/// Total attempts per quote fetch, including the first one.
	pub retry_attempts: u32,
	/// Fixed sleep between attempts.
	pub retry_backoff: Duration,
	/// Tokens are treated as stale this long before they actually expire.
	pub token_skew: Duration,
}
impl QuoteClientConfig {
	/// Default quotes path.
	pub const DEFAULT_QUOTES_PATH: &'static str = "/quotes";
	/// Default `User-Agent` header value.
	pub const DEFAULT_USER_AGENT: &'static str = concat!("parcel-quotes/", env!("CARGO_PKG_VERSION"));
	/// Default per-request HTTP timeout.
	pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(15);
	/// Default cache TTL.
	pub const DEFAULT_CACHE_TTL: Duration = Duration::seconds(60);
	/// Longest accepted cache TTL.
	pub const MAX_CACHE_TTL: Duration = Duration::days(30);
	/// Default attempt budget (one try plus one retry).
	pub const DEFAULT_RETRY_ATTEMPTS: u32 = 2;
	/// Default fixed backoff between attempts.
	pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::milliseconds(300);
	/// Default token expiry skew.
	pub const DEFAULT_TOKEN_SKEW: Duration = Duration::seconds(30);

	/// Returns a builder seeded with defaults.
	pub fn builder() -> QuoteClientConfigBuilder {
		QuoteClientConfigBuilder::default()
	}

	/// Full URL of the quotes endpoint.
	pub fn quotes_url(&self) -> Url {
		let mut url = self.base_url.clone();
		let base_path = url.path().trim_end_matches('/');
		let path = format!("{base_path}/{}", self.quotes_path.trim_start_matches('/'));

		url.set_path(&path);

		url
	}
}
impl Debug for QuoteClientConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("QuoteClientConfig")
			.field("base_url", &self.base_url.as_str())
			.field("token_url", &self.token_url.as_str())
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("quotes_path", &self.quotes_path)
			.field("user_agent", &self.user_agent)
			.field("services", &self.services)
			.field("request_timeout", &self.request_timeout)
			.field("cache_ttl", &self.cache_ttl)
			.field("retry_attempts", &self.retry_attempts)
			.field("retry_backoff", &self.retry_backoff)
			.field("token_skew", &self.token_skew)
			.finish()
	}
}
