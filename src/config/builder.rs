// self
use crate::{_prelude::*, config::QuoteClientConfig, error::ConfigError};

/// Builder for [`QuoteClientConfig`] values.
#[derive(Clone, Debug, Default)]
pub struct QuoteClientConfigBuilder {
	base_url: Option<Url>,
	token_url: Option<Url>,
	client_id: Option<String>,
	client_secret: Option<String>,
	quotes_path: Option<String>,
	user_agent: Option<String>,
	services: Option<String>,
	request_timeout: Option<Duration>,
	cache_ttl: Option<Duration>,
	retry_attempts: Option<u32>,
	retry_backoff: Option<Duration>,
	token_skew: Option<Duration>,
}
impl QuoteClientConfigBuilder {
	/// Sets the base URL of the quotes API.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Sets the OAuth 2.0 token endpoint.
	pub fn token_url(mut self, url: Url) -> Self {
		self.token_url = Some(url);

		self
	}

	/// Sets the OAuth 2.0 client identifier.
	pub fn client_id(mut self, id: impl Into<String>) -> Self {
		self.client_id = Some(id.into());

		self
	}

	/// Sets the OAuth 2.0 client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Overrides the quotes path (defaults to `/quotes`).
	pub fn quotes_path(mut self, path: impl Into<String>) -> Self {
		self.quotes_path = Some(path.into());

		self
	}

	/// Overrides the `User-Agent` header.
	pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
		self.user_agent = Some(agent.into());

		self
	}

	/// Restricts quotes to the given upstream service identifiers.
	pub fn services(mut self, services: impl Into<String>) -> Self {
		self.services = Some(services.into());

		self
	}

	/// Overrides the per-request HTTP timeout (defaults to 15 seconds).
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Overrides the cache TTL (defaults to 60 seconds).
	pub fn cache_ttl(mut self, ttl: Duration) -> Self {
		self.cache_ttl = Some(ttl);

		self
	}

	/// Overrides the attempt budget (defaults to 2).
	pub fn retry_attempts(mut self, attempts: u32) -> Self {
		self.retry_attempts = Some(attempts);

		self
	}

	/// Overrides the fixed backoff between attempts (defaults to 300 milliseconds).
	pub fn retry_backoff(mut self, backoff: Duration) -> Self {
		self.retry_backoff = Some(backoff);

		self
	}

	/// Overrides the token expiry skew (defaults to 30 seconds).
	pub fn token_skew(mut self, skew: Duration) -> Self {
		self.token_skew = Some(skew);

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<QuoteClientConfig, ConfigError> {
		let base_url = self.base_url.ok_or(ConfigError::MissingField { field: "base_url" })?;
		let token_url = self.token_url.ok_or(ConfigError::MissingField { field: "token_url" })?;
		let client_id = required("client_id", self.client_id)?;
		let client_secret = required("client_secret", self.client_secret)?;
		let config = QuoteClientConfig {
			base_url,
			token_url,
			client_id,
			client_secret,
			quotes_path: self
				.quotes_path
				.unwrap_or_else(|| QuoteClientConfig::DEFAULT_QUOTES_PATH.into()),
			user_agent: self
				.user_agent
				.unwrap_or_else(|| QuoteClientConfig::DEFAULT_USER_AGENT.into()),
			services: self.services.map(|s| s.trim().to_owned()).unwrap_or_default(),
			request_timeout: self
				.request_timeout
				.unwrap_or(QuoteClientConfig::DEFAULT_REQUEST_TIMEOUT),
			cache_ttl: self.cache_ttl.unwrap_or(QuoteClientConfig::DEFAULT_CACHE_TTL),
			retry_attempts: self.retry_attempts.unwrap_or(QuoteClientConfig::DEFAULT_RETRY_ATTEMPTS),
			retry_backoff: self.retry_backoff.unwrap_or(QuoteClientConfig::DEFAULT_RETRY_BACKOFF),
			token_skew: self.token_skew.unwrap_or(QuoteClientConfig::DEFAULT_TOKEN_SKEW),
		};

		config.validate()?;

		Ok(config)
	}
}

impl QuoteClientConfig {
	/// Validates invariants for the config.
	fn validate(&self) -> Result<(), ConfigError> {
		validate_endpoint("base", &self.base_url)?;
		validate_endpoint("token", &self.token_url)?;

		if self.retry_attempts == 0 {
			return Err(ConfigError::OutOfRange {
				field: "retry_attempts",
				reason: "at least one attempt is required",
			});
		}
		if !self.request_timeout.is_positive() {
			return Err(ConfigError::OutOfRange {
				field: "request_timeout",
				reason: "must be positive",
			});
		}

		validate_non_negative("cache_ttl", self.cache_ttl)?;

		if self.cache_ttl > Self::MAX_CACHE_TTL {
			return Err(ConfigError::OutOfRange {
				field: "cache_ttl",
				reason: "must not exceed 30 days",
			});
		}

		validate_non_negative("retry_backoff", self.retry_backoff)?;
		validate_non_negative("token_skew", self.token_skew)?;

		Ok(())
	}
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
	match value {
		Some(value) if !value.trim().is_empty() => Ok(value),
		_ => Err(ConfigError::MissingField { field }),
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	if matches!(url.scheme(), "http" | "https") && url.has_host() {
		Ok(())
	} else {
		Err(ConfigError::InvalidUrl { field: name, url: url.to_string() })
	}
}

fn validate_non_negative(field: &'static str, value: Duration) -> Result<(), ConfigError> {
	if value.is_negative() {
		Err(ConfigError::OutOfRange { field, reason: "must not be negative" })
	} else {
		Ok(())
	}
}
