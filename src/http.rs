//! Transport primitives shared by the token exchange and the quotes endpoint.
//!
//! [`HttpTransport`] is the client's only dependency on an HTTP stack. The default
//! [`ReqwestHttpClient`] wraps a pooled [`ReqwestClient`]; tests and embedders can inject any
//! other implementation through [`QuoteClient::with_transport`](crate::client::QuoteClient::with_transport).
//! Token exchanges run through the `oauth2` crate by way of [`TokenHandle`], which records
//! [`ResponseMetadata`] so authentication failures can be reported with the upstream status.

pub use oauth2;

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError};
use reqwest::{
	header::{HeaderMap, RETRY_AFTER},
	redirect::Policy,
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	config::QuoteClientConfig,
	error::{ConfigError, TransportError},
};

/// Outgoing request shape accepted by [`HttpTransport`].
pub type HttpRequest = oauth2::HttpRequest;
/// Buffered response shape returned by [`HttpTransport`].
pub type HttpResponse = oauth2::HttpResponse;
/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing buffered requests.
///
/// Implementations must report timeouts as [`TransportError::Timeout`] (or an IO error of
/// kind `TimedOut`) so the retry policy can tell them apart from permanent network failures.
/// Non-2xx statuses are not errors at this layer; they are returned as responses.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and buffers the full response body.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Captures metadata from the most recent HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the upstream, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Redirects are never followed: both the token and the quotes endpoints must answer
/// directly.
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a pooled client honoring the configured timeout and user agent.
	pub fn from_config(config: &QuoteClientConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(config.request_timeout.unsigned_abs())
			.user_agent(config.user_agent.as_str())
			.redirect(Policy::none())
			.build()?;

		Ok(Self(client))
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl HttpTransport for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let request: reqwest::Request = request.try_into().map_err(TransportError::request)?;
			let response = self.0.execute(request).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// [`AsyncHttpClient`] adapter that lets `oauth2` drive any [`HttpTransport`].
pub struct TokenHandle<'t, T>
where
	T: ?Sized + HttpTransport,
{
	transport: &'t T,
	slot: ResponseMetadataSlot,
}
impl<'t, T> TokenHandle<'t, T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a handle that records response metadata in `slot`.
	pub fn new(transport: &'t T, slot: ResponseMetadataSlot) -> Self {
		Self { transport, slot }
	}
}
impl<'c, T> AsyncHttpClient<'c> for TokenHandle<'_, T>
where
	T: ?Sized + HttpTransport,
{
	type Error = HttpClientError<TransportError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.slot.take();

			let response = self
				.transport
				.execute(request)
				.await
				.map_err(|e| HttpClientError::Reqwest(Box::new(e)))?;

			self.slot.store(ResponseMetadata {
				status: Some(response.status().as_u16()),
				retry_after: parse_retry_after(response.headers()),
			});

			Ok(response)
		})
	}
}

/// Reads a `Retry-After` header given either as delta-seconds or as an HTTP date.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return i64::try_from(secs).ok().map(Duration::seconds);
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
