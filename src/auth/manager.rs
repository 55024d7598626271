//! Client-credentials token manager with proactive refresh and a singleflight guard.
//!
//! The manager keeps at most one [`AccessToken`]. Callers get the cached token without I/O
//! while it is valid (`now < expires_at - skew`); otherwise one caller performs the
//! `client_credentials` exchange while concurrent callers wait on the same guard and pick up
//! the freshly stored token instead of stampeding the token endpoint. The cached value is only
//! locked for reads and writes, never across the network call.

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	config::QuoteClientConfig,
	error::{AuthError, TransportError},
	http::{HttpTransport, ResponseMetadata, ResponseMetadataSlot, TokenHandle},
	obs::{self, OpKind, OpOutcome, OpSpan},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Owns the shared access token and refreshes it on demand.
pub struct TokenManager {
	oauth_client: ConfiguredBasicClient,
	skew: Duration,
	current: Mutex<Option<AccessToken>>,
	refresh_guard: AsyncMutex<()>,
}
impl TokenManager {
	/// Creates a manager that posts the client credentials in the form body.
	pub fn new(config: &QuoteClientConfig) -> Self {
		let oauth_client = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.clone()))
			.set_token_uri(TokenUrl::from_url(config.token_url.clone()))
			.set_auth_type(AuthType::RequestBody);

		Self {
			oauth_client,
			skew: config.token_skew,
			current: Mutex::new(None),
			refresh_guard: AsyncMutex::new(()),
		}
	}

	/// Returns a valid token, refreshing it through `transport` when stale.
	pub async fn token<T>(&self, transport: &T) -> Result<AccessToken>
	where
		T: ?Sized + HttpTransport,
	{
		if let Some(token) = self.cached(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let _singleflight = self.refresh_guard.lock().await;

		// Another caller may have refreshed while this one waited on the guard.
		if let Some(token) = self.cached(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let token = self.exchange(transport).await?;

		*self.current.lock() = Some(token.clone());

		Ok(token)
	}

	/// Returns the cached token if it is still valid at `now`.
	pub fn cached(&self, now: OffsetDateTime) -> Option<AccessToken> {
		self.current.lock().as_ref().filter(|token| token.is_valid_at(now, self.skew)).cloned()
	}

	/// Drops the cached token so the next call refreshes it.
	pub fn invalidate(&self) {
		self.current.lock().take();
	}

	async fn exchange<T>(&self, transport: &T) -> Result<AccessToken>
	where
		T: ?Sized + HttpTransport,
	{
		const KIND: OpKind = OpKind::TokenRefresh;

		let span = OpSpan::new(KIND, "client_credentials");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let meta = ResponseMetadataSlot::default();
				let handle = TokenHandle::new(transport, meta.clone());
				let response = self
					.oauth_client
					.exchange_client_credentials()
					.request_async(&handle)
					.await
					.map_err(|err| map_request_error(meta.take(), err))?;
				let expires_in =
					response.expires_in().ok_or(AuthError::MissingExpiresIn)?.as_secs();
				let expires_in =
					i64::try_from(expires_in).map_err(|_| AuthError::ExpiresInOutOfRange)?;

				if expires_in <= 0 {
					return Err(AuthError::ExpiresInOutOfRange.into());
				}

				let secret = response.access_token().secret();

				if secret.is_empty() {
					return Err(AuthError::EmptyAccessToken.into());
				}

				let expires_at = OffsetDateTime::now_utc()
					.checked_add(Duration::seconds(expires_in))
					.ok_or(AuthError::ExpiresInOutOfRange)?;

				obs::trace_token_refreshed(expires_at);

				Ok(AccessToken::new(secret.to_owned(), expires_at))
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}
}
impl Debug for TokenManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("skew", &self.skew)
			.field("cached", &self.current.lock().is_some())
			.finish()
	}
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<TransportError>>,
) -> Error {
	let status = meta.and_then(|value| value.status);
	let auth = match err {
		RequestTokenError::ServerResponse(response) => map_server_response(response, status),
		RequestTokenError::Request(HttpClientError::Reqwest(inner)) =>
			AuthError::Unreachable { source: *inner },
		RequestTokenError::Request(HttpClientError::Http(inner)) => AuthError::Request(inner),
		RequestTokenError::Request(HttpClientError::Io(inner)) =>
			AuthError::Unreachable { source: TransportError::Io(inner) },
		RequestTokenError::Request(other) => AuthError::Rejected {
			message: format!("HTTP client error occurred while calling the token endpoint: {other}"),
			status,
		},
		RequestTokenError::Parse(source, _body) => AuthError::MalformedResponse { source, status },
		RequestTokenError::Other(message) => AuthError::Rejected { message, status },
	};

	auth.into()
}

fn map_server_response(response: BasicErrorResponse, status: Option<u16>) -> AuthError {
	let message = match response.error_description() {
		Some(description) => format!("{}: {description}", response.error().as_ref()),
		None => response.error().as_ref().to_owned(),
	};

	AuthError::Rejected { message, status }
}
