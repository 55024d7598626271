#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	sync::atomic::{AtomicUsize, Ordering},
};
// crates.io
use parking_lot::Mutex;
use time::Duration;
use url::Url;
// self
use parcel_quotes::{
	client::QuoteClient,
	config::{QuoteClientConfig, QuoteClientConfigBuilder},
	error::TransportError,
	http::{
		HttpRequest, HttpResponse, HttpTransport, TransportFuture,
		oauth2::http::{StatusCode, header::CONTENT_TYPE},
	},
	quote::{Parcel, QuoteQuery},
};

pub const TOKEN_PATH: &str = "/oauth/token";
pub const QUOTES_PATH: &str = "/quotes";
pub const SEDEX_BODY: &str = r#"[
	{"id":1,"name":"SEDEX","price":24.90,"delivery_time":2,"has_error":false,"company":{"name":"Correios"}},
	{"id":2,"name":"PAC","price":0,"has_error":true}
]"#;

pub fn config_builder(base: &str) -> QuoteClientConfigBuilder {
	let base_url = Url::parse(base).expect("Test base URL should parse.");
	let token_url = base_url.join(TOKEN_PATH).expect("Test token URL should join.");

	QuoteClientConfig::builder()
		.base_url(base_url)
		.token_url(token_url)
		.client_id("quotes-client")
		.client_secret("quotes-secret")
		.retry_backoff(Duration::milliseconds(10))
}

pub fn sedex_query() -> QuoteQuery {
	QuoteQuery::new("01310-100", "20040-020", vec![Parcel::new(1.2, 10., 15., 20.)], 0.)
}

pub fn json_response(status: u16, body: &str) -> HttpResponse {
	let mut response = HttpResponse::new(body.as_bytes().to_vec());

	*response.status_mut() = StatusCode::from_u16(status).expect("Fixture status should be valid.");
	response.headers_mut().insert(
		CONTENT_TYPE,
		"application/json".parse().expect("Content type header should parse."),
	);

	response
}

/// Scripted reply to one quotes call.
pub enum Step {
	Respond(u16, &'static str),
	Timeout,
	Refused,
	Hang(std::time::Duration),
}

/// Fake transport that answers token requests itself and replays a script for quote calls.
pub struct ScriptedTransport {
	script: Mutex<VecDeque<Step>>,
	token_calls: AtomicUsize,
	quote_calls: AtomicUsize,
	token_expires_in: u64,
	token_delay: std::time::Duration,
	authorizations: Mutex<Vec<String>>,
}
impl ScriptedTransport {
	pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
		Self {
			script: Mutex::new(steps.into_iter().collect()),
			token_calls: AtomicUsize::new(0),
			quote_calls: AtomicUsize::new(0),
			token_expires_in: 3600,
			token_delay: std::time::Duration::ZERO,
			authorizations: Mutex::new(Vec::new()),
		}
	}

	pub fn with_token_expires_in(mut self, seconds: u64) -> Self {
		self.token_expires_in = seconds;

		self
	}

	pub fn with_token_delay(mut self, delay: std::time::Duration) -> Self {
		self.token_delay = delay;

		self
	}

	pub fn push(&self, step: Step) {
		self.script.lock().push_back(step);
	}

	pub fn token_calls(&self) -> usize {
		self.token_calls.load(Ordering::SeqCst)
	}

	pub fn quote_calls(&self) -> usize {
		self.quote_calls.load(Ordering::SeqCst)
	}

	pub fn authorizations(&self) -> Vec<String> {
		self.authorizations.lock().clone()
	}
}
impl HttpTransport for ScriptedTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			if request.uri().path() == TOKEN_PATH {
				let call = self.token_calls.fetch_add(1, Ordering::SeqCst) + 1;

				if !self.token_delay.is_zero() {
					tokio::time::sleep(self.token_delay).await;
				}

				let body = format!(
					"{{\"access_token\":\"token-{call}\",\"token_type\":\"bearer\",\"expires_in\":{}}}",
					self.token_expires_in
				);

				return Ok(json_response(200, &body));
			}

			self.quote_calls.fetch_add(1, Ordering::SeqCst);

			if let Some(value) = request.headers().get("authorization") {
				self.authorizations
					.lock()
					.push(value.to_str().expect("Authorization header should be ASCII.").to_owned());
			}

			let step = self.script.lock().pop_front();

			match step {
				Some(Step::Respond(status, body)) => Ok(json_response(status, body)),
				Some(Step::Timeout) => Err(TransportError::timeout(std::io::Error::new(
					std::io::ErrorKind::TimedOut,
					"operation timed out",
				))),
				Some(Step::Refused) =>
					Err(TransportError::network(std::io::Error::other("connection refused"))),
				Some(Step::Hang(duration)) => {
					tokio::time::sleep(duration).await;

					Ok(json_response(200, "[]"))
				},
				None => Ok(json_response(500, "script exhausted")),
			}
		})
	}
}

pub fn scripted_client(transport: ScriptedTransport) -> QuoteClient<ScriptedTransport> {
	scripted_client_with(config_builder("https://api.example.com"), transport)
}

pub fn scripted_client_with(
	builder: QuoteClientConfigBuilder,
	transport: ScriptedTransport,
) -> QuoteClient<ScriptedTransport> {
	let config = builder.build().expect("Test config should build.");

	QuoteClient::with_transport(config, transport)
}
