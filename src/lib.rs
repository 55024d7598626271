//! Resilient shipping-quote client: OAuth 2.0 client-credentials auth with transparent token
//! refresh, fingerprinted quote caching, and a retry policy that only retries what is transient.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod quote;
pub mod retry;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and config helpers for tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::config::{QuoteClientConfig, QuoteClientConfigBuilder};

	/// Client identifier used by test configurations.
	pub const TEST_CLIENT_ID: &str = "quotes-client";
	/// Client secret used by test configurations.
	pub const TEST_CLIENT_SECRET: &str = "quotes-secret";

	/// Returns a config builder pointed at `base` for both the token and quotes endpoints.
	///
	/// The token endpoint lives at `{base}/oauth/token` and quotes at `{base}/quotes`.
	pub fn test_config_builder(base: &str) -> QuoteClientConfigBuilder {
		let base_url = Url::parse(base).expect("Failed to parse test base URL.");
		let token_url = base_url.join("/oauth/token").expect("Failed to build test token URL.");

		QuoteClientConfig::builder()
			.base_url(base_url)
			.token_url(token_url)
			.client_id(TEST_CLIENT_ID)
			.client_secret(TEST_CLIENT_SECRET)
			.retry_backoff(Duration::milliseconds(10))
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
