//! Demonstrates quoting a parcel against a mocked upstream: the first lookup exchanges client
//! credentials and calls the quotes endpoint, the second is served from the cache.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use parcel_quotes::{
	client::QuoteClient,
	config::QuoteClientConfig,
	quote::{Parcel, QuoteQuery},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let quotes_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/quotes").header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body(
				r#"[
					{"id":1,"name":"SEDEX","price":24.90,"delivery_time":2,"company":{"name":"Correios"}},
					{"id":2,"name":"PAC","price":"18.35","delivery_time":6,"company":{"name":"Correios"}},
					{"id":3,"name":".Com","has_error":true,"error":"Route not served","company":{"name":"Jadlog"}}
				]"#,
			);
		})
		.await;
	let config = QuoteClientConfig::builder()
		.base_url(Url::parse(&server.base_url())?)
		.token_url(Url::parse(&server.url("/oauth/token"))?)
		.client_id("demo-client")
		.client_secret("super-secret")
		.build()?;
	let client = QuoteClient::new(config)?;
	let query = QuoteQuery::new("01310-100", "20040-020", vec![Parcel::new(1.2, 10., 15., 20.)], 0.);

	for option in client.get_quotes(&query).await? {
		println!(
			"{} {}: {:.2} in {} day(s).",
			option.carrier, option.service_code, option.price, option.estimated_days
		);
	}

	let cached = client.get_quotes(&query).await?;

	println!("Second lookup returned {} cached option(s).", cached.len());

	token_mock.assert_calls_async(1).await;
	quotes_mock.assert_calls_async(1).await;

	Ok(())
}
