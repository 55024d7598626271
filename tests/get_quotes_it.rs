mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::json;
use time::Duration;
// self
use common::*;
use parcel_quotes::{
	client::QuoteClient,
	error::{AuthError, Error},
	quote::{Parcel, QuoteQuery, ShippingOption},
};

const TOKEN_BODY: &str =
	"{\"access_token\":\"quotes-token\",\"token_type\":\"bearer\",\"expires_in\":3600}";

fn client(server: &MockServer) -> QuoteClient {
	let config = config_builder(&server.base_url()).build().expect("Test config should build.");

	QuoteClient::new(config).expect("Reqwest client should build.")
}

async fn mock_token<'a>(server: &'a MockServer, body: &str) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}

#[tokio::test]
async fn reference_request_maps_to_single_option() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, TOKEN_BODY).await;
	let quotes = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(QUOTES_PATH)
				.header("authorization", "Bearer quotes-token")
				.json_body(json!({
					"from": { "postal_code": "01310100" },
					"to": { "postal_code": "20040020" },
					"package": { "weight": 1.2, "height": 10.0, "width": 15.0, "length": 20.0 },
					"options": {
						"insurance_value": 0.0,
						"use_insurance_value": false,
						"own_hand": false,
						"receipt": false
					}
				}));
			then.status(200).header("content-type", "application/json").body(SEDEX_BODY);
		})
		.await;
	let options =
		client(&server).get_quotes(&sedex_query()).await.expect("Quote lookup should succeed.");

	assert_eq!(options, vec![ShippingOption {
		carrier: "Correios".into(),
		service_code: "SEDEX".into(),
		price: 24.90,
		estimated_days: 2,
	}]);

	token.assert_calls_async(1).await;
	quotes.assert_calls_async(1).await;
}

#[tokio::test]
async fn token_form_and_user_agent_are_sent() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded")
				.form_urlencoded_tuple("grant_type", "client_credentials")
				.form_urlencoded_tuple("client_id", "quotes-client")
				.form_urlencoded_tuple("client_secret", "quotes-secret");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let quotes = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(QUOTES_PATH)
				.header("user-agent", "checkout-service/1.0")
				.header("accept", "application/json")
				.header("content-type", "application/json");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let config = config_builder(&server.base_url())
		.user_agent("checkout-service/1.0")
		.build()
		.expect("Test config should build.");
	let options = QuoteClient::new(config)
		.expect("Reqwest client should build.")
		.get_quotes(&sedex_query())
		.await
		.expect("Lookup should succeed.");

	assert!(options.is_empty());

	token.assert_calls_async(1).await;
	quotes.assert_calls_async(1).await;
}

#[tokio::test]
async fn identical_lookups_hit_upstream_once() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, TOKEN_BODY).await;
	let quotes = server
		.mock_async(|when, then| {
			when.method(POST).path(QUOTES_PATH);
			then.status(200).header("content-type", "application/json").body(SEDEX_BODY);
		})
		.await;
	let client = client(&server);
	let first = client.get_quotes(&sedex_query()).await.expect("First lookup should succeed.");
	// Same route and parcel, formatted differently.
	let reformatted =
		QuoteQuery::new("01310100", "20040 020", vec![Parcel::new(1.2000001, 10., 15., 20.)], 0.);
	let second = client.get_quotes(&reformatted).await.expect("Second lookup should succeed.");

	assert_eq!(first, second);

	token.assert_calls_async(1).await;
	quotes.assert_calls_async(1).await;
}

#[tokio::test]
async fn cache_misses_again_after_ttl() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server, TOKEN_BODY).await;
	let quotes = server
		.mock_async(|when, then| {
			when.method(POST).path(QUOTES_PATH);
			then.status(200).header("content-type", "application/json").body(SEDEX_BODY);
		})
		.await;
	let config = config_builder(&server.base_url())
		.cache_ttl(Duration::milliseconds(300))
		.build()
		.expect("Test config should build.");
	let client = QuoteClient::new(config).expect("Reqwest client should build.");

	client.get_quotes(&sedex_query()).await.expect("Miss should fetch.");
	client.get_quotes(&sedex_query()).await.expect("Hit should be served from cache.");

	quotes.assert_calls_async(1).await;

	tokio::time::sleep(std::time::Duration::from_millis(400)).await;

	client.get_quotes(&sedex_query()).await.expect("Expired entry should refetch.");

	quotes.assert_calls_async(2).await;
}

#[tokio::test]
async fn empty_results_are_cached() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server, TOKEN_BODY).await;
	let quotes = server
		.mock_async(|when, then| {
			when.method(POST).path(QUOTES_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"name\":\"PAC\",\"price\":0,\"has_error\":true}]");
		})
		.await;
	let client = client(&server);

	assert!(client.get_quotes(&sedex_query()).await.expect("Lookup should succeed.").is_empty());
	assert!(client.get_quotes(&sedex_query()).await.expect("Lookup should succeed.").is_empty());

	quotes.assert_calls_async(1).await;
}

#[tokio::test]
async fn client_errors_fail_fast() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server, TOKEN_BODY).await;
	let quotes = server
		.mock_async(|when, then| {
			when.method(POST).path(QUOTES_PATH);
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"message\":\"The given data was invalid.\"}");
		})
		.await;
	let err = client(&server).get_quotes(&sedex_query()).await.expect_err("HTTP 400 must fail.");

	assert!(matches!(err, Error::Rejected { status: 400, ref body } if body.contains("invalid")));

	quotes.assert_calls_async(1).await;
}

#[tokio::test]
async fn server_errors_are_retried_once() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server, TOKEN_BODY).await;
	let quotes = server
		.mock_async(|when, then| {
			when.method(POST).path(QUOTES_PATH);
			then.status(503).body("unavailable");
		})
		.await;
	let err = client(&server).get_quotes(&sedex_query()).await.expect_err("HTTP 503 must fail.");

	assert!(err.is_retryable());

	quotes.assert_calls_async(2).await;
}

#[tokio::test]
async fn upstream_timeouts_are_retried() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server, TOKEN_BODY).await;
	let quotes = server
		.mock_async(|when, then| {
			when.method(POST).path(QUOTES_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("[]")
				.delay(std::time::Duration::from_millis(500));
		})
		.await;
	let config = config_builder(&server.base_url())
		.request_timeout(Duration::milliseconds(100))
		.build()
		.expect("Test config should build.");
	let err = QuoteClient::new(config)
		.expect("Reqwest client should build.")
		.get_quotes(&sedex_query())
		.await
		.expect_err("Every attempt should time out.");

	assert!(matches!(err, Error::Transient(_)));

	quotes.assert_calls_async(2).await;
}

#[tokio::test]
async fn token_is_reused_while_valid() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, TOKEN_BODY).await;
	let _quotes = server
		.mock_async(|when, then| {
			when.method(POST).path(QUOTES_PATH);
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let client = client(&server);

	client.get_quotes(&sedex_query()).await.expect("First lookup should succeed.");

	tokio::time::sleep(std::time::Duration::from_secs(1)).await;

	let other = QuoteQuery::new("70040-010", "30130-010", vec![Parcel::new(0.3, 2., 11., 16.)], 0.);

	client.get_quotes(&other).await.expect("Second lookup should succeed.");

	token.assert_calls_async(1).await;
}

#[tokio::test]
async fn expired_token_triggers_one_refresh() {
	let server = MockServer::start_async().await;
	let token = mock_token(
		&server,
		"{\"access_token\":\"short-lived\",\"token_type\":\"bearer\",\"expires_in\":1}",
	)
	.await;
	let _quotes = server
		.mock_async(|when, then| {
			when.method(POST).path(QUOTES_PATH);
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let config = config_builder(&server.base_url())
		.token_skew(Duration::ZERO)
		.build()
		.expect("Test config should build.");
	let client = QuoteClient::new(config).expect("Reqwest client should build.");

	client.get_quotes(&sedex_query()).await.expect("First lookup should succeed.");

	tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

	let other = QuoteQuery::new("70040-010", "30130-010", vec![Parcel::new(0.3, 2., 11., 16.)], 0.);

	client.get_quotes(&other).await.expect("Second lookup should succeed.");

	token.assert_calls_async(2).await;
}

#[tokio::test]
async fn token_endpoint_rejection_is_an_auth_error() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\",\"error_description\":\"Unknown client.\"}");
		})
		.await;
	let quotes = server
		.mock_async(|when, then| {
			when.method(POST).path(QUOTES_PATH);
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let err = client(&server).get_quotes(&sedex_query()).await.expect_err("Auth must fail.");

	assert!(matches!(err, Error::Auth(AuthError::Rejected { status: Some(401), .. })));

	token.assert_calls_async(1).await;
	quotes.assert_calls_async(0).await;
}

#[tokio::test]
async fn token_without_access_token_is_an_auth_error() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server, "{\"token_type\":\"bearer\",\"expires_in\":3600}").await;
	let err = client(&server).get_quotes(&sedex_query()).await.expect_err("Auth must fail.");

	assert!(matches!(err, Error::Auth(AuthError::MalformedResponse { .. })));
}

#[tokio::test]
async fn unauthorized_quotes_response_forces_token_refresh() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, TOKEN_BODY).await;
	let quotes = server
		.mock_async(|when, then| {
			when.method(POST).path(QUOTES_PATH);
			then.status(401).body("{\"message\":\"Unauthenticated.\"}");
		})
		.await;
	let client = client(&server);

	client.get_quotes(&sedex_query()).await.expect_err("HTTP 401 is permanent.");
	client.get_quotes(&sedex_query()).await.expect_err("HTTP 401 is permanent.");

	token.assert_calls_async(2).await;
	quotes.assert_calls_async(2).await;
}
