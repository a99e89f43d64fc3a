mod common;

// std
use std::time::Duration as StdDuration;
// crates.io
use httpmock::prelude::*;
// self
use cidaas_oauth2::{
	config::{ClientConfig, TokenRequestMethod},
	error::{Error, MalformedJsonError, TransportError},
	flows::GrantType,
	params::RequestParameters,
};
use common::{reqwest_client, test_config};

const TOKEN_PATH: &str = "/oauth2-login/oauth2/token";
const REDIRECT: &str = "redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback";

#[tokio::test]
async fn authorization_code_exchange_posts_form_and_builds_token() {
	let server = MockServer::start_async().await;
	let client = reqwest_client(test_config(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded")
				.body(format!(
					"client_id=test-client&client_secret=test-secret&{REDIRECT}&grant_type=authorization_code&code=abc"
				));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"T\",\"expires_in\":3600,\"id_token\":\"ID\"}");
		})
		.await;
	let token = client
		.exchange(GrantType::AuthorizationCode, RequestParameters::new().with("code", "abc"))
		.await
		.expect("Authorization code exchange should succeed.");

	mock.assert_async().await;

	assert_eq!(token.secret(), "T");
	assert_eq!(token.expires_in, Some(3600));
	assert!(token.expires_at.is_some());
	assert_eq!(token.value("id_token").and_then(|v| v.as_str()), Some("ID"));
	assert_eq!(token.resource_owner_id, None);
}

#[tokio::test]
async fn caller_overrides_win_except_grant_type() {
	let server = MockServer::start_async().await;
	let client = reqwest_client(test_config(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH).body(format!(
				"client_id=other-client&client_secret=test-secret&{REDIRECT}&grant_type=authorization_code&code=abc"
			));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"T\"}");
		})
		.await;
	let overrides = RequestParameters::new()
		.with("grant_type", "password")
		.with("client_id", "other-client")
		.with("code", "abc");
	let token = client
		.exchange(GrantType::AuthorizationCode, overrides)
		.await
		.expect("Exchange with overrides should succeed.");

	mock.assert_async().await;

	assert_eq!(token.secret(), "T");
	assert_eq!(token.expires_in, None);
}

#[tokio::test]
async fn get_token_requests_move_parameters_to_the_query() {
	let server = MockServer::start_async().await;
	let config = ClientConfig::builder()
		.base_url(server.base_url())
		.client_id("test-client")
		.token_request_method(TokenRequestMethod::Get)
		.resource_owner_id_key("user.id")
		.build()
		.expect("Failed to build GET configuration.");
	let client = reqwest_client(config);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(TOKEN_PATH)
				.query_param("client_id", "test-client")
				.query_param("grant_type", "client_credentials");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"G\",\"expires_in\":\"60\",\"user\":{\"id\":\"u-1\"}}");
		})
		.await;
	let token = client
		.exchange(GrantType::ClientCredentials, RequestParameters::new())
		.await
		.expect("GET exchange should succeed.");

	mock.assert_async().await;

	assert_eq!(token.secret(), "G");
	assert_eq!(token.expires_in, Some(60));
	assert_eq!(token.resource_owner_id.as_ref().and_then(|v| v.as_str()), Some("u-1"));
}

#[tokio::test]
async fn form_encoded_token_responses_are_accepted() {
	let server = MockServer::start_async().await;
	let client = reqwest_client(test_config(&server.base_url()));
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/x-www-form-urlencoded")
				.body("access_token=F&refresh_token=R&expires_in=120");
		})
		.await;
	let token = client
		.exchange(GrantType::RefreshToken, RequestParameters::new().with("refresh_token", "old"))
		.await
		.expect("Form-encoded token response should be accepted.");

	assert_eq!(token.secret(), "F");
	assert_eq!(token.refresh_token.as_ref().map(|t| t.expose()), Some("R"));
	assert_eq!(token.expires_in, Some(120));
}

#[tokio::test]
async fn provider_errors_carry_status_message_and_body() {
	let server = MockServer::start_async().await;
	let client = reqwest_client(test_config(&server.base_url()));
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"code already used\"}");
		})
		.await;
	let err = client
		.exchange_code("stale", None)
		.await
		.expect_err("Invalid grants should surface as provider errors.");

	match err {
		Error::IdentityProvider(inner) => {
			assert_eq!(inner.status, Some(400));
			assert_eq!(inner.message, "invalid_grant");
			assert_eq!(inner.description.as_deref(), Some("code already used"));
			assert!(inner.body.is_some());
			assert!(!inner.is_transport());
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

async fn failed_client_credentials(
	status: u16,
	content_type: &'static str,
	body: &'static str,
) -> Error {
	let server = MockServer::start_async().await;
	let client = reqwest_client(test_config(&server.base_url()));
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(status).header("content-type", content_type).body(body);
		})
		.await;

	client
		.exchange(GrantType::ClientCredentials, RequestParameters::new())
		.await
		.expect_err("Exchange against a broken response should fail.")
}

#[tokio::test]
async fn malformed_bodies_are_classified() {
	let err = failed_client_credentials(500, "text/plain", "boom").await;

	assert!(matches!(err, Error::ServerErrorNoBody { .. }));

	let err = failed_client_credentials(200, "application/json", "not-json").await;

	assert!(matches!(err, Error::MalformedJson(MalformedJsonError::Json { status: 200, .. })));

	let err = failed_client_credentials(200, "application/json", "{\"expires_in\":5}").await;

	assert!(matches!(err, Error::MalformedJson(MalformedJsonError::TokenShape { .. })));

	let err = failed_client_credentials(200, "application/json", "[\"T\"]").await;

	assert!(matches!(err, Error::MalformedJson(MalformedJsonError::NotAnObject { .. })));
}

#[tokio::test]
async fn deadlines_are_forwarded_to_the_transport() {
	let server = MockServer::start_async().await;
	let config = ClientConfig::builder()
		.base_url(server.base_url())
		.client_id("test-client")
		.request_timeout(StdDuration::from_millis(100))
		.build()
		.expect("Failed to build timeout configuration.");
	let client = reqwest_client(config);
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"late\"}")
				.delay(StdDuration::from_secs(3));
		})
		.await;
	let err = client
		.exchange(GrantType::ClientCredentials, RequestParameters::new())
		.await
		.expect_err("Slow responses should time out.");

	match err {
		Error::IdentityProvider(inner) => {
			assert_eq!(inner.status, None);
			assert!(matches!(inner.source, Some(TransportError::Timeout { .. })));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}
