//! Walks through a complete login against a mocked Cidaas tenant: building the authorization URL,
//! exchanging the returned code, and authorizing an inbound API request with the issued token.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use cidaas_oauth2::{
	client::ReqwestCidaasClient,
	config::ClientConfig,
	oauth2::http::Request,
	params::RequestParameters,
	resource::RouteMetadata,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2-login/oauth2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let introspection_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token/userinfobytoken").header("access_token", "demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"sub\":\"user-123\",\"roles\":[\"admin\"]}");
		})
		.await;
	let config = ClientConfig::builder()
		.base_url(server.base_url())
		.client_id("demo-client")
		.client_secret("demo-secret")
		.redirect_uri("https://app.example.com/oauth/callback")
		.build()?;
	let client = ReqwestCidaasClient::new(config);
	let login = client.authorization_url_with_pkce(RequestParameters::new());

	println!("Send your user to {}.", login.url);

	// Simulate the redirect handler receiving `code` and `state`.
	login.validate_state(&login.state)?;

	let token = client.exchange_code("demo-code", login.pkce_verifier.as_deref()).await?;

	println!("Issued token expires at {:?}.", token.expires_at);

	let mut inbound = Request::builder()
		.uri("https://api.example.com/orders")
		.header("authorization", format!("Bearer {}", token.secret()))
		.body(())?;

	inbound.extensions_mut().insert(RouteMetadata::new(["admin"], ["orders:read"]));

	let decision = client.authorize_request(&inbound).await?;

	println!("Authorization decision: {}.", serde_json::to_string(&decision)?);

	token_mock.assert_async().await;
	introspection_mock.assert_async().await;

	Ok(())
}
