//! Grant exchanges against the token endpoint.

// crates.io
use oauth2::{
	HttpRequest,
	http::{Method, Request, header::CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::Token,
	client::{CidaasClient, FORM_CONTENT_TYPE, TransportErrorMapper},
	codec,
	config::{Endpoint, TokenRequestMethod},
	error::ConfigError,
	http::IdpHttpClient,
	obs::{self, Operation, OperationOutcome, OperationSpan},
	params::RequestParameters,
};

/// OAuth 2.0 grants accepted by the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Authorization code grant; requires `code`.
	AuthorizationCode,
	/// Refresh token grant; requires `refresh_token`.
	RefreshToken,
	/// Client credentials grant.
	ClientCredentials,
	/// Resource owner password grant; requires `username` and `password`.
	Password,
}
impl GrantType {
	/// Returns the `grant_type` wire value.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
			GrantType::ClientCredentials => "client_credentials",
			GrantType::Password => "password",
		}
	}

	/// Parameters the grant cannot be exchanged without.
	pub const fn required_parameters(self) -> &'static [&'static str] {
		match self {
			GrantType::AuthorizationCode => &["code"],
			GrantType::RefreshToken => &["refresh_token"],
			GrantType::ClientCredentials => &[],
			GrantType::Password => &["username", "password"],
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

impl<C, M> CidaasClient<C, M>
where
	C: ?Sized + IdpHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges `grant` for an access token.
	///
	/// Caller `overrides` win over the configured `client_id`, `client_secret` and
	/// `redirect_uri`; `grant_type` is always taken from `grant`. Missing required parameters fail
	/// with [`Error::MissingParameter`] before any request is sent.
	pub async fn exchange(&self, grant: GrantType, overrides: RequestParameters) -> Result<Token> {
		const OPERATION: Operation = Operation::TokenExchange;
		const ENDPOINT: Endpoint = Endpoint::Token;

		let span = OperationSpan::new(OPERATION, ENDPOINT, grant.as_str());

		obs::record_operation_outcome(OPERATION, ENDPOINT, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let params = self.token_request_parameters(grant, overrides)?;
				let request = self.token_request(&params)?;
				let map = self.fetch_parsed(OPERATION, request).await?.into_object("token")?;

				Token::from_response(
					map,
					self.config.resource_owner_id_key(),
					OffsetDateTime::now_utc(),
				)
			})
			.await;

		obs::record_operation_outcome(OPERATION, ENDPOINT, OperationOutcome::of(&result));

		result
	}

	/// Exchanges an authorization `code`, attaching the PKCE verifier when one was issued.
	pub async fn exchange_code(&self, code: &str, pkce_verifier: Option<&str>) -> Result<Token> {
		let mut params = RequestParameters::new().with("code", code);

		if let Some(verifier) = pkce_verifier {
			params.insert("code_verifier", verifier);
		}

		self.exchange(GrantType::AuthorizationCode, params).await
	}

	/// Assembles and validates the parameter set sent to the token endpoint.
	pub fn token_request_parameters(
		&self,
		grant: GrantType,
		overrides: RequestParameters,
	) -> Result<RequestParameters> {
		let mut params = RequestParameters::new().with("client_id", self.config.client_id());

		if let Some(secret) = self.config.client_secret() {
			params.insert("client_secret", secret);
		}
		if let Some(redirect_uri) = self.config.redirect_uri() {
			params.insert("redirect_uri", redirect_uri);
		}

		params.insert("grant_type", grant.as_str());
		params.merge(overrides);
		params.insert("grant_type", grant.as_str());

		let required = self
			.config
			.required_token_parameters()
			.iter()
			.map(String::as_str)
			.chain(grant.required_parameters().iter().copied());

		ensure_required(&params, required)?;

		Ok(params)
	}

	fn token_request(&self, params: &RequestParameters) -> Result<HttpRequest> {
		let url = self.config.endpoint_url(Endpoint::Token);
		let encoded = codec::encode(params);
		let builder = Request::builder().header(CONTENT_TYPE, FORM_CONTENT_TYPE);
		let request = match self.config.token_request_method() {
			TokenRequestMethod::Post =>
				builder.method(Method::POST).uri(url).body(encoded.into_bytes()),
			TokenRequestMethod::Get => builder
				.method(Method::GET)
				.uri(codec::append_query(&url, &encoded))
				.body(Vec::new()),
		}
		.map_err(ConfigError::from)?;

		Ok(request)
	}
}

fn ensure_required<'a>(
	params: &RequestParameters,
	required: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
	match required.into_iter().find(|name| !params.is_filled(name)) {
		Some(name) => Err(Error::MissingParameter { name: name.to_owned() }),
		None => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn grant_requirements_are_fixed_per_variant() {
		assert_eq!(GrantType::AuthorizationCode.required_parameters(), ["code"]);
		assert_eq!(GrantType::RefreshToken.required_parameters(), ["refresh_token"]);
		assert!(GrantType::ClientCredentials.required_parameters().is_empty());
		assert_eq!(GrantType::Password.required_parameters(), ["username", "password"]);
		assert_eq!(GrantType::Password.to_string(), "password");
	}

	#[test]
	fn first_missing_or_empty_parameter_is_reported() {
		let params = RequestParameters::new().with("username", "ada").with("password", "");
		let err = ensure_required(&params, ["scope_hint", "username", "password"])
			.expect_err("Missing parameters should fail.");

		assert!(matches!(err, Error::MissingParameter { name } if name == "scope_hint"));

		let err = ensure_required(&params, ["username", "password"])
			.expect_err("Empty parameters should fail.");

		assert!(matches!(err, Error::MissingParameter { name } if name == "password"));
		assert!(ensure_required(&params, ["username"]).is_ok());
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn token_requests_follow_the_configured_method() {
		// self
		use crate::{client::ReqwestCidaasClient, config::ClientConfig};

		let client_for = |method| {
			ReqwestCidaasClient::new(
				ClientConfig::builder()
					.base_url("https://demo.cidaas.de")
					.client_id("client")
					.token_request_method(method)
					.build()
					.expect("Failed to build test configuration."),
			)
		};
		let params = RequestParameters::new().with("grant_type", "client_credentials");
		let post = client_for(TokenRequestMethod::Post)
			.token_request(&params)
			.expect("POST token request should build.");

		assert_eq!(post.method(), Method::POST);
		assert_eq!(post.uri(), "https://demo.cidaas.de/oauth2-login/oauth2/token");
		assert_eq!(post.body().as_slice(), b"grant_type=client_credentials");
		assert_eq!(
			post.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
			Some(FORM_CONTENT_TYPE)
		);

		let get = client_for(TokenRequestMethod::Get)
			.token_request(&params)
			.expect("GET token request should build.");

		assert_eq!(get.method(), Method::GET);
		assert_eq!(
			get.uri(),
			"https://demo.cidaas.de/oauth2-login/oauth2/token?grant_type=client_credentials"
		);
		assert!(get.body().is_empty());
	}
}
