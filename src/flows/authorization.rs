//! Authorization-URL construction with optional PKCE.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	client::{CidaasClient, TransportErrorMapper},
	codec,
	config::Endpoint,
	http::IdpHttpClient,
	obs::{self, Operation, OperationOutcome, OperationSpan},
	params::{ParamValue, RequestParameters},
};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;
const SCOPE_SEPARATOR: &str = " ";

/// Scopes requested when the caller does not name any.
pub const DEFAULT_SCOPES: [&str; 3] = ["openid", "profile", "email"];

/// Authorization redirect produced by [`CidaasClient::authorization_url`].
///
/// The caller persists `state` (and the PKCE verifier, when present) until the redirect comes
/// back; the client keeps no copy.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
	/// Fully-formed authorization URL to send the end-user to.
	pub url: String,
	/// State value that must round-trip through the redirect.
	pub state: String,
	/// PKCE verifier to send as `code_verifier` on exchange.
	pub pkce_verifier: Option<String>,
}
impl AuthorizationRequest {
	/// Validates the `state` returned with the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state { Ok(()) } else { Err(Error::StateMismatch) }
	}
}
impl Debug for AuthorizationRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationRequest")
			.field("url", &self.url)
			.field("state", &self.state)
			.field("pkce", &self.pkce_verifier.is_some())
			.finish()
	}
}

impl<C, M> CidaasClient<C, M>
where
	C: ?Sized + IdpHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the authorization URL for a login attempt.
	///
	/// Caller options are kept in order. `state`, `scope` and `response_type` are filled in when
	/// missing or empty, `approval_prompt` defaults to `auto`, `redirect_uri` falls back to the
	/// configured one, and `client_id` always comes from configuration.
	pub fn authorization_url(&self, options: RequestParameters) -> AuthorizationRequest {
		self.build_authorization_request(options, false)
	}

	/// Same as [`authorization_url`](Self::authorization_url), plus an S256 PKCE challenge whose
	/// verifier is returned in [`AuthorizationRequest::pkce_verifier`].
	pub fn authorization_url_with_pkce(&self, options: RequestParameters) -> AuthorizationRequest {
		self.build_authorization_request(options, true)
	}

	fn build_authorization_request(
		&self,
		options: RequestParameters,
		pkce: bool,
	) -> AuthorizationRequest {
		const OPERATION: Operation = Operation::AuthorizationUrl;
		const ENDPOINT: Endpoint = Endpoint::Authorization;

		let _span = OperationSpan::new(
			OPERATION,
			ENDPOINT,
			if pkce { "authorization_url_with_pkce" } else { "authorization_url" },
		)
		.entered();

		obs::record_operation_outcome(OPERATION, ENDPOINT, OperationOutcome::Attempt);

		let (mut params, state) = authorization_parameters(options);

		if let Some(redirect_uri) = self.config.redirect_uri() {
			params.insert_if_absent("redirect_uri", redirect_uri);
		}

		params.insert("client_id", self.config.client_id());

		let pkce_verifier = pkce.then(|| {
			let verifier = random_string(PKCE_VERIFIER_LEN);

			params.insert("code_challenge", pkce_challenge(&verifier));
			params.insert("code_challenge_method", "S256");

			verifier
		});
		let url = codec::append_query(
			&self.config.endpoint_url(ENDPOINT),
			&codec::encode(&params),
		);

		obs::record_operation_outcome(OPERATION, ENDPOINT, OperationOutcome::Success);

		AuthorizationRequest { url, state, pkce_verifier }
	}
}

fn authorization_parameters(mut params: RequestParameters) -> (RequestParameters, String) {
	let state = match params.get_str("state") {
		Some(state) if !state.is_empty() => state.to_owned(),
		_ => {
			let state = random_string(STATE_LEN);

			params.insert("state", state.clone());

			state
		},
	};

	if !params.is_filled("scope") {
		params.insert("scope", DEFAULT_SCOPES);
	}
	if !params.is_filled("response_type") {
		params.insert("response_type", "code");
	}

	params.insert_if_absent("approval_prompt", "auto");

	if let Some(scope @ ParamValue::List(_)) = params.get("scope") {
		let joined = scope.join(SCOPE_SEPARATOR);

		params.insert("scope", joined);
	}

	(params, state)
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn pkce_challenge(verifier: &str) -> String {
	let digest = Sha256::digest(verifier.as_bytes());

	URL_SAFE_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_fill_missing_and_empty_values() {
		let (params, state) = authorization_parameters(
			RequestParameters::new().with("state", "").with("prompt", "login"),
		);

		assert_eq!(state.len(), STATE_LEN);
		assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_eq!(params.get_str("state"), Some(state.as_str()));
		assert_eq!(params.get_str("scope"), Some("openid profile email"));
		assert_eq!(params.get_str("response_type"), Some("code"));
		assert_eq!(params.get_str("approval_prompt"), Some("auto"));
		assert_eq!(
			params.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
			["state", "prompt", "scope", "response_type", "approval_prompt"]
		);
	}

	#[test]
	fn caller_values_are_kept_and_scope_lists_are_joined() {
		let (params, state) = authorization_parameters(
			RequestParameters::new()
				.with("state", "xyz")
				.with("scope", ["openid", "groups"])
				.with("approval_prompt", "force"),
		);

		assert_eq!(state, "xyz");
		assert_eq!(params.get_str("scope"), Some("openid groups"));
		assert_eq!(params.get_str("approval_prompt"), Some("force"));
	}

	#[test]
	fn pkce_challenge_matches_rfc_7636_vector() {
		assert_eq!(
			pkce_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
			"E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
		);
	}

	#[test]
	fn state_validation_errors_on_mismatch() {
		let request = AuthorizationRequest {
			url: "https://demo.cidaas.de/oauth2-login/oauth2/authz?state=expected".into(),
			state: "expected".into(),
			pkce_verifier: None,
		};

		assert!(request.validate_state("expected").is_ok());

		let err = request.validate_state("other").expect_err("State mismatch should fail.");

		assert!(matches!(err, Error::StateMismatch));
	}
}
