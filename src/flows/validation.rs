//! Remote token check.

// crates.io
use oauth2::http::{HeaderValue, Method, header::CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	client::{CidaasClient, JSON_CONTENT_TYPE, TransportErrorMapper},
	config::Endpoint,
	http::IdpHttpClient,
	obs::{self, Operation, OperationOutcome, OperationSpan},
};

const VALID_BODY: &[u8] = b"true";

impl<C, M> CidaasClient<C, M>
where
	C: ?Sized + IdpHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Asks the token check endpoint whether `access_token` is still valid.
	///
	/// Only a 2xx response whose body is exactly `true` counts as valid; `True`, `1` or any other
	/// body yields `false`. Transport failures are returned as errors rather than folded into
	/// `false`; callers must treat any `Err` as "not valid".
	pub async fn validate_token(&self, access_token: &str) -> Result<bool> {
		const OPERATION: Operation = Operation::TokenValidation;
		const ENDPOINT: Endpoint = Endpoint::CheckToken;

		let span = OperationSpan::new(OPERATION, ENDPOINT, "validate_token");

		obs::record_operation_outcome(OPERATION, ENDPOINT, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut request = self.authenticated_request(
					Method::GET,
					&self.config.endpoint_url(ENDPOINT),
					access_token,
				)?;

				request
					.headers_mut()
					.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

				let response = self.send(OPERATION, request).await?;

				Ok(response.is_success() && response.body == VALID_BODY)
			})
			.await;

		obs::record_operation_outcome(OPERATION, ENDPOINT, OperationOutcome::of(&result));

		result
	}
}
