//! Resource-owner lookups authenticated with an issued token.

// crates.io
use oauth2::http::{HeaderValue, Method, header::CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	auth::{ResourceOwner, Token},
	client::{CidaasClient, JSON_CONTENT_TYPE, TransportErrorMapper},
	config::Endpoint,
	http::IdpHttpClient,
	obs::{self, Operation, OperationOutcome, OperationSpan},
};

impl<C, M> CidaasClient<C, M>
where
	C: ?Sized + IdpHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the profile of the user `token` was issued to.
	pub async fn resource_owner(&self, token: &Arc<Token>) -> Result<ResourceOwner> {
		let url = self.config.endpoint_url(Endpoint::UserInfo);

		self.fetch_resource_owner(Endpoint::UserInfo, &url, token, false).await
	}

	/// Fetches a user by id from the user-management endpoint.
	pub async fn resource_owner_by_id(
		&self,
		token: &Arc<Token>,
		user_id: &str,
	) -> Result<ResourceOwner> {
		let url = self.config.user_url(user_id);

		self.fetch_resource_owner(Endpoint::UserById, &url, token, true).await
	}

	async fn fetch_resource_owner(
		&self,
		endpoint: Endpoint,
		url: &str,
		token: &Arc<Token>,
		json: bool,
	) -> Result<ResourceOwner> {
		const OPERATION: Operation = Operation::ResourceOwner;

		let span = OperationSpan::new(OPERATION, endpoint, "fetch_resource_owner");

		obs::record_operation_outcome(OPERATION, endpoint, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut request = self.authenticated_request(Method::GET, url, token.secret())?;

				if json {
					request
						.headers_mut()
						.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
				}

				let attributes =
					self.fetch_parsed(OPERATION, request).await?.into_object("resource owner")?;

				Ok(ResourceOwner::new(attributes, token))
			})
			.await;

		obs::record_operation_outcome(OPERATION, endpoint, OperationOutcome::of(&result));

		result
	}
}
