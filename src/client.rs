//! Client facade shared by every identity-provider operation.
//!
//! [`CidaasClient`] owns the immutable configuration, the transport, and the transport error
//! mapper. The individual operations live in [`crate::flows`] (client side) and
//! [`crate::resource`] (resource-server side); this module only provides the request plumbing they
//! share.

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest,
	http::{Method, Request},
};
// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	error::{ConfigError, TransportError},
	http::{IdpHttpClient, RequestTimeout},
	obs::Operation,
	response::{self, ParsedResponse, RawResponse},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Header carrying the bearer token on authenticated requests.
pub const ACCESS_TOKEN_HEADER: &str = "access_token";

pub(crate) const JSON_CONTENT_TYPE: &str = "application/json";
pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestCidaasClient = CidaasClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Maps HTTP transport failures into adapter [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into an adapter error.
	fn map_transport_error(&self, operation: Operation, error: HttpClientError<E>) -> Error;
}

/// Mapper usable with any transport; every transport-specific failure is reported as a network
/// error.
#[derive(Clone, Debug, Default)]
pub struct DefaultTransportErrorMapper;
impl<E> TransportErrorMapper<E> for DefaultTransportErrorMapper
where
	E: 'static + Send + Sync + StdError,
{
	fn map_transport_error(&self, operation: Operation, error: HttpClientError<E>) -> Error {
		let _ = operation;

		map_http_client_error(error, |inner| TransportError::network(inner).into())
	}
}

/// Mapper for reqwest-backed transports; separates timeouts and request-builder failures.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		operation: Operation,
		error: HttpClientError<ReqwestError>,
	) -> Error {
		let _ = operation;

		map_http_client_error(error, |inner| {
			if inner.is_builder() {
				ConfigError::from(inner).into()
			} else {
				TransportError::from(inner).into()
			}
		})
	}
}

/// Adapter for a single Cidaas tenant.
///
/// The client holds no per-call state, so one instance can serve concurrent exchanges and
/// introspections. Authorization state is returned to the caller instead of being stored here.
pub struct CidaasClient<C, M>
where
	C: ?Sized + IdpHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Validated configuration.
	pub config: Arc<ClientConfig>,
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
}
impl<C, M> CidaasClient<C, M>
where
	C: ?Sized + IdpHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: impl Into<Arc<ClientConfig>>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			config: config.into(),
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
		}
	}

	/// Returns the configuration the client was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Builds a request carrying `token` in the `access_token` header.
	pub fn authenticated_request(
		&self,
		method: Method,
		url: &str,
		token: &str,
	) -> Result<HttpRequest> {
		let request = Request::builder()
			.method(method)
			.uri(url)
			.header(ACCESS_TOKEN_HEADER, token)
			.body(Vec::new())
			.map_err(ConfigError::from)?;

		Ok(request)
	}

	/// Issues `request` and returns the raw response; transport failures go through the mapper.
	pub(crate) async fn send(
		&self,
		operation: Operation,
		mut request: HttpRequest,
	) -> Result<RawResponse> {
		if let Some(timeout) = self.config.request_timeout() {
			request.extensions_mut().insert(RequestTimeout(timeout));
		}

		let handle = self.http_client.handle();
		let response = handle
			.call(request)
			.await
			.map_err(|e| self.transport_mapper.map_transport_error(operation, e))?;

		Ok(RawResponse::from(response))
	}

	/// Sends `request`, then parses and classifies the response.
	pub(crate) async fn fetch_parsed(
		&self,
		operation: Operation,
		request: HttpRequest,
	) -> Result<ParsedResponse> {
		let response = self.send(operation, request).await?;
		let parsed = response::parse_response(&response)?;

		response::check_response(&response, parsed)
	}
}
#[cfg(feature = "reqwest")]
impl CidaasClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client backed by a default reqwest transport.
	///
	/// Use [`CidaasClient::with_http_client`] to supply a tuned [`ReqwestClient`] (for example one
	/// that does not follow redirects).
	pub fn new(config: impl Into<Arc<ClientConfig>>) -> Self {
		Self::with_http_client(
			config,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Clone for CidaasClient<C, M>
where
	C: ?Sized + IdpHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
		}
	}
}
impl<C, M> Debug for CidaasClient<C, M>
where
	C: ?Sized + IdpHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CidaasClient").field("config", &self.config).finish()
	}
}

fn map_http_client_error<E>(error: HttpClientError<E>, map_inner: impl FnOnce(E) -> Error) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match error {
		HttpClientError::Reqwest(inner) => map_inner(*inner),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::Other { message }.into(),
		other => TransportError::Other { message: other.to_string() }.into(),
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::io::{Error as IoError, ErrorKind};
	// self
	use super::*;
	use crate::error::IdentityProviderError;

	#[derive(Debug, ThisError)]
	#[error("Connection refused.")]
	struct Refused;

	fn transport_source(err: Error) -> TransportError {
		match err {
			Error::IdentityProvider(IdentityProviderError { source: Some(source), status, .. }) => {
				assert_eq!(status, None);

				source
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn default_mapper_classifies_transport_failures() {
		let mapper = DefaultTransportErrorMapper;
		let err = mapper
			.map_transport_error(Operation::TokenExchange, HttpClientError::Reqwest(Box::new(Refused)));

		assert!(matches!(transport_source(err), TransportError::Network { .. }));

		let err = <DefaultTransportErrorMapper as TransportErrorMapper<Refused>>::map_transport_error(
			&mapper,
			Operation::Introspection,
			HttpClientError::Io(IoError::new(ErrorKind::BrokenPipe, "pipe")),
		);

		assert!(matches!(transport_source(err), TransportError::Io(_)));

		let err = <DefaultTransportErrorMapper as TransportErrorMapper<Refused>>::map_transport_error(
			&mapper,
			Operation::TokenValidation,
			HttpClientError::Other("dns".into()),
		);

		assert!(matches!(transport_source(err), TransportError::Other { message } if message == "dns"));
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn authenticated_requests_carry_the_token_header() {
		let config = ClientConfig::builder()
			.base_url("https://demo.cidaas.de")
			.client_id("client")
			.build()
			.expect("Failed to build test configuration.");
		let client = ReqwestCidaasClient::new(config);
		let request = client
			.authenticated_request(Method::GET, "https://demo.cidaas.de/userinfo", "T")
			.expect("Request should build.");

		assert_eq!(request.method(), Method::GET);
		assert_eq!(
			request.headers().get(ACCESS_TOKEN_HEADER).and_then(|v| v.to_str().ok()),
			Some("T")
		);

		let err = client
			.authenticated_request(Method::GET, "https://demo.cidaas.de/userinfo", "bad\ntoken")
			.expect_err("Header values with control characters should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::HttpRequest(_))));
	}
}
