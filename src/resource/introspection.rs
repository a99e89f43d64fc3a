//! Remote token introspection and the authorization decision derived from it.

// crates.io
use oauth2::{
	HttpRequest,
	http::{Method, Request, header::CONTENT_TYPE},
};
use serde::{Serializer, ser::SerializeMap};
// self
use crate::{
	_prelude::*,
	client::{ACCESS_TOKEN_HEADER, CidaasClient, JSON_CONTENT_TYPE, TransportErrorMapper},
	config::Endpoint,
	error::{ACCESS_DENIED_MESSAGE, ACCESS_DENIED_STATUS, ConfigError, MalformedJsonError},
	http::IdpHttpClient,
	obs::{self, Operation, OperationOutcome, OperationSpan},
	resource::{InboundRequest, RouteMetadata, locate_token},
};

const GRANTED_STATUS: u16 = 200;

time::serde::format_description!(
	created_time_format,
	OffsetDateTime,
	"[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
);

/// Request metadata sent alongside a token to the introspection endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionContext {
	/// Token being introspected.
	pub access_token: String,
	/// Always `null` on the wire; the provider resolves it.
	pub user_id: Option<String>,
	/// Always `null` on the wire; the provider resolves it.
	pub client_id: Option<String>,
	/// `referrer` header.
	pub referrer: String,
	/// First address of `x-forwarded-for`.
	pub ip_address: String,
	/// `X-Forwarded-Host` header.
	pub host: String,
	/// `Accept-Language` header.
	pub accept_language: String,
	/// `User-Agent` header.
	pub user_agent: String,
	/// URL of the inbound request, without its query string.
	#[serde(rename = "requestURL")]
	pub request_url: String,
	/// Always `false` on the wire.
	pub success: bool,
	/// Route scopes joined with a space.
	pub requested_scopes: String,
	/// Route roles joined with a comma.
	pub requested_roles: String,
	/// Instant the context was assembled, rendered as `2024-01-01T12:00:00+0000`.
	#[serde(with = "created_time_format")]
	pub created_time: OffsetDateTime,
	/// Header snapshot, first value per name.
	pub request_info: BTreeMap<String, String>,
}
impl IntrospectionContext {
	/// Assembles the context for `access_token` from an inbound request and its route metadata.
	pub fn from_request<R>(access_token: impl Into<String>, request: &R) -> Self
	where
		R: ?Sized + InboundRequest,
	{
		let header = |name: &str| request.header(name).unwrap_or_default().to_owned();
		let ip_address = request
			.header("x-forwarded-for")
			.and_then(|value| value.split(',').next())
			.map(|ip| ip.trim().to_owned())
			.unwrap_or_default();

		Self {
			access_token: access_token.into(),
			user_id: None,
			client_id: None,
			referrer: header("referrer"),
			ip_address,
			host: header("x-forwarded-host"),
			accept_language: header("accept-language"),
			user_agent: header("user-agent"),
			request_url: request.request_url().unwrap_or_default(),
			success: false,
			requested_scopes: String::new(),
			requested_roles: String::new(),
			created_time: OffsetDateTime::now_utc(),
			request_info: request.headers(),
		}
		.with_route(&request.route_metadata())
	}

	/// Replaces the requested roles and scopes with those of `route`.
	pub fn with_route(mut self, route: &RouteMetadata) -> Self {
		self.requested_roles = route.roles.join(",");
		self.requested_scopes = route.scopes.join(" ");

		self
	}
}
impl Debug for IntrospectionContext {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IntrospectionContext")
			.field("access_token", &"<redacted>")
			.field("ip_address", &self.ip_address)
			.field("host", &self.host)
			.field("request_url", &self.request_url)
			.field("requested_scopes", &self.requested_scopes)
			.field("requested_roles", &self.requested_roles)
			.field("created_time", &self.created_time)
			.finish_non_exhaustive()
	}
}

/// Authorization decision for an inbound request.
///
/// Serializes to exactly one of two shapes:
/// `{"data": <introspection body>, "status_code": 200}` or
/// `{"error": "Access denied for this resource", "status_code": 401}`.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthorizationResult {
	/// Token accepted; carries the decoded introspection body.
	Granted(Value),
	/// Token missing or refused.
	Denied,
}
impl AuthorizationResult {
	/// HTTP status of the decision (200 or 401).
	pub fn status_code(&self) -> u16 {
		match self {
			Self::Granted(_) => GRANTED_STATUS,
			Self::Denied => ACCESS_DENIED_STATUS,
		}
	}

	/// Returns `true` for [`AuthorizationResult::Granted`].
	pub fn is_granted(&self) -> bool {
		matches!(self, Self::Granted(_))
	}

	/// Introspection body of a granted request.
	pub fn data(&self) -> Option<&Value> {
		match self {
			Self::Granted(data) => Some(data),
			Self::Denied => None,
		}
	}
}
impl Serialize for AuthorizationResult {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut map = serializer.serialize_map(Some(2))?;

		match self {
			Self::Granted(data) => map.serialize_entry("data", data)?,
			Self::Denied => map.serialize_entry("error", ACCESS_DENIED_MESSAGE)?,
		}

		map.serialize_entry("status_code", &self.status_code())?;
		map.end()
	}
}

impl<C, M> CidaasClient<C, M>
where
	C: ?Sized + IdpHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Posts `context` to the introspection endpoint and returns the decoded body.
	///
	/// Any status other than 200 fails with [`Error::IntrospectionDenied`]. An empty 200 body
	/// decodes to `null`.
	pub async fn introspect_token(&self, context: &IntrospectionContext) -> Result<Value> {
		const OPERATION: Operation = Operation::Introspection;
		const ENDPOINT: Endpoint = Endpoint::Introspection;

		let span = OperationSpan::new(OPERATION, ENDPOINT, "introspect_token");

		obs::record_operation_outcome(OPERATION, ENDPOINT, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.introspection_request(context)?;
				let response = self.send(OPERATION, request).await?;

				if response.status != GRANTED_STATUS {
					return Err(Error::IntrospectionDenied { status: response.status });
				}

				let body = response.text();

				if body.trim().is_empty() {
					return Ok(Value::Null);
				}

				serde_json::from_str(&body).map_err(|source| {
					Error::from(MalformedJsonError::Json { source, status: response.status })
				})
			})
			.await;

		obs::record_operation_outcome(OPERATION, ENDPOINT, OperationOutcome::of(&result));

		result
	}

	/// Introspects `access_token` in the context of `request`.
	///
	/// Refusals become [`AuthorizationResult::Denied`]. An accepted token whose body cannot be
	/// decoded is granted with `null` data. Transport and configuration failures are returned as
	/// errors.
	pub async fn introspect<R>(
		&self,
		access_token: &str,
		request: &R,
	) -> Result<AuthorizationResult>
	where
		R: ?Sized + InboundRequest,
	{
		let context = IntrospectionContext::from_request(access_token, request);

		decide(self.introspect_token(&context).await)
	}

	/// Locates the bearer token on `request` and introspects it.
	///
	/// A missing token and a refused token both yield [`AuthorizationResult::Denied`].
	pub async fn authorize_request<R>(&self, request: &R) -> Result<AuthorizationResult>
	where
		R: ?Sized + InboundRequest,
	{
		let located = match locate_token(request) {
			Ok(located) => located,
			Err(e) => return decide(Err(e)),
		};

		self.introspect(&located.token, request).await
	}

	fn introspection_request(&self, context: &IntrospectionContext) -> Result<HttpRequest> {
		let body =
			serde_json::to_vec(context).map_err(|source| MalformedJsonError::Serialize { source })?;
		let request = Request::builder()
			.method(Method::POST)
			.uri(self.config.endpoint_url(Endpoint::Introspection))
			.header(CONTENT_TYPE, JSON_CONTENT_TYPE)
			.header(ACCESS_TOKEN_HEADER, context.access_token.as_str())
			.body(body)
			.map_err(ConfigError::from)?;

		Ok(request)
	}
}

fn decide(outcome: Result<Value>) -> Result<AuthorizationResult> {
	match outcome {
		Ok(data) => Ok(AuthorizationResult::Granted(data)),
		// The provider accepted the token; only its payload is unreadable.
		Err(Error::MalformedJson(MalformedJsonError::Json { status: GRANTED_STATUS, .. })) =>
			Ok(AuthorizationResult::Granted(Value::Null)),
		Err(e) if e.is_access_denied() => Ok(AuthorizationResult::Denied),
		Err(e) => Err(e),
	}
}
