//! Immutable client configuration and the endpoints derived from it.
//!
//! [`ClientConfig`] is built once, either through [`ClientConfig::builder`] or from a JSON
//! document (unknown keys are rejected), and validated up front so a missing base URL fails
//! before any request is assembled.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, codec, error::ConfigError};

/// Remote endpoints exposed by the identity provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	/// Authorization (login) endpoint.
	Authorization,
	/// Token endpoint used for grant exchanges.
	Token,
	/// Token check endpoint answering a bare `true`.
	CheckToken,
	/// User-info endpoint for the token's owner.
	UserInfo,
	/// User-management endpoint addressed by user id.
	UserById,
	/// Resource-server token introspection endpoint.
	Introspection,
}
impl Endpoint {
	/// Path appended to the base URL.
	pub const fn path(self) -> &'static str {
		match self {
			Endpoint::Authorization => "/oauth2-login/oauth2/authz",
			Endpoint::Token => "/oauth2-login/oauth2/token",
			Endpoint::CheckToken => "/oauth2-login/oauth2/checktoken",
			Endpoint::UserInfo => "/oauth2-usermanagement/oauth2/userinfo",
			Endpoint::UserById => "/oauth2-usermanagement/oauth2",
			Endpoint::Introspection => "/token/userinfobytoken",
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Endpoint::Authorization => "authorization",
			Endpoint::Token => "token",
			Endpoint::CheckToken => "check_token",
			Endpoint::UserInfo => "user_info",
			Endpoint::UserById => "user_by_id",
			Endpoint::Introspection => "introspection",
		}
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// HTTP method used when requesting access tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenRequestMethod {
	#[default]
	/// Parameters travel in a form-encoded body.
	Post,
	/// Parameters travel in the query string.
	Get,
}

/// Immutable client configuration.
///
/// Every construction path (builder, [`ClientConfig::from_value`], or a plain serde
/// deserialization) runs the same validation, so a value of this type always has a usable base
/// URL and client id.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClientConfig")]
pub struct ClientConfig {
	base_url: String,
	client_id: String,
	client_secret: Option<String>,
	redirect_uri: Option<String>,
	required_token_parameters: Vec<String>,
	resource_owner_id_key: Option<String>,
	token_request_method: TokenRequestMethod,
	request_timeout: Option<StdDuration>,
}
impl ClientConfig {
	/// Creates a new builder.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Deserializes and validates a configuration from a JSON value.
	///
	/// Unlike a bare `serde_json::from_value`, failures keep their [`ConfigError`] variant and
	/// unknown keys report their path.
	pub fn from_value(value: Value) -> Result<Self, ConfigError> {
		let raw: RawClientConfig = serde_path_to_error::deserialize(value)?;

		raw.try_into()
	}

	/// Deserializes and validates a configuration from a JSON string.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);
		let raw: RawClientConfig = serde_path_to_error::deserialize(&mut de)?;

		raw.try_into()
	}

	/// Provider base URL, without a trailing `/`.
	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// OAuth 2.0 client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Client secret sent with token requests.
	pub fn client_secret(&self) -> Option<&str> {
		self.client_secret.as_deref()
	}

	/// Default redirect URI for authorization and token requests.
	pub fn redirect_uri(&self) -> Option<&str> {
		self.redirect_uri.as_deref()
	}

	/// Provider-declared parameters every token request must carry.
	pub fn required_token_parameters(&self) -> &[String] {
		&self.required_token_parameters
	}

	/// Dotted key path locating the resource-owner id in token responses.
	pub fn resource_owner_id_key(&self) -> Option<&str> {
		self.resource_owner_id_key.as_deref()
	}

	/// Method used for token requests.
	pub fn token_request_method(&self) -> TokenRequestMethod {
		self.token_request_method
	}

	/// Deadline forwarded to the transport for every request.
	pub fn request_timeout(&self) -> Option<StdDuration> {
		self.request_timeout
	}

	/// Full URL for `endpoint`.
	pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
		format!("{}{}", self.base_url, endpoint.path())
	}

	/// User-management URL for `user_id`; the id is percent-encoded as a path segment.
	pub fn user_url(&self, user_id: &str) -> String {
		format!("{}/{}", self.endpoint_url(Endpoint::UserById), codec::encode_component(user_id))
	}
}
impl Debug for ClientConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientConfig")
			.field("base_url", &self.base_url)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("redirect_uri", &self.redirect_uri)
			.field("required_token_parameters", &self.required_token_parameters)
			.field("resource_owner_id_key", &self.resource_owner_id_key)
			.field("token_request_method", &self.token_request_method)
			.field("request_timeout", &self.request_timeout)
			.finish()
	}
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClientConfig {
	base_url: String,
	client_id: String,
	#[serde(default)]
	client_secret: Option<String>,
	#[serde(default)]
	redirect_uri: Option<String>,
	#[serde(default)]
	required_token_parameters: Vec<String>,
	#[serde(default)]
	resource_owner_id_key: Option<String>,
	#[serde(default)]
	token_request_method: TokenRequestMethod,
	#[serde(default)]
	request_timeout: Option<StdDuration>,
}
impl TryFrom<RawClientConfig> for ClientConfig {
	type Error = ConfigError;

	fn try_from(raw: RawClientConfig) -> Result<Self, Self::Error> {
		let base_url = raw.base_url.trim().trim_end_matches('/');

		if base_url.is_empty() {
			return Err(ConfigError::MissingBaseUrl);
		}

		match Url::parse(base_url) {
			Ok(url) if matches!(url.scheme(), "http" | "https") => {},
			Ok(_) => return Err(ConfigError::InvalidBaseUrl { url: base_url.into(), source: None }),
			Err(e) =>
				return Err(ConfigError::InvalidBaseUrl { url: base_url.into(), source: Some(e) }),
		}
		if raw.client_id.is_empty() {
			return Err(ConfigError::MissingClientId);
		}

		Ok(Self {
			base_url: base_url.to_owned(),
			client_id: raw.client_id,
			client_secret: raw.client_secret,
			redirect_uri: raw.redirect_uri,
			required_token_parameters: raw.required_token_parameters,
			resource_owner_id_key: raw.resource_owner_id_key,
			token_request_method: raw.token_request_method,
			request_timeout: raw.request_timeout,
		})
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
	base_url: Option<String>,
	client_id: Option<String>,
	client_secret: Option<String>,
	redirect_uri: Option<String>,
	required_token_parameters: Vec<String>,
	resource_owner_id_key: Option<String>,
	token_request_method: TokenRequestMethod,
	request_timeout: Option<StdDuration>,
}
impl ClientConfigBuilder {
	/// Sets the provider base URL.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets the default redirect URI.
	pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(uri.into());

		self
	}

	/// Declares a parameter every token request must carry.
	pub fn require_token_parameter(mut self, name: impl Into<String>) -> Self {
		self.required_token_parameters.push(name.into());

		self
	}

	/// Sets the dotted key path of the resource-owner id in token responses.
	pub fn resource_owner_id_key(mut self, key: impl Into<String>) -> Self {
		self.resource_owner_id_key = Some(key.into());

		self
	}

	/// Overrides the token request method.
	pub fn token_request_method(mut self, method: TokenRequestMethod) -> Self {
		self.token_request_method = method;

		self
	}

	/// Sets the deadline forwarded to the transport.
	pub fn request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let base_url = self.base_url.ok_or(ConfigError::MissingBaseUrl)?;
		let client_id = self.client_id.ok_or(ConfigError::MissingClientId)?;

		RawClientConfig {
			base_url,
			client_id,
			client_secret: self.client_secret,
			redirect_uri: self.redirect_uri,
			required_token_parameters: self.required_token_parameters,
			resource_owner_id_key: self.resource_owner_id_key,
			token_request_method: self.token_request_method,
			request_timeout: self.request_timeout,
		}
		.try_into()
	}
}
