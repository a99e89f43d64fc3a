//! Response normalization and error classification.
//!
//! Bodies are parsed before the declared content type is trusted: providers regularly label JSON
//! as `text/html` or `text/plain`, so JSON is always attempted unless the response says it is
//! form-encoded. Only a body that claims to be JSON, or an HTTP 500, turns a JSON failure into an
//! error; anything else falls back to the raw string.

// crates.io
use oauth2::{
	HttpResponse,
	http::{StatusCode, header::CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	codec,
	error::{IdentityProviderError, MalformedJsonError},
	http,
};

const GENERIC_ERROR_MESSAGE: &str = "identity provider returned an error response";

/// Response body normalized by [`parse_response`].
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedResponse {
	/// Decoded JSON (or form-encoded pairs folded into a JSON object).
	Structured(Value),
	/// Body that was neither form-encoded nor JSON, passed through verbatim.
	Raw(String),
}
impl ParsedResponse {
	/// Returns the JSON object, if the body decoded to one.
	pub fn as_object(&self) -> Option<&Map<String, Value>> {
		match self {
			Self::Structured(Value::Object(map)) => Some(map),
			_ => None,
		}
	}

	/// Looks up a top-level field of a JSON object body.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.as_object().and_then(|map| map.get(key))
	}

	/// Returns the raw body for [`ParsedResponse::Raw`].
	pub fn as_raw(&self) -> Option<&str> {
		match self {
			Self::Raw(raw) => Some(raw),
			Self::Structured(_) => None,
		}
	}

	/// Consumes the response and returns its JSON object, failing for any other shape.
	pub fn into_object(self, context: &'static str) -> Result<Map<String, Value>> {
		match self {
			Self::Structured(Value::Object(map)) => Ok(map),
			_ => Err(MalformedJsonError::NotAnObject { context }.into()),
		}
	}
}

/// Status, content type, and body of a provider response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// All `content-type` header values joined with `;`.
	pub content_type: String,
	/// Retry-After hint, when the provider sent one.
	pub retry_after: Option<Duration>,
	/// Response body.
	pub body: Vec<u8>,
}
impl RawResponse {
	/// Creates a response with the given parts and no Retry-After hint.
	pub fn new(status: u16, content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
		Self { status, content_type: content_type.into(), retry_after: None, body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}
impl From<HttpResponse> for RawResponse {
	fn from(response: HttpResponse) -> Self {
		let content_type = response
			.headers()
			.get_all(CONTENT_TYPE)
			.iter()
			.filter_map(|value| value.to_str().ok())
			.collect::<Vec<_>>()
			.join(";");
		let retry_after = http::parse_retry_after(response.headers());

		Self {
			status: response.status().as_u16(),
			content_type,
			retry_after,
			body: response.into_body(),
		}
	}
}

/// Normalizes a raw response body.
///
/// 1. `urlencoded` content types decode into a flat object (last value wins).
/// 2. Everything else is decoded as JSON first.
/// 3. On JSON failure: a JSON content type fails with [`Error::MalformedJson`], a 500 fails with
///    [`Error::ServerErrorNoBody`], and any other response returns [`ParsedResponse::Raw`].
pub fn parse_response(response: &RawResponse) -> Result<ParsedResponse> {
	let content = response.text();
	let content_type = response.content_type.to_ascii_lowercase();

	if content_type.contains("urlencoded") {
		let map = codec::decode(&content)
			.iter()
			.map(|(k, v)| (k.clone(), Value::String(v.join(","))))
			.collect::<Map<_, _>>();

		return Ok(ParsedResponse::Structured(Value::Object(map)));
	}

	match serde_json::from_str::<Value>(&content) {
		Ok(value) => Ok(ParsedResponse::Structured(value)),
		Err(source) if content_type.contains("json") =>
			Err(MalformedJsonError::Json { source, status: response.status }.into()),
		Err(source) if response.status == 500 => Err(Error::ServerErrorNoBody { source }),
		Err(_) => Ok(ParsedResponse::Raw(content)),
	}
}

/// Turns error statuses (`>= 400`) into [`Error::IdentityProvider`]; other responses pass
/// through unchanged.
///
/// The message is the provider's `error` field when present, else the HTTP reason phrase, else
/// a generic message.
pub fn check_response(response: &RawResponse, parsed: ParsedResponse) -> Result<ParsedResponse> {
	if response.status < 400 {
		return Ok(parsed);
	}

	let message = parsed
		.get("error")
		.and_then(value_text)
		.or_else(|| reason_phrase(response.status).map(str::to_owned))
		.unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_owned());
	let description = parsed.get("error_description").and_then(value_text);
	let mut err = IdentityProviderError::response(message, response.status, parsed)
		.with_retry_after(response.retry_after);

	if let Some(description) = description {
		err = err.with_description(description);
	}

	Err(err.into())
}

fn value_text(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(text) if text.is_empty() => None,
		Value::String(text) => Some(text.clone()),
		other => Some(other.to_string()),
	}
}

fn reason_phrase(status: u16) -> Option<&'static str> {
	StatusCode::from_u16(status).ok().and_then(|code| code.canonical_reason())
}
