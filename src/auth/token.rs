//! Immutable token model produced by grant exchanges.

// crates.io
use serde::{Deserializer, de::Error as DeError};
// self
use crate::{_prelude::*, auth::TokenSecret, error::MalformedJsonError};

/// Access token issued by the token endpoint.
///
/// Every field of the token response is kept verbatim in [`Token::values`]; the typed fields are
/// views over the well-known keys.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Lifetime in seconds, as reported by the provider.
	pub expires_in: Option<i64>,
	/// Expiry instant derived from `issued_at` plus `expires_in`.
	pub expires_at: Option<OffsetDateTime>,
	/// Refresh token secret, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Resource-owner id resolved through the configured key path.
	pub resource_owner_id: Option<Value>,
	/// Instant the response was received.
	pub issued_at: OffsetDateTime,
	/// All response fields, unmodified.
	pub values: Map<String, Value>,
}
impl Token {
	/// Builds a token from a parsed token response.
	///
	/// `resource_owner_id_key` is a dotted path (`user.id`); when it is `None` the
	/// `resource_owner_id` field stays empty.
	pub fn from_response(
		values: Map<String, Value>,
		resource_owner_id_key: Option<&str>,
		issued_at: OffsetDateTime,
	) -> Result<Self> {
		let document = Value::Object(values);
		let fields: TokenFields = serde_path_to_error::deserialize(&document)
			.map_err(|source| MalformedJsonError::TokenShape { source })?;
		let Value::Object(values) = document else {
			return Err(MalformedJsonError::NotAnObject { context: "token response" }.into());
		};
		let resource_owner_id =
			resource_owner_id_key.and_then(|key| lookup_path(&values, key)).cloned();
		let expires_at = fields
			.expires_in
			.and_then(|secs| issued_at.checked_add(Duration::seconds(secs)));

		Ok(Self {
			access_token: TokenSecret::new(fields.access_token),
			expires_in: fields.expires_in,
			expires_at,
			refresh_token: fields.refresh_token.map(TokenSecret::new),
			resource_owner_id,
			issued_at,
			values,
		})
	}

	/// Returns the access token value. Callers must avoid logging this string.
	pub fn secret(&self) -> &str {
		self.access_token.expose()
	}

	/// Returns a raw response field.
	pub fn value(&self, key: &str) -> Option<&Value> {
		self.values.get(key)
	}

	/// Returns `true` if the token has an expiry at or before `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("access_token", &"<redacted>")
			.field("expires_in", &self.expires_in)
			.field("expires_at", &self.expires_at)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("resource_owner_id", &self.resource_owner_id)
			.field("issued_at", &self.issued_at)
			.field("fields", &self.values.keys().collect::<Vec<_>>())
			.finish()
	}
}

#[derive(Deserialize)]
struct TokenFields {
	access_token: String,
	#[serde(default, deserialize_with = "deserialize_seconds")]
	expires_in: Option<i64>,
	#[serde(default)]
	refresh_token: Option<String>,
}

fn deserialize_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Seconds {
		Number(i64),
		Text(String),
	}

	match Option::<Seconds>::deserialize(deserializer)? {
		None => Ok(None),
		Some(Seconds::Number(secs)) => Ok(Some(secs)),
		Some(Seconds::Text(text)) => text
			.trim()
			.parse()
			.map(Some)
			.map_err(|_| DeError::custom(format!("expires_in `{text}` is not a whole number"))),
	}
}

fn lookup_path<'a>(values: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
	if let Some(value) = values.get(path) {
		return Some(value);
	}

	let mut segments = path.split('.');
	let mut current = values.get(segments.next()?)?;

	for segment in segments {
		current = current.as_object()?.get(segment)?;
	}

	Some(current)
}
