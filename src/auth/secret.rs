//! Bearer credential wrapper that keeps token material out of logs.

// self
use crate::_prelude::*;

/// Access or refresh token string whose formatters never print the value.
///
/// Serialization emits the plain string, since the introspection payload and persisted tokens
/// need the real value.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Consumes the wrapper and returns the token value.
	pub fn into_inner(self) -> String {
		self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<&str> for TokenSecret {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formatters_redact_but_serialization_does_not() {
		let secret = TokenSecret::new("bearer-value");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(
			serde_json::to_string(&secret).expect("Secret should serialize."),
			"\"bearer-value\""
		);
	}
}
