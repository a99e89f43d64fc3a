//! Resource-owner profile returned by the user-info endpoints.

// self
use crate::{_prelude::*, auth::Token};

/// Attribute map describing the owner of a token.
///
/// The owner keeps a weak link back to the token it was fetched with, so dropping the token does
/// not leave a cycle behind.
#[derive(Clone, Debug)]
pub struct ResourceOwner {
	attributes: Map<String, Value>,
	token: Weak<Token>,
}
impl ResourceOwner {
	/// Wraps a user-info document fetched with `token`.
	pub fn new(attributes: Map<String, Value>, token: &Arc<Token>) -> Self {
		Self { attributes, token: Arc::downgrade(token) }
	}

	/// Subject identifier (`sub`).
	pub fn id(&self) -> Option<&str> {
		self.get_str("sub")
	}

	/// E-mail address, if the provider disclosed one.
	pub fn email(&self) -> Option<&str> {
		self.get_str("email")
	}

	/// Returns any attribute by key.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.attributes.get(key)
	}

	/// Returns a string attribute by key.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(Value::as_str)
	}

	/// Full attribute map.
	pub fn attributes(&self) -> &Map<String, Value> {
		&self.attributes
	}

	/// Consumes the owner and returns its attribute map.
	pub fn into_attributes(self) -> Map<String, Value> {
		self.attributes
	}

	/// Token the profile was fetched with, while it is still alive.
	pub fn token(&self) -> Option<Arc<Token>> {
		self.token.upgrade()
	}
}
impl Serialize for ResourceOwner {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		self.attributes.serialize(serializer)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn exposes_attributes_and_weak_token_link() {
		let Value::Object(token_fields) = json!({ "access_token": "T" }) else {
			panic!("Fixture must be a JSON object.");
		};
		let token = Arc::new(
			Token::from_response(token_fields, None, OffsetDateTime::now_utc())
				.expect("Fixture token should build."),
		);
		let Value::Object(attributes) =
			json!({ "sub": "user-1", "email": "user@example.com", "given_name": "Ada" })
		else {
			panic!("Fixture must be a JSON object.");
		};
		let owner = ResourceOwner::new(attributes, &token);

		assert_eq!(owner.id(), Some("user-1"));
		assert_eq!(owner.email(), Some("user@example.com"));
		assert_eq!(owner.get("given_name"), Some(&json!("Ada")));
		assert!(owner.token().is_some_and(|t| t.secret() == "T"));
		assert_eq!(
			serde_json::to_value(&owner).expect("Owner should serialize."),
			json!({ "sub": "user-1", "email": "user@example.com", "given_name": "Ada" })
		);

		drop(token);

		assert!(owner.token().is_none());
	}
}
