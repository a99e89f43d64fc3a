//! Ordered request-parameter map shared by the authorization and token flows.

// std
use std::slice::Iter;
// self
use crate::_prelude::*;

/// Value stored under a request parameter key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
	/// Plain string value.
	Single(String),
	/// List value, encoded as `key[0]=..&key[1]=..` unless a flow joins it first.
	List(Vec<String>),
}
impl ParamValue {
	/// Returns the string value for [`ParamValue::Single`].
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Single(value) => Some(value),
			Self::List(_) => None,
		}
	}

	/// Returns `true` for an empty string or an empty list.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Single(value) => value.is_empty(),
			Self::List(values) => values.is_empty(),
		}
	}

	/// Collapses the value into a single string, joining list items with `separator`.
	pub fn join(&self, separator: &str) -> String {
		match self {
			Self::Single(value) => value.clone(),
			Self::List(values) => values.join(separator),
		}
	}
}
impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::Single(value.to_owned())
	}
}
impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::Single(value)
	}
}
impl From<&String> for ParamValue {
	fn from(value: &String) -> Self {
		Self::Single(value.clone())
	}
}
impl From<Vec<String>> for ParamValue {
	fn from(values: Vec<String>) -> Self {
		Self::List(values)
	}
}
impl From<Vec<&str>> for ParamValue {
	fn from(values: Vec<&str>) -> Self {
		Self::List(values.into_iter().map(str::to_owned).collect())
	}
}
impl<const N: usize> From<[&str; N]> for ParamValue {
	fn from(values: [&str; N]) -> Self {
		Self::List(values.iter().map(|v| (*v).to_owned()).collect())
	}
}

/// Insertion-ordered parameter map.
///
/// Replacing a key keeps its original position, so merging caller overrides over defaults
/// produces the same key order the defaults established.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestParameters {
	entries: Vec<(String, ParamValue)>,
}
impl RequestParameters {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style [`insert`](Self::insert).
	pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.insert(key, value);

		self
	}

	/// Inserts or replaces `key`, returning the previous value.
	pub fn insert(
		&mut self,
		key: impl Into<String>,
		value: impl Into<ParamValue>,
	) -> Option<ParamValue> {
		let key = key.into();
		let value = value.into();

		match self.entries.iter_mut().find(|(k, _)| *k == key) {
			Some((_, slot)) => Some(std::mem::replace(slot, value)),
			None => {
				self.entries.push((key, value));

				None
			},
		}
	}

	/// Inserts `value` only when `key` is not present yet.
	pub fn insert_if_absent(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
		let key = key.into();

		if !self.contains(&key) {
			self.entries.push((key, value.into()));
		}
	}

	/// Merges `other` into `self`; keys from `other` win.
	pub fn merge(&mut self, other: RequestParameters) {
		for (key, value) in other.entries {
			self.insert(key, value);
		}
	}

	/// Removes `key`, returning its value.
	pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
		let idx = self.entries.iter().position(|(k, _)| k == key)?;

		Some(self.entries.remove(idx).1)
	}

	/// Returns the value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&ParamValue> {
		self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	/// Returns the string stored under `key`, ignoring list values.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(ParamValue::as_str)
	}

	/// Returns `true` when `key` is present (even if empty).
	pub fn contains(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	/// Returns `true` when `key` is present with a non-empty value.
	pub fn is_filled(&self, key: &str) -> bool {
		self.get(key).is_some_and(|v| !v.is_empty())
	}

	/// Number of keys.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` if no keys are present.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterator over entries in insertion order.
	pub fn iter(&self) -> Iter<'_, (String, ParamValue)> {
		self.entries.iter()
	}
}
impl<K, V> FromIterator<(K, V)> for RequestParameters
where
	K: Into<String>,
	V: Into<ParamValue>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		let mut params = Self::new();

		for (key, value) in iter {
			params.insert(key, value);
		}

		params
	}
}
impl<'a> IntoIterator for &'a RequestParameters {
	type IntoIter = Iter<'a, (String, ParamValue)>;
	type Item = &'a (String, ParamValue);

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn replacing_a_key_keeps_its_position() {
		let mut params: RequestParameters =
			[("client_id", "a"), ("grant_type", "x"), ("code", "c")].into_iter().collect();

		params.merge(RequestParameters::new().with("grant_type", "y").with("extra", "e"));

		let keys = params.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>();

		assert_eq!(keys, ["client_id", "grant_type", "code", "extra"]);
		assert_eq!(params.get_str("grant_type"), Some("y"));
	}

	#[test]
	fn insert_if_absent_never_overwrites() {
		let mut params = RequestParameters::new().with("approval_prompt", "force");

		params.insert_if_absent("approval_prompt", "auto");
		params.insert_if_absent("state", "s");

		assert_eq!(params.get_str("approval_prompt"), Some("force"));
		assert_eq!(params.get_str("state"), Some("s"));
	}

	#[test]
	fn filled_checks_reject_empty_values() {
		let params = RequestParameters::new()
			.with("code", "")
			.with("scope", Vec::<String>::new())
			.with("username", "alice");

		assert!(!params.is_filled("code"));
		assert!(!params.is_filled("scope"));
		assert!(!params.is_filled("missing"));
		assert!(params.is_filled("username"));
	}
}
