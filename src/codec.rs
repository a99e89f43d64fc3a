//! Query-string codec for authorization URLs and form-encoded token bodies.
//!
//! Encoding follows RFC 3986: every byte outside the unreserved set (`A-Z a-z 0-9 - . _ ~`) is
//! percent-encoded, so a space becomes `%20`, never `+`. Keys keep the order of the input map.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::form_urlencoded;
// self
use crate::params::{ParamValue, RequestParameters};

const RFC3986_UNRESERVED: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Encodes `params` as `key=value` pairs joined by `&`.
///
/// List values expand to `key[0]=a&key[1]=b` with the brackets percent-encoded.
pub fn encode(params: &RequestParameters) -> String {
	let mut buf = String::new();

	for (key, value) in params {
		match value {
			ParamValue::Single(value) => push_pair(&mut buf, key, value),
			ParamValue::List(values) =>
				for (idx, value) in values.iter().enumerate() {
					push_pair(&mut buf, &format!("{key}[{idx}]"), value);
				},
		}
	}

	buf
}

/// Decodes a form-encoded string into a flat map; the last value wins on duplicate keys.
///
/// A leading `?` is ignored and `+` decodes to a space.
pub fn decode(query: &str) -> RequestParameters {
	form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
		.map(|(k, v)| (k.into_owned(), v.into_owned()))
		.collect()
}

/// Appends `query` to `url`.
///
/// Leading and trailing `?`/`&` are trimmed from `query`; the glue is `?` unless `url` already
/// carries a query component, then `&`. An empty query leaves `url` unchanged.
pub fn append_query(url: &str, query: &str) -> String {
	let query = query.trim_matches(|c| c == '?' || c == '&');

	if query.is_empty() {
		return url.to_owned();
	}

	let glue = if url.contains('?') { '&' } else { '?' };

	format!("{url}{glue}{query}")
}

/// Percent-encodes a single component with the RFC 3986 unreserved set.
pub fn encode_component(value: &str) -> String {
	utf8_percent_encode(value, RFC3986_UNRESERVED).to_string()
}

fn push_pair(buf: &mut String, key: &str, value: &str) {
	if !buf.is_empty() {
		buf.push('&');
	}

	buf.extend(utf8_percent_encode(key, RFC3986_UNRESERVED));
	buf.push('=');
	buf.extend(utf8_percent_encode(value, RFC3986_UNRESERVED));
}
