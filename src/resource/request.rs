//! Read-only view over an inbound HTTP request.

// crates.io
use oauth2::http::{
	Request,
	header::{COOKIE, HOST},
};
use percent_encoding::percent_decode_str;
// self
use crate::{_prelude::*, codec};

/// Roles and scopes a route demands, attached by the web framework.
///
/// For [`http::Request`](oauth2::http::Request) values the metadata is read from the request
/// extensions; insert it there when routing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteMetadata {
	/// Roles the route requires.
	pub roles: Vec<String>,
	/// Scopes the route requires.
	pub scopes: Vec<String>,
}
impl RouteMetadata {
	/// Creates route metadata from role and scope lists.
	pub fn new<R, S>(roles: R, scopes: S) -> Self
	where
		R: IntoIterator,
		R::Item: Into<String>,
		S: IntoIterator,
		S::Item: Into<String>,
	{
		Self {
			roles: roles.into_iter().map(Into::into).collect(),
			scopes: scopes.into_iter().map(Into::into).collect(),
		}
	}
}

/// Accessors the resource-server path needs from an inbound request.
pub trait InboundRequest {
	/// First value of header `name`; lookups are case-insensitive.
	fn header(&self, name: &str) -> Option<&str>;

	/// Snapshot of every header, keeping the first value per name.
	fn headers(&self) -> BTreeMap<String, String>;

	/// Query parameter `name`; the last occurrence wins.
	fn query(&self, name: &str) -> Option<String>;

	/// Cookie `name`, percent-decoded.
	fn cookie(&self, name: &str) -> Option<String>;

	/// URL of the request without its query string, when it can be reconstructed.
	fn request_url(&self) -> Option<String>;

	/// Roles and scopes required by the matched route.
	fn route_metadata(&self) -> RouteMetadata;
}
impl<B> InboundRequest for Request<B> {
	fn header(&self, name: &str) -> Option<&str> {
		self.headers().get(name).and_then(|value| value.to_str().ok())
	}

	fn headers(&self) -> BTreeMap<String, String> {
		let mut snapshot = BTreeMap::new();

		for (name, value) in Request::headers(self) {
			if let Ok(value) = value.to_str() {
				snapshot.entry(name.as_str().to_owned()).or_insert_with(|| value.to_owned());
			}
		}

		snapshot
	}

	fn query(&self, name: &str) -> Option<String> {
		let query = self.uri().query()?;

		codec::decode(query).get_str(name).map(str::to_owned)
	}

	fn cookie(&self, name: &str) -> Option<String> {
		Request::headers(self)
			.get_all(COOKIE)
			.iter()
			.filter_map(|value| value.to_str().ok())
			.flat_map(|value| value.split(';'))
			.filter_map(|pair| pair.trim().split_once('='))
			.find(|(key, _)| *key == name)
			.map(|(_, value)| {
				percent_decode_str(value.trim_matches('"')).decode_utf8_lossy().into_owned()
			})
	}

	fn request_url(&self) -> Option<String> {
		let uri = self.uri();
		let path = uri.path();

		if let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) {
			return Some(format!("{scheme}://{authority}{path}"));
		}

		let host = InboundRequest::header(self, HOST.as_str())?;
		let scheme = InboundRequest::header(self, "x-forwarded-proto").unwrap_or("http");

		Some(format!("{scheme}://{host}{path}"))
	}

	fn route_metadata(&self) -> RouteMetadata {
		self.extensions().get::<RouteMetadata>().cloned().unwrap_or_default()
	}
}
