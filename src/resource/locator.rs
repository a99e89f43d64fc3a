//! Bearer-token discovery on inbound requests.

// self
use crate::{_prelude::*, client::ACCESS_TOKEN_HEADER, resource::InboundRequest};

const AUTHORIZATION_HEADER: &str = "authorization";
const BEARER_PREFIX: &str = "bearer";

/// Where a located token was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenSource {
	/// `access_token` request header.
	Header,
	/// `access_token` query parameter.
	Query,
	/// `Authorization: Bearer` header.
	AuthorizationHeader,
	/// `access_token` cookie.
	Cookie,
}

/// Bearer token extracted from an inbound request.
#[derive(Clone, PartialEq, Eq)]
pub struct LocatedToken {
	/// Token value.
	pub token: String,
	/// Location the token was read from.
	pub source: TokenSource,
}
impl LocatedToken {
	/// Returns `true` when the token came from a cookie.
	pub fn is_cookie_request(&self) -> bool {
		self.source == TokenSource::Cookie
	}
}
impl Debug for LocatedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LocatedToken")
			.field("token", &"<redacted>")
			.field("source", &self.source)
			.finish()
	}
}

/// Finds the bearer token on `request`.
///
/// The first non-empty match wins, in this order: `access_token` header, `access_token` query
/// parameter, `Authorization: Bearer <token>` header, `access_token` cookie. Fails with
/// [`Error::MissingToken`] when none is present.
pub fn locate_token<R>(request: &R) -> Result<LocatedToken>
where
	R: ?Sized + InboundRequest,
{
	let found = request
		.header(ACCESS_TOKEN_HEADER)
		.filter(|token| !token.is_empty())
		.map(|token| (token.to_owned(), TokenSource::Header))
		.or_else(|| {
			request
				.query(ACCESS_TOKEN_HEADER)
				.filter(|token| !token.is_empty())
				.map(|token| (token, TokenSource::Query))
		})
		.or_else(|| {
			request
				.header(AUTHORIZATION_HEADER)
				.and_then(bearer_token)
				.map(|token| (token.to_owned(), TokenSource::AuthorizationHeader))
		})
		.or_else(|| {
			request
				.cookie(ACCESS_TOKEN_HEADER)
				.filter(|token| !token.is_empty())
				.map(|token| (token, TokenSource::Cookie))
		});

	match found {
		Some((token, source)) => Ok(LocatedToken { token, source }),
		None => Err(Error::MissingToken),
	}
}

fn bearer_token(value: &str) -> Option<&str> {
	let prefix = value.get(..BEARER_PREFIX.len())?;

	if !prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
		return None;
	}

	value.split_whitespace().nth(1)
}
