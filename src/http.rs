//! Transport primitives for calls against the identity provider.
//!
//! [`IdpHttpClient`] is the adapter's only dependency on an HTTP stack. It hands out
//! [`AsyncHttpClient`] handles from the `oauth2` crate, so any transport that already speaks
//! `oauth2::HttpRequest`/`HttpResponse` plugs in unchanged. Per-request deadlines travel as a
//! [`RequestTimeout`] request extension; transports that support deadlines should honor it.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
use std::time::Duration as StdDuration;
// crates.io
#[cfg(feature = "reqwest")] use oauth2::{HttpRequest, HttpResponse};
use oauth2::{
	AsyncHttpClient, HttpClientError,
	http::{HeaderMap, header::RETRY_AFTER},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;

/// Abstraction over HTTP transports capable of reaching the identity provider.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back many clients, and
/// the handles they return must own whatever state their request futures need so those futures
/// stay `Send` for the lifetime of the in-flight call. Connection and timeout failures must be
/// reported as [`HttpClientError`] values, never as synthesized HTTP responses.
pub trait IdpHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle used for a single call.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle for the next request.
	fn handle(&self) -> Self::Handle;
}

/// Deadline attached to outbound requests as an `http` extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTimeout(pub StdDuration);

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Configure any custom [`ReqwestClient`] to disable redirect following; token and
/// introspection endpoints answer directly and a redirect usually signals a misconfigured base
/// URL.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl IdpHttpClient for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self) -> Self::Handle {
		ReqwestHandle(self.0.clone())
	}
}

/// Handle returned by [`ReqwestHttpClient`] that satisfies [`IdpHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let timeout = request.extensions().get::<RequestTimeout>().map(|t| t.0);
			let mut request: reqwest::Request = request.try_into().map_err(Box::new)?;

			if let Some(timeout) = timeout {
				*request.timeout_mut() = Some(timeout);
			}

			let response = client.execute(request).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Reads a Retry-After header expressed either in seconds or as an RFC 2822 date.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
