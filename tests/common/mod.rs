//! Helpers shared by the integration tests.

#![allow(dead_code)]

// std
use std::{
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use cidaas_oauth2::{
	client::{CidaasClient, DefaultTransportErrorMapper, ReqwestTransportErrorMapper},
	config::ClientConfig,
	http::{IdpHttpClient, ReqwestHttpClient, RequestTimeout},
	oauth2::{
		AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
		http::{HeaderMap, HeaderValue, Method, StatusCode, header::CONTENT_TYPE},
	},
	reqwest::{Client, redirect::Policy},
};
use parking_lot::Mutex;

pub type ReqwestTestClient = CidaasClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;
pub type RecordingTestClient = CidaasClient<RecordingHttpClient, DefaultTransportErrorMapper>;

/// Builds a [`ClientConfig`] pointing at `base_url` with fixed test credentials.
pub fn test_config(base_url: &str) -> ClientConfig {
	ClientConfig::builder()
		.base_url(base_url)
		.client_id("test-client")
		.client_secret("test-secret")
		.redirect_uri("https://app.example.com/callback")
		.build()
		.expect("Failed to build test client configuration.")
}

/// Builds a reqwest-backed client that never follows redirects, so mock servers observe the
/// exact request the adapter issued.
pub fn reqwest_client(config: ClientConfig) -> ReqwestTestClient {
	let client = Client::builder()
		.redirect(Policy::none())
		.build()
		.expect("Failed to build Reqwest client for tests.");

	CidaasClient::with_http_client(
		config,
		ReqwestHttpClient::with_client(client),
		ReqwestTransportErrorMapper,
	)
}

/// Builds a client backed by `transport`.
pub fn recording_client(
	config: ClientConfig,
	transport: &RecordingHttpClient,
) -> RecordingTestClient {
	CidaasClient::with_http_client(config, transport.clone(), DefaultTransportErrorMapper)
}

#[derive(Debug)]
pub struct StubTransportError;
impl Display for StubTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Stub transport refused the connection.")
	}
}
impl std::error::Error for StubTransportError {}

/// Request as observed by [`RecordingHttpClient`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
	pub method: Method,
	pub uri: String,
	pub headers: HeaderMap,
	pub body: Vec<u8>,
	pub timeout: Option<RequestTimeout>,
}
impl RecordedRequest {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	pub fn json(&self) -> serde_json::Value {
		serde_json::from_slice(&self.body).expect("Recorded body should be JSON.")
	}
}

#[derive(Clone, Copy, Debug)]
struct Reply {
	status: u16,
	content_type: &'static str,
	body: &'static str,
}

/// Transport that records every request and answers with a canned reply, or fails when no reply
/// is configured.
#[derive(Clone, Default)]
pub struct RecordingHttpClient {
	calls: Arc<Mutex<Vec<RecordedRequest>>>,
	reply: Option<Reply>,
}
impl RecordingHttpClient {
	pub fn replying(status: u16, content_type: &'static str, body: &'static str) -> Self {
		Self { calls: Default::default(), reply: Some(Reply { status, content_type, body }) }
	}

	pub fn failing() -> Self {
		Self::default()
	}

	pub fn calls(&self) -> Vec<RecordedRequest> {
		self.calls.lock().clone()
	}
}
impl IdpHttpClient for RecordingHttpClient {
	type Handle = RecordingHandle;
	type TransportError = StubTransportError;

	fn handle(&self) -> Self::Handle {
		RecordingHandle { calls: self.calls.clone(), reply: self.reply }
	}
}

pub struct RecordingHandle {
	calls: Arc<Mutex<Vec<RecordedRequest>>>,
	reply: Option<Reply>,
}
impl<'c> AsyncHttpClient<'c> for RecordingHandle {
	type Error = HttpClientError<StubTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let calls = self.calls.clone();
		let reply = self.reply;

		Box::pin(async move {
			calls.lock().push(RecordedRequest {
				method: request.method().clone(),
				uri: request.uri().to_string(),
				headers: request.headers().clone(),
				timeout: request.extensions().get::<RequestTimeout>().copied(),
				body: request.into_body(),
			});

			let Some(reply) = reply else {
				return Err(HttpClientError::Reqwest(Box::new(StubTransportError)));
			};
			let mut response = HttpResponse::new(reply.body.as_bytes().to_vec());

			*response.status_mut() =
				StatusCode::from_u16(reply.status).expect("Stub status should be valid.");
			response
				.headers_mut()
				.insert(CONTENT_TYPE, HeaderValue::from_static(reply.content_type));

			Ok(response)
		})
	}
}
