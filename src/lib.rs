//! Cidaas OAuth 2.0 adapter: authorization URLs, grant exchanges, token validation, and the
//! resource-server bearer-token introspection path, all over a pluggable HTTP transport.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod params;
pub mod resource;
pub mod response;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::{Arc, Weak},
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use {oauth2, url};
#[cfg(test)] use {color_eyre as _, httpmock as _, parking_lot as _};
