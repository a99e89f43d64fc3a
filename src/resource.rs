//! Resource-server path: locating bearer tokens on inbound requests and introspecting them.

pub mod introspection;
pub mod locator;
pub mod request;

pub use introspection::*;
pub use locator::*;
pub use request::*;
