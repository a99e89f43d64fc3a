//! Client-side operations: authorization URLs, grant exchanges, token validation, and
//! resource-owner lookups.

pub mod authorization;
pub mod exchange;
pub mod resource_owner;
pub mod validation;

pub use authorization::*;
pub use exchange::*;
