//! Token and resource-owner models.

pub mod owner;
pub mod secret;
pub mod token;

pub use owner::*;
pub use secret::*;
pub use token::*;
