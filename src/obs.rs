//! Optional observability helpers for identity-provider operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `cidaas_oauth2.operation` with the
//!   `operation`, `endpoint` and `stage` fields.
//! - Enable `metrics` to increment the `cidaas_oauth2_operation_total` counter, labeled by
//!   `operation`, `endpoint` and `outcome`.
//!
//! Access-denied failures (missing or refused tokens) are counted as `denied`, apart from
//! transport and provider failures, so a spike of rejected bearer tokens does not read as an
//! outage.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operation kinds observed by the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Authorization URL construction.
	AuthorizationUrl,
	/// Grant exchange against the token endpoint.
	TokenExchange,
	/// Token check endpoint call.
	TokenValidation,
	/// User-info or user-by-id lookup.
	ResourceOwner,
	/// Resource-server token introspection.
	Introspection,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::AuthorizationUrl => "authorization_url",
			Operation::TokenExchange => "token_exchange",
			Operation::TokenValidation => "token_validation",
			Operation::ResourceOwner => "resource_owner",
			Operation::Introspection => "introspection",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to an adapter operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Token missing or refused by the provider.
	Denied,
	/// Any other failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Classifies a finished operation.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => Self::Success,
			Err(e) if e.is_access_denied() => Self::Denied,
			Err(_) => Self::Failure,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Denied => "denied",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn outcomes_separate_denials_from_failures() {
		assert_eq!(OperationOutcome::of(&Ok::<_, Error>(())), OperationOutcome::Success);
		assert_eq!(
			OperationOutcome::of::<()>(&Err(Error::MissingToken)),
			OperationOutcome::Denied
		);
		assert_eq!(
			OperationOutcome::of::<()>(&Err(Error::IntrospectionDenied { status: 404 })),
			OperationOutcome::Denied
		);
		assert_eq!(
			OperationOutcome::of::<()>(&Err(Error::StateMismatch)),
			OperationOutcome::Failure
		);
		assert_eq!(OperationOutcome::Denied.to_string(), "denied");
	}
}
