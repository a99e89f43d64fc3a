// self
use crate::{
	config::Endpoint,
	obs::{Operation, OperationOutcome},
};

/// Counts one `outcome` of `operation` against `endpoint` on the global recorder (when enabled).
pub fn record_operation_outcome(
	operation: Operation,
	endpoint: Endpoint,
	outcome: OperationOutcome,
) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"cidaas_oauth2_operation_total",
			"operation" => operation.as_str(),
			"endpoint" => endpoint.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, endpoint, outcome);
	}
}
