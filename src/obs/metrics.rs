// self
use crate::obs::{CallKind, CallOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"inter_cobranca_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a scheduled retry via the global metrics recorder (when enabled).
pub fn record_retry(kind: CallKind) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("inter_cobranca_retry_total", "call" => kind.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = kind;
	}
}
