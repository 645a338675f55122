// self
use crate::{
	_prelude::*,
	error::TransportError,
	obs::{CallKind, CallStage},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: CallStage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"inter_cobranca.call",
				call = kind.as_str(),
				stage = stage.as_str()
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

pub(crate) fn emit_retry(kind: CallKind, attempt: u32, delay: Duration, fault: &TransportError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			call = kind.as_str(),
			attempt,
			delay = %delay,
			error = %fault,
			"Transport fault; retrying after backoff."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, attempt, delay, fault);
	}
}

pub(crate) fn emit_exhausted(kind: CallKind, attempts: u32, fault: &TransportError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			call = kind.as_str(),
			attempts,
			error = %fault,
			"Transport faults exhausted the retry budget."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, attempts, fault);
	}
}

pub(crate) fn emit_rejected(kind: CallKind, status: u16) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(call = kind.as_str(), status, "Remote service rejected the call.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, status);
	}
}

pub(crate) fn emit_reauthenticating(kind: CallKind) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(call = kind.as_str(), "Bearer token rejected; re-authenticating once.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = kind;
	}
}

pub(crate) fn emit_cache_hit(scope: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(scope, "Reusing cached token.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = scope;
	}
}

pub(crate) fn emit_token_exchanged(scope: &str, expires_at: OffsetDateTime) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(scope, expires_at = %expires_at, "Exchanged client credentials for a token.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (scope, expires_at);
	}
}

pub(crate) fn emit_leeway_clamped(scope: &str, lifetime: Duration, leeway: Duration) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			scope,
			lifetime = %lifetime,
			leeway = %leeway,
			"Expiry leeway covers the whole token lifetime; capping it at half the lifetime."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (scope, lifetime, leeway);
	}
}
