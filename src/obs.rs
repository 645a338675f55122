//! Optional observability helpers for charge operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `inter_cobranca.call` with the `call`
//!   (operation) and `stage` (`request` or `reauthenticate`) fields, plus `warn!` events for retries and rejected
//!   calls and `debug!` events for token cache activity.
//! - Enable `metrics` to increment the `inter_cobranca_call_total` counter for every
//!   attempt/success/failure, labeled by `call` + `outcome`, and `inter_cobranca_retry_total`
//!   for every scheduled retry, labeled by `call`.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::{_prelude::*, error::TransportError};

/// Outbound call kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Client-credentials exchange against the token endpoint.
	TokenExchange,
	/// `POST /cobranca/v3/cobrancas`.
	IssueCharge,
	/// `GET /cobranca/v3/cobrancas/{id}`.
	QueryCharge,
	/// `GET /cobranca/v3/cobrancas/{id}/pdf`.
	FetchPdf,
	/// `PATCH /cobranca/v3/cobrancas/{id}/cancelar`.
	CancelCharge,
	/// `PUT /cobranca/v3/cobrancas/webhook`.
	RegisterWebhook,
	/// `DELETE /cobranca/v3/cobrancas/webhook`.
	RemoveWebhook,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::TokenExchange => "token_exchange",
			CallKind::IssueCharge => "issue_charge",
			CallKind::QueryCharge => "query_charge",
			CallKind::FetchPdf => "fetch_pdf",
			CallKind::CancelCharge => "cancel_charge",
			CallKind::RegisterWebhook => "register_webhook",
			CallKind::RemoveWebhook => "remove_webhook",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Phase of an operation that a span covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallStage {
	/// The whole operation, from validation to the decoded response.
	Request,
	/// The single repeat after the service rejected the bearer token with a 401.
	Reauthenticate,
}
impl CallStage {
	/// Returns a stable label suitable for span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallStage::Request => "request",
			CallStage::Reauthenticate => "reauthenticate",
		}
	}
}
impl Display for CallStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

pub(crate) fn retry_scheduled(kind: CallKind, attempt: u32, delay: Duration, fault: &TransportError) {
	tracing::emit_retry(kind, attempt, delay, fault);
	metrics::record_retry(kind);
}

pub(crate) fn retries_exhausted(kind: CallKind, attempts: u32, fault: &TransportError) {
	tracing::emit_exhausted(kind, attempts, fault);
}

pub(crate) fn call_rejected(kind: CallKind, status: u16) {
	tracing::emit_rejected(kind, status);
}

pub(crate) fn reauthenticating(kind: CallKind) {
	tracing::emit_reauthenticating(kind);
}

pub(crate) fn cache_hit(scope: &str) {
	tracing::emit_cache_hit(scope);
}

pub(crate) fn token_exchanged(scope: &str, expires_at: OffsetDateTime) {
	tracing::emit_token_exchanged(scope, expires_at);
}

pub(crate) fn leeway_clamped(scope: &str, lifetime: Duration, leeway: Duration) {
	tracing::emit_leeway_clamped(scope, lifetime, leeway);
}
