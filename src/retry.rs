//! Bounded exponential backoff and the resilient request executor.
//!
//! [`RequestExecutor::send`] runs one logical call as a loop of at most
//! [`RetryPolicy::max_attempts`] attempts. Only transport faults (connection failures,
//! timeouts, TLS errors) are retried; any HTTP response ends the loop, because repeating a
//! request the service already answered cannot change the answer. The request is rebuilt
//! on every attempt since [`HttpRequest`] bodies are consumed by the transport.
//! [`RequestExecutor::execute`] additionally turns non-2xx answers into
//! [`Error::Domain`].

// crates.io
use oauth2::{HttpRequest, HttpResponse};
use rand::Rng;
// self
use crate::{
	_prelude::*,
	config::ConfigBuildError,
	error::{TransientError, TransportError},
	http::ApiTransport,
	obs::{self, CallKind},
};

/// Exponential backoff schedule: `unit × base^retry`, capped at `max`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Backoff {
	/// Exponent base applied per retry.
	pub base: f64,
	/// Delay multiplied by the exponential factor.
	pub unit: Duration,
	/// Upper bound for any single wait.
	pub max: Duration,
	/// Applies equal jitter: half the ceiling plus a random share of the other half.
	pub jitter: bool,
}
impl Backoff {
	/// Schedule that never waits between attempts.
	pub const fn immediate() -> Self {
		Self { base: 1., unit: Duration::ZERO, max: Duration::ZERO, jitter: false }
	}

	/// Deterministic upper bound of the wait before retry number `retry` (1-based).
	pub fn ceiling(&self, retry: u32) -> Duration {
		if self.unit.is_zero() || self.max.is_zero() {
			return Duration::ZERO;
		}

		let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
		let seconds = self.unit.as_seconds_f64() * self.base.powi(exponent);

		if !seconds.is_finite() || seconds >= self.max.as_seconds_f64() {
			return self.max;
		}

		Duration::seconds_f64(seconds)
	}

	/// Wait before retry number `retry`, jittered when enabled.
	pub fn delay_for(&self, retry: u32) -> Duration {
		let ceiling = self.ceiling(retry);

		if !self.jitter || ceiling.is_zero() {
			return ceiling;
		}

		let half = ceiling / 2;

		half + (ceiling - half) * rand::rng().random::<f64>()
	}

	pub(crate) fn validate(&self) -> Result<(), ConfigBuildError> {
		if !self.base.is_finite() || self.base < 1. {
			return Err(ConfigBuildError::InvalidRetryPolicy {
				reason: "backoff base must be a finite number of at least 1",
			});
		}
		if self.unit.is_negative() {
			return Err(ConfigBuildError::InvalidRetryPolicy {
				reason: "backoff unit cannot be negative",
			});
		}
		if self.max < self.unit {
			return Err(ConfigBuildError::InvalidRetryPolicy {
				reason: "backoff cap cannot be smaller than the unit",
			});
		}

		Ok(())
	}
}
impl Default for Backoff {
	fn default() -> Self {
		Self { base: 2., unit: Duration::SECOND, max: Duration::minutes(1), jitter: true }
	}
}

/// Attempt budget plus the backoff schedule applied between attempts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
	max_attempts: u32,
	backoff: Backoff,
}
impl RetryPolicy {
	const DEFAULT_MAX_ATTEMPTS: u32 = 5;

	/// Creates a policy allowing `max_attempts` attempts with the default backoff.
	pub fn new(max_attempts: u32) -> Self {
		Self { max_attempts, backoff: Backoff::default() }
	}

	/// Overrides the backoff schedule.
	pub fn with_backoff(mut self, backoff: Backoff) -> Self {
		self.backoff = backoff;

		self
	}

	/// Total attempts allowed per logical call, first attempt included.
	pub fn max_attempts(&self) -> u32 {
		self.max_attempts
	}

	/// Backoff schedule applied between attempts.
	pub fn backoff(&self) -> &Backoff {
		&self.backoff
	}

	pub(crate) fn validate(&self) -> Result<(), ConfigBuildError> {
		if self.max_attempts == 0 {
			return Err(ConfigBuildError::InvalidRetryPolicy {
				reason: "at least one attempt is required",
			});
		}

		self.backoff.validate()
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(Self::DEFAULT_MAX_ATTEMPTS)
	}
}

/// Runs requests through a transport under a [`RetryPolicy`].
pub struct RequestExecutor<T>
where
	T: ?Sized + ApiTransport,
{
	transport: Arc<T>,
	policy: RetryPolicy,
}
impl<T> RequestExecutor<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates an executor over a shared transport.
	pub fn new(transport: impl Into<Arc<T>>, policy: RetryPolicy) -> Self {
		Self { transport: transport.into(), policy }
	}

	/// Policy applied to every call.
	pub fn policy(&self) -> &RetryPolicy {
		&self.policy
	}

	/// Transport shared by every call.
	pub fn transport(&self) -> &Arc<T> {
		&self.transport
	}

	/// Sends the request built by `build`, retrying transport faults only.
	///
	/// Returns whatever response the service produced, success or not. A builder failure
	/// aborts immediately without consuming the attempt budget.
	pub async fn send<F>(&self, kind: CallKind, mut build: F) -> Result<HttpResponse>
	where
		F: FnMut() -> Result<HttpRequest>,
	{
		let max_attempts = self.policy.max_attempts.max(1);
		let mut attempt = 1;

		loop {
			let request = build()?;

			match self.transport.send(request).await {
				Ok(response) => return Ok(response),
				Err(e) => {
					let fault = TransportError::network(e);

					if attempt >= max_attempts {
						obs::retries_exhausted(kind, attempt, &fault);

						return Err(TransientError::Exhausted {
							call: kind.as_str(),
							attempts: attempt,
							source: fault,
						}
						.into());
					}

					let delay = self.policy.backoff.delay_for(attempt);

					obs::retry_scheduled(kind, attempt, delay, &fault);

					if let Ok(wait) = std::time::Duration::try_from(delay)
						&& !wait.is_zero()
					{
						tokio::time::sleep(wait).await;
					}

					attempt += 1;
				},
			}
		}
	}

	/// Same as [`send`](Self::send), but non-2xx answers become [`Error::Domain`].
	pub async fn execute<F>(&self, kind: CallKind, build: F) -> Result<HttpResponse>
	where
		F: FnMut() -> Result<HttpRequest>,
	{
		let response = self.send(kind, build).await?;
		let status = response.status();

		if status.is_success() {
			return Ok(response);
		}

		let body = String::from_utf8_lossy(response.body()).into_owned();

		obs::call_rejected(kind, status.as_u16());

		Err(Error::Domain { status: status.as_u16(), body })
	}
}
impl<T> Clone for RequestExecutor<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self { transport: self.transport.clone(), policy: self.policy }
	}
}
impl<T> Debug for RequestExecutor<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestExecutor").field("policy", &self.policy).finish()
	}
}
