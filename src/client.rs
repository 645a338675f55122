//! The charges API client.
//!
//! [`InterClient`] ties the pieces together: a [`TokenCache`] that lazily exchanges client
//! credentials per scope set, a [`RequestExecutor`] that retries transport faults, and thin
//! per-operation methods (see the `charges` and `webhooks` submodules) that validate input,
//! attach the bearer token, and decode typed responses. Clones share the same cache and
//! transport, so a single client can serve many concurrent tasks.

mod charges;
mod webhooks;

// crates.io
use oauth2::{
	HttpRequest, HttpResponse,
	http::{
		HeaderName, Method,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue},
	},
};
use serde::de::DeserializeOwned;
// self
#[cfg(feature = "reqwest")] use crate::http::{ClientIdentity, ReqwestTransport};
use crate::{
	_prelude::*,
	auth::{ScopeSet, Token},
	cache::{TokenCache, TokenCacheMetrics},
	clock::{Clock, SystemClock},
	config::ClientConfig,
	error::ConfigError,
	http::ApiTransport,
	oauth,
	obs::{self, CallKind, CallOutcome, CallSpan, CallStage},
	retry::RequestExecutor,
};

/// Header carrying the checking account when the credentials cover several accounts.
pub const ACCOUNT_HEADER: &str = "x-conta-corrente";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Banco Inter charges client over the mTLS reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestInterClient = InterClient<ReqwestTransport>;

/// Banco Inter charges client over the transport `T`.
///
/// Construction performs no I/O; the first operation triggers the first token exchange.
pub struct InterClient<T>
where
	T: ?Sized + ApiTransport,
{
	config: Arc<ClientConfig>,
	executor: RequestExecutor<T>,
	cache: Arc<TokenCache>,
	clock: Arc<dyn Clock>,
	token_endpoint: Url,
}
impl<T> InterClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client over a caller-supplied transport.
	pub fn with_transport(config: ClientConfig, transport: impl Into<Arc<T>>) -> Result<Self> {
		let token_endpoint = config.token_endpoint()?;
		let clock: Arc<dyn Clock> = Arc::new(SystemClock);
		let cache = Arc::new(TokenCache::new(
			clock.clone(),
			config.token_cache_capacity,
			config.token_expiry_leeway,
		));
		let executor = RequestExecutor::new(transport, config.retry);

		Ok(Self { config: Arc::new(config), executor, cache, clock, token_endpoint })
	}

	/// Replaces the time source; tokens cached so far are discarded.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.cache = Arc::new(TokenCache::new(
			clock.clone(),
			self.config.token_cache_capacity,
			self.config.token_expiry_leeway,
		));
		self.clock = clock;

		self
	}

	/// Settings the client was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Executor shared by every call, including token exchanges.
	pub fn executor(&self) -> &RequestExecutor<T> {
		&self.executor
	}

	/// Token cache shared by every clone.
	pub fn token_cache(&self) -> &TokenCache {
		&self.cache
	}

	/// Token cache counters.
	pub fn token_metrics(&self) -> Arc<TokenCacheMetrics> {
		self.cache.metrics()
	}

	/// Returns a token covering `scope`, exchanging credentials on a miss.
	///
	/// An empty `scope` falls back to [`ClientConfig::default_scope`].
	pub async fn acquire_token(&self, scope: &ScopeSet) -> Result<Token> {
		let scope = if scope.is_empty() { &self.config.default_scope } else { scope };

		self.cache
			.acquire_with(scope, || {
				oauth::exchange_client_credentials(
					&self.executor,
					&self.token_endpoint,
					&self.config.credentials,
					scope,
					self.clock.as_ref(),
				)
			})
			.await
	}

	/// Runs one authenticated call: acquire, send, and on a 401 invalidate and repeat once.
	async fn call<F>(&self, kind: CallKind, scope: &ScopeSet, build: F) -> Result<HttpResponse>
	where
		F: Fn(&Token) -> Result<HttpRequest>,
	{
		let token = self.acquire_token(scope).await?;

		match self.executor.execute(kind, || build(&token)).await {
			Err(e) if e.is_unauthorized() && self.config.reauthenticate_on_unauthorized => {
				obs::reauthenticating(kind);
				self.cache.invalidate(&token);

				let retry = async {
					let fresh = self.acquire_token(scope).await?;

					self.executor.execute(kind, || build(&fresh)).await
				};

				CallSpan::new(kind, CallStage::Reauthenticate).instrument(retry).await
			},
			result => result,
		}
	}

	/// Assembles an authenticated JSON request against `path`.
	fn request(
		&self,
		method: Method,
		path: &str,
		token: &Token,
		body: Option<&[u8]>,
	) -> Result<HttpRequest> {
		let url = self.config.endpoint(path)?;
		let bearer = token
			.access_token
			.bearer_header()
			.map_err(|e| ConfigError::from(oauth2::http::Error::from(e)))?;
		let mut builder = oauth2::http::Request::builder()
			.method(method)
			.uri(url.as_str())
			.header(AUTHORIZATION, bearer)
			.header(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));

		if let Some(account) = &self.config.account {
			builder = builder.header(HeaderName::from_static(ACCOUNT_HEADER), account.as_str());
		}
		if body.is_some() {
			builder = builder.header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
		}

		let request =
			builder.body(body.map(<[u8]>::to_vec).unwrap_or_default()).map_err(ConfigError::from)?;

		Ok(request)
	}
}
#[cfg(feature = "reqwest")]
impl InterClient<ReqwestTransport> {
	/// Builds the mTLS reqwest transport from `identity` and wraps it in a client.
	pub fn connect(config: ClientConfig, identity: ClientIdentity) -> Result<Self> {
		let timeout = std::time::Duration::try_from(config.request_timeout)
			.map_err(ConfigError::http_client_build)?;
		let transport = ReqwestTransport::builder().identity(identity).timeout(timeout).build()?;

		Self::with_transport(config, transport)
	}
}
impl<T> Clone for InterClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			executor: self.executor.clone(),
			cache: self.cache.clone(),
			clock: self.clock.clone(),
			token_endpoint: self.token_endpoint.clone(),
		}
	}
}
impl<T> Debug for InterClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("InterClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("cache", &self.cache)
			.field("executor", &self.executor)
			.finish()
	}
}

/// Wraps an operation future in its span and outcome counters.
async fn observed<R, Fut>(kind: CallKind, fut: Fut) -> Result<R>
where
	Fut: Future<Output = Result<R>>,
{
	let span = CallSpan::new(kind, CallStage::Request);

	obs::record_call_outcome(kind, CallOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => obs::record_call_outcome(kind, CallOutcome::Success),
		Err(_) => obs::record_call_outcome(kind, CallOutcome::Failure),
	}

	result
}

fn decode<D>(response: &HttpResponse) -> Result<D>
where
	D: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(response.body());

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::Decode { status: response.status().as_u16(), source })
}

fn encode<S>(value: &S) -> Result<Vec<u8>>
where
	S: ?Sized + Serialize,
{
	serde_json::to_vec(value).map_err(|source| ConfigError::RequestEncode { source }.into())
}
