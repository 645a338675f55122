//! Scope-aware bearer token cache with per-scope-set singleflight guards.
//!
//! Lookups scan the entries for a token whose granted scopes cover the requested set and
//! which stays valid past `now + leeway`. Misses take the scope set's async guard, re-scan,
//! and only then run the exchange, so concurrent callers asking for the same scope set share
//! one exchange while disjoint sets proceed in parallel. The entries lock is synchronous and
//! never held across an `.await`.

mod metrics;

pub use self::metrics::*;

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, Token},
	clock::Clock,
	obs,
};

/// Default number of tokens kept before the oldest is evicted.
pub const DEFAULT_CAPACITY: usize = 32;

/// Process-local token cache owned by one client.
pub struct TokenCache {
	entries: Mutex<Vec<Token>>,
	guards: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
	clock: Arc<dyn Clock>,
	capacity: usize,
	leeway: Duration,
	metrics: Arc<TokenCacheMetrics>,
}
impl TokenCache {
	/// Creates an empty cache reading time from `clock`.
	pub fn new(clock: Arc<dyn Clock>, capacity: usize, leeway: Duration) -> Self {
		Self {
			entries: Mutex::new(Vec::new()),
			guards: Mutex::new(HashMap::new()),
			clock,
			capacity: capacity.max(1),
			leeway,
			metrics: Default::default(),
		}
	}

	/// Returns the first cached token usable for `scope`, if any.
	pub fn lookup(&self, scope: &ScopeSet) -> Option<Token> {
		let now = self.clock.now();

		self.entries.lock().iter().find(|token| token.is_usable_for(scope, now, self.leeway)).cloned()
	}

	/// Appends `token` after sweeping expired entries and enforcing the capacity limit.
	pub fn insert(&self, token: Token) {
		let now = self.clock.now();
		let mut entries = self.entries.lock();
		let before = entries.len();

		entries.retain(|entry| !entry.is_expired_at(now));
		entries.push(token);

		let overflow = entries.len().saturating_sub(self.capacity);

		entries.drain(..overflow);

		self.metrics.record_evictions(before + 1 - entries.len());
	}

	/// Removes `token` (matched by its secret). Returns `true` when an entry was removed.
	pub fn invalidate(&self, token: &Token) -> bool {
		let mut entries = self.entries.lock();
		let before = entries.len();

		entries.retain(|entry| entry.access_token != token.access_token);

		let removed = entries.len() < before;

		if removed {
			self.metrics.record_invalidation();
		}

		removed
	}

	/// Number of tokens currently held, expired ones included until the next sweep.
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	/// Returns `true` when no token is held.
	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	/// Activity counters.
	pub fn metrics(&self) -> Arc<TokenCacheMetrics> {
		self.metrics.clone()
	}

	/// Returns a usable token for `scope`, running `exchange` on a miss.
	///
	/// Only one exchange per scope set runs at a time; callers waiting on the guard re-scan
	/// before exchanging and usually find the token the first caller inserted.
	pub async fn acquire_with<F, Fut>(&self, scope: &ScopeSet, exchange: F) -> Result<Token>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<Token>>,
	{
		if let Some(token) = self.hit(scope) {
			return Ok(token);
		}

		let guard = self.guard(scope);
		let _singleflight = guard.lock().await;

		if let Some(token) = self.hit(scope) {
			return Ok(token);
		}

		let token = exchange().await?;

		if token.leeway_exceeds_lifetime(self.leeway) {
			obs::leeway_clamped(&scope.normalized(), token.lifetime(), self.leeway);
		}

		self.metrics.record_exchange();
		self.insert(token.clone());

		Ok(token)
	}

	fn hit(&self, scope: &ScopeSet) -> Option<Token> {
		let token = self.lookup(scope)?;

		self.metrics.record_hit();
		obs::cache_hit(&scope.normalized());

		Some(token)
	}

	fn guard(&self, scope: &ScopeSet) -> Arc<AsyncMutex<()>> {
		let mut guards = self.guards.lock();

		guards.entry(scope.fingerprint()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("entries", &self.len())
			.field("capacity", &self.capacity)
			.field("leeway", &self.leeway)
			.finish()
	}
}
