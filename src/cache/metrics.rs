// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for token cache activity.
#[derive(Debug, Default)]
pub struct TokenCacheMetrics {
	hits: AtomicU64,
	exchanges: AtomicU64,
	invalidations: AtomicU64,
	evictions: AtomicU64,
}
impl TokenCacheMetrics {
	/// Number of acquisitions served from a cached token.
	pub fn hits(&self) -> u64 {
		self.hits.load(Ordering::Relaxed)
	}

	/// Number of successful credential exchanges.
	pub fn exchanges(&self) -> u64 {
		self.exchanges.load(Ordering::Relaxed)
	}

	/// Number of tokens removed after the service rejected them.
	pub fn invalidations(&self) -> u64 {
		self.invalidations.load(Ordering::Relaxed)
	}

	/// Number of entries dropped by expiry sweeps or the capacity limit.
	pub fn evictions(&self) -> u64 {
		self.evictions.load(Ordering::Relaxed)
	}

	pub(crate) fn record_hit(&self) {
		self.hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_exchange(&self) {
		self.exchanges.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_invalidation(&self) {
		self.invalidations.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_evictions(&self, count: usize) {
		if count > 0 {
			self.evictions.fetch_add(count as u64, Ordering::Relaxed);
		}
	}
}
