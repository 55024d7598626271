//! Thread-safe TTL cache mapping request fingerprints to quote results.

// self
use crate::{_prelude::*, quote::ShippingOption};

#[derive(Clone, Debug)]
struct CacheEntry {
	expires_at: OffsetDateTime,
	value: Vec<ShippingOption>,
}

/// In-process quote cache with lazy expiry.
///
/// Entries are replaced whole and evicted when a lookup finds them expired; there is no
/// background sweeper. Empty results are cached like any other result.
#[derive(Debug)]
pub struct QuoteCache {
	ttl: Duration,
	entries: Mutex<HashMap<String, CacheEntry>>,
}
impl QuoteCache {
	/// Creates an empty cache whose entries live for `ttl`.
	pub fn new(ttl: Duration) -> Self {
		Self { ttl, entries: Default::default() }
	}

	/// Configured time-to-live.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Returns the cached value for `fingerprint` if it has not expired.
	pub fn get(&self, fingerprint: &str) -> Option<Vec<ShippingOption>> {
		self.get_at(fingerprint, OffsetDateTime::now_utc())
	}

	/// Stores `value` under `fingerprint`, replacing any previous entry.
	pub fn set(&self, fingerprint: impl Into<String>, value: Vec<ShippingOption>) {
		self.set_at(fingerprint, value, OffsetDateTime::now_utc());
	}

	/// Number of stored entries, expired ones included until they are looked up.
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	/// Removes every entry.
	pub fn clear(&self) {
		self.entries.lock().clear();
	}

	fn get_at(&self, fingerprint: &str, now: OffsetDateTime) -> Option<Vec<ShippingOption>> {
		let mut entries = self.entries.lock();

		match entries.get(fingerprint) {
			Some(entry) if now < entry.expires_at => return Some(entry.value.clone()),
			Some(_) => {},
			None => return None,
		}

		entries.remove(fingerprint);

		None
	}

	fn set_at(&self, fingerprint: impl Into<String>, value: Vec<ShippingOption>, now: OffsetDateTime) {
		let expires_at = now.checked_add(self.ttl).unwrap_or(now);

		self.entries.lock().insert(fingerprint.into(), CacheEntry { expires_at, value });
	}
}
impl Default for QuoteCache {
	fn default() -> Self {
		Self::new(crate::config::QuoteClientConfig::DEFAULT_CACHE_TTL)
	}
}
