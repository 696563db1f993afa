//! Expiring memo of resolved violation messages.
//!
//! The same violation shape (a malformed field hit on every request) resolves
//! to the same string, so results are cached per `(path, descriptor)`.
//! Entries expire a fixed time after they were written; reads never extend
//! their lifetime.

use moka::sync::Cache;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::path::PropertyPath;
use crate::violation::{ConstraintDescriptor, Violation};

/// Default time-to-live of a cached message.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Default maximum number of cached messages.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Monotonic time source used to judge entry freshness.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// Production clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Structural identity of a violation shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: PropertyPath,
    pub descriptor: ConstraintDescriptor,
}

impl CacheKey {
    #[must_use]
    pub fn new(path: PropertyPath, descriptor: ConstraintDescriptor) -> Self {
        Self { path, descriptor }
    }
}

impl From<&Violation> for CacheKey {
    fn from(v: &Violation) -> Self {
        Self::new(v.path.clone(), v.descriptor.clone())
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    message: String,
    written_at: Instant,
}

/// Concurrent TTL cache of resolved messages.
///
/// Expiry and size bounding are delegated to `moka`. The write instant is
/// also kept on each entry and checked against the injected [`Clock`], so a
/// non-system clock sees the same expiry.
pub struct MessageCache {
    entries: Cache<CacheKey, CacheEntry>,
    ttl: Duration,
    enabled: bool,
    clock: Arc<dyn Clock>,
}

impl MessageCache {
    /// Cache with the given TTL and optional size bound, using the system clock.
    #[must_use]
    pub fn new(ttl: Duration, max_entries: Option<usize>) -> Self {
        Self::with_clock(ttl, max_entries, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(ttl: Duration, max_entries: Option<usize>, clock: Arc<dyn Clock>) -> Self {
        let mut builder = Cache::builder().time_to_live(ttl);
        if let Some(max) = max_entries {
            builder = builder.max_capacity(u64::try_from(max).unwrap_or(u64::MAX));
        }

        Self {
            entries: builder.build(),
            ttl,
            enabled: max_entries != Some(0),
            clock,
        }
    }

    /// Return the cached message for `key`, computing and storing it on a
    /// miss or after expiry.
    ///
    /// Concurrent misses on the same key may each call `compute`; the last
    /// write wins. Errors are returned as-is and never cached.
    ///
    /// # Errors
    /// Propagates the error returned by `compute`.
    pub fn get_or_compute<F, E>(&self, key: CacheKey, compute: F) -> Result<String, E>
    where
        F: FnOnce() -> Result<String, E>,
    {
        let now = self.clock.now();

        match self.entries.get(&key) {
            Some(entry) if self.is_fresh(entry.written_at, now) => {
                tracing::trace!(path = %key.path, "Violation message cache hit");
                return Ok(entry.message);
            }
            Some(_) => {
                tracing::debug!(path = %key.path, "Violation message cache entry expired");
                self.entries.invalidate(&key);
            }
            None => {
                tracing::debug!(path = %key.path, "Violation message cache miss");
            }
        }

        let message = compute()?;
        if self.enabled {
            self.entries.insert(
                key,
                CacheEntry {
                    message: message.clone(),
                    written_at: now,
                },
            );
        }
        Ok(message)
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        for (key, entry) in &self.entries {
            if !self.is_fresh(entry.written_at, now) {
                self.entries.invalidate(&*key);
            }
        }
        self.entries.run_pending_tasks();
    }

    /// Number of live entries, after pending evictions are applied.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        usize::try_from(self.entries.entry_count()).unwrap_or(usize::MAX)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, written_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(written_at) < self.ttl
    }
}

impl Default for MessageCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, Some(DEFAULT_MAX_ENTRIES))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::path::Node;
    use parking_lot::Mutex;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Clock that only moves when told to.
    #[derive(Debug)]
    struct ManualClock {
        base: Instant,
        offset: Mutex<Duration>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                base: Instant::now(),
                offset: Mutex::new(Duration::ZERO),
            }
        }

        fn advance(&self, by: Duration) {
            *self.offset.lock() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.base + *self.offset.lock()
        }
    }

    fn key(field: &str) -> CacheKey {
        CacheKey::new(
            PropertyPath::new([Node::property(field)]).unwrap(),
            ConstraintDescriptor::new("NotBlank"),
        )
    }

    fn counting(calls: &AtomicUsize, value: &str) -> Result<String, Infallible> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value.to_owned())
    }

    #[test]
    fn structurally_equal_keys_share_an_entry() {
        let cache = MessageCache::default();
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_compute(key("name"), || counting(&calls, "name must not be blank"));
        let second = cache.get_or_compute(key("name"), || counting(&calls, "something else"));

        assert_eq!(first, Ok("name must not be blank".to_owned()));
        assert_eq!(second, first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn entry_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = MessageCache::with_clock(DEFAULT_TTL, None, clock.clone());
        let calls = AtomicUsize::new(0);

        cache
            .get_or_compute(key("name"), || counting(&calls, "stale"))
            .unwrap();

        clock.advance(DEFAULT_TTL - Duration::from_secs(1));
        let still_cached = cache
            .get_or_compute(key("name"), || counting(&calls, "fresh"))
            .unwrap();
        assert_eq!(still_cached, "stale");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(1));
        let recomputed = cache
            .get_or_compute(key("name"), || counting(&calls, "fresh"))
            .unwrap();
        assert_eq!(recomputed, "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reads_do_not_extend_lifetime() {
        let clock = Arc::new(ManualClock::new());
        let ttl = Duration::from_secs(10);
        let cache = MessageCache::with_clock(ttl, None, clock.clone());
        let calls = AtomicUsize::new(0);

        cache.get_or_compute(key("age"), || counting(&calls, "v1")).unwrap();
        for _ in 0..3 {
            clock.advance(Duration::from_secs(3));
            cache.get_or_compute(key("age"), || counting(&calls, "v2")).unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(1));
        let value = cache.get_or_compute(key("age"), || counting(&calls, "v2")).unwrap();
        assert_eq!(value, "v2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = MessageCache::default();

        let failed: Result<String, &str> = cache.get_or_compute(key("name"), || Err("boom"));
        assert_eq!(failed, Err("boom"));
        assert!(cache.is_empty());

        let ok: Result<String, &str> = cache.get_or_compute(key("name"), || Ok("fine".to_owned()));
        assert_eq!(ok, Ok("fine".to_owned()));
    }

    #[test]
    fn bounded_cache_stays_within_bound() {
        let cache = MessageCache::new(DEFAULT_TTL, Some(8));
        let calls = AtomicUsize::new(0);

        for i in 0..100 {
            let field = format!("field{i}");
            let value = cache
                .get_or_compute(key(&field), || counting(&calls, &field))
                .unwrap();
            assert_eq!(value, field);
        }
        assert!(cache.len() <= 8, "len = {}", cache.len());
        assert_eq!(calls.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn zero_bound_stores_nothing() {
        let cache = MessageCache::new(DEFAULT_TTL, Some(0));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value = cache
                .get_or_compute(key("name"), || counting(&calls, "computed"))
                .unwrap();
            assert_eq!(value, "computed");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn purge_drops_only_expired_entries() {
        let clock = Arc::new(ManualClock::new());
        let cache = MessageCache::with_clock(Duration::from_secs(10), None, clock.clone());
        let calls = AtomicUsize::new(0);

        cache.get_or_compute(key("old"), || counting(&calls, "old")).unwrap();
        clock.advance(Duration::from_secs(6));
        cache.get_or_compute(key("new"), || counting(&calls, "new")).unwrap();
        clock.advance(Duration::from_secs(6));

        cache.purge_expired();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.ttl(), Duration::from_secs(10));
    }

    #[test]
    fn concurrent_readers_and_writers_agree() {
        let cache = Arc::new(MessageCache::new(DEFAULT_TTL, Some(32)));

        let workers: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for j in 0..200 {
                        let field = format!("field{}", (j + t) % 24);
                        let expected = format!("{field} must not be blank");
                        let got = cache
                            .get_or_compute(key(&field), || {
                                Ok::<_, Infallible>(format!("{field} must not be blank"))
                            })
                            .unwrap();
                        assert_eq!(got, expected);
                    }
                })
            })
            .collect();

        for w in workers {
            w.join().unwrap();
        }

        assert!(cache.len() <= 24, "len = {}", cache.len());
        for i in 0..24 {
            let field = format!("field{i}");
            let got = cache
                .get_or_compute(key(&field), || Ok::<_, Infallible>(format!("{field} must not be blank")))
                .unwrap();
            assert_eq!(got, format!("{field} must not be blank"));
        }
    }
}
