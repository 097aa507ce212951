use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::domain::geo::{Location, Route};

const CAPACITY: usize = 100_000;
const TTL: Duration = Duration::from_secs(24 * 60 * 60);

fn fingerprint(origin: Location, destination: Location) -> String {
    format!(
        "{:.6},{:.6};{:.6},{:.6}",
        origin.longitude(),
        origin.latitude(),
        destination.longitude(),
        destination.latitude()
    )
}

struct Entry {
    route: Route,
    cached_at: Instant,
}

/// Bounded, TTL-checked cache of routes keyed by endpoint pair (§4.2).
/// `lru` has no time dimension of its own, so expiry is checked on read and
/// a stale entry is evicted rather than returned.
pub struct RouteCache {
    inner: Mutex<LruCache<String, Entry>>,
}

impl RouteCache {
    pub fn new() -> Self {
        Self { inner: Mutex::new(LruCache::new(NonZeroUsize::new(CAPACITY).unwrap())) }
    }

    pub fn get(&self, origin: Location, destination: Location) -> Option<Route> {
        let key = fingerprint(origin, destination);
        let mut cache = self.inner.lock().expect("route cache mutex poisoned");
        match cache.get(&key) {
            Some(entry) if entry.cached_at.elapsed() < TTL => Some(entry.route.clone()),
            Some(_) => {
                cache.pop(&key);
                None
            }
            None => None,
        }
    }

    /// Write-through on success only; failures are never cached (§4.2).
    pub fn put(&self, origin: Location, destination: Location, route: Route) {
        let key = fingerprint(origin, destination);
        let mut cache = self.inner.lock().expect("route cache mutex poisoned");
        cache.put(key, Entry { route, cached_at: Instant::now() });
    }
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new()
    }
}
