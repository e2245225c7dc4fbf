//! Scope-keyed cache of derived values.
//!
//! Signup lists are expensive to derive (one rule-engine pass per signed-up
//! controller), so computed payloads are kept per scope key with a TTL and
//! dropped explicitly whenever the scope changes. Each scope also carries a
//! last-update watermark that outlives the cached payload, letting clients
//! poll "changed since T" without re-fetching.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// Time source abstraction so expiry is deterministic in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub const DEFAULT_TTL_HOURS: i64 = 6;

struct CacheEntry<V> {
    payload: V,
    expires_at: DateTime<Utc>,
}

struct ScopeState<V> {
    entry: Option<CacheEntry<V>>,
    generation: u64,
    last_update: Option<DateTime<Utc>>,
}

impl<V> Default for ScopeState<V> {
    fn default() -> Self {
        Self {
            entry: None,
            generation: 0,
            last_update: None,
        }
    }
}

/// Cache of derived values keyed by a composite scope string, with TTL
/// expiry, explicit invalidation, and per-scope last-update watermarks.
///
/// Scope-local by construction: invalidating one scope never touches
/// another. The interior mutex is never held across an await.
pub struct DerivedCache<V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    scopes: Mutex<HashMap<String, ScopeState<V>>>,
}

impl<V: Clone> DerivedCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            scopes: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_ttl(clock: Arc<dyn Clock>) -> Self {
        Self::new(Duration::hours(DEFAULT_TTL_HOURS), clock)
    }

    /// Cached payload for `scope` if present and not expired.
    pub fn get(&self, scope: &str) -> Option<V> {
        let now = self.clock.now();
        let scopes = self.scopes.lock().expect("cache mutex poisoned");
        scopes
            .get(scope)
            .and_then(|state| state.entry.as_ref())
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.payload.clone())
    }

    /// Compute-through read.
    ///
    /// Concurrent callers may duplicate the computation; that is accepted,
    /// as both produce the same value. A recompute that races an
    /// invalidation is returned to its caller but not stored, so a stale
    /// payload can never outlive the invalidation that obsoleted it.
    pub async fn get_or_compute<F, Fut, E>(&self, scope: &str, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let generation = {
            let now = self.clock.now();
            let mut scopes = self.scopes.lock().expect("cache mutex poisoned");
            let state = scopes.entry(scope.to_string()).or_default();
            if let Some(entry) = &state.entry {
                if entry.expires_at > now {
                    return Ok(entry.payload.clone());
                }
            }
            state.generation
        };

        let payload = compute().await?;

        let expires_at = self.clock.now() + self.ttl;
        let mut scopes = self.scopes.lock().expect("cache mutex poisoned");
        let state = scopes.entry(scope.to_string()).or_default();
        if state.generation == generation {
            state.entry = Some(CacheEntry {
                payload: payload.clone(),
                expires_at,
            });
        }

        Ok(payload)
    }

    /// Drop the scope's entry and advance its last-update watermark.
    ///
    /// The watermark is strictly monotonic per scope even if the clock
    /// stands still, so pollers comparing timestamps never miss an update.
    pub fn invalidate(&self, scope: &str) -> DateTime<Utc> {
        let now = self.clock.now();
        let mut scopes = self.scopes.lock().expect("cache mutex poisoned");
        let state = scopes.entry(scope.to_string()).or_default();

        state.entry = None;
        state.generation += 1;

        let stamp = match state.last_update {
            Some(previous) if now <= previous => previous + Duration::milliseconds(1),
            _ => now,
        };
        state.last_update = Some(stamp);
        stamp
    }

    pub fn last_update(&self, scope: &str) -> Option<DateTime<Utc>> {
        let scopes = self.scopes.lock().expect("cache mutex poisoned");
        scopes.get(scope).and_then(|state| state.last_update)
    }
}
