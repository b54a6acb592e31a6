// Credential storage
// Pluggable key/value backends for the cached access token

use dashmap::DashMap;
use serde_json::Value;
use std::time::Duration;

/// Key/value storage backing the token cache.
///
/// Contract shared by every backend:
/// - `set` with [`Value::Null`] is a no-op, so a failed lookup can never
///   overwrite a previously cached token with an empty marker.
/// - `ttl` is advisory. Backends without native expiry (like [`MemoryStore`])
///   may ignore it; the token manager's in-memory timestamp remains the
///   authoritative expiry check either way.
///
/// The core performs no locking around its read-check-then-fetch sequence,
/// so concurrent access is only as safe as the backend itself.
pub trait SessionStore: Send + Sync {
    /// Look up a stored value, `None` when absent.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store a value with an optional time-to-live.
    fn set(&self, key: &str, value: Value, ttl: Option<Duration>);

    /// Remove a stored value. Absent keys are not an error.
    fn delete(&self, key: &str);
}

/// Default process-lifetime store backed by a concurrent map.
///
/// Ignores TTL entirely; expiry enforcement relies on the token manager's
/// in-memory timestamp. External TTL-capable backends (a cache service, a
/// database) implement [`SessionStore`] with their native expiry instead.
#[derive(Default)]
pub struct MemoryStore {
    data: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.data.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: Value, _ttl: Option<Duration>) {
        if value.is_null() {
            return;
        }
        self.data.insert(key.to_string(), value);
    }

    fn delete(&self, key: &str) {
        self.data.remove(key);
    }
}
