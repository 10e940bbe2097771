//! Process-local key-value store honouring TTLs.

use crate::cache::ports::{DistributedKv, KvError, KvResult, effective_ttl};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Thread-safe in-memory key-value store.
///
/// Expiry is evaluated lazily against the injected clock: an entry whose
/// deadline has passed is invisible to every operation and is purged on the
/// next write to the same key. Clones share state, which models several
/// service instances talking to one store.
#[derive(Debug, Clone)]
pub struct InMemoryKv<C: Clock> {
    state: Arc<RwLock<HashMap<String, StoredValue>>>,
    clock: Arc<C>,
}

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl StoredValue {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

impl<C: Clock> InMemoryKv<C> {
    /// Creates an empty store driven by `clock`.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            state: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Returns the number of live entries.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::Backend`] when lock acquisition fails.
    pub fn live_len(&self) -> KvResult<usize> {
        let now = self.clock.utc();
        let state = self
            .state
            .read()
            .map_err(|err| KvError::backend(std::io::Error::other(err.to_string())))?;
        Ok(state.values().filter(|entry| entry.is_live(now)).count())
    }

    fn deadline(&self, ttl: Option<Duration>) -> Option<DateTime<Utc>> {
        let lifetime = effective_ttl(ttl)?;
        let delta = TimeDelta::from_std(lifetime).ok()?;
        self.clock.utc().checked_add_signed(delta)
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> DistributedKv for InMemoryKv<C> {
    async fn acquire(&self, key: &str, value: &str, ttl: Duration) -> KvResult<bool> {
        let now = self.clock.utc();
        let expires_at = self.deadline(Some(ttl));
        let mut state = self
            .state
            .write()
            .map_err(|err| KvError::backend(std::io::Error::other(err.to_string())))?;
        if state.get(key).is_some_and(|entry| entry.is_live(now)) {
            return Ok(false);
        }
        state.insert(
            key.to_owned(),
            StoredValue {
                value: value.to_owned(),
                expires_at,
            },
        );
        Ok(true)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> KvResult<()> {
        let expires_at = self.deadline(ttl);
        let mut state = self
            .state
            .write()
            .map_err(|err| KvError::backend(std::io::Error::other(err.to_string())))?;
        state.insert(
            key.to_owned(),
            StoredValue {
                value: value.to_owned(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        let now = self.clock.utc();
        let state = self
            .state
            .read()
            .map_err(|err| KvError::backend(std::io::Error::other(err.to_string())))?;
        Ok(state
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn release(&self, key: &str, expected: &str) -> KvResult<bool> {
        let now = self.clock.utc();
        let mut state = self
            .state
            .write()
            .map_err(|err| KvError::backend(std::io::Error::other(err.to_string())))?;
        let matches = state
            .get(key)
            .is_some_and(|entry| entry.is_live(now) && entry.value == expected);
        if matches {
            state.remove(key);
        }
        Ok(matches)
    }
}
