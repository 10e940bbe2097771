//! Generic stale-while-revalidate engine over a shared key-value store.
//!
//! One [`SwrCache`] manages one [`CacheResource`]. Readers are never made to
//! wait on the persistent store while any copy exists; at most one refresh
//! per resource runs at a time across every instance sharing the store,
//! guarded by the revalidation marker.

use crate::cache::{
    domain::{
        CacheDomainError, CachePolicy, CacheResource, CacheState, RegistrySnapshot,
        RevalidationEvent,
    },
    ports::{DistributedKv, KvError, SnapshotSource, SnapshotSourceError},
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Service-level errors for cache operations.
#[derive(Debug, Error)]
pub enum CacheServiceError {
    /// A cached value could not be encoded or decoded.
    #[error(transparent)]
    Domain(#[from] CacheDomainError),
    /// The authoritative source failed.
    #[error(transparent)]
    Source(#[from] SnapshotSourceError),
    /// The shared store failed.
    #[error(transparent)]
    Kv(#[from] KvError),
}

/// Result type for cache service operations.
pub type CacheServiceResult<T> = Result<T, CacheServiceError>;

/// Stale-while-revalidate cache for one resource.
///
/// Cloning is cheap and clones share the event channel, so a clone can be
/// moved into detached background tasks.
pub struct SwrCache<K, S>
where
    K: DistributedKv + 'static,
    S: SnapshotSource + 'static,
{
    kv: Arc<K>,
    source: Arc<S>,
    resource: CacheResource,
    policy: CachePolicy,
    events: broadcast::Sender<RevalidationEvent>,
}

impl<K, S> Clone for SwrCache<K, S>
where
    K: DistributedKv + 'static,
    S: SnapshotSource + 'static,
{
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
            source: Arc::clone(&self.source),
            resource: self.resource.clone(),
            policy: self.policy,
            events: self.events.clone(),
        }
    }
}

impl<K, S> SwrCache<K, S>
where
    K: DistributedKv + 'static,
    S: SnapshotSource + 'static,
{
    /// Creates a cache for `resource` with the given policy.
    #[must_use]
    pub fn new(kv: Arc<K>, source: Arc<S>, resource: CacheResource, policy: CachePolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            kv,
            source,
            resource,
            policy,
            events,
        }
    }

    /// Returns the managed resource.
    #[must_use]
    pub const fn resource(&self) -> &CacheResource {
        &self.resource
    }

    /// Returns the freshness policy.
    #[must_use]
    pub const fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Subscribes to outcomes of detached background revalidations.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RevalidationEvent> {
        self.events.subscribe()
    }

    /// Reads the resource with stale-while-revalidate semantics.
    ///
    /// Returns the primary copy while fresh. Once it expires the stale
    /// mirror is returned immediately and, unless a refresh is already in
    /// flight, exactly one detached revalidation is started. Only when no
    /// copy exists does the caller wait on the authoritative source.
    ///
    /// # Errors
    ///
    /// Returns [`CacheServiceError::Source`] only on the cold path, when no
    /// copy exists and the synchronous load fails. Store failures on the
    /// read path degrade to misses.
    pub async fn get(&self) -> CacheServiceResult<RegistrySnapshot> {
        if let Some(snapshot) = self.read_copy(self.resource.primary_key()).await {
            return Ok(snapshot);
        }

        let (stale, revalidating) = tokio::join!(
            self.read_copy(self.resource.stale_key()),
            self.revalidation_in_flight()
        );

        if let Some(snapshot) = stale {
            if revalidating {
                debug!(
                    resource = %self.resource,
                    "serving stale copy, revalidation already in flight"
                );
            } else {
                debug!(resource = %self.resource, "serving stale copy, starting revalidation");
                drop(self.spawn_revalidation());
            }
            return Ok(snapshot);
        }

        info!(resource = %self.resource, "no cached copy, loading synchronously");
        let snapshot = self.source.load().await?;
        if let Err(err) = self.store(&snapshot).await {
            warn!(resource = %self.resource, error = %err, "loaded snapshot could not be cached");
        }
        Ok(snapshot)
    }

    /// Loads from the source and writes both the primary and stale copies.
    ///
    /// The two writes run concurrently and are not atomic with respect to
    /// each other. No marker is taken.
    ///
    /// # Errors
    ///
    /// Returns [`CacheServiceError`] when the load or either write fails.
    pub async fn load_and_cache(&self) -> CacheServiceResult<RegistrySnapshot> {
        let snapshot = self.source.load().await?;
        self.store(&snapshot).await?;
        Ok(snapshot)
    }

    /// Reloads the resource, overwriting the primary copy regardless of TTL.
    ///
    /// Failures are logged and reported as `None`; this path may run
    /// unattended.
    pub async fn reload(&self) -> Option<RegistrySnapshot> {
        match self.load_and_cache().await {
            Ok(snapshot) => {
                info!(resource = %self.resource, entries = snapshot.len(), "cache reloaded");
                Some(snapshot)
            }
            Err(err) => {
                error!(resource = %self.resource, error = %err, "cache reload failed");
                None
            }
        }
    }

    /// Refreshes the resource if no other reviver holds the marker.
    ///
    /// The marker is acquired with a per-attempt token and released by
    /// compare-and-delete after the reload, whether it succeeded or not. The
    /// outcome is published to subscribers and returned.
    pub async fn background_revalidate(&self) -> RevalidationEvent {
        let token = Uuid::new_v4().to_string();
        let marker_key = self.resource.revalidating_key();

        let acquired = match self
            .kv
            .acquire(marker_key, &token, self.policy.revalidation_lock_ttl())
            .await
        {
            Ok(acquired) => acquired,
            Err(err) => {
                warn!(resource = %self.resource, error = %err, "revalidation marker acquisition failed");
                return self.publish(RevalidationEvent::Failed {
                    resource: self.resource.clone(),
                    reason: err.to_string(),
                });
            }
        };

        if !acquired {
            debug!(resource = %self.resource, "revalidation skipped, marker held elsewhere");
            return self.publish(RevalidationEvent::SkippedLockHeld {
                resource: self.resource.clone(),
            });
        }

        let outcome = self.load_and_cache().await;

        match self.kv.release(marker_key, &token).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(resource = %self.resource, "revalidation marker lapsed before release");
            }
            Err(err) => {
                warn!(resource = %self.resource, error = %err, "revalidation marker release failed");
            }
        }

        let event = match outcome {
            Ok(snapshot) => {
                info!(resource = %self.resource, entries = snapshot.len(), "cache revalidated");
                RevalidationEvent::Completed {
                    resource: self.resource.clone(),
                    entries: snapshot.len(),
                }
            }
            Err(err) => {
                error!(resource = %self.resource, error = %err, "background revalidation failed");
                RevalidationEvent::Failed {
                    resource: self.resource.clone(),
                    reason: err.to_string(),
                }
            }
        };
        self.publish(event)
    }

    /// Starts a detached revalidation task.
    ///
    /// The handle may be dropped; the outcome is observable through
    /// [`SwrCache::subscribe`].
    #[must_use = "dropping the handle detaches the task"]
    pub fn spawn_revalidation(&self) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            this.background_revalidate().await;
        })
    }

    /// Reports which copies of the resource currently exist.
    ///
    /// # Errors
    ///
    /// Returns [`CacheServiceError::Kv`] when the store cannot be read.
    pub async fn state(&self) -> CacheServiceResult<CacheState> {
        let (primary, stale) = tokio::join!(
            self.kv.get(self.resource.primary_key()),
            self.kv.get(self.resource.stale_key())
        );
        Ok(CacheState::from_presence(primary?.is_some(), stale?.is_some()))
    }

    async fn store(&self, snapshot: &RegistrySnapshot) -> CacheServiceResult<()> {
        let payload = snapshot.encode()?;
        let (primary, stale) = tokio::join!(
            self.kv.set(
                self.resource.primary_key(),
                &payload,
                Some(self.policy.primary_ttl())
            ),
            self.kv.set(self.resource.stale_key(), &payload, None)
        );
        primary?;
        stale?;
        Ok(())
    }

    async fn read_copy(&self, key: &str) -> Option<RegistrySnapshot> {
        let payload = match self.kv.get(key).await {
            Ok(payload) => payload?,
            Err(err) => {
                warn!(resource = %self.resource, key, error = %err, "cache read failed, treating as miss");
                return None;
            }
        };
        match RegistrySnapshot::decode(&payload) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(resource = %self.resource, key, error = %err, "discarding undecodable cache entry");
                None
            }
        }
    }

    async fn revalidation_in_flight(&self) -> bool {
        match self.kv.get(self.resource.revalidating_key()).await {
            Ok(marker) => marker.is_some(),
            Err(err) => {
                warn!(resource = %self.resource, error = %err, "revalidation marker read failed");
                false
            }
        }
    }

    fn publish(&self, event: RevalidationEvent) -> RevalidationEvent {
        if self.events.send(event.clone()).is_err() {
            debug!(resource = %self.resource, "no revalidation subscribers");
        }
        event
    }
}
