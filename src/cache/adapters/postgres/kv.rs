//! `PostgreSQL`-backed shared key-value store.
//!
//! Expiry is computed with the database clock so that every instance agrees
//! on when a marker lapses.

use super::models::CacheValueRow;
use crate::cache::ports::{DistributedKv, KvError, KvResult, effective_ttl};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::{BigInt, Nullable, Text};
use std::time::Duration;

/// `PostgreSQL` connection pool type used by cache adapters.
pub type CachePgPool = Pool<ConnectionManager<PgConnection>>;

const ACQUIRE_SQL: &str = "INSERT INTO cache_entries (key, value, expires_at) \
     VALUES ($1, $2, now() + ($3 * interval '1 millisecond')) \
     ON CONFLICT (key) DO UPDATE \
     SET value = EXCLUDED.value, expires_at = EXCLUDED.expires_at \
     WHERE cache_entries.expires_at IS NOT NULL AND cache_entries.expires_at <= now()";

const SET_SQL: &str = "INSERT INTO cache_entries (key, value, expires_at) \
     VALUES ($1, $2, now() + ($3 * interval '1 millisecond')) \
     ON CONFLICT (key) DO UPDATE \
     SET value = EXCLUDED.value, expires_at = EXCLUDED.expires_at";

const GET_SQL: &str = "SELECT value FROM cache_entries \
     WHERE key = $1 AND (expires_at IS NULL OR expires_at > now())";

const RELEASE_SQL: &str = "DELETE FROM cache_entries \
     WHERE key = $1 AND value = $2 AND (expires_at IS NULL OR expires_at > now())";

/// Shared key-value store over the `cache_entries` table.
#[derive(Debug, Clone)]
pub struct PostgresKv {
    pool: CachePgPool,
}

impl PostgresKv {
    /// Creates a store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: CachePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> KvResult<T>
    where
        F: FnOnce(&mut PgConnection) -> KvResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(|err| KvError::Unavailable(err.to_string()))?;
            f(&mut connection)
        })
        .await
        .map_err(KvError::backend)?
    }
}

fn ttl_millis(ttl: Option<Duration>) -> Option<i64> {
    effective_ttl(ttl).map(|duration| i64::try_from(duration.as_millis()).unwrap_or(i64::MAX))
}

#[async_trait]
impl DistributedKv for PostgresKv {
    async fn acquire(&self, key: &str, value: &str, ttl: Duration) -> KvResult<bool> {
        let key_val = key.to_owned();
        let value_val = value.to_owned();
        let ttl_val = ttl_millis(Some(ttl));
        self.run_blocking(move |connection| {
            let affected = diesel::sql_query(ACQUIRE_SQL)
                .bind::<Text, _>(&key_val)
                .bind::<Text, _>(&value_val)
                .bind::<Nullable<BigInt>, _>(ttl_val)
                .execute(connection)
                .map_err(KvError::backend)?;
            Ok(affected > 0)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> KvResult<()> {
        let key_val = key.to_owned();
        let value_val = value.to_owned();
        let ttl_val = ttl_millis(ttl);
        self.run_blocking(move |connection| {
            diesel::sql_query(SET_SQL)
                .bind::<Text, _>(&key_val)
                .bind::<Text, _>(&value_val)
                .bind::<Nullable<BigInt>, _>(ttl_val)
                .execute(connection)
                .map_err(KvError::backend)?;
            Ok(())
        })
        .await
    }

    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        let key_val = key.to_owned();
        self.run_blocking(move |connection| {
            let row = diesel::sql_query(GET_SQL)
                .bind::<Text, _>(&key_val)
                .get_result::<CacheValueRow>(connection)
                .optional()
                .map_err(KvError::backend)?;
            Ok(row.map(|found| found.value))
        })
        .await
    }

    async fn release(&self, key: &str, expected: &str) -> KvResult<bool> {
        let key_val = key.to_owned();
        let expected_val = expected.to_owned();
        self.run_blocking(move |connection| {
            let affected = diesel::sql_query(RELEASE_SQL)
                .bind::<Text, _>(&key_val)
                .bind::<Text, _>(&expected_val)
                .execute(connection)
                .map_err(KvError::backend)?;
            Ok(affected > 0)
        })
        .await
    }
}
