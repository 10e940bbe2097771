//! Shared test helpers for `PostgreSQL` integration tests.

pub use super::cluster::{BoxError, PostgresCluster, postgres_cluster};
use super::cluster::{ManagedCluster, TemporaryDatabase};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use enfyra_core::schema::domain::{ColumnDefinition, ColumnType, TableDraft};
use rstest::fixture;
use tokio::runtime::Runtime;
use uuid::Uuid;

/// SQL creating the cache and schema metadata tables.
pub const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_core_schema/up.sql");

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "enfyra_test_template";

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a multi-threaded runtime so adapters can use `spawn_blocking`.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn test_runtime() -> Result<Runtime, BoxError> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| Box::new(err) as BoxError)
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: &ManagedCluster) -> Result<(), BoxError> {
    let connection = cluster.connection();
    cluster.ensure_template_exists(TEMPLATE_DB, move |db_name| {
        apply_migrations(&connection.database_url(db_name))
    })
}

fn apply_migrations(url: &str) -> Result<(), BoxError> {
    let mut conn = PgConnection::establish(url).map_err(|err| Box::new(err) as BoxError)?;
    conn.batch_execute(CREATE_SCHEMA_SQL)
        .map_err(|err| Box::new(err) as BoxError)?;
    Ok(())
}

/// A migrated per-test database with a pool and a runtime to drive adapters.
pub struct PgContext {
    pub pool: PgPool,
    pub rt: Runtime,
    temp_db: TemporaryDatabase,
}

impl PgContext {
    /// Runs raw SQL on a fresh connection, outside any adapter transaction.
    pub fn execute(&self, sql: &str) -> Result<(), BoxError> {
        let mut conn =
            PgConnection::establish(&self.temp_db.url()).map_err(|err| Box::new(err) as BoxError)?;
        conn.batch_execute(sql)
            .map_err(|err| Box::new(err) as BoxError)?;
        Ok(())
    }

    /// Whether a base table named `name` exists in the public schema.
    pub fn physical_table_exists(&self, name: &str) -> Result<bool, BoxError> {
        #[derive(diesel::QueryableByName)]
        struct PresentRow {
            #[diesel(sql_type = diesel::sql_types::Bool)]
            present: bool,
        }

        let mut conn =
            PgConnection::establish(&self.temp_db.url()).map_err(|err| Box::new(err) as BoxError)?;
        let row = diesel::sql_query(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_name = $1) AS present",
        )
        .bind::<diesel::sql_types::Text, _>(name)
        .get_result::<PresentRow>(&mut conn)
        .map_err(|err| Box::new(err) as BoxError)?;
        Ok(row.present)
    }
}

fn prepare_context(cluster: PostgresCluster) -> Result<PgContext, BoxError> {
    ensure_template(cluster)?;
    let temp_db = cluster
        .temporary_database_from_template(&format!("test_{}", Uuid::new_v4()), TEMPLATE_DB)?;
    let manager = ConnectionManager::<PgConnection>::new(temp_db.url());
    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|err| Box::new(err) as BoxError)?;
    Ok(PgContext {
        pool,
        rt: test_runtime()?,
        temp_db,
    })
}

/// Provides a freshly migrated database for one test.
#[fixture]
pub fn pg_context(postgres_cluster: PostgresCluster) -> PgContext {
    prepare_context(postgres_cluster).expect("postgres test database")
}

/// Draft with an integer primary key, as every managed table carries one.
#[must_use]
pub fn table_draft(name: &str) -> TableDraft {
    TableDraft::new(name).with_column(ColumnDefinition::primary_id(ColumnType::Int))
}
