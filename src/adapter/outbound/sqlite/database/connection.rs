//! Database connection management using Diesel ORM.
//!
//! Provides connection pooling, migration support, and connection
//! configuration for the SQLite sink.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{Error, Result};

/// Embedded database migrations compiled from the migrations/ directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

const BUSY_TIMEOUT_PRAGMA: &str = "PRAGMA busy_timeout=5000";

/// Concurrent category pipelines share one database file; writers wait on
/// the lock instead of failing with `SQLITE_BUSY`.
#[derive(Debug)]
struct BusyTimeout;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for BusyTimeout {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        diesel::sql_query(BUSY_TIMEOUT_PRAGMA)
            .execute(conn)
            .map(|_| ())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Create a connection pool for the given database path.
///
/// # Errors
/// Returns an error if the pool cannot be created.
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(5)
        .connection_customizer(Box::new(BusyTimeout))
        .build(manager)
        .map_err(|e| Error::Connection(e.to_string()))
}

/// Run all pending database migrations.
///
/// # Errors
/// Returns an error if migrations fail.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool.get().map_err(|e| Error::Connection(e.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| Error::Connection(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(diesel::QueryableByName)]
    struct TableName {
        #[diesel(sql_type = diesel::sql_types::Text)]
        name: String,
    }

    #[derive(diesel::QueryableByName)]
    struct TableCount {
        #[diesel(sql_type = diesel::sql_types::BigInt)]
        count: i64,
    }

    fn temp_pool() -> (tempfile::TempDir, DbPool) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.db");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        (dir, pool)
    }

    #[test]
    fn run_migrations_creates_sync_tables() {
        let (_dir, pool) = temp_pool();
        run_migrations(&pool).unwrap();

        let mut conn = pool.get().unwrap();
        let tables: Vec<String> = diesel::sql_query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name",
        )
        .load::<TableName>(&mut conn)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();

        for table in [
            "agents",
            "snapshots",
            "snapshot_history",
            "trades",
            "analytics_snapshots",
            "conversations",
            "account_totals",
            "account_positions",
            "since_inception_values",
            "crypto_prices",
            "sync_runs",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }
    }

    #[test]
    fn run_migrations_is_idempotent_and_seeds_agents_once() {
        let (_dir, pool) = temp_pool();
        run_migrations(&pool).unwrap();
        run_migrations(&pool).unwrap();

        let mut conn = pool.get().unwrap();
        let count = diesel::sql_query("SELECT COUNT(*) AS count FROM agents")
            .load::<TableCount>(&mut conn)
            .unwrap()
            .first()
            .unwrap()
            .count;
        assert_eq!(count, 6);
    }

    #[test]
    fn pooled_connections_share_one_database_file() {
        let (_dir, pool) = temp_pool();
        run_migrations(&pool).unwrap();

        let _held = pool.get().unwrap();
        let mut other = pool.get().unwrap();
        let count = diesel::sql_query("SELECT COUNT(*) AS count FROM sync_runs")
            .load::<TableCount>(&mut other)
            .unwrap()
            .first()
            .unwrap()
            .count;
        assert_eq!(count, 0);
    }
}
