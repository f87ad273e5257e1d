pub mod assert;

use crate::DbPool;
use anyhow::Context;
use diesel::{
    connection::SimpleConnection,
    r2d2::{ConnectionManager, Error as PoolError},
    SqliteConnection,
};
use r2d2::{CustomizeConnection, PooledConnection};

const SCHEMA_SQL: &str = include_str!("schema.sql");

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, PoolError> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), PoolError> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(PoolError::QueryError)
    }
}

/// Opens the pool and makes sure every table exists.
pub fn init_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .context("Failed to create pool")?;

    let mut conn = pool.get().context("DB connection")?;
    conn.batch_execute(SCHEMA_SQL).context("Failed to create schema")?;

    Ok(pool)
}

pub fn get_db_conn(
    pool: &DbPool,
) -> anyhow::Result<PooledConnection<ConnectionManager<SqliteConnection>>> {
    pool.get().context("DB connection")
}
