//! Connection pool construction.

use anyhow::Context;
use horizon_config::DatabaseConfig;
use sqlx::{PgPool, postgres::PgPoolOptions};

/// Open the shared PostgreSQL pool. Every concurrent request borrows
/// connections from this one pool; individual reads are not wrapped in
/// transactions.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .context("failed to connect to PostgreSQL")
}
