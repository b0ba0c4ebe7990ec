//! Database module providing connection management and queries.
//!
//! Query methods live on `DbPool` and are grouped by table in the
//! `files` and `access_logs` submodules.

pub mod access_logs;
pub mod files;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::error::{AppError, AppResult};

/// Thin clonable wrapper around the SeaORM connection pool.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect to the database.
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let mut opts = ConnectOptions::new(database_url.to_owned());
        opts.sqlx_logging(false);

        let conn = Database::connect(opts)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(Self { conn })
    }

    /// Wrap an existing connection (used by tests).
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get the underlying connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}
