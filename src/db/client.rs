//! PostgreSQL client wrapper.
//!
//! Owns the `tokio_postgres` client and its spawned connection driver.
//! Generated queries run through the simple-query protocol so every
//! cell comes back as server-rendered text, which sidesteps per-OID
//! decoding for arbitrary user tables (NUMERIC, enums, domains).

use crate::config::PgSettings;
use crate::output::ResultSet;
use crate::types::{AssistantError, Result};
use tokio_postgres::{NoTls, SimpleQueryMessage};
use tracing::{debug, info};

/// Connection health report, shown by `nlsql verify`.
#[derive(Debug, Clone)]
pub struct ConnectionReport {
    /// Server version string
    pub server_version: String,
    /// Role the session authenticated as
    pub current_user: String,
    /// Session role
    pub session_user: String,
    /// Connected database
    pub database: String,
    /// Base tables visible outside system schemas
    pub visible_tables: i64,
}

/// A live PostgreSQL connection.
pub struct PgClient {
    client: tokio_postgres::Client,
}

impl PgClient {
    /// Connect to the database and spawn the connection driver task.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Connection` if the server is
    /// unreachable or authentication fails.
    pub async fn connect(settings: &PgSettings) -> Result<Self> {
        let config = settings.to_pg_config();
        let (client, connection) = config.connect(NoTls).await.map_err(|e| {
            AssistantError::Connection(format!(
                "cannot connect to {}:{}/{}: {}",
                settings.host, settings.port, settings.dbname, e
            ))
        })?;

        // The connection object drives the socket; it must be polled
        // for the client to make progress.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                debug!("postgres connection closed: {}", e);
            }
        });

        info!(host = %settings.host, dbname = %settings.dbname, "connected to PostgreSQL");
        Ok(Self { client })
    }

    /// Verify the connection and report what the session can see.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Connection` if the probe queries fail.
    pub async fn verify(&self) -> Result<ConnectionReport> {
        let version_row = self
            .client
            .query_one("SELECT version()", &[])
            .await
            .map_err(|e| AssistantError::Connection(format!("version probe failed: {}", e)))?;
        let server_version: String = version_row.get(0);

        let user_row = self
            .client
            .query_one(
                "SELECT current_user, session_user, current_database()",
                &[],
            )
            .await
            .map_err(|e| AssistantError::Connection(format!("session probe failed: {}", e)))?;

        let count_row = self
            .client
            .query_one(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema NOT IN ('pg_catalog', 'information_schema') \
                 AND table_type = 'BASE TABLE'",
                &[],
            )
            .await
            .map_err(|e| AssistantError::Connection(format!("table probe failed: {}", e)))?;

        Ok(ConnectionReport {
            server_version,
            current_user: user_row.get(0),
            session_user: user_row.get(1),
            database: user_row.get(2),
            visible_tables: count_row.get(0),
        })
    }

    /// Execute a validated SELECT and collect the rows as text.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Query` if the server rejects the
    /// statement.
    pub async fn run_select(&self, sql: &str) -> Result<ResultSet> {
        debug!(sql, "executing query");
        let messages = self
            .client
            .simple_query(sql)
            .await
            .map_err(|e| AssistantError::Query(e.to_string()))?;

        let mut result = ResultSet::default();
        for message in messages {
            match message {
                SimpleQueryMessage::RowDescription(desc) => {
                    result.columns = desc.iter().map(|c| c.name().to_string()).collect();
                }
                SimpleQueryMessage::Row(row) => {
                    if result.columns.is_empty() {
                        result.columns = row
                            .columns()
                            .iter()
                            .map(|c| c.name().to_string())
                            .collect();
                    }
                    let cells = (0..row.len())
                        .map(|i| row.get(i).map(|v| v.to_string()))
                        .collect();
                    result.rows.push(cells);
                }
                SimpleQueryMessage::CommandComplete(_) => {}
                _ => {}
            }
        }
        Ok(result)
    }

    /// Borrow the underlying client for typed queries (introspection).
    pub(crate) fn inner(&self) -> &tokio_postgres::Client {
        &self.client
    }
}
