use sqlx::{Connection, MySqlConnection};
use std::ops::{Deref, DerefMut};
use tracing::info;

/// Logs a statement right before it is handed to the driver.
pub fn log_query(query: &str) -> &str {
    info!(query, "running sql");
    query
}

/// A single connection that lives for the scope of one job.
///
/// Prefer [`DatabaseConnection::close`] so the shutdown handshake is awaited;
/// dropping it still releases the socket.
pub struct DatabaseConnection {
    conn: MySqlConnection,
}

impl DatabaseConnection {
    pub async fn open(database_url: &str) -> sqlx::Result<Self> {
        info!("Connecting to database");
        let conn = MySqlConnection::connect(database_url).await?;
        Ok(Self { conn })
    }

    pub async fn close(self) -> sqlx::Result<()> {
        self.conn.close().await?;
        info!("Database connection closed");
        Ok(())
    }
}

impl Deref for DatabaseConnection {
    type Target = MySqlConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for DatabaseConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}
