// Bounded SQLite Connection Pool

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use salon_core::error::{AppError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{ConnectOptions, SqliteConnection};
use tokio::sync::{mpsc, Mutex};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;

/// A fixed-size pool of exclusive SQLite connections.
///
/// All `max_connections` connections are opened eagerly at startup; any
/// open failure is fatal (`PoolInit`). At runtime the pool only lends and
/// takes back those same connections - it never opens a replacement, so the
/// number of live handles against the database file is a hard bound.
///
/// Waiters queue on a fair async mutex in front of the slot channel, so
/// acquisition is FIFO: a burst of concurrent callers gets bounded queuing
/// plus explicit `PoolExhausted` timeouts instead of starvation.
#[derive(Debug)]
pub struct ConnectionPool {
    slots: Mutex<mpsc::Receiver<SqliteConnection>>,
    returns: mpsc::Sender<SqliteConnection>,
    acquire_timeout: Duration,
    capacity: usize,
}

impl ConnectionPool {
    /// Eagerly open `config.max_connections` connections to the database
    /// file and enqueue them. WAL journal mode and a busy timeout keep
    /// concurrent writers from tripping over SQLITE_BUSY immediately.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            // sqlx turns foreign_keys ON by default; this schema's
            // REFERENCES clauses are advisory-only (see DESIGN.md).
            .foreign_keys(false)
            .busy_timeout(Duration::from_secs(5));

        let (returns, slots) = mpsc::channel(config.max_connections);

        for opened in 0..config.max_connections {
            let conn = options.connect().await.map_err(|e| {
                AppError::PoolInit(format!(
                    "failed opening connection {}/{} to {}: {}",
                    opened + 1,
                    config.max_connections,
                    config.database_path,
                    e
                ))
            })?;

            returns
                .try_send(conn)
                .map_err(|_| AppError::PoolInit("pool slot unavailable at startup".to_string()))?;
        }

        info!(
            database = %config.database_path,
            connections = config.max_connections,
            "connection pool ready"
        );

        Ok(Self {
            slots: Mutex::new(slots),
            returns,
            acquire_timeout: config.acquire_timeout,
            capacity: config.max_connections,
        })
    }

    /// Borrow a connection, waiting up to the configured acquire timeout.
    ///
    /// The returned handle gives the caller exclusive use of one connection
    /// and puts it back on the available set when dropped, on every exit
    /// path. On timeout this fails with `PoolExhausted` - it never invents
    /// an extra connection.
    pub async fn acquire(&self) -> Result<PooledConnection> {
        let recv_next = async {
            let mut slots = self.slots.lock().await;
            slots.recv().await
        };

        match timeout(self.acquire_timeout, recv_next).await {
            Ok(Some(conn)) => {
                debug!("connection checked out");
                Ok(PooledConnection {
                    conn: Some(conn),
                    returns: self.returns.clone(),
                })
            }
            // The pool itself holds a sender, so the channel cannot close
            // while `self` is alive.
            Ok(None) => Err(AppError::Database("connection pool closed".to_string())),
            Err(_) => {
                let waited_ms = self.acquire_timeout.as_millis() as u64;
                warn!(waited_ms, "no connection became available before timeout");
                Err(AppError::PoolExhausted { waited_ms })
            }
        }
    }

    /// Configured pool size.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Scoped handle to one pooled connection.
///
/// Dereferences to the underlying `SqliteConnection`. Dropping the handle
/// returns the connection to the pool exactly once, whether the operation
/// finished, failed, or was cancelled mid-await. A transaction left open by
/// a cancelled operation is rolled back by sqlx before the connection runs
/// its next statement, so the connection re-enters the pool clean.
#[derive(Debug)]
pub struct PooledConnection {
    conn: Option<SqliteConnection>,
    returns: mpsc::Sender<SqliteConnection>,
}

impl Deref for PooledConnection {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        self.conn.as_ref().expect("connection present until drop")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_mut().expect("connection present until drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            // Channel capacity equals pool size, so the slot is always
            // free; try_send only fails if the pool itself was dropped,
            // in which case the connection simply closes.
            let _ = self.returns.try_send(conn);
        }
    }
}
