use std::path::Path;

use rusqlite::{Connection, Transaction};
use tracing::{debug, warn};

use crate::database::schema;
use crate::database::store::{Store, StoreStats};
use crate::error::Result;
use crate::models::RunFingerprint;

/// Owns the store connection for one run. Dropping it closes the connection.
pub struct TransactionManager {
    conn: Connection,
}

impl TransactionManager {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        debug!("Opened database {:?}", path.as_ref());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Runs `f` inside one transaction. Commits on `Ok`, rolls back on `Err`.
    pub fn in_transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction) -> Result<T>,
    {
        let tx = self.conn.transaction()?;
        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                warn!("Rolling back run: {}", e);
                // Dropping the transaction rolls it back as well, this only surfaces errors.
                if let Err(rollback) = tx.rollback() {
                    warn!("Rollback failed: {}", rollback);
                }
                Err(e)
            }
        }
    }

    pub fn stats(&self) -> Result<StoreStats> {
        self.conn.stats()
    }

    pub fn latest_fingerprint(&self) -> Result<Option<RunFingerprint>> {
        self.conn.latest_fingerprint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::models::Artist;
    use tempfile::TempDir;

    fn artist(id: &str) -> Artist {
        Artist {
            id: id.to_string(),
            name: id.to_string(),
            followers: 0,
            popularity: 0,
        }
    }

    #[test]
    fn test_failed_unit_of_work_rolls_back() {
        let mut tm = TransactionManager::open_in_memory().unwrap();

        let result: Result<()> = tm.in_transaction(|tx| {
            tx.append_artists(&[artist("a1")])?;
            Err(SyncError::SourceData("boom".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(tm.stats().unwrap().artists, 0);
    }

    #[test]
    fn test_schema_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("charts.db");

        {
            let mut tm = TransactionManager::new(&path).unwrap();
            tm.in_transaction(|tx| tx.append_artists(&[artist("a1")]))
                .unwrap();
        }

        let tm = TransactionManager::new(&path).unwrap();
        assert_eq!(tm.stats().unwrap().artists, 1);
    }
}
