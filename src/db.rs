use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Mutex;
use thiserror::Error;

use crate::entities::{Account, AccountDraft};

/// Storage failure surfaced to the pipeline.
///
/// Not-found is NOT an error at this layer: lookups return `Ok(None)` so the
/// existence resolver stays the only place that classifies a 404.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// The store seam the pipeline and handlers depend on.
///
/// Injected explicitly (never ambient global state) so tests can substitute
/// doubles. Five operations, each atomic in isolation; no transaction
/// discipline across them.
pub trait AccountStore: Send + Sync {
    fn get_all(&self) -> Result<Vec<Account>, StoreError>;
    fn get_by_id(&self, id: i64) -> Result<Option<Account>, StoreError>;
    fn insert(&self, draft: &AccountDraft) -> Result<Account, StoreError>;
    fn update(&self, id: i64, draft: &AccountDraft) -> Result<Option<Account>, StoreError>;
    fn delete(&self, id: i64) -> Result<Option<Account>, StoreError>;
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            budget REAL NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_accounts_name ON accounts(name)",
        [],
    )?;

    Ok(())
}

/// SQLite-backed account store.
///
/// rusqlite connections are not Sync, so the connection is serialized behind
/// a mutex; each store call holds the lock for one statement.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        SqliteStore {
            conn: Mutex::new(conn),
        }
    }

    /// Fresh in-memory store with the schema applied. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(Self::new(conn))
    }

    fn fetch(conn: &Connection, id: i64) -> rusqlite::Result<Option<Account>> {
        conn.query_row(
            "SELECT id, name, budget FROM accounts WHERE id = ?1",
            params![id],
            |row| {
                Ok(Account {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    budget: row.get(2)?,
                })
            },
        )
        .optional()
    }
}

impl AccountStore for SqliteStore {
    fn get_all(&self) -> Result<Vec<Account>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare("SELECT id, name, budget FROM accounts ORDER BY id")?;
        let accounts = stmt
            .query_map([], |row| {
                Ok(Account {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    budget: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let conn = self.conn.lock().unwrap();
        Ok(Self::fetch(&conn, id)?)
    }

    fn insert(&self, draft: &AccountDraft) -> Result<Account, StoreError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO accounts (name, budget) VALUES (?1, ?2)",
            params![draft.name, draft.budget],
        )?;

        Ok(Account {
            id: conn.last_insert_rowid(),
            name: draft.name.clone(),
            budget: draft.budget,
        })
    }

    fn update(&self, id: i64, draft: &AccountDraft) -> Result<Option<Account>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let changed = conn.execute(
            "UPDATE accounts SET name = ?1, budget = ?2 WHERE id = ?3",
            params![draft.name, draft.budget, id],
        )?;

        if changed == 0 {
            return Ok(None);
        }

        Ok(Some(Account {
            id,
            name: draft.name.clone(),
            budget: draft.budget,
        }))
    }

    fn delete(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let conn = self.conn.lock().unwrap();

        // Capture the snapshot before the row disappears
        let existing = Self::fetch(&conn, id)?;
        if existing.is_some() {
            conn.execute("DELETE FROM accounts WHERE id = ?1", params![id])?;
        }

        Ok(existing)
    }
}

// ============================================================================
// TESTS
// ============================================================================
