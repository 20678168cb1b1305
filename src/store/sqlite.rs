//! Local SQLite vault backend.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};

use super::{schema, StoreError, VaultStore};
use crate::models::VaultItem;

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// One database file per project, named after the project identifier.
    pub fn open_in_dir(dir: &Path, project_id: &str) -> Result<Self> {
        let file: String = project_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let path = dir.join(format!("{}.db", file));
        tracing::info!("Opening local vault at {}", path.display());
        Self::open(path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    pub fn upsert_item(&self, item: &VaultItem) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "INSERT INTO vault_items (hash, domain, foundational_rule, mastered_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(hash) DO UPDATE SET
                domain = excluded.domain,
                foundational_rule = excluded.foundational_rule,
                mastered_at = excluded.mastered_at",
            (
                &item.hash,
                &item.domain,
                &item.foundational_rule,
                &item.mastered_at,
            ),
        )?;
        Ok(())
    }

    pub fn get_item(&self, hash: &str) -> Result<Option<VaultItem>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let item = conn
            .query_row(
                "SELECT hash, domain, foundational_rule, mastered_at
                 FROM vault_items WHERE hash = ?",
                [hash],
                row_to_item,
            )
            .optional()?;
        Ok(item)
    }

    pub fn get_all_items(&self) -> Result<Vec<VaultItem>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT hash, domain, foundational_rule, mastered_at
             FROM vault_items ORDER BY mastered_at DESC",
        )?;

        let items = stmt
            .query_map([], row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM vault_items", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<VaultItem> {
    Ok(VaultItem {
        hash: row.get(0)?,
        domain: row.get(1)?,
        foundational_rule: row.get(2)?,
        mastered_at: row.get(3)?,
    })
}

#[async_trait]
impl VaultStore for SqliteStore {
    async fn upsert(&self, item: &VaultItem) -> Result<(), StoreError> {
        self.upsert_item(item)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    async fn list_recent(&self) -> Result<Vec<VaultItem>, StoreError> {
        self.get_all_items()
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}
