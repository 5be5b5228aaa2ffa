//! SQLite-backed progress store.
//!
//! Provides persistent storage for:
//! - One progress record per user, stored as camelCase JSON
//! - Parent ↔ child account links

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::{data_dir, migrations};
use crate::error::StoreError;
use crate::progress::ProgressRecord;

const DB_FILE: &str = "studyquest.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentLink {
    pub parent_id: String,
    pub child_id: String,
    pub linked_at: DateTime<Utc>,
}

/// Local store holding every user's progress record.
///
/// There is one logical writer per user; concurrent writers from other
/// processes are not coordinated and the last save wins.
pub struct ProgressStore {
    pub(crate) conn: Connection,
}

impl ProgressStore {
    /// Open the store at `<data dir>/studyquest.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened
    /// or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir()
            .map_err(|e| StoreError::QueryFailed(format!("data directory unavailable: {e}")))?;
        Self::open_at(&dir.join(DB_FILE))
    }

    /// Open (or create) the store at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        tracing::debug!(path = %path.display(), "progress store opened");
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        migrations::migrate(&self.conn).map_err(|e| StoreError::MigrationFailed(e.to_string()))
    }

    /// Load a user's record, if one was ever saved.
    ///
    /// The stored level is re-derived from experience on the way out.
    pub fn load(&self, user_id: &str) -> Result<Option<ProgressRecord>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT record FROM progress WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        let mut record: ProgressRecord =
            serde_json::from_str(&raw).map_err(|e| StoreError::CorruptRecord {
                user_id: user_id.to_string(),
                message: e.to_string(),
            })?;
        if record.level != crate::progress::level_for(record.experience) {
            tracing::warn!(
                %user_id,
                stored = record.level,
                "stored level out of sync, re-deriving"
            );
            record.normalize();
        }
        Ok(Some(record))
    }

    /// Load a user's record, or a fresh default one for a first-time user.
    pub fn load_or_default(&self, user_id: &str) -> Result<ProgressRecord, StoreError> {
        Ok(self.load(user_id)?.unwrap_or_default())
    }

    pub fn save(&self, user_id: &str, record: &ProgressRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record)
            .map_err(|e| StoreError::QueryFailed(format!("cannot encode record: {e}")))?;
        self.conn.execute(
            "INSERT INTO progress (user_id, record, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET record = excluded.record,
                                                updated_at = excluded.updated_at",
            params![user_id, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// All user ids with a stored record, sorted.
    pub fn users(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id FROM progress ORDER BY user_id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    /// Link a parent account to a child. Returns `false` if already linked.
    pub fn link_parent(&self, parent_id: &str, child_id: &str) -> Result<bool, StoreError> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO parent_links (parent_id, child_id, linked_at)
             VALUES (?1, ?2, ?3)",
            params![parent_id, child_id, Utc::now().to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    /// Remove a link. Returns `false` if there was none.
    pub fn unlink_parent(&self, parent_id: &str, child_id: &str) -> Result<bool, StoreError> {
        let removed = self.conn.execute(
            "DELETE FROM parent_links WHERE parent_id = ?1 AND child_id = ?2",
            params![parent_id, child_id],
        )?;
        Ok(removed > 0)
    }

    pub fn is_linked(&self, parent_id: &str, child_id: &str) -> Result<bool, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM parent_links WHERE parent_id = ?1 AND child_id = ?2",
            params![parent_id, child_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn children_of(&self, parent_id: &str) -> Result<Vec<ParentLink>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT parent_id, child_id, linked_at FROM parent_links
             WHERE parent_id = ?1 ORDER BY child_id",
        )?;
        let rows = stmt.query_map(params![parent_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut links = Vec::new();
        for row in rows {
            let (parent_id, child_id, linked_at) = row?;
            let linked_at = DateTime::parse_from_rfc3339(&linked_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    StoreError::QueryFailed(format!(
                        "bad linked_at '{linked_at}' for {parent_id} -> {child_id}: {e}"
                    ))
                })?;
            links.push(ParentLink {
                parent_id,
                child_id,
                linked_at,
            });
        }
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_user_loads_default() {
        let store = ProgressStore::open_memory().unwrap();
        assert!(store.load("ava").unwrap().is_none());
        let record = store.load_or_default("ava").unwrap();
        assert_eq!(record, ProgressRecord::default());
    }

    #[test]
    fn save_and_load_round_trip() {
        let store = ProgressStore::open_memory().unwrap();
        let mut record = ProgressRecord::default();
        record.experience = 620;
        record.normalize();
        record.completed_chapter_ids.insert("ch1".into());
        store.save("ava", &record).unwrap();

        record.experience = 700;
        store.save("ava", &record).unwrap();

        let loaded = store.load("ava").unwrap().unwrap();
        assert_eq!(loaded, record);
        assert_eq!(store.users().unwrap(), vec!["ava".to_string()]);
    }

    #[test]
    fn load_normalizes_stale_level() {
        let store = ProgressStore::open_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO progress (user_id, record, updated_at) VALUES ('ava', ?1, '')",
                params![r#"{"experience": 1200, "level": 1}"#],
            )
            .unwrap();
        assert_eq!(store.load("ava").unwrap().unwrap().level, 3);
    }

    #[test]
    fn corrupt_record_is_reported() {
        let store = ProgressStore::open_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO progress (user_id, record, updated_at) VALUES ('ava', 'not json', '')",
                [],
            )
            .unwrap();
        assert!(matches!(
            store.load("ava"),
            Err(StoreError::CorruptRecord { .. })
        ));
    }

    #[test]
    fn unreadable_link_timestamp_is_reported() {
        let store = ProgressStore::open_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO parent_links (parent_id, child_id, linked_at)
                 VALUES ('mum', 'ava', 'yesterday')",
                [],
            )
            .unwrap();
        match store.children_of("mum") {
            Err(StoreError::QueryFailed(message)) => assert!(message.contains("yesterday")),
            other => panic!("expected QueryFailed, got {other:?}"),
        }
    }

    #[test]
    fn parent_links() {
        let store = ProgressStore::open_memory().unwrap();
        assert!(store.link_parent("mum", "ava").unwrap());
        assert!(!store.link_parent("mum", "ava").unwrap());
        assert!(store.link_parent("mum", "ben").unwrap());
        assert!(store.is_linked("mum", "ava").unwrap());
        assert!(!store.is_linked("ava", "mum").unwrap());

        let children: Vec<_> = store
            .children_of("mum")
            .unwrap()
            .into_iter()
            .map(|l| l.child_id)
            .collect();
        assert_eq!(children, vec!["ava", "ben"]);

        assert!(store.unlink_parent("mum", "ava").unwrap());
        assert!(!store.unlink_parent("mum", "ava").unwrap());
        assert!(!store.is_linked("mum", "ava").unwrap());
    }

    #[test]
    fn open_at_persists_to_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(DB_FILE);
        {
            let store = ProgressStore::open_at(&path).unwrap();
            store.save("ava", &ProgressRecord::default()).unwrap();
        }
        let store = ProgressStore::open_at(&path).unwrap();
        assert!(store.load("ava").unwrap().is_some());
    }
}
