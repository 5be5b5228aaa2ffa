//! Schema migrations for the progress store, run on every open.
//!
//! Each step is applied in its own transaction and bumps the single row in
//! `schema_version`, so a store left at any earlier version catches up.

use rusqlite::{Connection, Result as SqliteResult};

pub const SCHEMA_VERSION: i32 = 2;

/// `(version, sql)` pairs in ascending order.
const STEPS: &[(i32, &str)] = &[
    // one JSON progress record per user
    (
        1,
        "CREATE TABLE IF NOT EXISTS progress (
            user_id    TEXT PRIMARY KEY,
            record     TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );",
    ),
    // parent -> child account links
    (
        2,
        "CREATE TABLE IF NOT EXISTS parent_links (
            parent_id TEXT NOT NULL,
            child_id  TEXT NOT NULL,
            linked_at TEXT NOT NULL,
            PRIMARY KEY (parent_id, child_id)
        );
        CREATE INDEX IF NOT EXISTS idx_parent_links_child ON parent_links(child_id);",
    ),
];

/// Bring `conn` up to [`SCHEMA_VERSION`]. Safe to call on an up-to-date store.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    migrate_to(conn, SCHEMA_VERSION)
}

fn migrate_to(conn: &Connection, target: i32) -> SqliteResult<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);")?;

    let current = get_schema_version(conn);
    for &(version, sql) in STEPS {
        if version <= current || version > target {
            continue;
        }
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.execute("DELETE FROM schema_version", [])?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
        tx.commit()?;
        tracing::info!(version, "progress store migrated");
    }
    Ok(())
}

/// Stored schema version, 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .unwrap_or_else(|e| {
            if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
                tracing::warn!("cannot read schema_version: {e}");
            }
            0
        })
}
