use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

pub fn init_db() -> Result<Connection> {
    let db_path = crate::global::db_file()?;
    open_db(&db_path)
}

pub fn open_db(db_path: &Path) -> Result<Connection> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let conn = Connection::open(db_path).context("Failed to open database connection")?;

    migrate(&conn)?;

    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .context("Failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS scrums (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            attendees TEXT NOT NULL,
            length_in_minutes INTEGER NOT NULL,
            theme TEXT NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create scrums table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS history (
            id TEXT PRIMARY KEY,
            scrum_id TEXT NOT NULL REFERENCES scrums(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            attendees TEXT NOT NULL,
            length_in_minutes INTEGER NOT NULL,
            transcript TEXT
        )",
        [],
    )
    .context("Failed to create history table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_history_scrum_date ON history(scrum_id, date DESC)",
        [],
    )
    .context("Failed to create history index")?;

    Ok(())
}
