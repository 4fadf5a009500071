pub mod models;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use std::path::Path;

use crate::db::models::{Donation, User};
use crate::state::DbPool;

pub const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_initial",
        include_str!("../../migrations/001_initial.sql"),
    ),
    (
        "002_donations",
        include_str!("../../migrations/002_donations.sql"),
    ),
];

pub fn create_pool(db_path: &Path) -> anyhow::Result<DbPool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            ",
        )
    });
    let pool = Pool::builder().max_size(8).build(manager)?;

    let conn = pool.get()?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        ",
    )?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let conn = pool.get()?;

    // Create migrations tracking table
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM schema_version WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        if !already_applied {
            tracing::info!("Applying migration: {}", name);
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO schema_version (name) VALUES (?1)",
                params![name],
            )?;
        }
    }

    tracing::info!("Database migrations complete");
    Ok(())
}

// --- Users ---

pub fn insert_user(
    conn: &rusqlite::Connection,
    username: &str,
    display_name: Option<&str>,
    password_hash: &str,
) -> Result<User, rusqlite::Error> {
    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO users (id, username, display_name, password_hash) VALUES (?1, ?2, ?3, ?4)",
        params![id, username, display_name, password_hash],
    )?;
    find_user_by_username(conn, username)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

pub fn find_user_by_username(
    conn: &rusqlite::Connection,
    username: &str,
) -> Result<Option<User>, rusqlite::Error> {
    conn.query_row(
        "SELECT id, username, display_name, password_hash, created_at FROM users WHERE username = ?1",
        params![username],
        |row| {
            Ok(User {
                id: row.get(0)?,
                username: row.get(1)?,
                display_name: row.get(2)?,
                password_hash: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )
    .optional()
}

// --- Donations ---

pub fn insert_donation(
    conn: &rusqlite::Connection,
    donor_id: Option<&str>,
    description: &str,
    quantity: &str,
    location: &str,
) -> Result<String, rusqlite::Error> {
    let id = uuid::Uuid::now_v7().to_string();
    let created_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true);
    conn.execute(
        "INSERT INTO donations (id, donor_id, description, quantity, location, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id, donor_id, description, quantity, location, created_at],
    )?;
    Ok(id)
}

pub fn donations_for_donor(
    conn: &rusqlite::Connection,
    donor_id: &str,
) -> Result<Vec<Donation>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, donor_id, description, quantity, location, created_at
         FROM donations
         WHERE donor_id = ?1
         ORDER BY created_at DESC, id DESC
         LIMIT 100",
    )?;

    let donations = stmt
        .query_map(params![donor_id], |row| {
            Ok(Donation {
                id: row.get(0)?,
                donor_id: row.get(1)?,
                description: row.get(2)?,
                quantity: row.get(3)?,
                location: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(donations)
}

#[cfg(test)]
pub(crate) fn test_pool() -> DbPool {
    let manager = SqliteConnectionManager::memory()
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    run_migrations(&pool).unwrap();
    pool
}
