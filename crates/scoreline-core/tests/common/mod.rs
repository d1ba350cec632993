// Shared fixture store for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use rusqlite::Connection;
use scoreline_core::Database;

pub const SCHEMA: &str = include_str!("../fixtures/schema.sql");
pub const SEED: &str = include_str!("../fixtures/seed.sql");

fn seed(conn: &Connection, extra: &str) {
    conn.execute_batch(SCHEMA).expect("fixture schema should apply");
    conn.execute_batch(SEED).expect("fixture seed should apply");
    conn.execute_batch(extra).expect("extra rows should apply");
}

/// In-memory store with the fixture rows.
pub fn seeded() -> Database {
    seeded_with("")
}

pub fn seeded_with(extra: &str) -> Database {
    let conn = Connection::open_in_memory().expect("in-memory database should open");
    seed(&conn, extra);
    Database::from_connection(conn)
}

/// Write the fixture to a fresh file on disk and return its path.
pub fn seeded_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("scoreline_it_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    let path = dir.join(name);
    let _ = std::fs::remove_file(&path);
    let conn = Connection::open(&path).expect("fixture file should open");
    seed(&conn, "");
    path
}
