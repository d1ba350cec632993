// In-memory store seeded with the shared fixture, for unit tests.

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::store::Database;

pub(crate) const SCHEMA: &str = include_str!("../tests/fixtures/schema.sql");
pub(crate) const SEED: &str = include_str!("../tests/fixtures/seed.sql");

/// Fresh in-memory database with the fixture schema and rows.
pub(crate) fn seeded_db() -> Database {
    seeded_db_with("")
}

/// Seeded database plus extra statements applied on top.
pub(crate) fn seeded_db_with(extra: &str) -> Database {
    let conn = Connection::open_in_memory().expect("in-memory database should open");
    conn.execute_batch(SCHEMA).expect("fixture schema should apply");
    conn.execute_batch(SEED).expect("fixture seed should apply");
    conn.execute_batch(extra).expect("extra fixture rows should apply");
    Database::from_connection(conn)
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
}
