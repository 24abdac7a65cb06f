//! Database connection management
//!
//! The backup job never creates the store: it opens an existing database
//! read-write (without `CREATE`) so a wrong path fails loudly instead of
//! producing a snapshot of an empty file.

use crate::errors::{store_unreachable, Result};
use rusqlite::{Connection, OpenFlags};
use std::time::Duration;

/// Open an existing SQLite database by path or `file:` URI
pub fn open_existing(target: &str) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Connection::open_with_flags(target, flags).map_err(|e| store_unreachable(target, e))
}

/// Configure a backup connection
///
/// A busy timeout lets the export wait out short write transactions of the
/// running application instead of failing with `SQLITE_BUSY`.
pub fn configure(conn: &Connection, target: &str, busy_timeout: Duration) -> Result<()> {
    conn.busy_timeout(busy_timeout)
        .map_err(|e| store_unreachable(target, e))
}

/// Check that the opened file really is a database
///
/// SQLite opens lazily; the first read is what surfaces "file is not a
/// database" for a mistyped path.
pub fn probe(conn: &Connection, target: &str) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))
        .map_err(|e| store_unreachable(target, e))
}
