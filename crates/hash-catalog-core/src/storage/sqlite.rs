use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::error::Error;

/// Current catalog layout: printable paths stored split into dir and name.
pub const SCHEMA_VERSION: i64 = 2;
/// The old layout with a single combined `printable_path` column.
pub const LEGACY_SCHEMA_VERSION: i64 = 1;

/// Read-write catalog handle. At most one writer transaction may be active
/// against the catalog at a time; SQLite enforces this, and a second writer
/// fails with SQLITE_BUSY once the busy timeout elapses instead of
/// deadlocking.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

/// Read-only catalog handle for queries. `PRAGMA query_only` makes mutation
/// impossible at the connection level, on top of the read-only open flag, and
/// reads are satisfied from a snapshot while a writer is active.
pub struct ReadOnlyDatabase {
    conn: Connection,
}

impl Database {
    /// Open an existing catalog read-write.
    ///
    /// A missing store file is an error. Maintenance never creates catalogs,
    /// so a mistyped path fails here instead of succeeding against a silently
    /// created empty one.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
        Self::from_connection(conn)
    }

    /// Open a catalog read-write, creating and initializing it when absent.
    pub fn open_or_create(path: &Path) -> Result<Self, Error> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, Error> {
        let db = Database { conn };
        db.configure_pragmas()?;
        db.init_schema()?;
        Ok(db)
    }

    fn configure_pragmas(&self) -> Result<(), Error> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    /// Create the schema on a fresh catalog. Safe to run against an
    /// already-initialized store: everything in schema.sql is IF NOT EXISTS,
    /// and catalogs at the legacy version are left untouched for `migrate`.
    fn init_schema(&self) -> Result<(), Error> {
        match schema_version(&self.conn)? {
            0 => {
                self.conn.execute_batch(include_str!("schema.sql"))?;
                self.conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
                debug!("catalog schema initialized (version {})", SCHEMA_VERSION);
                Ok(())
            }
            SCHEMA_VERSION => {
                self.conn.execute_batch(include_str!("schema.sql"))?;
                Ok(())
            }
            LEGACY_SCHEMA_VERSION => {
                debug!("catalog is at legacy schema version {}", LEGACY_SCHEMA_VERSION);
                Ok(())
            }
            found => Err(Error::SchemaMismatch {
                found,
                expected: SCHEMA_VERSION,
            }),
        }
    }

    pub fn schema_version(&self) -> Result<i64, Error> {
        Ok(schema_version(&self.conn)?)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl ReadOnlyDatabase {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        conn.pragma_update(None, "query_only", true)?;
        conn.pragma_update(None, "busy_timeout", 5000)?;

        let found = schema_version(&conn)?;
        if found != SCHEMA_VERSION {
            return Err(Error::SchemaMismatch {
                found,
                expected: SCHEMA_VERSION,
            });
        }
        Ok(ReadOnlyDatabase { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Determine the schema version of an opened catalog.
///
/// Catalogs written before versions were stamped have `user_version` 0; those
/// are recognized as legacy by the combined `printable_path` column.
fn schema_version(conn: &Connection) -> rusqlite::Result<i64> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version > 0 {
        return Ok(version);
    }
    let combined: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info('hashed') WHERE name = 'printable_path'",
        [],
        |row| row.get(0),
    )?;
    if combined > 0 {
        Ok(LEGACY_SCHEMA_VERSION)
    } else {
        Ok(0)
    }
}
