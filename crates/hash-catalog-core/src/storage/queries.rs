use rusqlite::{params, Row};

use super::models::{CatalogEntry, RootEntry};
use super::sqlite::ReadOnlyDatabase;
use crate::error::Error;
use crate::paths::RawPath;
use crate::prefix::successor;

const ENTRY_COLUMNS: &str =
    "path, printable_dir, printable_name, modified, apparent_size, read_size, hash";

fn entry_from_row(row: &Row) -> rusqlite::Result<CatalogEntry> {
    let hash: Vec<u8> = row.get(6)?;
    let hash: [u8; 32] = hash.try_into().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            rusqlite::types::Type::Blob,
            "hash is not 32 bytes".into(),
        )
    })?;
    Ok(CatalogEntry {
        path: RawPath::new(row.get(0)?),
        printable_dir: row.get(1)?,
        printable_name: row.get(2)?,
        modified: row.get(3)?,
        apparent_size: row.get(4)?,
        read_size: row.get(5)?,
        hash,
    })
}

impl ReadOnlyDatabase {
    /// Every catalog entry, in storage order.
    pub fn list_all(&self) -> Result<Vec<CatalogEntry>, Error> {
        let mut stmt = self
            .connection()
            .prepare(&format!("SELECT {} FROM hashed", ENTRY_COLUMNS))?;
        let entries = stmt
            .query_map([], entry_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Entries whose raw path begins with `prefix`, ordered by key.
    ///
    /// LIKE does not work on BLOBs (and invites injection), so the prefix is
    /// turned into the key range `[prefix, successor(prefix))` and answered by
    /// a single range scan over the path index. A prefix of all 0xff bytes has
    /// no finite successor and degenerates to an unbounded scan.
    pub fn list_prefix(&self, prefix: &[u8]) -> Result<Vec<CatalogEntry>, Error> {
        let entries = match successor(prefix) {
            Some(upper) => {
                let mut stmt = self.connection().prepare(&format!(
                    "SELECT {} FROM hashed WHERE path >= ?1 AND path < ?2 ORDER BY path",
                    ENTRY_COLUMNS
                ))?;
                let rows = stmt.query_map(params![prefix, upper], entry_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = self.connection().prepare(&format!(
                    "SELECT {} FROM hashed WHERE path >= ?1 ORDER BY path",
                    ENTRY_COLUMNS
                ))?;
                let rows = stmt.query_map(params![prefix], entry_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(entries)
    }

    /// Entries under `prefix` whose hash no other entry shares.
    ///
    /// Uniqueness is checked against the whole catalog, not just the queried
    /// prefix: a duplicate outside the prefix still disqualifies an entry
    /// inside it. The anti-join excludes the entry itself by path inequality,
    /// so the first of several duplicates is never reported as unique.
    pub fn find_unique_hashes(&self, prefix: &[u8]) -> Result<Vec<CatalogEntry>, Error> {
        let unique_filter = "NOT EXISTS (
                 SELECT 1 FROM hashed AS other
                  WHERE other.hash = hashed.hash AND other.path <> hashed.path)";
        let entries = match successor(prefix) {
            Some(upper) => {
                let mut stmt = self.connection().prepare(&format!(
                    "SELECT {} FROM hashed
                      WHERE path >= ?1 AND path < ?2 AND {}
                      ORDER BY path",
                    ENTRY_COLUMNS, unique_filter
                ))?;
                let rows = stmt.query_map(params![prefix, upper], entry_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = self.connection().prepare(&format!(
                    "SELECT {} FROM hashed
                      WHERE path >= ?1 AND {}
                      ORDER BY path",
                    ENTRY_COLUMNS, unique_filter
                ))?;
                let rows = stmt.query_map(params![prefix], entry_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(entries)
    }

    /// Scan roots recorded by the external scanner.
    pub fn roots(&self) -> Result<Vec<RootEntry>, Error> {
        let mut stmt = self
            .connection()
            .prepare("SELECT path, printable_path FROM roots ORDER BY path")?;
        let roots = stmt
            .query_map([], |row| {
                Ok(RootEntry {
                    path: RawPath::new(row.get(0)?),
                    printable_path: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(roots)
    }
}
