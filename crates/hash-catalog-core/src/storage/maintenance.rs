//! Catalog maintenance: pruning entries whose file is gone, and migrating the
//! on-disk layout. Both run their read and write phases inside one
//! transaction, so a concurrent reader observes either the old or the new
//! state, never an intermediate one.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::MAIN_SEPARATOR;

use rusqlite::params;
use tracing::{debug, info, warn};

use super::sqlite::{Database, LEGACY_SCHEMA_VERSION, SCHEMA_VERSION};
use crate::error::Error;
use crate::paths::RawPath;

/// Rows streamed per batch during migration, bounding peak memory.
const MIGRATION_BATCH: usize = 1_000;

#[derive(Debug, Default)]
pub struct PruneReport {
    /// Printable paths of the deleted entries.
    pub pruned: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MigrateOutcome {
    AlreadyCurrent,
    Migrated { rows: u64 },
}

impl Database {
    /// Delete every entry whose backing file no longer exists as a regular
    /// file.
    ///
    /// The existence scan and the batch delete share one transaction. A stat
    /// failure that does not mean "not found" aborts the whole run with
    /// nothing deleted. Catalogs at another schema version are refused.
    pub fn prune(&self) -> Result<PruneReport, Error> {
        match self.schema_version()? {
            SCHEMA_VERSION => {}
            found => {
                return Err(Error::SchemaMismatch {
                    found,
                    expected: SCHEMA_VERSION,
                })
            }
        }

        let tx = self.connection().unchecked_transaction()?;
        let mut missing: Vec<(RawPath, String)> = Vec::new();
        {
            let mut stmt =
                tx.prepare("SELECT path, printable_dir, printable_name FROM hashed")?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let path = RawPath::new(row.get(0)?);
                if !file_exists(&path)? {
                    let dir: String = row.get(1)?;
                    let name: String = row.get(2)?;
                    missing.push((path, dir + &name));
                }
            }
        }

        if missing.is_empty() {
            debug!("prune: all files still exist");
            return Ok(PruneReport::default());
        }

        {
            let mut delete = tx.prepare("DELETE FROM hashed WHERE path = ?1")?;
            for (path, _) in &missing {
                delete.execute(params![path.as_bytes()])?;
            }
        }
        tx.commit()?;

        info!("pruned {} entries", missing.len());
        Ok(PruneReport {
            pruned: missing.into_iter().map(|(_, printable)| printable).collect(),
        })
    }

    /// Bring the catalog to the current schema version.
    ///
    /// Running against an already-migrated catalog is a no-op. The only
    /// supported step restructures the combined `printable_path` column into
    /// the split dir/name layout; any failure mid-stream rolls the whole
    /// migration back, leaving the original table intact.
    pub fn migrate(&self) -> Result<MigrateOutcome, Error> {
        match self.schema_version()? {
            SCHEMA_VERSION => Ok(MigrateOutcome::AlreadyCurrent),
            LEGACY_SCHEMA_VERSION => {
                let rows = self.split_printable_paths().map_err(Error::Migration)?;
                // reclaim the space freed by dropping the old table;
                // VACUUM cannot run inside the transaction
                self.connection().execute_batch("VACUUM")?;
                info!("migrated {} entries to schema version {}", rows, SCHEMA_VERSION);
                Ok(MigrateOutcome::Migrated { rows })
            }
            found => Err(Error::SchemaMismatch {
                found,
                expected: SCHEMA_VERSION,
            }),
        }
    }

    /// The v1 -> v2 step: rename the old table, create the new schema, stream
    /// the old rows in bounded batches keyed on the path primary key, split
    /// each stored printable path into dir and name, and bulk-insert.
    fn split_printable_paths(&self) -> rusqlite::Result<u64> {
        struct LegacyRow {
            path: Vec<u8>,
            printable_path: String,
            modified: String,
            apparent_size: i64,
            read_size: i64,
            hash: Vec<u8>,
        }

        let tx = self.connection().unchecked_transaction()?;
        tx.execute("ALTER TABLE hashed RENAME TO hashed_old", [])?;
        tx.execute_batch(include_str!("schema.sql"))?;

        let mut copied = 0u64;
        {
            let mut select = tx.prepare(
                "SELECT path, printable_path, modified, apparent_size, read_size, hash
                   FROM hashed_old WHERE path > ?1 ORDER BY path LIMIT ?2",
            )?;
            let mut insert = tx.prepare(
                "INSERT INTO hashed
                   (path, printable_dir, printable_name, modified,
                    apparent_size, read_size, hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;

            let mut last_key: Vec<u8> = Vec::new();
            loop {
                let batch = select
                    .query_map(params![last_key, MIGRATION_BATCH as i64], |row| {
                        Ok(LegacyRow {
                            path: row.get(0)?,
                            printable_path: row.get(1)?,
                            modified: row.get(2)?,
                            apparent_size: row.get(3)?,
                            read_size: row.get(4)?,
                            hash: row.get(5)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                let Some(last) = batch.last() else {
                    break;
                };
                last_key = last.path.clone();

                for row in &batch {
                    let (dir, name) = split_printable(&row.printable_path);
                    insert.execute(params![
                        row.path,
                        dir,
                        name,
                        row.modified,
                        row.apparent_size,
                        row.read_size,
                        row.hash,
                    ])?;
                    copied += 1;
                }
            }
        }

        tx.execute("DROP TABLE hashed_old", [])?;
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        tx.commit()?;
        Ok(copied)
    }
}

/// Split a combined printable path into (dir, name) at the final separator,
/// keeping the separator on the dir side.
fn split_printable(printable: &str) -> (&str, &str) {
    match printable.rfind(MAIN_SEPARATOR) {
        Some(pos) => printable.split_at(pos + MAIN_SEPARATOR.len_utf8()),
        None => ("", printable),
    }
}

/// Whether the file behind a catalog entry still exists as a regular file.
///
/// `NotFound` is a definite no; any other stat error is surfaced so a
/// transient failure never causes a deletion.
fn file_exists(path: &RawPath) -> io::Result<bool> {
    let Some(path) = path.to_path() else {
        // not representable on this platform; cannot stat, so keep the entry
        warn!("cannot check non-UTF-8 path on this platform");
        return Ok(true);
    };
    match fs::metadata(path) {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::split_printable;

    #[test]
    fn split_keeps_trailing_separator_on_dir() {
        assert_eq!(split_printable("/a/b/c.txt"), ("/a/b/", "c.txt"));
        assert_eq!(split_printable("/c.txt"), ("/", "c.txt"));
    }

    #[test]
    fn split_without_separator_is_all_name() {
        assert_eq!(split_printable("c.txt"), ("", "c.txt"));
    }

    #[test]
    fn split_of_directory_path_has_empty_name() {
        assert_eq!(split_printable("/a/b/"), ("/a/b/", ""));
    }
}
