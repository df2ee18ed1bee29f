use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Catalog schema version is {found}, expected {expected} (run migrate)")]
    SchemaMismatch { found: i64, expected: i64 },

    #[error("Migration failed, catalog left at its previous version: {0}")]
    Migration(#[source] rusqlite::Error),

    #[error("Scanner error: {0}")]
    Scanner(String),
}
