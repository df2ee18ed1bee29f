pub mod maintenance;
pub mod models;
pub mod queries;
mod sqlite;

pub use maintenance::{MigrateOutcome, PruneReport};
pub use sqlite::{Database, ReadOnlyDatabase, SCHEMA_VERSION};
