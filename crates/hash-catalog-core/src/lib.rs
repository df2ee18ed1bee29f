pub mod config;
pub mod error;
pub mod paths;
pub mod prefix;
pub mod scanner;
pub mod storage;

pub use config::AppConfig;
pub use error::Error;
pub use paths::{PrintablePath, RawPath};
pub use storage::{Database, ReadOnlyDatabase};
