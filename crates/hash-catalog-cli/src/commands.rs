use std::ffi::OsString;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "hash-catalog")]
#[command(about = "Inspect and maintain a catalog of hashed files", long_about = None)]
pub struct Cli {
    /// Catalog database file, overriding the configured path
    #[arg(short, long, global = true)]
    pub catalog: Option<OsString>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List catalog entries, optionally restricted to a path prefix
    List {
        /// Raw path prefix to restrict the listing to
        prefix: Option<OsString>,
    },
    /// List entries under a prefix whose hash occurs nowhere else in the catalog
    FindUniqueHashes {
        /// Raw path prefix to search under
        prefix: OsString,
    },
    /// List the scan roots recorded by the scanner
    Roots,
    /// Remove entries whose backing file no longer exists
    Prune,
    /// Migrate the catalog to the current schema layout
    Migrate,
    /// Run the external scanner, forwarding any remaining arguments
    Scan {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },
    /// Print configuration values
    PrintConfig,
}
