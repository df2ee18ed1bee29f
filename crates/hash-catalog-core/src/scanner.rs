//! Hand-off to the external scanner process.
//!
//! The scanner walks the filesystem, hashes file contents and writes catalog
//! rows itself; the only contract between it and this crate is the catalog
//! schema. It receives the catalog path followed by any residual arguments,
//! forwarded verbatim.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::error::Error;

pub fn run_scanner(command: &str, catalog: &Path, args: &[OsString]) -> Result<(), Error> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| Error::Scanner("scanner command is empty".to_string()))?;

    info!("Running scanner: {} {}", program, catalog.display());
    let status = Command::new(program)
        .args(parts)
        .arg(catalog)
        .args(args)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::Scanner(format!("scanner exited with {}", status)))
    }
}
