mod commands;
mod logging;

use std::error::Error;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use hash_catalog_core::storage::{Database, MigrateOutcome, ReadOnlyDatabase};
use hash_catalog_core::{scanner, AppConfig, RawPath};
use tracing::error;

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match hash_catalog_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();
    let catalog = args
        .catalog
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.catalog_path));

    let result = match args.command {
        Some(Commands::List { prefix }) => run_list(&catalog, prefix),
        Some(Commands::FindUniqueHashes { prefix }) => run_find_unique_hashes(&catalog, &prefix),
        Some(Commands::Roots) => run_roots(&catalog),
        Some(Commands::Prune) => run_prune(&catalog),
        Some(Commands::Migrate) => run_migrate(&catalog),
        Some(Commands::Scan { args }) => run_scan(&config, &catalog, &args),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {}", err);
        process::exit(1);
    }
}

/// Turn a command-line prefix into catalog key bytes.
fn parse_prefix(prefix: &OsStr) -> Result<RawPath, Box<dyn Error>> {
    RawPath::from_os_str(prefix)
        .ok_or_else(|| "prefix must be valid UTF-8 on this platform".into())
}

fn run_list(catalog: &Path, prefix: Option<OsString>) -> Result<(), Box<dyn Error>> {
    let prefix = prefix.as_deref().map(parse_prefix).transpose()?;
    let db = ReadOnlyDatabase::open(catalog)?;
    let entries = match prefix {
        Some(prefix) => db.list_prefix(prefix.as_bytes())?,
        None => db.list_all()?,
    };
    for entry in &entries {
        println!(
            "{} {} {}",
            entry.printable_path(),
            entry.modified,
            entry.read_size
        );
    }
    Ok(())
}

fn run_find_unique_hashes(catalog: &Path, prefix: &OsStr) -> Result<(), Box<dyn Error>> {
    let prefix = parse_prefix(prefix)?;
    let db = ReadOnlyDatabase::open(catalog)?;
    for entry in &db.find_unique_hashes(prefix.as_bytes())? {
        println!(
            "{} {} {} {}",
            entry.printable_path(),
            entry.modified,
            entry.read_size,
            entry.hash_hex()
        );
    }
    Ok(())
}

fn run_roots(catalog: &Path) -> Result<(), Box<dyn Error>> {
    let db = ReadOnlyDatabase::open(catalog)?;
    for root in &db.roots()? {
        println!("{}", root.printable_path);
    }
    Ok(())
}

fn run_prune(catalog: &Path) -> Result<(), Box<dyn Error>> {
    let db = Database::open(catalog)?;
    let report = db.prune()?;
    if report.pruned.is_empty() {
        println!("all files still exist");
        return Ok(());
    }
    for path in &report.pruned {
        println!("pruned {}", path);
    }
    println!("{} entries pruned", report.pruned.len().to_string().red());
    Ok(())
}

fn run_migrate(catalog: &Path) -> Result<(), Box<dyn Error>> {
    let db = Database::open(catalog)?;
    match db.migrate()? {
        MigrateOutcome::AlreadyCurrent => {
            println!("catalog is already at the current schema version");
        }
        MigrateOutcome::Migrated { rows } => {
            println!("{} entries migrated", rows.to_string().green());
        }
    }
    Ok(())
}

fn run_scan(config: &AppConfig, catalog: &Path, args: &[OsString]) -> Result<(), Box<dyn Error>> {
    let command = config
        .scanner_command
        .as_deref()
        .ok_or("no scanner_command configured")?;
    scanner::run_scanner(command, catalog, args)?;
    Ok(())
}
