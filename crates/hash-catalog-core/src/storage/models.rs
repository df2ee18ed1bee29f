use std::fmt::Write;

use crate::paths::RawPath;

/// One catalog row per distinct file identity, keyed by raw path.
///
/// `modified` is fixed-width `YYYY-MM-DD HH:MM:SS` text and `hash` is exactly
/// 32 bytes; both invariants are enforced by the schema at write time.
/// `read_size` may differ from `apparent_size` if the file changed while the
/// scanner was hashing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub path: RawPath,
    pub printable_dir: String,
    pub printable_name: String,
    pub modified: String,
    pub apparent_size: u64,
    pub read_size: u64,
    pub hash: [u8; 32],
}

impl CatalogEntry {
    /// Derived view, never stored independently.
    pub fn printable_path(&self) -> String {
        let mut full = String::with_capacity(self.printable_dir.len() + self.printable_name.len());
        full.push_str(&self.printable_dir);
        full.push_str(&self.printable_name);
        full
    }

    /// Derived lowercase hex rendering of the content hash.
    pub fn hash_hex(&self) -> String {
        let mut hex = String::with_capacity(self.hash.len() * 2);
        for byte in self.hash {
            write!(hex, "{:02x}", byte).unwrap();
        }
        hex
    }
}

/// A scan origin recorded by the external scanner when a scan starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootEntry {
    pub path: RawPath,
    pub printable_path: String,
}
