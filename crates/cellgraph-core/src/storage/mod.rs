//! Raw-input persistence.
//!
//! A sheet is persisted as a [`Snapshot`]: canonical cell identifier to raw
//! input, for non-empty inputs only. Loading replays each entry through
//! `Sheet::set`, so computed values are never stored.

mod json;
mod parser;
mod writer;

pub use json::{parse_json, parse_json_content, write_json, write_json_content};
pub use parser::{parse_grd, parse_grd_content};
pub use writer::{write_grd, write_grd_content};

use crate::error::Result;
use cellgraph_engine::engine::CellId;
use std::collections::BTreeMap;
use std::path::Path;

/// Raw inputs keyed by cell identifier.
pub type Snapshot = BTreeMap<CellId, String>;

/// On-disk snapshot format.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StorageFormat {
    /// `ID: VALUE` lines.
    Grd,
    /// A flat JSON object of identifier to raw input.
    Json,
}

impl StorageFormat {
    /// Pick a format from the file extension (`.json`, anything else is `.grd`).
    pub fn from_path(path: &Path) -> StorageFormat {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => StorageFormat::Json,
            _ => StorageFormat::Grd,
        }
    }
}

/// Read a snapshot, choosing the format from the extension.
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    match StorageFormat::from_path(path) {
        StorageFormat::Grd => parse_grd(path),
        StorageFormat::Json => parse_json(path),
    }
}

/// Write a snapshot, choosing the format from the extension.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    match StorageFormat::from_path(path) {
        StorageFormat::Grd => write_grd(path, snapshot),
        StorageFormat::Json => write_json(path, snapshot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(StorageFormat::from_path(Path::new("a.json")), StorageFormat::Json);
        assert_eq!(StorageFormat::from_path(Path::new("a.JSON")), StorageFormat::Json);
        assert_eq!(StorageFormat::from_path(Path::new("a.grd")), StorageFormat::Grd);
        assert_eq!(StorageFormat::from_path(Path::new("sheet")), StorageFormat::Grd);
    }

    #[test]
    fn test_round_trip_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let mut snapshot = Snapshot::new();
        snapshot.insert(CellId::parse("A1").unwrap(), "10".to_string());
        snapshot.insert(CellId::parse("B1").unwrap(), "Hello \"world\"".to_string());
        snapshot.insert(CellId::parse("C1").unwrap(), "=A1 * 2".to_string());
        snapshot.insert(CellId::parse("D1").unwrap(), "line\nbreak".to_string());

        for name in ["sheet.grd", "sheet.json"] {
            let path = dir.path().join(name);
            write_snapshot(&path, &snapshot).unwrap();
            assert_eq!(read_snapshot(&path).unwrap(), snapshot, "{name}");
        }
    }
}
