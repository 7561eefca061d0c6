//! JSON snapshot format: a flat object of cell identifier to raw input.

use super::Snapshot;
use crate::error::{CellgraphError, Result};
use cellgraph_engine::engine::CellId;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Parse a JSON snapshot file
pub fn parse_json(path: &Path) -> Result<Snapshot> {
    let content = fs::read_to_string(path)?;
    parse_json_content(&content)
}

/// Parse a JSON snapshot from a string
pub fn parse_json_content(content: &str) -> Result<Snapshot> {
    let entries: BTreeMap<String, String> = serde_json::from_str(content)?;
    let mut snapshot = Snapshot::new();
    for (key, raw) in entries {
        let cell_id = CellId::parse(&key).ok_or(CellgraphError::InvalidCellRef(key))?;
        if raw.is_empty() {
            continue;
        }
        // "a1" and "A1" are the same cell; the later key in sort order wins.
        snapshot.insert(cell_id, raw);
    }
    Ok(snapshot)
}

/// Write a snapshot to a JSON file
pub fn write_json(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let content = write_json_content(snapshot)?;
    fs::write(path, content)?;
    Ok(())
}

/// Write a snapshot as pretty-printed JSON
pub fn write_json_content(snapshot: &Snapshot) -> Result<String> {
    let entries: BTreeMap<&str, &str> = snapshot
        .iter()
        .filter(|(_, raw)| !raw.is_empty())
        .map(|(id, raw)| (id.as_str(), raw.as_str()))
        .collect();
    let mut content = serde_json::to_string_pretty(&entries)?;
    content.push('\n');
    Ok(content)
}
