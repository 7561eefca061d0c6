//! Writer for .grd file format

use super::Snapshot;
use crate::error::Result;
use std::fs;
use std::path::Path;

/// Write a snapshot to a .grd file
pub fn write_grd(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let content = write_grd_content(snapshot);
    fs::write(path, content)?;
    Ok(())
}

/// Write a snapshot to a .grd format string
pub fn write_grd_content(snapshot: &Snapshot) -> String {
    let mut lines = vec!["# Cellgraph Sheet".to_string()];

    // BTreeMap iteration is already sorted by identifier
    for (cell_id, raw) in snapshot {
        if raw.is_empty() {
            continue;
        }
        lines.push(format!("{}: {}", cell_id, encode_raw(raw)));
    }

    lines.join("\n") + "\n"
}

/// Formulas and numbers are written bare when that reads back unchanged;
/// everything else is quoted.
fn encode_raw(raw: &str) -> String {
    let bare_safe = raw == raw.trim() && !raw.chars().any(char::is_control);
    let is_bare = bare_safe && (raw.starts_with('=') || raw.parse::<f64>().is_ok());
    if is_bare {
        raw.to_string()
    } else {
        format!("\"{}\"", escape_grd_text(raw))
    }
}

fn escape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}
