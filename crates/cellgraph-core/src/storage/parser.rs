//! Parser for .grd file format

use super::Snapshot;
use crate::error::{CellgraphError, Result};
use cellgraph_engine::engine::CellId;
use std::fs;
use std::path::Path;

/// Parse a .grd file into a snapshot
pub fn parse_grd(path: &Path) -> Result<Snapshot> {
    let content = fs::read_to_string(path)?;
    parse_grd_content(&content)
}

/// Parse .grd content from a string
pub fn parse_grd_content(content: &str) -> Result<Snapshot> {
    let mut snapshot = Snapshot::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Parse "CELLREF: VALUE" format
        let Some((cell_ref_str, value_str)) = line.split_once(':') else {
            return Err(CellgraphError::Parse {
                line: line_num + 1,
                message: "Expected 'CELLREF: VALUE' format".to_string(),
            });
        };

        let cell_ref_str = cell_ref_str.trim();
        let cell_id = CellId::parse(cell_ref_str).ok_or_else(|| CellgraphError::Parse {
            line: line_num + 1,
            message: format!("Invalid cell reference: {}", cell_ref_str),
        })?;

        let raw = parse_raw_value(value_str, line_num + 1)?;
        if raw.is_empty() {
            continue;
        }
        if snapshot.insert(cell_id.clone(), raw).is_some() {
            log::warn!("line {}: {} defined more than once", line_num + 1, cell_id);
        }
    }

    Ok(snapshot)
}

/// Decode the value part of a line into the raw input it stands for.
fn parse_raw_value(value: &str, line_num: usize) -> Result<String> {
    let value = value.trim();

    if value.is_empty() {
        return Ok(String::new());
    }

    // Formula: starts with '='
    if value.starts_with('=') {
        return Ok(value.to_string());
    }

    // Quoted string: starts and ends with '"'
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        return Ok(unescape_grd_text(&value[1..value.len() - 1]));
    }

    // Bare numeric literal
    if value.parse::<f64>().is_ok() {
        return Ok(value.to_string());
    }

    Err(CellgraphError::Parse {
        line: line_num,
        message: format!("Invalid value: {}. Use quotes for text.", value),
    })
}

fn unescape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                match next {
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    _ => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            } else {
                out.push('\\');
            }
        } else {
            out.push(ch);
        }
    }
    out
}
