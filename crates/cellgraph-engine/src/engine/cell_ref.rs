//! Cell identifier parsing and normalization.
//!
//! Identifiers are spreadsheet-style names (e.g., "A1", "b2", "AA100"):
//! one or more letters followed by one or more digits. Parsing is
//! case-insensitive; the canonical form is uppercase letters followed by the
//! digits exactly as written.
//!
//! Row and column magnitudes are unbounded, so the canonical text is kept
//! instead of numeric coordinates.
//!
//! # Examples
//!
//! ```
//! use cellgraph_engine::engine::CellId;
//!
//! let id = CellId::parse("ab12").unwrap();
//! assert_eq!(id.as_str(), "AB12");
//! assert_eq!(id.letters(), "AB");
//! assert_eq!(id.digits(), "12");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A canonical cell identifier.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellId {
    name: String,
    split: usize,
}

impl CellId {
    /// Parse a cell identifier, returning None if the input is not `letters+digits`.
    /// Surrounding whitespace is ignored.
    pub fn parse(name: &str) -> Option<CellId> {
        let caps = cell_id_re().captures(name.trim())?;
        let letters = caps.name("letters")?.as_str();
        let digits = caps.name("digits")?.as_str();

        let mut canonical = String::with_capacity(letters.len() + digits.len());
        canonical.push_str(&letters.to_ascii_uppercase());
        canonical.push_str(digits);

        Some(CellId {
            name: canonical,
            split: letters.len(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Column letters in uppercase.
    pub fn letters(&self) -> &str {
        &self.name[..self.split]
    }

    /// Row digits as written.
    pub fn digits(&self) -> &str {
        &self.name[self.split..]
    }
}

fn cell_id_re() -> &'static Regex {
    static CELL_ID_RE: OnceLock<Regex> = OnceLock::new();
    CELL_ID_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<digits>[0-9]+)$")
            .expect("cell identifier regex must compile")
    })
}

impl std::str::FromStr for CellId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl TryFrom<String> for CellId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellId> for String {
    fn from(id: CellId) -> String {
        id.name
    }
}

impl AsRef<str> for CellId {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
