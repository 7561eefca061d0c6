//! Cell data structures for the sheet.
//!
//! This module provides the value model:
//! - [`CellValue`] - The computed value of a cell (number, text, or error)
//! - [`ErrorKind`], [`CellError`] - Error values stored in cells
//! - [`Cell`] - A raw input together with its computed value

use std::fmt;

/// The kind of error a cell can hold.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ErrorKind {
    /// Malformed or unevaluable formula.
    Parse,
    /// The cell is part of a dependency cycle.
    Circular,
}

impl ErrorKind {
    /// The externally visible error code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Parse => "#ERROR!",
            ErrorKind::Circular => "#CIRC!",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An error value stored in a cell.
///
/// Displays as its code; `reason` is kept for diagnostics only.
#[derive(Clone, Debug, PartialEq)]
pub struct CellError {
    pub kind: ErrorKind,
    pub reason: String,
}

impl CellError {
    pub fn parse(reason: impl Into<String>) -> CellError {
        CellError {
            kind: ErrorKind::Parse,
            reason: reason.into(),
        }
    }

    pub fn circular() -> CellError {
        CellError {
            kind: ErrorKind::Circular,
            reason: "circular reference".to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The computed value of a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Error(CellError),
}

impl CellValue {
    /// The value reported for cells that were never set.
    pub fn empty() -> CellValue {
        CellValue::Text(String::new())
    }

    /// Numeric view of the value: numbers as-is, numeric text parsed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            CellValue::Error(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&CellError> {
        match self {
            CellValue::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.as_error().map(|e| e.kind)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// Text substituted for this value when it is referenced by a formula.
    pub fn to_formula_text(&self) -> String {
        match self {
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Error(e) => e.code().to_string(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::empty()
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

/// A stored cell: the raw input as typed and its current computed value.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub raw: String,
    pub value: CellValue,
}

impl Cell {
    /// The formula body (without the leading `=`), if the raw input is a formula.
    pub fn formula(&self) -> Option<&str> {
        formula_body(&self.raw)
    }

    pub fn is_formula(&self) -> bool {
        self.formula().is_some()
    }
}

/// Split a raw input into its formula body, if it is a formula.
pub fn formula_body(raw: &str) -> Option<&str> {
    raw.strip_prefix('=')
}
