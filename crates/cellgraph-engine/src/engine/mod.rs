//! Reactive cell engine API.
//!
//! This module provides the computation engine for the sheet:
//!
//! - [`CellValue`], [`CellError`], [`ErrorKind`], [`Cell`] - The value model
//! - [`CellId`] - Cell identifier parsing and normalization
//! - [`eval_expression`] - Restricted arithmetic evaluation
//! - [`resolve_formula`] - Reference substitution for formulas
//! - [`DependencyGraph`] - Forward/reverse reference edges
//! - [`propagate`] - Recompute dependents with cycle detection
//! - [`Sheet`] - The cell store (`set` / `get`)
//! - [`format_value`] - Format values for display

mod cell;
mod cell_ref;
mod deps;
mod eval;
mod format;
mod formula;
mod propagate;
mod sheet;

pub use cell::{Cell, CellError, CellValue, ErrorKind, formula_body};
pub use cell_ref::CellId;
pub use deps::{DependencyGraph, extract_dependencies};
pub use eval::{EvalError, eval_expression};
pub use format::{DEFAULT_DECIMALS, format_number, format_value};
pub use formula::{FormulaError, Token, resolve_formula, substitute_and_eval, tokenize};
pub use propagate::{PropagationReport, propagate};
pub use sheet::{SelfReference, Sheet};
