//! cellgraph_engine - Reactive cell engine (formulas, dependency graph, propagation).

pub mod engine;

pub use engine::{CellId, CellValue, ErrorKind, Sheet};
