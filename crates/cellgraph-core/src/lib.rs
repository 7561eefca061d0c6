//! cellgraph-core - UI-agnostic document model + storage.

pub mod document;
pub mod error;
pub mod storage;

pub use document::Document;
pub use error::{CellgraphError, Result};

pub use cellgraph_engine::engine::{CellId, CellValue, PropagationReport, SelfReference};
