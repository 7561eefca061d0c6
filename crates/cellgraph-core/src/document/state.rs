use crate::error::Result;
use cellgraph_engine::engine::{SelfReference, Sheet};
use std::path::PathBuf;

/// UI-agnostic document state: a sheet bound to an optional file.
pub struct Document {
    /// The cell store
    pub sheet: Sheet,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the sheet has been modified since the last load/save
    pub modified: bool,
}

impl Document {
    /// Create a new, empty document.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Self::with_self_reference(SelfReference::default())
    }

    /// Create an empty document with the given self-reference policy.
    pub fn with_self_reference(self_reference: SelfReference) -> Self {
        Document {
            sheet: Sheet::with_self_reference(self_reference),
            file_path: None,
            modified: false,
        }
    }

    /// Create a new document and load a file if provided.
    ///
    /// A path that does not exist yet is remembered for the first save.
    pub fn with_file(path: Option<PathBuf>, self_reference: SelfReference) -> Result<Self> {
        let mut doc = Self::with_self_reference(self_reference);

        if let Some(p) = path {
            if p.exists() {
                doc.load_file(&p)?;
            } else {
                doc.file_path = Some(p);
                doc.modified = false;
            }
        }
        Ok(doc)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
