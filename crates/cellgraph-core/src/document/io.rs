use super::Document;
use crate::error::{CellgraphError, Result};
use crate::storage::{read_snapshot, write_snapshot};
use cellgraph_engine::engine::Sheet;
use std::path::{Path, PathBuf};

impl Document {
    /// Save to current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = &self.file_path else {
            return Err(CellgraphError::NoFilePath);
        };

        write_snapshot(path, &self.snapshot())?;
        self.modified = false;
        Ok(path.clone())
    }

    /// Save to a new path and remember it for later saves.
    pub fn save_file_as(&mut self, path: &Path) -> Result<PathBuf> {
        write_snapshot(path, &self.snapshot())?;
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(path.to_path_buf())
    }

    /// Load from file, replacing the current sheet.
    ///
    /// The file is read completely before anything is replaced, so a failed
    /// load leaves the document untouched.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let snapshot = read_snapshot(path)?;
        log::debug!("loaded {} cell(s) from {}", snapshot.len(), path.display());

        self.sheet = Sheet::from_raw_inputs(
            self.sheet.self_reference(),
            snapshot.iter().map(|(id, raw)| (id.as_str(), raw.as_str())),
        );
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }
}
