use super::Document;
use crate::error::{CellgraphError, Result};
use crate::storage::Snapshot;
use cellgraph_engine::engine::{CellId, CellValue, PropagationReport, format_value};

impl Document {
    /// Set cell contents from input string.
    pub fn set_cell_from_input(&mut self, cell: &str, input: &str) -> Result<PropagationReport> {
        let cell_id =
            CellId::parse(cell).ok_or_else(|| CellgraphError::InvalidCellRef(cell.to_string()))?;
        let report = self.sheet.set_cell(cell_id, input);
        self.modified = true;
        Ok(report)
    }

    /// Get the computed value of a cell.
    pub fn get_cell_value(&self, cell: &str) -> Result<CellValue> {
        let cell_id =
            CellId::parse(cell).ok_or_else(|| CellgraphError::InvalidCellRef(cell.to_string()))?;
        Ok(self.sheet.get_cell(&cell_id))
    }

    /// Get the display string for a cell.
    pub fn get_cell_display(&self, cell: &str, decimals: usize) -> Result<String> {
        Ok(format_value(&self.get_cell_value(cell)?, decimals))
    }

    /// The raw inputs to persist.
    pub fn snapshot(&self) -> Snapshot {
        self.sheet.raw_inputs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgraph_engine::engine::ErrorKind;

    #[test]
    fn test_set_marks_modified() {
        let mut doc = Document::new();
        assert!(!doc.modified);
        doc.set_cell_from_input("A1", "1").unwrap();
        assert!(doc.modified);
    }

    #[test]
    fn test_invalid_cell_is_an_error() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.set_cell_from_input("A", "1"),
            Err(CellgraphError::InvalidCellRef(_))
        ));
        assert!(!doc.modified);
        assert!(doc.get_cell_value("??").is_err());
    }

    #[test]
    fn test_report_lists_recomputed_cells() {
        let mut doc = Document::new();
        doc.set_cell_from_input("A1", "2").unwrap();
        doc.set_cell_from_input("B1", "=A1 * A1").unwrap();
        let report = doc.set_cell_from_input("a1", "3").unwrap();
        assert_eq!(report.recomputed, vec![CellId::parse("B1").unwrap()]);
        assert_eq!(doc.get_cell_display("B1", 2).unwrap(), "9");
    }

    #[test]
    fn test_display_of_errors() {
        let mut doc = Document::new();
        doc.set_cell_from_input("A1", "=B1").unwrap();
        doc.set_cell_from_input("B1", "=A1").unwrap();
        assert_eq!(doc.get_cell_display("A1", 2).unwrap(), "#CIRC!");
        assert_eq!(
            doc.get_cell_value("B1").unwrap().error_kind(),
            Some(ErrorKind::Circular)
        );
    }

    #[test]
    fn test_snapshot_skips_empty_inputs() {
        let mut doc = Document::new();
        doc.set_cell_from_input("A1", "").unwrap();
        doc.set_cell_from_input("B1", "x").unwrap();
        let snapshot = doc.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[&CellId::parse("B1").unwrap()], "x");
    }
}
