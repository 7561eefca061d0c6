//! The cell store.
//!
//! [`Sheet`] owns every cell and the dependency graph between them. Values
//! are maintained eagerly: `set` rebuilds edges, computes the new value and
//! propagates to all dependents before returning, so `get` is a plain lookup.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::cell::{Cell, CellValue};
use super::cell_ref::CellId;
use super::deps::DependencyGraph;
use super::propagate::{PropagationReport, compute_value, current_value, propagate};

/// How a formula that references its own cell is treated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfReference {
    /// No self-edge is created; the formula is evaluated once against the
    /// cell's previous value.
    #[default]
    Ignore,
    /// A direct self-reference is stored as `#CIRC!`.
    Circular,
}

/// A single-threaded reactive cell store.
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    cells: HashMap<CellId, Cell>,
    graph: DependencyGraph,
    self_reference: SelfReference,
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_self_reference(self_reference: SelfReference) -> Self {
        Sheet {
            self_reference,
            ..Self::default()
        }
    }

    pub fn self_reference(&self) -> SelfReference {
        self.self_reference
    }

    /// Set a cell from raw input.
    ///
    /// Input starting with `=` is a formula; anything else is stored as
    /// literal text. Writes to strings that are not cell identifiers are
    /// dropped, since no formula could ever reference them.
    pub fn set(&mut self, cell: &str, raw: &str) {
        match CellId::parse(cell) {
            Some(id) => {
                self.set_cell(id, raw);
            }
            None => log::warn!("ignoring write to invalid cell identifier '{cell}'"),
        }
    }

    /// Set a cell from raw input and report which dependents were recomputed.
    pub fn set_cell(&mut self, id: CellId, raw: impl Into<String>) -> PropagationReport {
        let raw = raw.into();

        // Edges first, so evaluation never sees a stale graph.
        self.graph.rebuild_edges(&id, &raw);

        let value = compute_value(&id, &raw, &self.cells, self.self_reference);
        self.cells.insert(id.clone(), Cell { raw, value });

        let report = propagate(&id, &mut self.cells, &self.graph, self.self_reference);
        if !report.recomputed.is_empty() || !report.circular.is_empty() {
            log::debug!(
                "set {id}: recomputed {} dependent(s), {} circular",
                report.recomputed.len(),
                report.circular.len()
            );
        }
        report
    }

    /// Computed value of a cell; empty text if it was never set.
    pub fn get(&self, cell: &str) -> CellValue {
        match CellId::parse(cell) {
            Some(id) => current_value(&self.cells, &id),
            None => CellValue::empty(),
        }
    }

    pub fn get_cell(&self, id: &CellId) -> CellValue {
        current_value(&self.cells, id)
    }

    pub fn cell(&self, id: &CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    /// Raw input of a cell, if it was ever set.
    pub fn raw(&self, cell: &str) -> Option<&str> {
        let id = CellId::parse(cell)?;
        self.cells.get(&id).map(|c| c.raw.as_str())
    }

    /// Whether the cell was ever set (an empty raw input still counts).
    pub fn contains(&self, cell: &str) -> bool {
        CellId::parse(cell).is_some_and(|id| self.cells.contains_key(&id))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All stored cells, sorted by identifier.
    pub fn iter(&self) -> impl Iterator<Item = (&CellId, &Cell)> {
        let mut entries: Vec<_> = self.cells.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn dependencies_of(&self, id: &CellId) -> BTreeSet<CellId> {
        self.graph.dependencies_of(id).cloned().unwrap_or_default()
    }

    pub fn dependents_of(&self, id: &CellId) -> BTreeSet<CellId> {
        self.graph.dependents_of(id).cloned().unwrap_or_default()
    }

    /// Non-empty raw inputs keyed by identifier: what a caller needs to
    /// persist and later replay through [`Sheet::set`].
    pub fn raw_inputs(&self) -> BTreeMap<CellId, String> {
        self.cells
            .iter()
            .filter(|(_, cell)| !cell.raw.is_empty())
            .map(|(id, cell)| (id.clone(), cell.raw.clone()))
            .collect()
    }

    /// Rebuild a sheet by replaying raw inputs in identifier order.
    pub fn from_raw_inputs<I, K, V>(self_reference: SelfReference, inputs: I) -> Sheet
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut ordered: BTreeMap<CellId, String> = BTreeMap::new();
        for (key, raw) in inputs {
            match CellId::parse(key.as_ref()) {
                Some(id) => {
                    ordered.insert(id, raw.into());
                }
                None => log::warn!("skipping invalid cell identifier '{}'", key.as_ref()),
            }
        }

        let mut sheet = Sheet::with_self_reference(self_reference);
        for (id, raw) in ordered {
            sheet.set_cell(id, raw);
        }
        sheet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ErrorKind;

    fn id(s: &str) -> CellId {
        CellId::parse(s).unwrap()
    }

    #[test]
    fn test_literal_stored_as_text() {
        let mut sheet = Sheet::new();
        sheet.set("A1", "42");
        assert_eq!(sheet.get("A1"), CellValue::Text("42".into()));
        assert_eq!(sheet.get("A1").as_number(), Some(42.0));
    }

    #[test]
    fn test_unset_vs_empty() {
        let mut sheet = Sheet::new();
        assert_eq!(sheet.get("A1"), CellValue::empty());
        assert!(!sheet.contains("A1"));

        sheet.set("A1", "");
        assert_eq!(sheet.get("A1"), CellValue::empty());
        assert!(sheet.contains("A1"));
        assert_eq!(sheet.raw("a1"), Some(""));
        assert!(sheet.raw_inputs().is_empty());
    }

    #[test]
    fn test_invalid_identifier_is_dropped() {
        let mut sheet = Sheet::new();
        sheet.set("not a cell", "1");
        assert!(sheet.is_empty());
        assert_eq!(sheet.get("not a cell"), CellValue::empty());
    }

    #[test]
    fn test_set_cell_reports_dependents() {
        let mut sheet = Sheet::new();
        sheet.set("A1", "1");
        sheet.set("B1", "=A1*2");
        let report = sheet.set_cell(id("A1"), "5");
        assert_eq!(report.recomputed, vec![id("B1")]);
        assert_eq!(sheet.get("B1"), CellValue::Number(10.0));
    }

    #[test]
    fn test_self_reference_ignored_by_default() {
        let mut sheet = Sheet::new();
        sheet.set("A1", "1");
        sheet.set("A1", "=A1+1");
        assert_eq!(sheet.get("A1"), CellValue::Number(2.0));
        assert!(sheet.dependencies_of(&id("A1")).is_empty());
        assert!(sheet.graph().is_consistent());
    }

    #[test]
    fn test_self_reference_circular_policy() {
        let mut sheet = Sheet::with_self_reference(SelfReference::Circular);
        sheet.set("A1", "1");
        sheet.set("B1", "=A1+1");
        sheet.set("A1", "=A1+1");
        assert_eq!(sheet.get("A1").error_kind(), Some(ErrorKind::Circular));
        assert_eq!(sheet.get("B1").error_kind(), Some(ErrorKind::Parse));
    }

    #[test]
    fn test_circular_self_reference_survives_recompute() {
        let mut sheet = Sheet::with_self_reference(SelfReference::Circular);
        sheet.set("B1", "1");
        sheet.set("A1", "=A1 + B1");
        assert_eq!(sheet.get("A1").error_kind(), Some(ErrorKind::Circular));

        let report = sheet.set_cell(id("B1"), "5");
        assert_eq!(report.recomputed, vec![id("A1")]);
        assert_eq!(sheet.get("A1").error_kind(), Some(ErrorKind::Circular));

        sheet.set("A1", "=B1 * 2");
        assert_eq!(sheet.get("A1"), CellValue::Number(10.0));
    }

    #[test]
    fn test_from_raw_inputs_order_independent() {
        let inputs = [("C1", "=A1+B1"), ("b1", "20"), ("A1", "10"), ("??", "1")];
        let sheet = Sheet::from_raw_inputs(SelfReference::Ignore, inputs);
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.get("C1"), CellValue::Number(30.0));
    }

    #[test]
    fn test_iter_is_sorted() {
        let mut sheet = Sheet::new();
        sheet.set("B1", "2");
        sheet.set("A2", "1");
        sheet.set("A1", "0");
        let ids: Vec<&str> = sheet.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["A1", "A2", "B1"]);
    }
}
