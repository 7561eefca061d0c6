//! Dependency extraction and the bidirectional dependency graph.
//!
//! [`extract_dependencies`] finds every cell reference in a formula body using
//! the same reference grammar as the tokenizer (`[A-Za-z]+[0-9]+`), even when
//! the rest of the formula is malformed.
//!
//! [`DependencyGraph`] keeps two indexes that always mirror each other:
//! `dependencies[id]` (cells `id` references) and `dependents[id]` (cells
//! whose formula references `id`).

use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use super::cell::formula_body;
use super::cell_ref::CellId;

/// Extract all cell references from a formula body, in source order.
pub fn extract_dependencies(formula: &str) -> Vec<CellId> {
    cell_ref_re()
        .find_iter(formula)
        .filter_map(|m| CellId::parse(m.as_str()))
        .collect()
}

fn cell_ref_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"[A-Za-z]+[0-9]+").expect("dependency cell reference regex must compile")
    })
}

/// Forward and reverse reference edges between cells.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    /// cell -> cells its formula references
    dependencies: HashMap<CellId, BTreeSet<CellId>>,
    /// cell -> cells whose formula references it
    dependents: HashMap<CellId, BTreeSet<CellId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the outgoing edges of `id` with those of `raw`.
    ///
    /// Old edges are removed first, then, if `raw` is a formula, an edge is
    /// added for every referenced cell other than `id` itself. Returns true
    /// if the formula references `id`.
    pub fn rebuild_edges(&mut self, id: &CellId, raw: &str) -> bool {
        self.remove_edges(id);

        let Some(formula) = formula_body(raw) else {
            return false;
        };

        let mut self_reference = false;
        let mut references = BTreeSet::new();
        for dep in extract_dependencies(formula) {
            if &dep == id {
                self_reference = true;
                continue;
            }
            references.insert(dep);
        }

        for dep in &references {
            self.dependents
                .entry(dep.clone())
                .or_default()
                .insert(id.clone());
        }
        if !references.is_empty() {
            self.dependencies.insert(id.clone(), references);
        }

        self_reference
    }

    /// Remove every edge where `id` is the source.
    pub fn remove_edges(&mut self, id: &CellId) {
        let Some(old) = self.dependencies.remove(id) else {
            return;
        };
        for dep in old {
            if let Some(set) = self.dependents.get_mut(&dep) {
                set.remove(id);
                if set.is_empty() {
                    self.dependents.remove(&dep);
                }
            }
        }
    }

    /// Cells referenced by `id`'s formula.
    pub fn dependencies_of(&self, id: &CellId) -> Option<&BTreeSet<CellId>> {
        self.dependencies.get(id)
    }

    /// Cells whose formula references `id`.
    pub fn dependents_of(&self, id: &CellId) -> Option<&BTreeSet<CellId>> {
        self.dependents.get(id)
    }

    /// Number of forward edges.
    pub fn edge_count(&self) -> usize {
        self.dependencies.values().map(BTreeSet::len).sum()
    }

    /// All forward edges as `(source, target)` pairs, sorted.
    pub fn edges(&self) -> BTreeSet<(CellId, CellId)> {
        self.dependencies
            .iter()
            .flat_map(|(src, targets)| targets.iter().map(move |t| (src.clone(), t.clone())))
            .collect()
    }

    /// Check that both indexes mirror each other, hold no empty sets and no
    /// self-edges.
    pub fn is_consistent(&self) -> bool {
        let forward_ok = self.dependencies.iter().all(|(src, targets)| {
            !targets.is_empty()
                && !targets.contains(src)
                && targets.iter().all(|t| {
                    self.dependents
                        .get(t)
                        .is_some_and(|back| back.contains(src))
                })
        });
        let reverse_ok = self.dependents.iter().all(|(target, sources)| {
            !sources.is_empty()
                && sources.iter().all(|s| {
                    self.dependencies
                        .get(s)
                        .is_some_and(|fwd| fwd.contains(target))
                })
        });
        forward_ok && reverse_ok
    }
}
