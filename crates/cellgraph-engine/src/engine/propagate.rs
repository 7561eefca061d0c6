//! Change propagation with circular dependency detection.
//!
//! After a cell is written, every cell that depends on it (transitively) must
//! be recomputed. A pass works in three steps over the reverse edges:
//!
//! 1. Collect the affected cells: formula cells reachable from the written
//!    cell.
//! 2. Find cycles among them. Every member of a strongly connected component
//!    with more than one cell is set to `#CIRC!`. The search keeps its own
//!    stack, so long chains cannot exhaust the call stack.
//! 3. Recompute the remaining cells once each, in dependency order, so a cell
//!    is only evaluated after every affected input has its final value.
//!
//! A diamond (two chains meeting in one downstream cell) is not a cycle; the
//! shared cell is recomputed once, after both chains.

use std::collections::{BTreeSet, HashMap, HashSet};

use super::cell::{Cell, CellError, CellValue, formula_body};
use super::cell_ref::CellId;
use super::deps::{DependencyGraph, extract_dependencies};
use super::formula::resolve_formula;
use super::sheet::SelfReference;

/// What a propagation pass touched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropagationReport {
    /// Cells recomputed, in evaluation order.
    pub recomputed: Vec<CellId>,
    /// Cells found to be part of a cycle.
    pub circular: BTreeSet<CellId>,
}

impl PropagationReport {
    /// Distinct cells whose value was written during the pass.
    pub fn touched(&self) -> BTreeSet<CellId> {
        self.recomputed
            .iter()
            .chain(self.circular.iter())
            .cloned()
            .collect()
    }
}

/// Current value of a cell; empty text if it was never set.
pub(crate) fn current_value(cells: &HashMap<CellId, Cell>, id: &CellId) -> CellValue {
    cells
        .get(id)
        .map(|cell| cell.value.clone())
        .unwrap_or_default()
}

/// Value of `raw` stored in cell `id`, given the current cell values.
///
/// Under [`SelfReference::Circular`] a formula naming its own cell is
/// `#CIRC!` every time it is evaluated, not only when it is written.
pub(crate) fn compute_value(
    id: &CellId,
    raw: &str,
    cells: &HashMap<CellId, Cell>,
    policy: SelfReference,
) -> CellValue {
    match formula_body(raw) {
        Some(body)
            if policy == SelfReference::Circular && extract_dependencies(body).contains(id) =>
        {
            CellValue::Error(CellError::circular())
        }
        Some(body) => resolve_formula(body, id, |r| current_value(cells, r)),
        None => CellValue::Text(raw.to_string()),
    }
}

/// Recompute every transitive dependent of `root`.
pub fn propagate(
    root: &CellId,
    cells: &mut HashMap<CellId, Cell>,
    graph: &DependencyGraph,
    policy: SelfReference,
) -> PropagationReport {
    let mut report = PropagationReport::default();

    let affected = affected_cells(root, cells, graph);
    if affected.len() <= 1 {
        return report;
    }

    report.circular = circular_cells(root, &affected, graph);
    for member in &report.circular {
        if let Some(cell) = cells.get_mut(member) {
            cell.value = CellValue::Error(CellError::circular());
        }
    }

    for next in evaluation_order(root, &affected, &report.circular, graph) {
        let Some(raw) = cells.get(&next).map(|cell| cell.raw.clone()) else {
            continue;
        };
        let value = compute_value(&next, &raw, cells, policy);
        log::trace!("recomputed {next} = {value:?}");
        if let Some(cell) = cells.get_mut(&next) {
            cell.value = value;
        }
        report.recomputed.push(next);
    }

    report
}

/// `root` plus every formula cell reachable from it over reverse edges.
fn affected_cells(
    root: &CellId,
    cells: &HashMap<CellId, Cell>,
    graph: &DependencyGraph,
) -> BTreeSet<CellId> {
    let mut affected = BTreeSet::from([root.clone()]);
    let mut pending = vec![root.clone()];

    while let Some(id) = pending.pop() {
        let Some(dependents) = graph.dependents_of(&id) else {
            continue;
        };
        for dependent in dependents {
            // Stale edges into literal cells are never followed.
            let is_formula = cells.get(dependent).is_some_and(Cell::is_formula);
            if is_formula && affected.insert(dependent.clone()) {
                pending.push(dependent.clone());
            }
        }
    }
    affected
}

/// Dependents of `id` inside `affected`, reversed so that popping yields
/// ascending order.
fn pending_dependents(
    graph: &DependencyGraph,
    id: &CellId,
    affected: &BTreeSet<CellId>,
) -> Vec<CellId> {
    graph
        .dependents_of(id)
        .map(|set| {
            set.iter()
                .rev()
                .filter(|dependent| affected.contains(*dependent))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// Members of every cycle among the affected cells (Tarjan's algorithm,
/// iterative).
fn circular_cells(
    root: &CellId,
    affected: &BTreeSet<CellId>,
    graph: &DependencyGraph,
) -> BTreeSet<CellId> {
    let mut circular = BTreeSet::new();

    let mut next_index = 0usize;
    let mut index: HashMap<CellId, usize> = HashMap::new();
    let mut lowlink: HashMap<CellId, usize> = HashMap::new();
    let mut stack: Vec<CellId> = Vec::new();
    let mut on_stack: HashSet<CellId> = HashSet::new();

    index.insert(root.clone(), next_index);
    lowlink.insert(root.clone(), next_index);
    next_index += 1;
    stack.push(root.clone());
    on_stack.insert(root.clone());
    let mut frames: Vec<(CellId, Vec<CellId>)> =
        vec![(root.clone(), pending_dependents(graph, root, affected))];

    loop {
        let Some(frame) = frames.last_mut() else {
            break;
        };
        let node = frame.0.clone();

        match frame.1.pop() {
            Some(next) => match index.get(&next) {
                Some(&next_index_of) => {
                    if on_stack.contains(&next) {
                        let low = lowlink[&node].min(next_index_of);
                        lowlink.insert(node, low);
                    }
                }
                None => {
                    index.insert(next.clone(), next_index);
                    lowlink.insert(next.clone(), next_index);
                    next_index += 1;
                    stack.push(next.clone());
                    on_stack.insert(next.clone());
                    let pending = pending_dependents(graph, &next, affected);
                    frames.push((next, pending));
                }
            },
            None => {
                frames.pop();
                let node_low = lowlink[&node];
                if let Some((parent, _)) = frames.last() {
                    let parent_low = lowlink[parent].min(node_low);
                    lowlink.insert(parent.clone(), parent_low);
                }
                if node_low != index[&node] {
                    continue;
                }

                let mut component = Vec::new();
                while let Some(member) = stack.pop() {
                    on_stack.remove(&member);
                    let done = member == node;
                    component.push(member);
                    if done {
                        break;
                    }
                }
                if component.len() > 1 {
                    component.sort();
                    log::warn!(
                        "circular reference: {}",
                        component
                            .iter()
                            .map(CellId::as_str)
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                    circular.extend(component);
                }
            }
        }
    }

    circular
}

/// Affected cells other than `root` and the cycle members, ordered so that
/// every cell comes after the affected cells it reads (ties in ascending
/// identifier order).
fn evaluation_order(
    root: &CellId,
    affected: &BTreeSet<CellId>,
    circular: &BTreeSet<CellId>,
    graph: &DependencyGraph,
) -> Vec<CellId> {
    // Incoming edges from other cells still waiting to be evaluated.
    let mut waiting_on: HashMap<CellId, usize> = affected
        .iter()
        .filter(|id| *id != root && !circular.contains(*id))
        .map(|id| (id.clone(), 0))
        .collect();
    let pending: Vec<CellId> = waiting_on.keys().cloned().collect();
    for id in &pending {
        for dependent in graph.dependents_of(id).into_iter().flatten() {
            if let Some(count) = waiting_on.get_mut(dependent) {
                *count += 1;
            }
        }
    }

    let mut ready: BTreeSet<CellId> = waiting_on
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(id, _)| id.clone())
        .collect();
    let mut order = Vec::with_capacity(waiting_on.len());

    while let Some(id) = ready.pop_first() {
        for dependent in graph.dependents_of(&id).into_iter().flatten() {
            if let Some(count) = waiting_on.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(dependent.clone());
                }
            }
        }
        order.push(id);
    }
    order
}
