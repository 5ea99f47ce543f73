//! # Dependency resolver: one start order, one stop order, per run.
//!
//! [`compute_start_order`] topologically sorts the dependency graph so every
//! subsystem appears after all of its dependencies. Ties (no dependency
//! relation between two nodes) are broken by registration order, so the
//! result is fully deterministic.
//!
//! [`compute_stop_order`] is the *exact reverse* of the start order — never a
//! second independent sort, which could disagree with the start order in the
//! presence of ties. This alone guarantees a dependency is never stopped
//! while a dependent is still active.
//!
//! Both orders are computed once per run; cost is O(V log V + E).

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::error::RegistryError;

/// Computes the start order for a dependency graph given in registration
/// order as `(name, dependencies)` pairs.
///
/// Errors:
/// - [`RegistryError::UnknownDependency`] if a dependency names no node;
/// - [`RegistryError::CyclicDependency`] with the names along one cycle.
pub(crate) fn compute_start_order(
    graph: &[(String, Vec<String>)],
) -> Result<Vec<String>, RegistryError> {
    let index: HashMap<&str, usize> = graph
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.as_str(), i))
        .collect();

    // indegree = unsatisfied dependencies; dependents = reverse edges
    let mut indegree = vec![0usize; graph.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); graph.len()];
    for (i, (name, deps)) in graph.iter().enumerate() {
        for dep in deps {
            let &j = index.get(dep.as_str()).ok_or_else(|| {
                RegistryError::UnknownDependency {
                    subsystem: name.clone(),
                    dependency: dep.clone(),
                }
            })?;
            indegree[i] += 1;
            dependents[j].push(i);
        }
    }

    // Kahn's algorithm; the ready set is a min-heap on registration index so
    // unrelated subsystems start in registration order.
    let mut ready: BinaryHeap<Reverse<usize>> = indegree
        .iter()
        .enumerate()
        .filter(|(_, &d)| d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(graph.len());
    while let Some(Reverse(i)) = ready.pop() {
        order.push(graph[i].0.clone());
        for &dep in &dependents[i] {
            indegree[dep] -= 1;
            if indegree[dep] == 0 {
                ready.push(Reverse(dep));
            }
        }
    }

    if order.len() < graph.len() {
        return Err(RegistryError::CyclicDependency {
            cycle: trace_cycle(graph, &index, &indegree),
        });
    }
    Ok(order)
}

/// The stop order: the exact reverse of the start order.
pub(crate) fn compute_stop_order(start_order: &[String]) -> Vec<String> {
    start_order.iter().rev().cloned().collect()
}

/// Walks the residual graph (nodes with unsatisfied dependencies) until a
/// node repeats, returning the names along the cycle.
fn trace_cycle(
    graph: &[(String, Vec<String>)],
    index: &HashMap<&str, usize>,
    indegree: &[usize],
) -> Vec<String> {
    let residual: Vec<usize> = indegree
        .iter()
        .enumerate()
        .filter(|(_, &d)| d > 0)
        .map(|(i, _)| i)
        .collect();

    let first = match residual.first() {
        Some(&i) => i,
        None => return Vec::new(),
    };

    // Follow any residual dependency from each node; the walk must loop.
    let mut path = vec![first];
    let mut current = first;
    loop {
        let next = graph[current]
            .1
            .iter()
            .filter_map(|dep| index.get(dep.as_str()).copied())
            .find(|j| indegree[*j] > 0);
        let next = match next {
            Some(j) => j,
            None => return path.iter().map(|&i| graph[i].0.clone()).collect(),
        };
        if let Some(pos) = path.iter().position(|&i| i == next) {
            return path[pos..].iter().map(|&i| graph[i].0.clone()).collect();
        }
        path.push(next);
        current = next;
    }
}
