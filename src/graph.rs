//! Constraint validation and deterministic topological ordering.
//!
//! The ordering problem is a plain directed graph: nodes are registration
//! indices, and an edge `(a, b)` means "`a` runs before `b`". The edge set
//! is normalized once up front from both `before` and `after` declarations,
//! then a stable Kahn's algorithm produces the order. Among ready nodes the
//! smallest registration index always wins, so middlewares with no
//! constraints between them keep registration order and two compiles of the
//! same stack agree.

use std::collections::{BTreeSet, HashMap};

use crate::error::Error;
use crate::middleware::Middleware;

/// Validates `middlewares` and resolves them into a total order of
/// registration indices.
///
/// Fails on a duplicate name, an unmet `requires` (all violations are
/// aggregated), or a constraint cycle. `before`/`after` entries naming
/// unregistered middlewares are inert.
pub(crate) fn resolve_order(middlewares: &[Middleware]) -> Result<Vec<usize>, Error> {
    let n = middlewares.len();

    let mut index_of: HashMap<&str, usize> = HashMap::with_capacity(n);
    for (idx, mw) in middlewares.iter().enumerate() {
        if index_of.insert(mw.name.as_str(), idx).is_some() {
            return Err(Error::DuplicateName { name: mw.name.clone() });
        }
    }

    // Existence validation. `requires` never contributes edges.
    let mut violations = Vec::new();
    for mw in middlewares {
        for required in &mw.requires {
            if !index_of.contains_key(required.as_str()) {
                violations.push((mw.name.clone(), required.clone()));
            }
        }
    }
    if !violations.is_empty() {
        return Err(Error::MissingRequirement { violations });
    }

    // Edge set, normalized before sorting. The set collapses duplicate
    // declarations so in-degrees stay accurate.
    let mut edges: BTreeSet<(usize, usize)> = BTreeSet::new();
    for (idx, mw) in middlewares.iter().enumerate() {
        for target in &mw.before {
            if let Some(&t) = index_of.get(target.as_str()) {
                edges.insert((idx, t));
            }
        }
        for source in &mw.after {
            if let Some(&s) = index_of.get(source.as_str()) {
                edges.insert((s, idx));
            }
        }
    }

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];
    for &(a, b) in &edges {
        successors[a].push(b);
        in_degree[b] += 1;
    }

    // Kahn's algorithm with a BTreeSet as the ready queue: popping the
    // first element is popping the smallest registration index.
    let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    while let Some(node) = ready.pop_first() {
        order.push(node);
        for &succ in &successors[node] {
            in_degree[succ] -= 1;
            if in_degree[succ] == 0 {
                ready.insert(succ);
            }
        }
    }

    if order.len() < n {
        return Err(Error::ConstraintCycle {
            members: cycle_members(middlewares, &successors, &order),
        });
    }

    Ok(order)
}

/// Names the middlewares actually on a cycle.
///
/// Kahn leaves behind every node it could not reach a zero in-degree for,
/// which includes nodes merely downstream of a cycle. Peeling nodes with no
/// successor among the leftovers strips those, so the report names the
/// cycle itself.
fn cycle_members(
    middlewares: &[Middleware],
    successors: &[Vec<usize>],
    sorted: &[usize],
) -> Vec<String> {
    let mut remaining: BTreeSet<usize> =
        (0..middlewares.len()).filter(|i| !sorted.contains(i)).collect();

    loop {
        let dead: Vec<usize> = remaining
            .iter()
            .copied()
            .filter(|&i| !successors[i].iter().any(|s| remaining.contains(s)))
            .collect();
        if dead.is_empty() {
            break;
        }
        for i in dead {
            remaining.remove(&i);
        }
    }

    remaining
        .into_iter()
        .map(|i| middlewares[i].name.clone())
        .collect()
}
