//! Dependency ordering of tables by foreign keys.

use crate::ast::Schema;
use std::collections::HashMap;
use tracing::warn;

/// A foreign-key edge that closes a cycle: `from` depends on `to`, which is
/// still being visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct SortOutcome {
    pub schema: Schema,
    pub cycles: Vec<BackEdge>,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// Reorder tables so referenced tables come before referencing ones.
///
/// Depth-first post-order over "table depends on the targets of its outgoing
/// relationships and of its `*_id` columns", starting from each table in model
/// order. Every table is visited once, so cycles terminate; inside a cycle the
/// order is best-effort and the closing edges are reported in [`SortOutcome::cycles`].
/// Self-references need no ordering and are not reported.
pub fn sort(mut schema: Schema) -> SortOutcome {
    let index: HashMap<&str, usize> = schema
        .tables
        .iter()
        .enumerate()
        .rev()
        .map(|(i, t)| (t.name.as_str(), i))
        .collect();

    // Build dependency graph: table -> tables it references, in relationship order
    let mut deps: Vec<Vec<usize>> = vec![Vec::new(); schema.tables.len()];
    for rel in &schema.relationships {
        let (Some(&src), Some(&dst)) = (
            index.get(rel.source.name()),
            index.get(rel.target.name()),
        ) else {
            continue;
        };
        if src != dst && !deps[src].contains(&dst) {
            deps[src].push(dst);
        }
    }

    // `*_id` columns without a declared relationship still get constrained
    // to the table their name points at.
    for (src, table) in schema.tables.iter().enumerate() {
        for col in &table.columns {
            if schema.is_declared_fk(&table.name, &col.name) {
                continue;
            }
            let Some(target) = schema.convention_target(&col.name) else {
                continue;
            };
            if let Some(&dst) = index.get(target.name.as_str()) {
                if src != dst && !deps[src].contains(&dst) {
                    deps[src].push(dst);
                }
            }
        }
    }

    let mut marks = vec![Mark::Unvisited; schema.tables.len()];
    let mut order = Vec::with_capacity(schema.tables.len());
    let mut back_edges = Vec::new();
    for start in 0..schema.tables.len() {
        visit(start, &deps, &mut marks, &mut order, &mut back_edges);
    }

    let cycles: Vec<BackEdge> = back_edges
        .into_iter()
        .map(|(from, to): (usize, usize)| BackEdge {
            from: schema.tables[from].name.clone(),
            to: schema.tables[to].name.clone(),
        })
        .collect();
    for edge in &cycles {
        warn!(
            "order: cyclic foreign keys, {} -> {} may be created before its target",
            edge.from, edge.to
        );
    }

    let mut slots: Vec<_> = schema.tables.drain(..).map(Some).collect();
    schema.tables = order.into_iter().filter_map(|i| slots[i].take()).collect();

    SortOutcome { schema, cycles }
}

fn visit(
    node: usize,
    deps: &[Vec<usize>],
    marks: &mut [Mark],
    order: &mut Vec<usize>,
    back_edges: &mut Vec<(usize, usize)>,
) {
    if marks[node] != Mark::Unvisited {
        return;
    }
    marks[node] = Mark::Visiting;
    for &dep in &deps[node] {
        match marks[dep] {
            Mark::Unvisited => visit(dep, deps, marks, order, back_edges),
            Mark::Visiting => back_edges.push((node, dep)),
            Mark::Done => {}
        }
    }
    marks[node] = Mark::Done;
    order.push(node);
}
