//! Genealogy walk: cycle-guarded depth-first traversal of the production
//! graph, plus seed search-term resolution.
//!
//! The walk is pure over an immutable graph; the only mutable state is the
//! visited set owned by one top-level `trace` call. If seed traversals were
//! ever parallelized, each seed would need its own visited set to keep the
//! cycle guard.

use std::collections::HashSet;

use crate::core::graph::ProductionGraph;
use crate::core::layout_v1::UNKNOWN_LABEL;
use crate::core::model::{PathHop, TraceDirection, TraceStep};

/// Parsed seed search term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeedQuery {
    /// A full barcode, e.g. `79528600-33`.
    Exact(String),
    /// A base code matching every `<base>-<digits>` variant.
    Base(String),
}

/// A term containing a dash and ending in a digit is a full barcode;
/// anything else is treated as a base code.
pub fn parse_search_term(term: &str) -> SeedQuery {
    let term = term.trim();
    if term.contains('-') && term.chars().last().is_some_and(|c| c.is_ascii_digit()) {
        SeedQuery::Exact(term.to_string())
    } else {
        SeedQuery::Base(term.to_string())
    }
}

/// `P` matches `P-1` and `P-12`, not `P-1-2` and not `P1`: exactly one
/// separator and an all-digit suffix.
pub fn matches_base_code(code: &str, base: &str) -> bool {
    let Some(rest) = code.strip_prefix(base) else {
        return false;
    };
    let Some(suffix) = rest.strip_prefix('-') else {
        return false;
    };
    !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit())
}

/// Resolves a query against the index the walk starts from: produced codes
/// for ancestors, consumed codes for descendants. A miss resolves to an
/// empty seed list; the caller decides whether that is an error. Output is
/// sorted so a fixed graph always yields the same seed order.
pub fn resolve_seed_codes(
    graph: &ProductionGraph,
    query: &SeedQuery,
    direction: TraceDirection,
) -> Vec<String> {
    let candidates: Vec<&str> = match direction {
        TraceDirection::Ancestors => graph.output_codes().collect(),
        TraceDirection::Descendants => graph.input_codes().collect(),
    };

    let mut matched: Vec<String> = candidates
        .into_iter()
        .filter(|code| match query {
            SeedQuery::Exact(exact) => *code == exact.as_str(),
            SeedQuery::Base(base) => matches_base_code(code, base),
        })
        .map(str::to_string)
        .collect();
    matched.sort();
    matched
}

struct ItemMeta {
    description: String,
    machine_id: String,
    process_name: String,
    consumed_quantity: f64,
    created_at: Option<chrono::NaiveDateTime>,
    terminal: bool,
}

fn placeholder_if_empty(value: &str) -> String {
    if value.trim().is_empty() {
        UNKNOWN_LABEL.to_string()
    } else {
        value.trim().to_string()
    }
}

/// Metadata fallback tiers: producing representative record, then the first
/// consuming record (true raw materials), then placeholders. A raw material
/// keeps the unknown process even when a consuming row is found — the row's
/// process belongs to the output it produced, not to the material itself.
fn item_metadata(graph: &ProductionGraph, code: &str) -> ItemMeta {
    if let Some(rep) = graph.representative(code) {
        let description = if rep.output_description.trim().is_empty() {
            placeholder_if_empty(&rep.input_description)
        } else {
            rep.output_description.trim().to_string()
        };
        return ItemMeta {
            description,
            machine_id: placeholder_if_empty(&rep.machine_id),
            process_name: placeholder_if_empty(&rep.process_name),
            consumed_quantity: rep.consumed_quantity,
            created_at: rep.created_at,
            terminal: false,
        };
    }

    if let Some(first_use) = graph.input_fallback(code) {
        return ItemMeta {
            description: placeholder_if_empty(&first_use.input_description),
            machine_id: placeholder_if_empty(&first_use.machine_id),
            process_name: UNKNOWN_LABEL.to_string(),
            consumed_quantity: first_use.consumed_quantity,
            created_at: first_use.created_at,
            terminal: true,
        };
    }

    ItemMeta {
        description: UNKNOWN_LABEL.to_string(),
        machine_id: UNKNOWN_LABEL.to_string(),
        process_name: UNKNOWN_LABEL.to_string(),
        consumed_quantity: 0.0,
        created_at: None,
        terminal: true,
    }
}

/// Walks the graph from every seed, depth-first pre-order, and returns the
/// visited steps in traversal order. One visited set covers the whole call,
/// so an item reachable from two seeds is emitted once.
pub fn trace(
    graph: &ProductionGraph,
    seed_codes: &[String],
    direction: TraceDirection,
) -> Vec<TraceStep> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut steps: Vec<TraceStep> = Vec::new();

    for seed in seed_codes {
        walk(graph, direction, seed, &[], &mut visited, &mut steps);
    }

    steps
}

fn walk(
    graph: &ProductionGraph,
    direction: TraceDirection,
    code: &str,
    parent_path: &[PathHop],
    visited: &mut HashSet<String>,
    out: &mut Vec<TraceStep>,
) {
    // Cycle/dedup guard: rework loops exist in the records.
    if !visited.insert(code.to_string()) {
        return;
    }

    let meta = item_metadata(graph, code);

    let mut path = Vec::with_capacity(parent_path.len() + 1);
    path.extend_from_slice(parent_path);
    path.push(PathHop {
        process_name: meta.process_name.clone(),
        item_code: code.to_string(),
    });

    out.push(TraceStep {
        item_code: code.to_string(),
        description: meta.description,
        machine_id: meta.machine_id,
        process_name: meta.process_name,
        consumed_quantity: meta.consumed_quantity,
        created_at: meta.created_at,
        path: path.clone(),
        terminal: meta.terminal,
    });

    match direction {
        TraceDirection::Ancestors => {
            for record in graph.producing_records(code) {
                walk(
                    graph,
                    direction,
                    &record.input_item_code,
                    &path,
                    visited,
                    out,
                );
            }
        }
        TraceDirection::Descendants => {
            for record in graph.consuming_records(code) {
                walk(
                    graph,
                    direction,
                    &record.output_item_code,
                    &path,
                    visited,
                    out,
                );
            }
        }
    }
}
