//! Traceability data model: normalized consumption events, walk output and
//! warning/report DTOs.
//!
//! Constraints (from the plant's reporting discipline):
//! - Data-quality problems never abort a run; absent fields degrade to
//!   `"Bilinmiyor"` / `0.0` placeholders that a reviewer can spot downstream.
//! - Everything serializable is camelCase for script consumers.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::layout_v1::{PATH_SEPARATOR, REPORT_TIMESTAMP_FORMAT};

/// One production/consumption transaction: an input item consumed to produce
/// an output item, plus whatever metadata the source row carried.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub input_item_code: String,
    pub output_item_code: String,
    #[serde(default)]
    pub process_name: String,
    #[serde(default)]
    pub machine_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub input_description: String,
    #[serde(default)]
    pub output_description: String,
    /// Kilograms of input consumed. Dirty source cells coerce to 0.0 at the
    /// import boundary; a zero here is not proof of zero consumption.
    #[serde(default)]
    pub consumed_quantity: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TraceDirection {
    /// From a finished item back toward the raw materials that constitute it.
    Ancestors,
    /// From a raw material forward to everything it contributed to.
    Descendants,
}

/// One `(process, item_code)` hop in a walk path.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PathHop {
    pub process_name: String,
    pub item_code: String,
}

impl PathHop {
    pub fn render(&self) -> String {
        format!("{} ({})", self.process_name, self.item_code)
    }
}

/// Renders a hop list as `"<process> (<code>) -> <process> (<code>) -> ..."`.
pub fn render_path(hops: &[PathHop]) -> String {
    hops.iter()
        .map(PathHop::render)
        .collect::<Vec<String>>()
        .join(PATH_SEPARATOR)
}

/// One node visited during a walk. Ephemeral: produced by `trace` and
/// consumed by the report projection within the same run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TraceStep {
    pub item_code: String,
    pub description: String,
    pub machine_id: String,
    pub process_name: String,
    pub consumed_quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    /// Hops from the walk's seed up to and including this node.
    pub path: Vec<PathHop>,
    /// True when the item never appears as an output (raw material), or is
    /// absent from the graph entirely.
    pub terminal: bool,
}

impl TraceStep {
    /// Number of edges between this node and its seed. The seed itself sits
    /// at depth 0 because its own hop is part of the path.
    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ReportOrder {
    /// Traversal order (seed first, depth-first pre-order).
    Natural,
    /// Longest genealogy chains first.
    DeepestFirst,
    /// Reversed rows and reversed path tokens, so the chain reads raw
    /// material → finished product.
    RawMaterialFirst,
}

/// One exported report row. Column order and header text live in
/// `layout_v1`; this is the value side only.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub item_code: String,
    pub description: String,
    pub machine_id: String,
    pub consumed_quantity: f64,
    pub created_at: String,
    pub process_name: String,
    pub path: String,
}

/// Renders an optional timestamp for the report; absent stays empty.
pub fn render_timestamp(value: Option<NaiveDateTime>) -> String {
    match value {
        Some(ts) => ts.format(REPORT_TIMESTAMP_FORMAT).to_string(),
        None => String::new(),
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TraceWarning {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u32>,
}
