//! Production genealogy (traceability) core for wire/rod consumption records.
//! Responsibilities: producer/consumer graph construction, backward/forward
//! genealogy walks, report projection, and the xlsx boundary for both ends.
//! Non-goals: barcode-label GUIs and the ad-hoc reconciliation reports
//! (handled by separate scripts).

pub mod core;
pub mod error;
pub mod usecase;

// --- Convenience surface (thin scripts and tests use these paths) ---
pub use crate::core::graph::ProductionGraph;
pub use crate::core::layout_v1;
pub use crate::core::model;
pub use crate::usecase::export::export_trace_xlsx;
pub use crate::usecase::import_events_xlsx;
pub use crate::usecase::project;
pub use crate::usecase::trace;
