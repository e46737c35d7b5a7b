//! Usecase layer: orchestrates core + xlsx adapters into callable report
//! operations.

pub mod export;
pub mod import_events_xlsx;
pub mod project;
pub mod trace;
