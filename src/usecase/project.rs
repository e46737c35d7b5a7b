//! Report projection: turns walk output into export-ready rows.
//!
//! Pure over the step list. The raw-material-first orientation is produced
//! here by reversing both the row order and each path's hop order; the
//! walker itself always emits seed-first.

use crate::core::model::{render_path, render_timestamp, ReportOrder, ReportRow, TraceStep};

pub fn project(steps: &[TraceStep], order: ReportOrder) -> Vec<ReportRow> {
    match order {
        ReportOrder::Natural => steps.iter().map(|s| row_from_step(s, false)).collect(),
        ReportOrder::DeepestFirst => {
            let mut sorted: Vec<&TraceStep> = steps.iter().collect();
            sorted.sort_by(|a, b| {
                b.depth()
                    .cmp(&a.depth())
                    .then_with(|| a.item_code.cmp(&b.item_code))
            });
            sorted.into_iter().map(|s| row_from_step(s, false)).collect()
        }
        ReportOrder::RawMaterialFirst => steps
            .iter()
            .rev()
            .map(|s| row_from_step(s, true))
            .collect(),
    }
}

fn row_from_step(step: &TraceStep, reverse_path: bool) -> ReportRow {
    let path = if reverse_path {
        let mut hops = step.path.clone();
        hops.reverse();
        render_path(&hops)
    } else {
        render_path(&step.path)
    };

    ReportRow {
        item_code: step.item_code.clone(),
        description: step.description.clone(),
        machine_id: step.machine_id.clone(),
        consumed_quantity: step.consumed_quantity,
        created_at: render_timestamp(step.created_at),
        process_name: step.process_name.clone(),
        path,
    }
}
