//! Producer/consumer index over consumption events.
//!
//! Built once per run from the imported event batch and passed by reference
//! into the walker; no ambient global state. Record lists preserve insertion
//! order, which is what makes a fixed input batch traverse deterministically.

use std::collections::HashMap;

use crate::core::model::EventRecord;

#[derive(Clone, Debug, Default)]
pub struct ProductionGraph {
    by_output: HashMap<String, Vec<EventRecord>>,
    by_input: HashMap<String, Vec<EventRecord>>,
    event_count: usize,
}

impl ProductionGraph {
    /// Indexes a finite batch of events. No validation: malformed or
    /// duplicate records are indexed as-is and propagate into the report
    /// instead of aborting the batch.
    pub fn build(events: impl IntoIterator<Item = EventRecord>) -> Self {
        let mut by_output: HashMap<String, Vec<EventRecord>> = HashMap::new();
        let mut by_input: HashMap<String, Vec<EventRecord>> = HashMap::new();
        let mut event_count = 0usize;

        for event in events {
            event_count += 1;
            by_input
                .entry(event.input_item_code.clone())
                .or_default()
                .push(event.clone());
            by_output
                .entry(event.output_item_code.clone())
                .or_default()
                .push(event);
        }

        Self {
            by_output,
            by_input,
            event_count,
        }
    }

    /// All records that produced `code`, insertion order. Multiple entries
    /// mean multiple inputs fed one output batch (or the code recurred).
    pub fn producing_records(&self, code: &str) -> &[EventRecord] {
        self.by_output.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All records in which `code` was consumed, insertion order.
    pub fn consuming_records(&self, code: &str) -> &[EventRecord] {
        self.by_input.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First-seen producing record: the metadata source for a repeated
    /// output code.
    pub fn representative(&self, code: &str) -> Option<&EventRecord> {
        self.producing_records(code).first()
    }

    /// First record that consumed `code`; metadata fallback for items that
    /// are never an output themselves.
    pub fn input_fallback(&self, code: &str) -> Option<&EventRecord> {
        self.consuming_records(code).first()
    }

    /// A terminal item (raw material) never appears as an output.
    pub fn is_terminal(&self, code: &str) -> bool {
        !self.by_output.contains_key(code)
    }

    pub fn output_codes(&self) -> impl Iterator<Item = &str> {
        self.by_output.keys().map(String::as_str)
    }

    pub fn input_codes(&self) -> impl Iterator<Item = &str> {
        self.by_input.keys().map(String::as_str)
    }

    pub fn event_count(&self) -> usize {
        self.event_count
    }

    pub fn output_count(&self) -> usize {
        self.by_output.len()
    }
}
