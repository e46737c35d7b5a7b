pub mod export_trace_xlsx;
