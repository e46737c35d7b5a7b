use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;

use izleme_core::core::model::{ReportOrder, TraceDirection};
use izleme_core::usecase::export::export_trace_xlsx::export_trace_xlsx;
use izleme_core::usecase::import_events_xlsx::{
    import_events_xlsx_with_options, ImportEventsOptions,
};
use izleme_core::usecase::project::project;
use izleme_core::usecase::trace::{parse_search_term, resolve_seed_codes, trace, SeedQuery};
use izleme_core::ProductionGraph;

const USAGE: &str = "usage: izleme <events.xlsx> <search-term> \
[--direction ancestors|descendants] [--order raw-first|natural|deepest-first] \
[--sheet NAME] [--strict] [--out PATH]";

#[derive(Debug)]
struct CliArgs {
    events_path: PathBuf,
    search_term: String,
    direction: TraceDirection,
    order: ReportOrder,
    sheet_name: Option<String>,
    strict: bool,
    out_path: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut positional: Vec<&String> = Vec::new();
    let mut direction = TraceDirection::Ancestors;
    let mut order = ReportOrder::RawMaterialFirst;
    let mut sheet_name = None;
    let mut strict = false;
    let mut out_path = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--direction" => {
                let value = iter.next().context("--direction needs a value")?;
                direction = match value.as_str() {
                    "ancestors" => TraceDirection::Ancestors,
                    "descendants" => TraceDirection::Descendants,
                    other => anyhow::bail!("unknown direction: {other}"),
                };
            }
            "--order" => {
                let value = iter.next().context("--order needs a value")?;
                order = match value.as_str() {
                    "natural" => ReportOrder::Natural,
                    "deepest-first" => ReportOrder::DeepestFirst,
                    "raw-first" => ReportOrder::RawMaterialFirst,
                    other => anyhow::bail!("unknown order: {other}"),
                };
            }
            "--sheet" => {
                sheet_name = Some(iter.next().context("--sheet needs a value")?.clone());
            }
            "--strict" => strict = true,
            "--out" => {
                out_path = Some(PathBuf::from(
                    iter.next().context("--out needs a value")?,
                ));
            }
            _ => positional.push(arg),
        }
    }

    if positional.len() != 2 {
        anyhow::bail!("{USAGE}");
    }

    Ok(CliArgs {
        events_path: PathBuf::from(positional[0]),
        search_term: positional[1].clone(),
        direction,
        order,
        sheet_name,
        strict,
        out_path,
    })
}

fn sanitize_for_filename(term: &str) -> String {
    term.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn default_out_path(search_term: &str) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!(
        "uretim_izleme_sonucu_{}_{timestamp}.xlsx",
        sanitize_for_filename(search_term)
    ))
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args)?;

    if !cli.events_path.exists() {
        anyhow::bail!("events file not found: {}", cli.events_path.display());
    }

    let outcome = match import_events_xlsx_with_options(
        &cli.events_path,
        Some(ImportEventsOptions {
            strict: Some(cli.strict),
            sheet_name: cli.sheet_name.clone(),
        }),
    ) {
        Ok(outcome) => outcome,
        Err(err) => {
            // Stable JSON shape for script consumers wrapping this binary.
            let report_error = err.to_report_error();
            eprintln!("{}", serde_json::to_string_pretty(&report_error)?);
            anyhow::bail!("import failed: {err}");
        }
    };

    for warning in &outcome.warnings {
        println!("[warn] {}: {}", warning.code, warning.message);
    }
    println!(
        "[ok] {} rows imported from sheet '{}' ({} events)",
        outcome.diagnostics.rows_scanned,
        outcome.diagnostics.used_sheet,
        outcome.events.len()
    );

    let graph = ProductionGraph::build(outcome.events);
    let query = parse_search_term(&cli.search_term);
    let seeds = resolve_seed_codes(&graph, &query, cli.direction);

    if seeds.is_empty() {
        match &query {
            SeedQuery::Exact(code) => println!("[warn] barcode not found: {code}"),
            SeedQuery::Base(base) => println!("[warn] no barcode matches base code: {base}"),
        }
        return Ok(());
    }
    println!("[ok] {} seed barcode(s) resolved", seeds.len());

    let steps = trace(&graph, &seeds, cli.direction);
    let rows = project(&steps, cli.order);

    let out_path = cli
        .out_path
        .unwrap_or_else(|| default_out_path(&cli.search_term));
    let export = export_trace_xlsx(&out_path, &rows)
        .with_context(|| format!("failed to write report: {}", out_path.display()))?;

    println!(
        "[ok] {} rows -> {} ({} ms)",
        export.diagnostics.exported_rows,
        out_path.display(),
        export.diagnostics.duration_ms
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_are_ancestors_and_raw_material_first() {
        let cli = parse_args(&args(&["events.xlsx", "79528600"])).unwrap();
        assert_eq!(cli.direction, TraceDirection::Ancestors);
        assert_eq!(cli.order, ReportOrder::RawMaterialFirst);
        assert!(!cli.strict);
        assert!(cli.sheet_name.is_none());
        assert!(cli.out_path.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse_args(&args(&[
            "events.xlsx",
            "77359201-1",
            "--direction",
            "descendants",
            "--order",
            "deepest-first",
            "--sheet",
            "Sayfa1",
            "--strict",
            "--out",
            "rapor.xlsx",
        ]))
        .unwrap();
        assert_eq!(cli.direction, TraceDirection::Descendants);
        assert_eq!(cli.order, ReportOrder::DeepestFirst);
        assert_eq!(cli.sheet_name.as_deref(), Some("Sayfa1"));
        assert!(cli.strict);
        assert_eq!(cli.out_path.as_deref(), Some(Path::new("rapor.xlsx")));
    }

    #[test]
    fn missing_positionals_fail_with_usage() {
        let err = parse_args(&args(&["events.xlsx"])).unwrap_err();
        assert!(err.to_string().contains("usage:"));
    }

    #[test]
    fn search_term_is_sanitized_for_the_default_filename() {
        assert_eq!(sanitize_for_filename("79528600-33"), "79528600-33");
        assert_eq!(sanitize_for_filename("a b/c"), "a_b_c");
    }
}
