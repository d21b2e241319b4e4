use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use tracing::{debug, info};

use logmd_map::apply_view;
use logmd_validate::{LoadError, load_logger_metadata};

use crate::cli::{DumpArgs, ValidateArgs, ViewArgs};

/// Validate each file, printing one status line per file and every
/// violation a failing document carries. Returns whether all files passed.
pub fn run_validate(args: &ValidateArgs) -> Result<bool> {
    let start = Instant::now();
    let mut all_ok = true;
    for path in &args.files {
        debug!(file = %path.display(), "validating");
        match load_logger_metadata(path) {
            Ok(md) => {
                println!(
                    "{}: ok ({}, {} table(s))",
                    path.display(),
                    md.logger_name,
                    md.tables.len()
                );
            }
            Err(LoadError::Semantic(report)) => {
                all_ok = false;
                println!("{}: {report}", path.display());
            }
            Err(error) => {
                all_ok = false;
                println!("{}: {error}", path.display());
            }
        }
    }
    info!(
        file_count = args.files.len(),
        duration_ms = start.elapsed().as_millis(),
        "validation complete"
    );
    Ok(all_ok)
}

/// Load a document and print the typed model back out as JSON. Since the
/// model only exists for valid documents, this doubles as a normalizer.
pub fn run_dump(args: &DumpArgs) -> Result<()> {
    let md = load_logger_metadata(&args.file)
        .with_context(|| format!("load {}", args.file.display()))?;
    let rendered = serde_json::to_string_pretty(&md).context("serialize metadata")?;
    println!("{rendered}");
    Ok(())
}

/// Apply a named view mapping and print the projected column descriptors.
pub fn run_view(args: &ViewArgs) -> Result<()> {
    let md = load_logger_metadata(&args.file)
        .with_context(|| format!("load {}", args.file.display()))?;
    let table_def = md
        .table(&args.table)
        .ok_or_else(|| anyhow!("no table {:?} in {}", args.table, md.logger_name))?;
    let mapping = table_def
        .mapping(&args.mapping)
        .ok_or_else(|| anyhow!("table {:?} has no mapping {:?}", args.table, args.mapping))?;
    let view = apply_view(table_def, mapping)?;

    let mut out = Table::new();
    out.set_header(vec!["Column", "Unit", "Prc", "SQL name"]);
    apply_table_style(&mut out);
    for column in &view {
        out.add_row(vec![
            column.name.clone(),
            column.unit.clone().unwrap_or_default(),
            column.prc.clone().unwrap_or_default(),
            column.sql_name(),
        ]);
    }
    println!("{out}");
    Ok(())
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}
