//! Transform command - run the full pipeline and print or save the
//! normalized dataset.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;

use assay::{Assay, AssayConfig, TransformOutcome};

/// Rows printed in the table preview before truncating.
const PREVIEW_ROWS: usize = 10;

pub fn run(
    file: PathBuf,
    source: Option<String>,
    output: Option<PathBuf>,
    json_output: bool,
    no_adapters: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(&file)
        .map_err(|e| format!("Cannot read {}: {}", file.display(), e))?;

    let source = source.unwrap_or_else(|| {
        file.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string())
    });

    let config = AssayConfig {
        use_adapters: !no_adapters,
        ..AssayConfig::default()
    };
    let engine = Assay::with_config(config)?;
    let outcome = engine.transform_str(&text, &source);
    tracing::debug!(source = %source, success = outcome.success, "transform finished");

    if let Some(path) = &output {
        fs::write(path, serde_json::to_string_pretty(&outcome)?)
            .map_err(|e| format!("Cannot write {}: {}", path.display(), e))?;
        if !json_output {
            println!("{} {}", "Wrote".green(), path.display());
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_summary(&outcome, verbose);
    }

    if !outcome.success {
        let reason = outcome
            .error
            .unwrap_or_else(|| "transformation failed".to_string());
        return Err(reason.into());
    }
    Ok(())
}

fn print_summary(outcome: &TransformOutcome, verbose: bool) {
    let dataset = &outcome.data;

    println!(
        "{} {}",
        "Transformed".cyan().bold(),
        dataset.title.white().bold()
    );
    println!(
        "Type: {}   Rows: {}   Columns: {}",
        dataset.data_type.to_string().yellow(),
        dataset.total_records.to_string().white().bold(),
        dataset.columns.len()
    );
    println!();

    if dataset.rows.is_empty() {
        println!("{}", "No rows materialized.".red());
        return;
    }

    let labels: Vec<&str> = dataset.columns.iter().map(|c| c.label.as_str()).collect();
    println!("{}", labels.join("  |  ").bold());

    for row in dataset.rows.iter().take(PREVIEW_ROWS) {
        let cells: Vec<String> = dataset
            .columns
            .iter()
            .map(|col| match row.get(&col.key) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(value) => value.to_string(),
                None => String::new(),
            })
            .collect();
        println!("{}", cells.join("  |  "));
    }
    if dataset.rows.len() > PREVIEW_ROWS {
        println!(
            "{}",
            format!("... {} more rows", dataset.rows.len() - PREVIEW_ROWS).dimmed()
        );
    }

    if verbose {
        println!();
        println!("{}", "Provenance".cyan().bold());
        println!(
            "  processed: {}  succeeded: {}  failed: {}",
            outcome.metadata.records_processed,
            outcome.metadata.records_succeeded,
            outcome.metadata.records_failed
        );
        for (target, src) in &outcome.metadata.field_mappings {
            println!("  {:<16} <- {}", target.green(), src);
        }
        for warning in &outcome.metadata.warnings {
            println!("  {} {}", "warning:".yellow(), warning);
        }
    }
}
