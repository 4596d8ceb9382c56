//! Inspect command - show the inferred schema, classification, and
//! field mappings for a payload without transforming it.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use serde_json::Value;

use assay::Assay;

pub fn run(file: PathBuf, json_output: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(&file)
        .map_err(|e| format!("Cannot read {}: {}", file.display(), e))?;
    let raw: Value = serde_json::from_str(&text)
        .map_err(|e| format!("{} is not valid JSON: {}", file.display(), e))?;

    let engine = Assay::new();
    let schema = engine.schema(&raw);
    let classification = engine.classify(&raw);
    let template = engine.mapping(&raw);

    if json_output {
        let report = serde_json::json!({
            "file": file.display().to_string(),
            "schema": schema,
            "classification": classification,
            "mapping": template,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Inspecting".cyan().bold(),
        file.display().to_string().white()
    );
    println!();

    println!(
        "Structure:  {}",
        classification.structure.to_string().yellow().bold()
    );
    if !classification.data_path.is_empty() {
        println!("Data path:  {}", classification.data_path.join(" -> "));
    }
    println!(
        "Iteration:  {}",
        if classification.is_array {
            "array"
        } else {
            "object"
        }
    );
    println!();

    let mappings = template.all_mappings();
    if mappings.is_empty() {
        println!("{}", "No canonical fields mapped.".red());
    } else {
        println!("{}", "Field mappings".cyan().bold());
        for (target, source) in &mappings {
            println!("  {:<16} <- {}", target.green(), source);
        }
    }

    if verbose {
        println!();
        println!("{}", "Discovered fields".cyan().bold());
        for (name, field) in &schema.fields {
            println!("  {:<24} {}", name, field.field_type.to_string().dimmed());
        }
        if !schema.metadata.is_empty() {
            println!();
            println!("{}", "Metadata sections".cyan().bold());
            for name in schema.metadata.keys() {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}
