//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Assay: schema-driven normalization of financial JSON payloads
#[derive(Parser)]
#[command(name = "assay")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect a payload: inferred schema, classification, and mappings
    Inspect {
        /// Path to a JSON payload file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON instead of a human-readable report
        #[arg(long)]
        json: bool,
    },

    /// Transform a payload into a normalized dataset
    Transform {
        /// Path to a JSON payload file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Source identifier recorded in the dataset (default: file stem)
        #[arg(short, long)]
        source: Option<String>,

        /// Write the full outcome envelope to a file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the outcome envelope as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Skip the provider adapter fast paths
        #[arg(long)]
        no_adapters: bool,
    },
}
