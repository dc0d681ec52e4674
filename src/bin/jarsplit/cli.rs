//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Jarsplit - merge and split JVM classpaths for usage analysis
#[derive(Parser)]
#[command(name = "jarsplit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge the target variant and record its manifest
    Target(VariantArgs),

    /// Merge the probe variant against a recorded target manifest
    Probe(VariantArgs),

    /// Run both steps from a job file
    Run(RunArgs),
}

#[derive(Args)]
pub struct VariantArgs {
    /// Compiled class directory (repeatable; later directories win)
    #[arg(long = "classes", value_name = "DIR")]
    pub classes: Vec<PathBuf>,

    /// Dependency archive (repeatable)
    #[arg(long = "jar", value_name = "JAR")]
    pub jars: Vec<PathBuf>,

    /// Merged archive to write
    #[arg(short, long, value_name = "JAR")]
    pub output: PathBuf,

    /// Directory holding the variant manifests
    #[arg(long, value_name = "DIR")]
    pub manifest_dir: PathBuf,

    /// Write diagnostic files to this directory
    #[arg(long, value_name = "DIR")]
    pub diagnostics: Option<PathBuf>,

    /// Configuration file (defaults to <manifest-dir>/jarsplit.toml if present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Merge even if the inputs are unchanged
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct RunArgs {
    /// Job file describing both variants
    pub job: PathBuf,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Merge even if the inputs are unchanged
    #[arg(long)]
    pub force: bool,
}
