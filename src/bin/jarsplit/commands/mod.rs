//! Command implementations

pub mod probe;
pub mod run;
pub mod target;

use anyhow::Result;

use crate::cli::VariantArgs;
use jarsplit::core::VariantInputs;
use jarsplit::ops::{SplitOptions, VariantOptions};
use jarsplit::util::Config;

/// Build the library options for a `target` or `probe` invocation.
pub fn variant_options(args: VariantArgs) -> Result<(VariantOptions, SplitOptions)> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&args.manifest_dir.join("jarsplit.toml")),
    };

    let mut config = config
        .with_diagnostics(args.diagnostics)
        .with_jobs(args.jobs);
    if args.force {
        config.merge.incremental = false;
    }

    let variant = VariantOptions {
        inputs: VariantInputs {
            class_dirs: args.classes,
            dependency_archives: args.jars,
        },
        output: args.output,
    };
    let opts = SplitOptions {
        manifest_dir: args.manifest_dir,
        config,
    };
    Ok((variant, opts))
}
