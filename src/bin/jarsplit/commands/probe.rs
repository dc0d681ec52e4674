//! `jarsplit probe` command

use anyhow::Result;

use crate::cli::VariantArgs;
use crate::commands::variant_options;
use jarsplit::ops::build_probe;

pub fn execute(args: VariantArgs) -> Result<()> {
    let (variant, opts) = variant_options(args)?;

    let result = build_probe(&variant, &opts)?;
    let merge = &result.probe.merge;

    eprintln!(
        "    Finished probe -> {} ({} classes, {} distinct dependencies{})",
        merge.archive.display(),
        merge.manifest.classes().len(),
        result.probe.distinct.len(),
        if merge.up_to_date { ", up to date" } else { "" }
    );

    // Duplicates were already logged as a warning; they don't fail the step.
    Ok(())
}
