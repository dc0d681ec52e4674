//! `jarsplit target` command

use anyhow::Result;

use crate::cli::VariantArgs;
use crate::commands::variant_options;
use jarsplit::ops::build_target;

pub fn execute(args: VariantArgs) -> Result<()> {
    let (variant, opts) = variant_options(args)?;

    let result = build_target(&variant, &opts)?;
    let merge = &result.merge;

    eprintln!(
        "    Finished target -> {} ({} classes{})",
        merge.archive.display(),
        merge.manifest.classes().len(),
        if merge.up_to_date { ", up to date" } else { "" }
    );

    Ok(())
}
