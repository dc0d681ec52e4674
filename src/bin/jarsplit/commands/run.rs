//! `jarsplit run` command

use anyhow::Result;

use crate::cli::RunArgs;
use jarsplit::core::Job;
use jarsplit::ops::run_job;

pub fn execute(args: RunArgs) -> Result<()> {
    let mut job = Job::load(&args.job)?;
    job.config = job.config.with_jobs(args.jobs);
    if args.force {
        job.config.merge.incremental = false;
    }

    let result = run_job(&job)?;
    let target = &result.target.merge;
    let probe = &result.probe.probe;

    eprintln!(
        "    Finished target -> {} ({} classes{})",
        target.archive.display(),
        target.manifest.classes().len(),
        up_to_date(target.up_to_date)
    );
    eprintln!(
        "    Finished probe -> {} ({} classes, {} distinct dependencies{})",
        probe.merge.archive.display(),
        probe.merge.manifest.classes().len(),
        probe.distinct.len(),
        up_to_date(probe.merge.up_to_date)
    );

    Ok(())
}

fn up_to_date(cached: bool) -> &'static str {
    if cached {
        ", up to date"
    } else {
        ""
    }
}
