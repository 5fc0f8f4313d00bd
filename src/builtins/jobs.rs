//! Implementation of the jobs builtin: list the job table.

use crate::jobs::with_jobs;
use crate::shell::Shell;

/// Render one listing line per present job, in slot order.
/// Collects under the signal block so printing happens outside it.
pub fn listing_lines() -> Vec<String> {
    with_jobs(|jobs| {
        jobs.iter()
            .map(|job| {
                format!(
                    "[{}] ({}) {} {}",
                    job.jid,
                    job.pid,
                    job.state.listing_name(),
                    job.cmdline()
                )
            })
            .collect()
    })
}

pub fn jobs(_shell: &mut Shell, _argv: &[String]) {
    for line in listing_lines() {
        println!("{line}");
    }
}
