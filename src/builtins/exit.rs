//! Implementation of the quit and logout builtins.

use crate::common::{exit_shell, user_error};
use crate::jobs::with_jobs;
use crate::shell::Shell;

pub fn quit(_shell: &mut Shell, _argv: &[String]) {
    exit_shell();
}

/// Like quit, but refuses while any job remains tracked.
pub fn logout(_shell: &mut Shell, _argv: &[String]) {
    if with_jobs(|jobs| jobs.any_active()) {
        user_error("There are suspended jobs.");
    } else {
        exit_shell();
    }
}
