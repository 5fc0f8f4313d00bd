//! The main-thread half of the process launcher: prepare the argument vector,
//! fork, register the job, then wait or notify.
//!
//! The launch discipline is what keeps the job table consistent: SIGCHLD is
//! blocked before forking so the parent always registers the job before the
//! reaper could observe any state change from it, and the insert itself runs
//! with every signal blocked.

use crate::common::{exit_without_destructors, state_error, user_error, EXIT_CMD_NOT_FOUND};
use crate::flog::FLOG;
use crate::fork_exec::postfork::{
    child_setup_process, execute_fork, execute_setpgid, safe_report_exec_error,
};
use crate::jobs::{with_jobs, JobState};
use crate::procfs;
use crate::signal::{wait_for_foreground, SignalBlock};
use errno::errno;
use std::ffi::CString;

/// Fork and exec a non-built-in command. `argv` is the parsed argument vector
/// (background marker already stripped), `cmdline` the original text for the
/// job table and the background-start notice.
pub fn launch_job(argv: &[String], bg: bool, cmdline: &str) {
    let mut cargs: Vec<CString> = Vec::with_capacity(argv.len());
    for arg in argv {
        let Ok(carg) = CString::new(arg.as_str()) else {
            user_error("Invalid command line.");
            return;
        };
        cargs.push(carg);
    }
    let mut argv_ptrs: Vec<*const libc::c_char> = cargs.iter().map(|c| c.as_ptr()).collect();
    argv_ptrs.push(std::ptr::null());

    // Hold SIGCHLD across fork+insert so the child cannot be reaped (or even
    // looked up) before its table entry exists.
    let chld_block = SignalBlock::sigchld();
    let child_mask = chld_block.saved_mask();

    FLOG!(exec_fork, "Fork for command", &argv[0]);
    let pid = execute_fork();
    if pid == 0 {
        // Forked child. Everything from here to exec must be async-signal-safe.
        // A new process group isolates this job from interactive signals aimed
        // at the shell's foreground job.
        execute_setpgid(0, 0, false);
        child_setup_process(&child_mask);
        unsafe {
            libc::execvp(argv_ptrs[0], argv_ptrs.as_ptr());
        }
        safe_report_exec_error(&cargs[0]);
        exit_without_destructors(EXIT_CMD_NOT_FOUND);
    }

    // Parent. Assign the group on this side too; whichever of the two setpgid
    // calls runs first wins and the other is a no-op.
    execute_setpgid(pid, pid, true);

    let state = if bg {
        JobState::Background
    } else {
        JobState::Foreground
    };
    let tracked = with_jobs(|jobs| {
        if !jobs.insert(pid, state, cmdline) {
            return false;
        }
        if let Some(job) = jobs.find_by_pid(pid) {
            if !procfs::write_job_record(job, crate::auth::current_user().as_bytes()) {
                state_error(&format!("Could not write proc/{pid} record."));
            }
        }
        true
    });
    drop(chld_block);

    if !tracked {
        // Degraded mode: the child runs, orphaned from job control. The reaper
        // will never signal the gate for it, so a foreground job is waited on
        // directly; the SIGCHLD handler may win that race and leave us ECHILD.
        if !bg {
            let mut status: libc::c_int = 0;
            while unsafe { libc::waitpid(pid, &mut status, 0) } < 0 {
                if errno().0 != libc::EINTR {
                    break;
                }
            }
        }
        return;
    }

    if bg {
        println!("{pid} {cmdline}");
    } else {
        wait_for_foreground(pid);
    }
}
