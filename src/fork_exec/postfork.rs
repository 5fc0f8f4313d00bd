// The stuff that happens after fork.
// Everything in this module must be async-signal safe.
// That means no locking, no allocating, no freeing memory, etc!

use super::flog_safe::FLOG_SAFE;
use crate::common::exit_without_destructors;
use crate::signal::signal_reset_handlers;
use libc::pid_t;
use std::ffi::CStr;
use std::time::Duration;

/// The number of times to try to call fork() before giving up.
const FORK_LAPS: usize = 5;

/// The number of nanoseconds to sleep between attempts to call fork().
const FORK_SLEEP_TIME: Duration = Duration::from_nanos(1000000);

/// This function is a wrapper around fork. If the fork call fails with EAGAIN, it is retried
/// FORK_LAPS times, with a very slight delay between each lap. If fork fails even then, the
/// process will exit with an error message.
pub fn execute_fork() -> pid_t {
    let mut err = 0;
    for i in 0..FORK_LAPS {
        let pid = unsafe { libc::fork() };
        if pid >= 0 {
            return pid;
        }
        err = errno::errno().0;
        if err != libc::EAGAIN {
            break;
        }
        // Don't sleep on the final lap.
        if i != FORK_LAPS - 1 {
            std::thread::sleep(FORK_SLEEP_TIME);
        }
    }

    match err {
        libc::EAGAIN => {
            FLOG_SAFE!(
                error,
                "fork: Out of resources. Check RLIMIT_NPROC and pid_max."
            );
        }
        libc::ENOMEM => {
            FLOG_SAFE!(error, "fork: Out of memory.");
        }
        _ => {
            FLOG_SAFE!(error, "fork: Unknown error number ", err);
        }
    }
    exit_without_destructors(1)
}

/// Execute setpgid, placing the process in its own new group.
/// Return 0 on success, or the value of errno on failure.
pub fn execute_setpgid(pid: pid_t, pgroup: pid_t, is_parent: bool) -> i32 {
    loop {
        if unsafe { libc::setpgid(pid, pgroup) } == 0 {
            return 0;
        }
        let err = errno::errno().0;
        if err == libc::EACCES && is_parent {
            // We are the parent process and our child has already called exec().
            // This is an unavoidable benign race.
            return 0;
        } else if err == libc::EINTR {
            // Paranoia.
            continue;
        }

        match err {
            libc::EACCES => FLOG_SAFE!(error, "setpgid: Process ", pid, " has already exec'd"),
            libc::ESRCH => FLOG_SAFE!(error, "setpgid: Process ID ", pid, " does not match"),
            _ => FLOG_SAFE!(error, "setpgid: Unknown error number ", err),
        }
        return err;
    }
}

/// Set up signal handling in a forked child: restore the pre-fork signal mask
/// so the new program starts with normal disposition, and reset every handler
/// the shell installed back to SIG_DFL.
pub fn child_setup_process(sigmask: &libc::sigset_t) {
    // Note we are called in a forked child.
    unsafe {
        libc::sigprocmask(libc::SIG_SETMASK, sigmask, std::ptr::null_mut());
    }
    signal_reset_handlers();
}

/// Report a failure to exec `argv0` from the forked child. The child must never
/// fall through into shell code, so callers exit immediately after this.
pub(crate) fn safe_report_exec_error(argv0: &CStr) {
    let fd = libc::STDOUT_FILENO;
    let write_all = |bytes: &[u8]| unsafe {
        let _ = libc::write(fd, bytes.as_ptr().cast(), bytes.len());
    };
    write_all(argv0.to_bytes());
    write_all(b": Command not found.\n");
}
