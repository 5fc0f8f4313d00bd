//! Signal handling: installation of the job-control handlers, the reaping and
//! forwarding logic that runs inside them, and the foreground wait gate.
//!
//! The handlers are installed with every signal masked (sa_mask is full), so a
//! running handler cannot be preempted by another one, and main-thread code
//! that needs the same exclusivity blocks signals via [`SignalBlock`]. The
//! handler bodies use only async-signal-safe operations: waitpid/kill, the
//! `FLOG_SAFE!` write path, and plain stores to the shared state in
//! [`crate::jobs`] and [`FG_GATE`].

use crate::common::{exit_without_destructors, getpid, unix_error};
use crate::fork_exec::flog_safe::FLOG_SAFE;
use crate::jobs::{jobs_for_handler, JobState};
use crate::procfs;
use errno::{errno, set_errno};
use libc::pid_t;
use std::sync::atomic::{AtomicI32, Ordering};

/// Store the "main" pid. This allows us to reliably determine if we are in a
/// forked child.
static MAIN_PID: AtomicI32 = AtomicI32::new(0);

/// The foreground wait gate: 0 when idle, otherwise the pid of the foreground
/// job whose most recent stop or termination the main thread has yet to
/// observe. Written only from handler context, read and reset only by
/// [`wait_for_foreground`].
pub(crate) static FG_GATE: AtomicI32 = AtomicI32::new(0);

/// It's possible that we receive a signal after we have forked, but before we
/// have reset the signal handlers. In that event we would mutate the parent's
/// job table image from inside the child. Check if we are the main shell
/// process; if not, reset and re-raise the signal. Return whether we re-raised.
fn reraise_if_forked_child(sig: i32) -> bool {
    if getpid() == MAIN_PID.load(Ordering::Relaxed) {
        return false;
    }
    // Safety: signal() and raise() are async-signal-safe.
    unsafe {
        libc::signal(sig, libc::SIG_DFL);
        libc::raise(sig);
    }
    true
}

/// An RAII guard which blocks signals on construction and restores the previous
/// mask on drop.
pub struct SignalBlock {
    saved: libc::sigset_t,
}

impl SignalBlock {
    /// Block every signal.
    pub fn all() -> Self {
        unsafe {
            let mut set: libc::sigset_t = std::mem::zeroed();
            libc::sigfillset(&mut set);
            Self::block(&set)
        }
    }

    /// Block only SIGCHLD. Used across fork+insert so the reaper cannot run
    /// before the job is registered.
    pub fn sigchld() -> Self {
        unsafe {
            let mut set: libc::sigset_t = std::mem::zeroed();
            libc::sigemptyset(&mut set);
            libc::sigaddset(&mut set, libc::SIGCHLD);
            Self::block(&set)
        }
    }

    unsafe fn block(set: &libc::sigset_t) -> Self {
        let mut saved: libc::sigset_t = std::mem::zeroed();
        libc::sigprocmask(libc::SIG_BLOCK, set, &mut saved);
        SignalBlock { saved }
    }

    /// The mask in effect before this guard, e.g. to restore in a forked child.
    pub fn saved_mask(&self) -> libc::sigset_t {
        self.saved
    }
}

impl Drop for SignalBlock {
    fn drop(&mut self) {
        unsafe {
            libc::sigprocmask(libc::SIG_SETMASK, &self.saved, std::ptr::null_mut());
        }
    }
}

/// Reap all currently-terminated-or-stopped children without blocking, and
/// update the job table and the wait gate accordingly. This is the SIGCHLD
/// handler body; it must drain every pending event before returning, since
/// pending signals of one kind coalesce.
pub(crate) fn reap_children() {
    loop {
        let mut status: libc::c_int = 0;
        let pid =
            unsafe { libc::waitpid(-1, &mut status, libc::WNOHANG | libc::WUNTRACED) };
        if pid == 0 {
            break;
        }
        if pid < 0 {
            let err = errno().0;
            if err == libc::ECHILD {
                break;
            }
            FLOG_SAFE!(error, "waitpid error ", err);
            exit_without_destructors(1);
        }

        let jobs = unsafe { jobs_for_handler() };
        if libc::WIFSTOPPED(status) {
            if let Some(job) = jobs.find_by_pid_mut(pid) {
                let was_foreground = job.state == JobState::Foreground;
                job.state = JobState::Stopped;
                if !procfs::write_job_record(job, crate::auth::current_user().as_bytes()) {
                    FLOG_SAFE!(warning, "could not update proc record for pid ", pid);
                }
                FLOG_SAFE!(proc_reap, "child ", pid, " stopped");
                if was_foreground {
                    FG_GATE.store(pid, Ordering::Relaxed);
                }
            }
        } else {
            // Terminated, normally or by a fatal signal.
            let was_foreground = jobs.foreground_pid() == pid;
            if jobs.remove(pid) {
                if !procfs::delete_record(pid) {
                    FLOG_SAFE!(warning, "could not remove proc record for pid ", pid);
                }
                FLOG_SAFE!(proc_reap, "reaped child ", pid);
            }
            if was_foreground {
                FG_GATE.store(pid, Ordering::Relaxed);
            }
        }
    }
}

/// Forward a keyboard interrupt to the foreground job's process group, if any,
/// and drop the job. Background jobs are in their own groups and never see the
/// interrupt. This is the SIGINT handler body.
pub(crate) fn interrupt_foreground() {
    let jobs = unsafe { jobs_for_handler() };
    let fg = jobs.foreground_pid();
    if fg <= 0 {
        return;
    }
    unsafe {
        libc::kill(-fg, libc::SIGINT);
    }
    jobs.remove(fg);
    if !procfs::delete_record(fg) {
        FLOG_SAFE!(warning, "could not remove proc record for pid ", fg);
    }
    FG_GATE.store(fg, Ordering::Relaxed);
}

/// Forward a keyboard stop to the foreground job's process group, if any, and
/// mark the job Stopped; it stays tracked so bg/fg can later resume it. This is
/// the SIGTSTP handler body.
pub(crate) fn stop_foreground() {
    let jobs = unsafe { jobs_for_handler() };
    let fg = jobs.foreground_pid();
    if fg <= 0 {
        return;
    }
    unsafe {
        libc::kill(-fg, libc::SIGTSTP);
    }
    if let Some(job) = jobs.find_by_pid_mut(fg) {
        job.state = JobState::Stopped;
        if !procfs::write_job_record(job, crate::auth::current_user().as_bytes()) {
            FLOG_SAFE!(warning, "could not update proc record for pid ", fg);
        }
    }
    FG_GATE.store(fg, Ordering::Relaxed);
}

extern "C" fn tsh_sigchld_handler(
    _sig: i32,
    _info: *mut libc::siginfo_t,
    _context: *mut libc::c_void,
) {
    // Ensure we preserve errno.
    let saved_errno = errno();
    if !reraise_if_forked_child(libc::SIGCHLD) {
        reap_children();
    }
    set_errno(saved_errno);
}

extern "C" fn tsh_sigint_handler(
    _sig: i32,
    _info: *mut libc::siginfo_t,
    _context: *mut libc::c_void,
) {
    let saved_errno = errno();
    if !reraise_if_forked_child(libc::SIGINT) {
        interrupt_foreground();
    }
    set_errno(saved_errno);
}

extern "C" fn tsh_sigtstp_handler(
    _sig: i32,
    _info: *mut libc::siginfo_t,
    _context: *mut libc::c_void,
) {
    let saved_errno = errno();
    if !reraise_if_forked_child(libc::SIGTSTP) {
        stop_foreground();
    }
    set_errno(saved_errno);
}

/// SIGQUIT provides a clean external way to kill the shell.
extern "C" fn tsh_sigquit_handler(
    _sig: i32,
    _info: *mut libc::siginfo_t,
    _context: *mut libc::c_void,
) {
    if reraise_if_forked_child(libc::SIGQUIT) {
        return;
    }
    let msg = b"Terminating after receipt of SIGQUIT signal\n";
    unsafe {
        let _ = libc::write(libc::STDOUT_FILENO, msg.as_ptr().cast(), msg.len());
    }
    exit_without_destructors(1);
}

// Wrapper around sigaction.
fn sigaction(sig: i32, act: &libc::sigaction) -> libc::c_int {
    unsafe { libc::sigaction(sig, act, std::ptr::null_mut()) }
}

/// Install the three job-control handlers plus the SIGQUIT handler.
/// Installation failure is a fatal system error.
pub fn install_handlers() {
    MAIN_PID.store(getpid(), Ordering::Relaxed);

    let mut act: libc::sigaction = unsafe { std::mem::zeroed() };
    // Run each handler with every signal masked, and restart interrupted
    // syscalls rather than surfacing EINTR to the read loop.
    unsafe { libc::sigfillset(&mut act.sa_mask) };
    act.sa_flags = libc::SA_SIGINFO | libc::SA_RESTART;

    act.sa_sigaction = tsh_sigint_handler as usize;
    if sigaction(libc::SIGINT, &act) != 0 {
        unix_error("Signal error");
    }
    act.sa_sigaction = tsh_sigtstp_handler as usize;
    if sigaction(libc::SIGTSTP, &act) != 0 {
        unix_error("Signal error");
    }
    act.sa_sigaction = tsh_sigchld_handler as usize;
    if sigaction(libc::SIGCHLD, &act) != 0 {
        unix_error("Signal error");
    }
    act.sa_sigaction = tsh_sigquit_handler as usize;
    if sigaction(libc::SIGQUIT, &act) != 0 {
        unix_error("Signal error");
    }
}

/// Set all our handled signals back to SIG_DFL.
/// This is called after fork - it must be async-signal safe.
pub fn signal_reset_handlers() {
    let mut act: libc::sigaction = unsafe { std::mem::zeroed() };
    unsafe { libc::sigemptyset(&mut act.sa_mask) };
    act.sa_flags = 0;
    act.sa_sigaction = libc::SIG_DFL;
    for sig in [libc::SIGINT, libc::SIGTSTP, libc::SIGCHLD, libc::SIGQUIT] {
        unsafe {
            libc::sigaction(sig, &act, std::ptr::null_mut());
        }
    }
}

/// Block until the foreground job `pid` terminates or stops.
///
/// SIGCHLD is blocked while the gate is checked, and `sigsuspend` atomically
/// unblocks it only for the duration of the sleep; a state change that lands
/// between the check and the sleep is therefore delivered once we are
/// suspended, never lost. Other signals stay deliverable throughout, so a ^C
/// typed while waiting reaches its handler (which also writes the gate).
pub fn wait_for_foreground(pid: pid_t) {
    unsafe {
        let mut chld: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut chld);
        libc::sigaddset(&mut chld, libc::SIGCHLD);
        let mut saved: libc::sigset_t = std::mem::zeroed();
        libc::sigprocmask(libc::SIG_BLOCK, &chld, &mut saved);

        while FG_GATE.load(Ordering::Relaxed) != pid {
            let mut suspend_mask = saved;
            libc::sigdelset(&mut suspend_mask, libc::SIGCHLD);
            // Always returns -1/EINTR once any unblocked signal was handled.
            libc::sigsuspend(&suspend_mask);
        }
        FG_GATE.store(0, Ordering::Relaxed);

        libc::sigprocmask(libc::SIG_SETMASK, &saved, std::ptr::null_mut());
    }
}
