//! Process-wide helpers and the error reporting routines shared by the whole shell.
//!
//! The shell distinguishes four kinds of failure:
//! - fatal system errors ([`unix_error`]) carry the OS error text and terminate,
//! - fatal application errors ([`app_error`]) terminate without OS error text,
//! - recoverable state errors ([`state_error`]) are reported and execution continues
//!   with the in-memory state as the source of truth,
//! - user errors ([`user_error`]) are reported and the command is ignored.
//!
//! All reports go to stdout; stderr is dup2'd onto stdout at startup so
//! diagnostics interleave with normal output.

use errno::errno;
use std::io::Write;

/// Exits without invoking destructors (via _exit), useful for code after fork.
pub fn exit_without_destructors(code: libc::c_int) -> ! {
    unsafe { libc::_exit(code) };
}

pub fn getpid() -> libc::pid_t {
    unsafe { libc::getpid() }
}

fn flush_stdout() {
    let _ = std::io::stdout().flush();
}

/// Fatal system error: report `msg: <strerror(errno)>` and terminate.
pub fn unix_error(msg: &str) -> ! {
    println!("{}: {}", msg, errno());
    flush_stdout();
    exit_without_destructors(1)
}

/// Fatal application error: report and terminate.
pub fn app_error(msg: &str) -> ! {
    println!("{msg}");
    flush_stdout();
    exit_without_destructors(1)
}

/// Recoverable state error: report and continue. The on-disk mirrors
/// (history file, proc records, passwd file) may now be stale.
pub fn state_error(msg: &str) {
    println!("Error: {msg}");
}

/// User error: report and continue, no state is mutated.
pub fn user_error(msg: &str) {
    println!("{msg}");
}

/// Exit code used by a forked child whose exec failed.
pub const EXIT_CMD_NOT_FOUND: libc::c_int = 127;

/// Flush stdout and exit cleanly. Used by `quit`, `logout` and end-of-input.
pub fn exit_shell() -> ! {
    flush_stdout();
    exit_without_destructors(0)
}
