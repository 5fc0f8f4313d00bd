//! Synthetic per-pid status records under `proc/`, one flat file per tracked
//! job in the style of Linux's `/proc/<pid>/status`.
//!
//! Records are written on insert, rewritten on every state transition and
//! unlinked on removal - including from handler context, so the writer uses
//! only raw `open`/`write`/`close`/`unlink` with stack-formatted buffers. The
//! shell's correctness never depends on a record write succeeding; failures
//! are reported and the record goes stale.

use crate::common::state_error;
use crate::fork_exec::flog_safe::{format_int, StackBuffer};
use crate::jobs::Job;
use libc::pid_t;

const PROC_DIR: &str = "proc";

/// Create the `proc/` directory at startup if absent.
pub fn init_proc_dir() {
    match std::fs::create_dir(PROC_DIR) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {}
        Err(_) => state_error("Could not create proc directory."),
    }
}

/// Render `proc/<pid>\0` into `buf`, returning the nul-terminated prefix.
fn record_path(pid: pid_t, buf: &mut [u8; 40]) -> *const libc::c_char {
    let mut cursor = 0;
    for &b in PROC_DIR.as_bytes() {
        buf[cursor] = b;
        cursor += 1;
    }
    buf[cursor] = b'/';
    cursor += 1;
    let mut storage = StackBuffer::uninit();
    for &b in format_int(&mut storage, pid.unsigned_abs().into(), pid < 0) {
        buf[cursor] = b;
        cursor += 1;
    }
    buf[cursor] = 0;
    buf.as_ptr().cast()
}

fn write_all(fd: libc::c_int, bytes: &[u8]) -> bool {
    let mut bytes = bytes;
    while !bytes.is_empty() {
        let amt = unsafe { libc::write(fd, bytes.as_ptr().cast(), bytes.len()) };
        if amt < 0 {
            if errno::errno().0 == libc::EINTR {
                continue;
            }
            return false;
        }
        bytes = &bytes[amt as usize..];
    }
    true
}

fn write_int(fd: libc::c_int, val: i64) -> bool {
    let mut storage = StackBuffer::uninit();
    let bytes = format_int(&mut storage, val.unsigned_abs(), val < 0);
    write_all(fd, bytes)
}

/// Write (or rewrite) the record for one job. Async-signal-safe.
pub fn write_record(pid: pid_t, name: &[u8], state_code: u8, owner: &[u8]) -> bool {
    let mut path = [0u8; 40];
    let path = record_path(pid, &mut path);
    let fd = unsafe {
        libc::open(
            path,
            libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
            0o644 as libc::c_uint,
        )
    };
    if fd < 0 {
        return false;
    }
    let shell_pid = crate::common::getpid();
    let sid = unsafe { libc::getsid(0) };
    let ok = write_all(fd, b"Name:\t")
        && write_all(fd, name)
        && write_all(fd, b"\nPid:\t")
        && write_int(fd, pid.into())
        && write_all(fd, b"\nPPid:\t")
        && write_int(fd, shell_pid.into())
        && write_all(fd, b"\nPGid:\t")
        && write_int(fd, pid.into())
        && write_all(fd, b"\nSid:\t")
        && write_int(fd, sid.into())
        && write_all(fd, b"\nState:\t")
        && write_all(fd, &[state_code])
        && write_all(fd, b"\nOwner:\t")
        && write_all(fd, owner)
        && write_all(fd, b"\n");
    unsafe {
        libc::close(fd);
    }
    ok
}

/// Write the record for a tracked job. The PGid field equals the job's pid:
/// the launcher puts every child in its own group.
pub fn write_job_record(job: &Job, owner: &[u8]) -> bool {
    write_record(job.pid, job.command_name_bytes(), job.state.code(), owner)
}

/// Unlink the record for a removed job. A record that is already gone counts
/// as deleted. Async-signal-safe.
pub fn delete_record(pid: pid_t) -> bool {
    let mut path = [0u8; 40];
    let path = record_path(pid, &mut path);
    let rc = unsafe { libc::unlink(path) };
    rc == 0 || errno::errno().0 == libc::ENOENT
}
