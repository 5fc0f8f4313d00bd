//! Process-spawning tests for the reaper and the foreground forwarding logic.
//!
//! The handler bodies are called directly rather than via signal delivery: the
//! test harness is multithreaded, so an asynchronously delivered SIGCHLD could
//! land on an arbitrary thread. Calling the bodies keeps every assertion
//! deterministic while still exercising real fork/kill/waitpid behavior.

use super::prelude::*;
use crate::jobs::{jobs_for_handler, with_jobs, JobState};
use crate::signal::{
    interrupt_foreground, reap_children, stop_foreground, wait_for_foreground, SignalBlock,
    FG_GATE,
};
use std::sync::atomic::Ordering;

fn reset_job_state() {
    with_jobs(|jobs| jobs.clear());
    FG_GATE.store(0, Ordering::Relaxed);
}

/// Fork a child that unblocks all signals and pauses forever, placed in its
/// own process group from both sides of the fork.
fn spawn_pausing_child() -> libc::pid_t {
    unsafe {
        let pid = libc::fork();
        assert!(pid >= 0, "fork failed");
        if pid == 0 {
            libc::setpgid(0, 0);
            let mut empty: libc::sigset_t = std::mem::zeroed();
            libc::sigemptyset(&mut empty);
            libc::sigprocmask(libc::SIG_SETMASK, &empty, std::ptr::null_mut());
            loop {
                libc::pause();
            }
        }
        libc::setpgid(pid, pid);
        pid
    }
}

fn spawn_exiting_child() -> libc::pid_t {
    unsafe {
        let pid = libc::fork();
        assert!(pid >= 0, "fork failed");
        if pid == 0 {
            libc::_exit(0);
        }
        pid
    }
}

/// Drive the reaper until `done` observes the expected table state.
pub(super) fn reap_until(mut done: impl FnMut() -> bool) {
    for _ in 0..5000 {
        reap_children();
        if done() {
            return;
        }
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
    panic!("child state change not observed by the reaper");
}

#[test]
#[serial]
fn reaper_removes_a_terminated_background_job() {
    test_init();
    reset_job_state();
    let _block = SignalBlock::all();

    let pid = spawn_exiting_child();
    let jobs = unsafe { jobs_for_handler() };
    assert!(jobs.insert(pid, JobState::Background, "true &"));

    reap_until(|| unsafe { jobs_for_handler() }.find_by_pid(pid).is_none());
    // A background termination never touches the foreground gate.
    assert_eq!(FG_GATE.load(Ordering::Relaxed), 0);
}

#[test]
#[serial]
fn foreground_termination_opens_the_gate_exactly_once() {
    test_init();
    reset_job_state();
    let _block = SignalBlock::all();

    let pid = spawn_exiting_child();
    let jobs = unsafe { jobs_for_handler() };
    assert!(jobs.insert(pid, JobState::Foreground, "true"));

    reap_until(|| unsafe { jobs_for_handler() }.find_by_pid(pid).is_none());
    assert_eq!(FG_GATE.load(Ordering::Relaxed), pid);

    // The gate is already open, so the wait returns without suspending and
    // consumes it.
    wait_for_foreground(pid);
    assert_eq!(FG_GATE.load(Ordering::Relaxed), 0);
}

#[test]
#[serial]
fn reaper_marks_a_stopped_foreground_job() {
    test_init();
    reset_job_state();
    let _block = SignalBlock::all();

    let pid = spawn_pausing_child();
    let jobs = unsafe { jobs_for_handler() };
    assert!(jobs.insert(pid, JobState::Foreground, "sleep 100"));

    unsafe {
        libc::kill(pid, libc::SIGSTOP);
    }
    reap_until(|| {
        unsafe { jobs_for_handler() }
            .find_by_pid(pid)
            .is_some_and(|job| job.state == JobState::Stopped)
    });
    assert_eq!(FG_GATE.load(Ordering::Relaxed), pid);
    let record = std::fs::read_to_string(format!("proc/{pid}")).unwrap();
    assert!(record.contains("State:\tT\n"));

    unsafe {
        libc::kill(pid, libc::SIGKILL);
    }
    reap_until(|| unsafe { jobs_for_handler() }.find_by_pid(pid).is_none());
    FG_GATE.store(0, Ordering::Relaxed);
}

#[test]
#[serial]
fn stop_forwarding_marks_the_job_and_opens_the_gate() {
    test_init();
    reset_job_state();
    let _block = SignalBlock::all();

    let pid = spawn_pausing_child();
    let jobs = unsafe { jobs_for_handler() };
    assert!(jobs.insert(pid, JobState::Foreground, "sleep 100"));

    stop_foreground();
    let jobs = unsafe { jobs_for_handler() };
    assert_eq!(jobs.find_by_pid(pid).unwrap().state, JobState::Stopped);
    assert_eq!(FG_GATE.load(Ordering::Relaxed), pid);

    unsafe {
        libc::kill(pid, libc::SIGKILL);
    }
    reap_until(|| unsafe { jobs_for_handler() }.find_by_pid(pid).is_none());
    FG_GATE.store(0, Ordering::Relaxed);
}

#[test]
#[serial]
fn interrupt_targets_only_the_foreground_group() {
    test_init();
    reset_job_state();
    let _block = SignalBlock::all();

    let fg_pid = spawn_pausing_child();
    let bg_pid = spawn_pausing_child();
    let jobs = unsafe { jobs_for_handler() };
    assert!(jobs.insert(fg_pid, JobState::Foreground, "sleep 100"));
    assert!(jobs.insert(bg_pid, JobState::Background, "sleep 200 &"));

    interrupt_foreground();

    let jobs = unsafe { jobs_for_handler() };
    assert!(jobs.find_by_pid(fg_pid).is_none());
    assert_eq!(FG_GATE.load(Ordering::Relaxed), fg_pid);
    // The background job is in its own group and never saw the interrupt.
    assert_eq!(jobs.find_by_pid(bg_pid).unwrap().state, JobState::Background);

    let mut status: libc::c_int = 0;
    let rc = unsafe { libc::waitpid(fg_pid, &mut status, 0) };
    assert_eq!(rc, fg_pid);
    assert!(libc::WIFSIGNALED(status));
    assert_eq!(libc::WTERMSIG(status), libc::SIGINT);

    unsafe {
        libc::kill(bg_pid, libc::SIGKILL);
    }
    reap_until(|| unsafe { jobs_for_handler() }.find_by_pid(bg_pid).is_none());
    FG_GATE.store(0, Ordering::Relaxed);
}

#[test]
#[serial]
fn forwarding_without_a_foreground_job_is_a_no_op() {
    test_init();
    reset_job_state();
    let _block = SignalBlock::all();

    let pid = spawn_pausing_child();
    let jobs = unsafe { jobs_for_handler() };
    assert!(jobs.insert(pid, JobState::Background, "sleep 100 &"));

    interrupt_foreground();
    stop_foreground();

    let jobs = unsafe { jobs_for_handler() };
    assert_eq!(jobs.find_by_pid(pid).unwrap().state, JobState::Background);
    assert_eq!(FG_GATE.load(Ordering::Relaxed), 0);

    unsafe {
        libc::kill(pid, libc::SIGKILL);
    }
    reap_until(|| unsafe { jobs_for_handler() }.find_by_pid(pid).is_none());
}
