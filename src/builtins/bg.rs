//! Implementation of the bg builtin: resume a stopped job in the background.

use crate::common::user_error;
use crate::jobs::{with_jobs, JobState};
use crate::procfs;
use crate::shell::Shell;
use libc::pid_t;

enum Outcome {
    NoSuchJob,
    IsForeground(i32, pid_t),
    AlreadyBackground(i32, pid_t),
    Resumed,
}

pub fn bg(_shell: &mut Shell, argv: &[String]) {
    let Some(arg) = argv.get(1) else {
        user_error("bg command requires a pid or jid argument");
        return;
    };
    let Ok(id) = arg.parse::<i32>() else {
        user_error("bg: argument must be a pid or jid");
        return;
    };

    // Lookup, transition and continue-signal happen under one signal block;
    // a reap interleaving between them could act on a stale state.
    let outcome = with_jobs(|jobs| {
        let Some(job) = jobs.find_by_jid_or_pid_mut(id) else {
            return Outcome::NoSuchJob;
        };
        match job.state {
            JobState::Foreground => Outcome::IsForeground(job.jid, job.pid),
            JobState::Background => Outcome::AlreadyBackground(job.jid, job.pid),
            JobState::Stopped => {
                job.state = JobState::Background;
                let _ = procfs::write_job_record(job, crate::auth::current_user().as_bytes());
                unsafe {
                    libc::kill(-job.pid, libc::SIGCONT);
                }
                Outcome::Resumed
            }
        }
    });

    match outcome {
        Outcome::NoSuchJob => user_error(&format!("bg: {id}: No such job")),
        Outcome::IsForeground(jid, pid) => user_error(&format!(
            "Job [{jid}] ({pid}) is in the foreground and must be stopped first."
        )),
        Outcome::AlreadyBackground(jid, pid) => {
            user_error(&format!("Job [{jid}] ({pid}) is already in the background."))
        }
        Outcome::Resumed => {}
    }
}
