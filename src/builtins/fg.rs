//! Implementation of the fg builtin: bring a background or stopped job to the
//! foreground and block until it completes or stops again.

use crate::common::user_error;
use crate::jobs::{with_jobs, JobState};
use crate::procfs;
use crate::shell::Shell;
use crate::signal::wait_for_foreground;
use libc::pid_t;

enum Outcome {
    NoSuchJob,
    AlreadyForeground(i32, pid_t),
    Wait(pid_t),
}

pub fn fg(_shell: &mut Shell, argv: &[String]) {
    let Some(arg) = argv.get(1) else {
        user_error("fg command requires a pid or jid argument");
        return;
    };
    let Ok(id) = arg.parse::<i32>() else {
        user_error("fg: argument must be a pid or jid");
        return;
    };

    let outcome = with_jobs(|jobs| {
        let Some(job) = jobs.find_by_jid_or_pid_mut(id) else {
            return Outcome::NoSuchJob;
        };
        match job.state {
            JobState::Foreground => Outcome::AlreadyForeground(job.jid, job.pid),
            JobState::Background => {
                job.state = JobState::Foreground;
                let _ = procfs::write_job_record(job, crate::auth::current_user().as_bytes());
                Outcome::Wait(job.pid)
            }
            JobState::Stopped => {
                job.state = JobState::Foreground;
                let _ = procfs::write_job_record(job, crate::auth::current_user().as_bytes());
                unsafe {
                    libc::kill(-job.pid, libc::SIGCONT);
                }
                Outcome::Wait(job.pid)
            }
        }
    });

    match outcome {
        Outcome::NoSuchJob => user_error(&format!("fg: {id}: No such job")),
        Outcome::AlreadyForeground(jid, pid) => {
            user_error(&format!("Job [{jid}] ({pid}) is already in the foreground."))
        }
        // Block outside the signal block: no resource is held across the wait.
        Outcome::Wait(pid) => wait_for_foreground(pid),
    }
}
