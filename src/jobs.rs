//! The job table: a fixed-capacity registry of child processes under shell
//! supervision, plus the scheduling state of each.
//!
//! The table itself performs no signal blocking. Every mutating operation must
//! be called with the job-control signals blocked by the caller: main-thread
//! code goes through [`with_jobs`], which masks all signals for the duration of
//! the closure, and handler code uses [`jobs_for_handler`], relying on the
//! kernel delivering our handlers with every signal masked.

use crate::flog::FLOG;
use libc::pid_t;
use std::cell::UnsafeCell;

/// Max jobs at any point in time.
pub const MAX_JOBS: usize = 16;

/// Max command line length retained per job.
pub const MAX_LINE: usize = 1024;

/// The scheduling state of a tracked job. An empty table slot has no state at
/// all (the slot is `None`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobState {
    /// Running and blocking the main loop; at most one job at a time.
    Foreground,
    /// Running, detached from the prompt.
    Background,
    /// Stopped by SIGTSTP/SIGSTOP; still tracked so bg/fg can resume it.
    Stopped,
}

impl JobState {
    /// The state name used by the `jobs` listing.
    pub fn listing_name(&self) -> &'static str {
        match self {
            JobState::Foreground => "Foreground",
            JobState::Background => "Running",
            JobState::Stopped => "Stopped",
        }
    }

    /// The single-letter state code used by proc records.
    pub fn code(&self) -> u8 {
        match self {
            JobState::Foreground | JobState::Background => b'R',
            JobState::Stopped => b'T',
        }
    }
}

/// One tracked child process. The command line is stored inline so that
/// clearing a slot from handler context frees no memory.
#[derive(Clone, Copy)]
pub struct Job {
    pub pid: pid_t,
    pub jid: i32,
    pub state: JobState,
    cmdline: [u8; MAX_LINE],
    cmdline_len: usize,
}

impl Job {
    fn new(pid: pid_t, jid: i32, state: JobState, cmdline: &str) -> Job {
        let mut buf = [0u8; MAX_LINE];
        let mut len = cmdline.len().min(MAX_LINE);
        while !cmdline.is_char_boundary(len) {
            len -= 1;
        }
        buf[..len].copy_from_slice(&cmdline.as_bytes()[..len]);
        Job {
            pid,
            jid,
            state,
            cmdline: buf,
            cmdline_len: len,
        }
    }

    /// The command text as typed, retained for display.
    pub fn cmdline(&self) -> &str {
        // Always valid: new() only truncates on a char boundary.
        std::str::from_utf8(&self.cmdline[..self.cmdline_len]).unwrap_or("")
    }

    /// The command word (argv[0]) as bytes, for the proc record writer.
    pub fn command_name_bytes(&self) -> &[u8] {
        let bytes = &self.cmdline[..self.cmdline_len];
        match bytes.iter().position(|&b| b == b' ') {
            Some(end) => &bytes[..end],
            None => bytes,
        }
    }
}

pub struct JobTable {
    slots: [Option<Job>; MAX_JOBS],
    /// Next job ID to allocate. Wraps back to 1 after MAX_JOBS and resets to
    /// max(existing jid)+1 whenever a job is deleted.
    next_jid: i32,
}

impl JobTable {
    pub const fn new() -> Self {
        const EMPTY: Option<Job> = None;
        JobTable {
            slots: [EMPTY; MAX_JOBS],
            next_jid: 1,
        }
    }

    /// Add a job. Fails if the pid is invalid or the table is full; a full
    /// table leaves the child running but untracked.
    /// Main-thread only (this logs, and logging allocates).
    pub fn insert(&mut self, pid: pid_t, state: JobState, cmdline: &str) -> bool {
        if pid < 1 {
            return false;
        }
        debug_assert!(
            state != JobState::Foreground || self.foreground_pid() == 0,
            "second foreground job"
        );
        let Some(slot) = self.slots.iter_mut().find(|slot| slot.is_none()) else {
            FLOG!(warning, "Tried to create too many jobs");
            return false;
        };
        let jid = self.next_jid;
        self.next_jid += 1;
        if self.next_jid > MAX_JOBS as i32 {
            self.next_jid = 1;
        }
        *slot = Some(Job::new(pid, jid, state, cmdline));
        FLOG!(job_table, format!("Added job [{}] {} {}", jid, pid, cmdline));
        true
    }

    /// Delete the job whose pid matches. Callable from handler context.
    pub fn remove(&mut self, pid: pid_t) -> bool {
        if pid < 1 {
            return false;
        }
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|job| job.pid == pid) {
                *slot = None;
                self.next_jid = self.max_jid() + 1;
                return true;
            }
        }
        false
    }

    fn max_jid(&self) -> i32 {
        self.iter().map(|job| job.jid).max().unwrap_or(0)
    }

    pub fn find_by_pid(&self, pid: pid_t) -> Option<&Job> {
        if pid < 1 {
            return None;
        }
        self.iter().find(|job| job.pid == pid)
    }

    pub fn find_by_pid_mut(&mut self, pid: pid_t) -> Option<&mut Job> {
        if pid < 1 {
            return None;
        }
        self.iter_mut().find(|job| job.pid == pid)
    }

    pub fn find_by_jid(&self, jid: i32) -> Option<&Job> {
        if jid < 1 {
            return None;
        }
        self.iter().find(|job| job.jid == jid)
    }

    pub fn find_by_jid_mut(&mut self, jid: i32) -> Option<&mut Job> {
        if jid < 1 {
            return None;
        }
        self.iter_mut().find(|job| job.jid == jid)
    }

    /// Resolve a bg/fg numeral: jid first, then literal pid.
    pub fn find_by_jid_or_pid_mut(&mut self, id: i32) -> Option<&mut Job> {
        if self.find_by_jid(id).is_some() {
            return self.find_by_jid_mut(id);
        }
        self.find_by_pid_mut(id as pid_t)
    }

    /// The pid of the sole foreground job, or 0 if none.
    pub fn foreground_pid(&self) -> pid_t {
        self.iter()
            .find(|job| job.state == JobState::Foreground)
            .map(|job| job.pid)
            .unwrap_or(0)
    }

    /// Present jobs in slot order, for the `jobs` listing.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Job> {
        self.slots.iter_mut().filter_map(|slot| slot.as_mut())
    }

    /// True if any job remains tracked; blocks logout.
    pub fn any_active(&self) -> bool {
        self.slots.iter().any(|slot| slot.is_some())
    }

    /// Clear every slot and reset the jid allocator.
    pub fn clear(&mut self) {
        self.slots = [None; MAX_JOBS];
        self.next_jid = 1;
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide job table. Initialized at startup, shared between the main
/// thread and the signal handlers, serialized purely by signal masking.
struct JobTableStorage(UnsafeCell<JobTable>);

// Safety: every access path masks signals (see module docs), and the shell has
// no other threads touching the table.
unsafe impl Sync for JobTableStorage {}

static JOBS: JobTableStorage = JobTableStorage(UnsafeCell::new(JobTable::new()));

/// Run `f` against the job table with all signals blocked. This is the only
/// way main-thread code may touch the table; a read-then-write sequence inside
/// one closure cannot be torn by a handler.
pub fn with_jobs<R>(f: impl FnOnce(&mut JobTable) -> R) -> R {
    let _block = crate::signal::SignalBlock::all();
    f(unsafe { &mut *JOBS.0.get() })
}

/// Access the table from handler context (or from main-thread code that has
/// already blocked all signals). Caller must guarantee exclusivity.
pub(crate) unsafe fn jobs_for_handler() -> &'static mut JobTable {
    &mut *JOBS.0.get()
}
