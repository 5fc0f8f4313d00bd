//! The bounded command history: a 10-entry in-memory log, oldest first, with a
//! per-user file mirror at `<home>/.tsh_history`.
//!
//! Every submitted line is appended file-first; a failed file write is a
//! recoverable state error and the in-memory append still happens, leaving the
//! mirror stale.

use crate::common::state_error;
use crate::flog::FLOG;
use std::io::Write;

/// Max history size.
pub const MAX_HISTORY: usize = 10;

/// The in-memory log, oldest entry first.
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        History {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry; a full log discards its oldest entry.
    pub fn push(&mut self, cmd: &str) {
        if self.entries.len() == MAX_HISTORY {
            self.entries.remove(0);
        }
        self.entries.push(cmd.to_string());
    }

    /// The Nth entry counting oldest = 1; this is the `!N` numbering.
    pub fn nth_oldest(&self, n: usize) -> Option<&str> {
        if n < 1 {
            return None;
        }
        self.entries.get(n - 1).map(|s| s.as_str())
    }

    /// Entries most recent first; this is the `history` display order.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().rev().map(|s| s.as_str())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

fn history_file(home: &str) -> String {
    format!("{home}/.tsh_history")
}

/// Seed the log from the last [`MAX_HISTORY`] lines of the user's history
/// file. Open failure is a state error and yields an empty log.
pub fn load(home: &str) -> History {
    let path = history_file(home);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(_) => {
            state_error(&format!("Could not open {home}/.tsh_history file."));
            return History::new();
        }
    };
    let lines: Vec<&str> = contents.lines().filter(|line| !line.is_empty()).collect();
    let mut history = History::new();
    let skip = lines.len().saturating_sub(MAX_HISTORY);
    for line in &lines[skip..] {
        history.push(line);
    }
    FLOG!(history_file, "Loaded", history.len(), "entries from", &path);
    history
}

/// Append one command to the user's history file.
pub fn append_to_file(home: &str, cmd: &str) {
    let path = history_file(home);
    let mut file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(file) => file,
        Err(_) => {
            state_error(&format!("Could not open {home}/.tsh_history file."));
            return;
        }
    };
    if writeln!(file, "{cmd}").is_err() {
        state_error("Could not write to history file.");
    }
}
