//! Implementation of the history builtin and `!N` recall.

use crate::common::state_error;
use crate::shell::Shell;

/// Print the log, most recent entry first, numbered from 1. The header text
/// claims the opposite order; both are kept exactly as the shell has always
/// behaved.
pub fn history(shell: &mut Shell, _argv: &[String]) {
    println!("History (last 10 commands used from least to most recent):");
    for (i, cmd) in shell.history.iter_newest_first().enumerate() {
        println!("{}. {}", i + 1, cmd);
    }
}

/// Re-run the Nth history entry, counting oldest = 1 (the reverse of the
/// display numbering). The `!N` line itself has already been appended, so it
/// is part of the log being indexed.
pub fn run_recall(shell: &mut Shell, word: &str) {
    let n: usize = word[1..].parse().unwrap_or(0);
    let len = shell.history.len();
    let Some(cmd) = shell.history.nth_oldest(n) else {
        state_error(&format!(
            "Called command {n} from history, however only {len} commands present in history."
        ));
        return;
    };
    // Feed the recalled line back through the evaluator as if typed.
    let cmd = format!("{cmd}\n");
    crate::eval::eval_line(shell, &cmd);
}
