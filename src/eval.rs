//! The evaluator: one command line in, one built-in dispatch or job launch out.

use crate::builtins;
use crate::exec::launch_job;
use crate::history;
use crate::parse::parse_cmdline;
use crate::shell::Shell;

/// Evaluate one submitted line. Empty lines are ignored entirely; everything
/// else is recorded in history (file first, then memory) before dispatch, so
/// `history`, `jobs` and the `!N` line itself all appear in the log.
pub fn eval_line(shell: &mut Shell, line: &str) {
    let (argv, bg) = parse_cmdline(line);
    if argv.is_empty() {
        return;
    }

    let cmdline = line.strip_suffix('\n').unwrap_or(line);
    history::append_to_file(crate::auth::home_dir(), cmdline);
    shell.history.push(cmdline);

    if builtins::is_builtin(&argv[0]) {
        builtins::run_builtin(shell, &argv);
    } else {
        launch_job(&argv, bg, cmdline);
    }
}
