// The main routine of the tsh shell: flag parsing, handler installation,
// login, then the read-eval loop.

use tsh::common::exit_without_destructors;
use tsh::history;
use tsh::jobs::with_jobs;
use tsh::shell::Shell;
use tsh::{auth, flog, procfs, signal};

fn usage() -> ! {
    print!(
        "Usage: shell [-hvp]\n   \
         -h   print this message\n   \
         -v   print additional diagnostic information\n   \
         -p   do not emit a command prompt\n"
    );
    use std::io::Write;
    let _ = std::io::stdout().flush();
    exit_without_destructors(1)
}

fn main() {
    // Redirect stderr onto stdout so diagnostics interleave with normal
    // output on one stream.
    unsafe {
        libc::dup2(libc::STDOUT_FILENO, libc::STDERR_FILENO);
    }

    let mut emit_prompt = true;
    // Flags are matched as whole arguments; combined forms like -vp are not
    // recognized and print usage.
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" => flog::activate_all_categories(),
            "-p" => emit_prompt = false,
            // -h, and anything unrecognized, prints usage and exits.
            _ => usage(),
        }
    }

    signal::install_handlers();
    with_jobs(|jobs| jobs.clear());
    procfs::init_proc_dir();

    auth::login();

    let history = history::load(auth::home_dir());
    let mut shell = Shell::new(history, emit_prompt);
    shell.run();
}
