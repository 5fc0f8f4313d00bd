//! The shell's top-level context and read-eval loop.

use crate::common::{app_error, exit_shell};
use crate::eval::eval_line;
use crate::history::History;
use std::io::{BufRead, Write};

pub const PROMPT: &str = "tsh> ";

pub struct Shell {
    pub history: History,
    pub emit_prompt: bool,
}

impl Shell {
    pub fn new(history: History, emit_prompt: bool) -> Self {
        Shell {
            history,
            emit_prompt,
        }
    }

    /// Run the read-eval loop until end of input or a quitting builtin.
    /// The very first iteration after login prints no prompt.
    pub fn run(&mut self) -> ! {
        let mut first_read = true;
        loop {
            if self.emit_prompt {
                if first_read {
                    first_read = false;
                } else {
                    print!("{PROMPT}");
                }
                let _ = std::io::stdout().flush();
            }

            let mut line = String::new();
            match std::io::stdin().lock().read_line(&mut line) {
                Ok(0) => exit_shell(),
                Ok(_) => eval_line(self, &line),
                Err(_) => app_error("fgets error"),
            }
            let _ = std::io::stdout().flush();
        }
    }
}
