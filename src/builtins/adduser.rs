//! Implementation of the adduser builtin (root only).
//!
//! Each provisioning step reports its own state error and the later steps
//! still run; a half-created user is an accepted inconsistency, consistent
//! with how the shell treats every external mirror.

use crate::auth;
use crate::common::{state_error, user_error};
use crate::shell::Shell;
use std::io::Write;
use std::os::unix::fs::DirBuilderExt;

pub fn adduser(_shell: &mut Shell, argv: &[String]) {
    let name = argv.get(1).map(String::as_str).unwrap_or("");
    let password = argv.get(2).map(String::as_str).unwrap_or("");
    if name.is_empty() || password.is_empty() {
        user_error(&format!(
            "Invalid username ({name}) or password({password}) provided."
        ));
        return;
    }

    if auth::current_user() != "root" {
        user_error("root privileges required to run adduser.");
        return;
    }

    if auth::user_exists(name) {
        user_error(&format!("User {name} may already exist."));
        return;
    }

    let home = format!("home/{name}");
    if std::fs::DirBuilder::new()
        .mode(0o700)
        .create(&home)
        .is_err()
    {
        state_error("Could not create user directory.");
    }

    if std::fs::File::create(format!("{home}/.tsh_history")).is_err() {
        state_error("Could not create .tsh_history file.");
    }

    let mut passwd = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("etc/passwd")
    {
        Ok(file) => file,
        Err(_) => {
            state_error("Could not open etc/passwd file.");
            return;
        }
    };
    if writeln!(passwd, "{name}:{password}:{home}").is_err() {
        state_error("Could not write to etc/passwd file.");
    }
}
