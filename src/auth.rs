//! Login and the credential store.
//!
//! The store is the file `etc/passwd` relative to the shell's working
//! directory, one `username:password:homedir` line per user. The logged-in
//! identity is process-wide, single-assignment state: it is set once by a
//! successful login and read (without allocation, so handler context may call
//! it) everywhere else.

use crate::common::{exit_shell, state_error, user_error};
use crate::flog::FLOG;
use once_cell::sync::OnceCell;
use std::io::{BufRead, Write};

static USERNAME: OnceCell<String> = OnceCell::new();
static HOME: OnceCell<String> = OnceCell::new();

/// The logged-in username, or "" before login.
pub fn current_user() -> &'static str {
    USERNAME.get().map(|s| s.as_str()).unwrap_or("")
}

/// The logged-in user's home directory (CWD-relative), or "" before login.
pub fn home_dir() -> &'static str {
    HOME.get().map(|s| s.as_str()).unwrap_or("")
}

pub fn set_identity(user: String, home: String) {
    let _ = USERNAME.set(user);
    let _ = HOME.set(home);
}

const PASSWD_FILE: &str = "etc/passwd";

/// Split one store line into (username, password, homedir).
/// Malformed lines (fewer than three fields) never match.
fn parse_passwd_line(line: &str) -> Option<(&str, &str, &str)> {
    let mut fields = line.trim_end_matches('\n').splitn(3, ':');
    let user = fields.next()?;
    let pass = fields.next()?;
    let home = fields.next()?;
    Some((user, pass, home))
}

/// Scan the store for a matching username/password pair; return the user's
/// home directory on success.
pub fn authenticate(username: &str, password: &str) -> Option<String> {
    let contents = match std::fs::read_to_string(PASSWD_FILE) {
        Ok(contents) => contents,
        Err(_) => {
            state_error("Could not open etc/passwd file.");
            return None;
        }
    };
    for line in contents.lines() {
        if let Some((user, pass, home)) = parse_passwd_line(line) {
            if user == username && pass == password {
                return Some(home.to_string());
            }
        }
    }
    None
}

/// True if the store already has a user with this name.
pub fn user_exists(username: &str) -> bool {
    let contents = match std::fs::read_to_string(PASSWD_FILE) {
        Ok(contents) => contents,
        Err(_) => {
            state_error("Could not open etc/passwd file.");
            return false;
        }
    };
    contents
        .lines()
        .filter_map(parse_passwd_line)
        .any(|(user, _, _)| user == username)
}

/// Read one whitespace-delimited word, skipping leading whitespace.
/// Returns None at end of input. Words are accumulated as raw bytes and
/// decoded once at the end, so multi-byte UTF-8 input survives intact.
pub fn read_word(reader: &mut impl BufRead) -> Option<String> {
    let mut word: Vec<u8> = Vec::new();
    loop {
        let buf = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(_) => return None,
        };
        if buf.is_empty() {
            return if word.is_empty() {
                None
            } else {
                Some(String::from_utf8_lossy(&word).into_owned())
            };
        }
        let mut used = 0;
        for &byte in buf {
            used += 1;
            if byte.is_ascii_whitespace() {
                if !word.is_empty() {
                    reader.consume(used);
                    return Some(String::from_utf8_lossy(&word).into_owned());
                }
            } else {
                word.push(byte);
            }
        }
        reader.consume(used);
    }
}

/// Prompt for credentials until a store entry matches, then record the
/// identity. Typing `quit` as the username, or end of input, exits the shell.
pub fn login() {
    let stdin = std::io::stdin();
    loop {
        print!("username: ");
        let _ = std::io::stdout().flush();
        let Some(username) = read_word(&mut stdin.lock()) else {
            exit_shell();
        };
        if username == "quit" {
            exit_shell();
        }

        print!("password: ");
        let _ = std::io::stdout().flush();
        let Some(password) = read_word(&mut stdin.lock()) else {
            exit_shell();
        };

        match authenticate(&username, &password) {
            Some(home) => {
                FLOG!(auth, "user", &username, "logged in");
                set_identity(username, home);
                return;
            }
            None => user_error("User Authentication failed. Please try again."),
        }
    }
}
