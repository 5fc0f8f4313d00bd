//! Category-gated diagnostic logging, distinct from the shell's user-facing output.
//!
//! Ordinary (main-thread) diagnostics go through the [`FLOG!`] macro. Handler
//! context must use `FLOG_SAFE!` from [`crate::fork_exec::flog_safe`] instead,
//! which performs no allocation or formatting.

use errno::errno;
use libc::c_int;
use std::sync::atomic::{AtomicI32, Ordering};

pub mod categories {
    use crate::global_safety::RelaxedAtomicBool;

    pub struct category_t {
        pub name: &'static str,
        pub description: &'static str,
        pub enabled: RelaxedAtomicBool,
    }

    /// Macro to declare a static variable identified by $var,
    /// with the given name and description, and optionally enabled by default.
    macro_rules! declare_category {
        (
            ($var:ident, $name:literal, $description:literal, $enabled:expr)
        ) => {
            #[allow(non_upper_case_globals)]
            pub static $var: category_t = category_t {
                name: $name,
                description: $description,
                enabled: RelaxedAtomicBool::new($enabled),
            };
        };
        (
            ($var:ident, $name:expr, $description:expr)
        ) => {
            declare_category!(($var, $name, $description, false));
        };
    }

    /// Macro to extract the variable name for a category.
    macro_rules! category_name {
        (($var:ident, $name:literal, $description:literal, $enabled:expr)) => {
            $var
        };
        (($var:ident, $name:literal, $description:literal)) => {
            $var
        };
    }

    macro_rules! categories {
        (
            // A repetition of categories, separated by semicolons.
            $($cats:tt);*

            // Allow trailing semicolon.
            $(;)?
        ) => {
            // Declare each category.
            $(
                declare_category!($cats);
            )*

            // Define a function which gives you a Vector of all categories.
            pub fn all_categories() -> Vec<&'static category_t> {
                vec![
                    $(
                        & category_name!($cats),
                    )*
                ]
            }
        };
    }

    categories!(
        (error, "error", "Serious unexpected errors (on by default)", true);

        (warning, "warning", "Warnings (on by default)", true);

        (debug, "debug", "Debugging aid");

        (job_table, "job-table", "Jobs entering and leaving the job table");

        (proc_reap, "proc-reap", "Reaping terminated or stopped children");

        (exec_fork, "exec-fork", "Calls to fork()");

        (history_file, "history-file", "Reading/writing the history file");

        (auth, "auth", "Login and credential store events");
    );
}

/// FLOG formats values. By default we would like to use Display, and fall back to Debug.
/// However that would require specialization. So instead we make two "separate" traits, bring
/// them both in scope, and let Rust figure it out.
pub trait FloggableDisplay {
    /// Return a string representation of this thing.
    fn to_flog_str(&self) -> String;
}

impl<T: std::fmt::Display> FloggableDisplay for T {
    fn to_flog_str(&self) -> String {
        self.to_string()
    }
}

pub trait FloggableDebug: std::fmt::Debug {
    fn to_flog_str(&self) -> String {
        format!("{:?}", self)
    }
}

/// Write to our FLOG file.
pub fn flog_impl(s: &str) {
    let fd = get_flog_file_fd();
    if fd < 0 {
        return;
    }
    let mut bytes = s.as_bytes();
    while !bytes.is_empty() {
        let amt = unsafe { libc::write(fd, bytes.as_ptr().cast(), bytes.len()) };
        if amt < 0 {
            if errno().0 == libc::EINTR {
                continue;
            }
            return;
        }
        bytes = &bytes[amt as usize..];
    }
}

/// The entry point for flogging.
#[macro_export]
macro_rules! FLOG {
    ($category:ident, $($elem:expr),+ $(,)*) => {
        if $crate::flog::categories::$category.enabled.load() {
            #[allow(unused_imports)]
            use $crate::flog::{FloggableDisplay, FloggableDebug};
            let mut vs = vec![format!("{}:", $crate::flog::categories::$category.name)];
            $(
                {
                   vs.push($elem.to_flog_str())
                }
            )+
            // We don't use locking here so we have to append our own newline to avoid
            // multiple writes.
            let mut v = vs.join(" ");
            v.push('\n');
            $crate::flog::flog_impl(&v);
        }
    };
}

pub use FLOG;

/// Enable every category. This is what the `-v` flag does.
pub fn activate_all_categories() {
    for cat in categories::all_categories() {
        cat.enabled.store(true);
    }
}

/// The flog output fd. Defaults to stderr. A value < 0 disables flog.
static FLOG_FD: AtomicI32 = AtomicI32::new(libc::STDERR_FILENO);

pub fn set_flog_file_fd(fd: c_int) {
    FLOG_FD.store(fd, Ordering::Relaxed);
}

#[inline]
pub fn get_flog_file_fd() -> c_int {
    FLOG_FD.load(Ordering::Relaxed)
}
