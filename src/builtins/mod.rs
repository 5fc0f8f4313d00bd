//! Built-in commands, dispatched by name before anything is forked.

pub mod adduser;
pub mod bg;
pub mod exit;
pub mod fg;
pub mod history;
pub mod jobs;

use crate::shell::Shell;

pub struct BuiltinData {
    pub name: &'static str,
    pub func: fn(&mut Shell, &[String]),
}

const BUILTIN_DATAS: &[BuiltinData] = &[
    BuiltinData {
        name: "adduser",
        func: adduser::adduser,
    },
    BuiltinData {
        name: "bg",
        func: bg::bg,
    },
    BuiltinData {
        name: "fg",
        func: fg::fg,
    },
    BuiltinData {
        name: "history",
        func: history::history,
    },
    BuiltinData {
        name: "jobs",
        func: jobs::jobs,
    },
    BuiltinData {
        name: "logout",
        func: exit::logout,
    },
    BuiltinData {
        name: "quit",
        func: exit::quit,
    },
];

fn builtin_lookup(name: &str) -> Option<&'static BuiltinData> {
    BUILTIN_DATAS.iter().find(|builtin| builtin.name == name)
}

/// True for `!N` words: a `!` followed by digits only.
fn is_history_recall(word: &str) -> bool {
    match word.strip_prefix('!') {
        Some(rest) => rest.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// True if the command word names something the evaluator runs in-process.
pub fn is_builtin(word: &str) -> bool {
    builtin_lookup(word).is_some() || is_history_recall(word)
}

/// Execute a built-in. The caller has already checked [`is_builtin`].
pub fn run_builtin(shell: &mut Shell, argv: &[String]) {
    let word = &argv[0];
    if let Some(builtin) = builtin_lookup(word) {
        (builtin.func)(shell, argv);
    } else if is_history_recall(word) {
        history::run_recall(shell, word);
    }
}
