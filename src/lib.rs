#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::comparison_chain)]
#![allow(clippy::uninlined_format_args)]

pub mod auth;
pub mod builtins;
pub mod common;
pub mod eval;
pub mod exec;
pub mod flog;
pub mod fork_exec;
pub mod global_safety;
pub mod history;
pub mod jobs;
pub mod parse;
pub mod procfs;
pub mod shell;
pub mod signal;

#[cfg(test)]
mod tests;
