// A module concerned with the exec side of fork/exec: async-signal-safe
// code which happens in between fork and exec, and the logging primitive
// that code is allowed to use.

pub mod flog_safe;
pub mod postfork;
