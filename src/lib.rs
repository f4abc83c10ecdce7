//! A tiny interactive shell.
//!
//! Each input line is tokenized (honoring single quotes, double quotes and
//! backslash escapes), turned into a [`CommandRequest`] with optional output
//! redirections, and dispatched either to a builtin (`echo`, `exit`, `pwd`,
//! `cd`, `type`) or to an external program found through `PATH`.
//!
//! The main entry point is [`Interpreter`], which runs single lines with
//! [`Interpreter::execute_line`] or drives a full read-eval-print loop over a
//! [`LineSource`] with [`Interpreter::repl`].

mod builtin;
pub mod command;
pub mod env;
pub mod error;
mod external;
mod interpreter;
mod io_adapters;
pub mod lexer;
pub mod parser;
mod redirection;

pub use builtin::Registry;
pub use external::{ExternalCommand, SearchPath};
pub use interpreter::{Flow, Interpreter, PROMPT};
pub use io_adapters::{BufReadSource, EditorSource, LineSource, MemWriter, ReadLine};
pub use parser::{CommandRequest, RedirectTarget};
pub use redirection::{BoundStreams, Redirections};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Mutex, MutexGuard, OnceLock};

    /// Serializes tests that read or change the process working directory.
    pub fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
