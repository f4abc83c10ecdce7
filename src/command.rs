use crate::builtin::Registry;
use crate::env::Environment;
use crate::parser::CommandRequest;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// Text a command produced for its two output streams.
///
/// Commands never write to the terminal themselves; the interpreter writes
/// this to whatever destinations are bound for the current dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stdout: text.into(),
            stderr: String::new(),
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: text.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}

/// Result of running a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The command finished; its output still has to be written.
    Done(Output),
    /// The shell should terminate with the given status once the current
    /// dispatch has been cleaned up.
    Exit(ExitCode),
}

impl From<Output> for Outcome {
    fn from(output: Output) -> Self {
        Outcome::Done(output)
    }
}

/// Read-only configuration a command may consult while running.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub env: &'a Environment,
    pub registry: &'a Registry,
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// Implemented by every builtin and by the external command launcher.
pub trait ExecutableCommand {
    /// Runs the command described by `request`.
    fn execute(&self, request: &CommandRequest, ctx: &Context<'_>) -> Outcome;
}
