use crate::builtin::Registry;
use crate::command::{Context, ExitCode, Outcome};
use crate::env::Environment;
use crate::io_adapters::{LineSource, ReadLine};
use crate::parser;
use crate::redirection::Redirections;
use anyhow::Context as _;
use std::io::Write;

/// Prompt shown before every line is read.
pub const PROMPT: &str = "$ ";

/// What the loop should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(ExitCode),
}

/// A minimal shell-like interpreter that runs one command per input line.
///
/// The interpreter owns an immutable [`Environment`] and [`Registry`]; both
/// are fixed at construction and passed by reference to every command.
///
/// Example
/// ```
/// use tinysh::{Flow, Interpreter, MemWriter};
/// let sh = Interpreter::default();
/// let out = MemWriter::new();
/// let err = MemWriter::new();
/// let flow = sh
///     .execute_line("echo hello   world\n", &mut out.clone(), &mut err.clone())
///     .unwrap();
/// assert_eq!(flow, Flow::Continue);
/// assert_eq!(out.contents(), "hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    registry: Registry,
}

impl Interpreter {
    /// Create a new interpreter with a custom environment and command table.
    pub fn new(env: Environment, registry: Registry) -> Self {
        Self { env, registry }
    }

    /// Parse and run a single input line.
    ///
    /// Parse errors and redirection failures are reported on `stderr` and the
    /// line is dropped. Files opened for redirection are closed before this
    /// returns, including when the command asks the shell to exit. Only a
    /// failure to report an error on `stderr` itself is returned as `Err`.
    pub fn execute_line(
        &self,
        line: &str,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> std::io::Result<Flow> {
        let request = match parser::parse_line(line) {
            Ok(request) => request,
            Err(err) => {
                tracing::debug!(%err, "discarding line");
                report(stderr, &format!("Error: {err}"))?;
                return Ok(Flow::Continue);
            }
        };

        let mut redirections = match Redirections::open(&request) {
            Ok(redirections) => redirections,
            Err(err) => {
                tracing::debug!(%err, "redirection failed, command not run");
                report(stderr, &err.to_string())?;
                return Ok(Flow::Continue);
            }
        };

        let ctx = Context {
            env: &self.env,
            registry: &self.registry,
        };
        let outcome = self.registry.resolve(&request.command).execute(&request, &ctx);

        let flow = match outcome {
            Outcome::Done(output) => {
                let mut streams = redirections.bind(&mut *stdout, &mut *stderr);
                if let Err(err) = streams.write_output(&output) {
                    tracing::warn!(%err, "failed to write command output");
                    report(stderr, &format!("{}: write error: {err}", request.command))?;
                }
                Flow::Continue
            }
            Outcome::Exit(code) => Flow::Exit(code),
        };

        if !redirections.is_empty() {
            tracing::trace!("closing redirect targets");
        }
        drop(redirections);
        Ok(flow)
    }

    /// Read, evaluate and print until `exit` or end of input.
    ///
    /// Returns the status the process should exit with. A read failure other
    /// than end of input is returned as an error.
    pub fn repl(
        &self,
        input: &mut dyn LineSource,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> anyhow::Result<ExitCode> {
        loop {
            let line = match input
                .read_line(PROMPT, stdout)
                .context("failed to read input line")?
            {
                ReadLine::Line(line) => line,
                ReadLine::Eof => {
                    stdout
                        .write_all(b"\nexit\n")
                        .and_then(|()| stdout.flush())
                        .context("failed to write to stdout")?;
                    return Ok(0);
                }
            };

            match self
                .execute_line(&line, stdout, stderr)
                .context("failed to write to stderr")?
            {
                Flow::Continue => {}
                Flow::Exit(code) => return Ok(code),
            }
        }
    }
}

impl Default for Interpreter {
    /// Interpreter over the process environment with the standard builtins.
    fn default() -> Self {
        Self::new(Environment::from_process(), Registry::default())
    }
}

fn report(stderr: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(stderr, "{message}")?;
    stderr.flush()
}
