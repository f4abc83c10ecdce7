//! Error types shared by the tokenizer, the request builder and the
//! dispatch layer.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that discard the whole input line before anything is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input ended inside a `'...'` span.
    #[error("unclosed single quote")]
    UnclosedSingleQuote,
    /// Input ended inside a `"..."` span.
    #[error("unclosed double quote")]
    UnclosedDoubleQuote,
    /// A redirection operator was followed by another operator or by nothing.
    #[error("expected a filename after redirection operator")]
    MissingRedirectTarget,
}

/// A redirection target could not be opened; the command is not run.
#[derive(Debug, Error)]
#[error("{}: {}", .path.display(), describe_io_error(.source))]
pub struct RedirectionError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// No directory of the search path contains the requested name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: not found")]
pub struct CommandNotFound {
    pub name: String,
}

/// Render an I/O error the way the shell reports it to the user: the bare
/// OS message with its first character upper-cased.
///
/// `std` appends `" (os error N)"` to OS errors; that suffix is dropped.
pub fn describe_io_error(err: &io::Error) -> String {
    let text = err.to_string();
    let message = match err.raw_os_error() {
        Some(code) => text
            .strip_suffix(&format!(" (os error {code})"))
            .unwrap_or(&text)
            .to_string(),
        None => text,
    };
    capitalize_first(&message)
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
