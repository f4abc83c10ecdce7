use crate::error::ParseError;
use crate::lexer::{self, Redirect, Token};
use std::path::PathBuf;

/// File that a standard stream is redirected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub path: PathBuf,
    /// Append to the file instead of truncating it.
    pub append: bool,
}

/// Fully parsed representation of one input line, ready for dispatch.
///
/// An empty `command` is the no-op request. Redirect targets are kept even
/// then, so `> file` on its own still creates `file`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandRequest {
    pub command: String,
    pub arguments: Vec<String>,
    pub stdout: Option<RedirectTarget>,
    pub stderr: Option<RedirectTarget>,
}

impl CommandRequest {
    /// Convenience constructor for a request without redirections.
    pub fn new(command: impl Into<String>, arguments: &[&str]) -> Self {
        Self {
            command: command.into(),
            arguments: arguments.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn is_noop(&self) -> bool {
        self.command.is_empty()
    }
}

struct RequestBuilder {
    tokens: std::vec::IntoIter<Token>,
    positional: Vec<String>,
    stdout: Option<RedirectTarget>,
    stderr: Option<RedirectTarget>,
}

impl RequestBuilder {
    fn from(tokens: Vec<Token>) -> Self {
        RequestBuilder {
            tokens: tokens.into_iter(),
            positional: Vec::new(),
            stdout: None,
            stderr: None,
        }
    }

    fn build(mut self) -> Result<CommandRequest, ParseError> {
        while let Some(token) = self.tokens.next() {
            match token {
                Token::Word(word) => self.positional.push(word),
                Token::Redirect(op) => self.parse_redirect(op)?,
            }
        }

        let mut positional = self.positional.into_iter();
        Ok(CommandRequest {
            command: positional.next().unwrap_or_default(),
            arguments: positional.collect(),
            stdout: self.stdout,
            stderr: self.stderr,
        })
    }

    /// The operator has been consumed; its target must be the next token.
    fn parse_redirect(&mut self, op: Redirect) -> Result<(), ParseError> {
        let path = match self.tokens.next() {
            Some(Token::Word(path)) => PathBuf::from(path),
            Some(Token::Redirect(_)) | None => {
                tracing::trace!(%op, "redirection operator without a target");
                return Err(ParseError::MissingRedirectTarget);
            }
        };
        let target = Some(RedirectTarget {
            path,
            append: op.is_append(),
        });
        // Last redirect of a stream wins.
        if op.is_stderr() {
            self.stderr = target;
        } else {
            self.stdout = target;
        }
        Ok(())
    }
}

/// Builds a [`CommandRequest`] from the tokens of one line.
pub fn build_request(tokens: Vec<Token>) -> Result<CommandRequest, ParseError> {
    RequestBuilder::from(tokens).build()
}

/// Tokenizes and builds a request in one step.
pub fn parse_line(line: &str) -> Result<CommandRequest, ParseError> {
    let request = build_request(lexer::split_into_tokens(line)?)?;
    tracing::debug!(?request, "parsed line");
    Ok(request)
}
