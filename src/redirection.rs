use crate::command::Output;
use crate::error::RedirectionError;
use crate::parser::{CommandRequest, RedirectTarget};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};

/// Files opened for the redirections of a single dispatch.
///
/// Each opened file is owned here and closed when this value is dropped, on
/// every exit path. The interpreter's own standard streams are never
/// replaced; [`Redirections::bind`] only decides, per stream, whether output
/// goes to the opened file or to the standard stream.
#[derive(Debug, Default)]
pub struct Redirections {
    stdout: Option<File>,
    stderr: Option<File>,
}

impl Redirections {
    /// Open every redirect target of `request`, stdout target first.
    ///
    /// If any target fails to open, files opened so far are closed and the
    /// command must not be dispatched.
    pub fn open(request: &CommandRequest) -> Result<Self, RedirectionError> {
        let stdout = request.stdout.as_ref().map(open_target).transpose()?;
        let stderr = request.stderr.as_ref().map(open_target).transpose()?;
        Ok(Self { stdout, stderr })
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.is_none() && self.stderr.is_none()
    }

    /// Destinations for this dispatch, falling back to the given standard
    /// streams where no file is bound.
    pub fn bind<'a>(
        &'a mut self,
        stdout: &'a mut dyn Write,
        stderr: &'a mut dyn Write,
    ) -> BoundStreams<'a> {
        BoundStreams {
            stdout: match self.stdout.as_mut() {
                Some(file) => file,
                None => stdout,
            },
            stderr: match self.stderr.as_mut() {
                Some(file) => file,
                None => stderr,
            },
        }
    }
}

fn open_target(target: &RedirectTarget) -> Result<File, RedirectionError> {
    let mut options = OpenOptions::new();
    if target.append {
        options.append(true).create(true);
    } else {
        options.write(true).create(true).truncate(true);
    }
    let file = options.open(&target.path).map_err(|source| RedirectionError {
        path: target.path.clone(),
        source,
    })?;
    tracing::debug!(path = %target.path.display(), append = target.append, "opened redirect target");
    Ok(file)
}

/// Currently bound output destinations.
pub struct BoundStreams<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
}

impl BoundStreams<'_> {
    /// Write a command's output to the bound destinations and flush them.
    ///
    /// Error text goes out first.
    pub fn write_output(&mut self, output: &Output) -> io::Result<()> {
        self.stderr.write_all(output.stderr.as_bytes())?;
        self.stderr.flush()?;
        self.stdout.write_all(output.stdout.as_bytes())?;
        self.stdout.flush()
    }
}
