use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::cell::RefCell;
use std::io::{self, BufRead, Result as IoResult, Write};
use std::rc::Rc;

/// One attempt at reading an input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
    /// A line, always terminated by `'\n'`.
    Line(String),
    /// The input stream is exhausted.
    Eof,
}

/// Source of input lines for the interactive loop.
///
/// Implementations show `prompt` before blocking for a line. End of input is
/// reported as [`ReadLine::Eof`]; any other failure as an I/O error.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> io::Result<ReadLine>;
}

/// Reads lines from any buffered reader, writing the prompt to `stdout`.
///
/// Input is taken as raw bytes; invalid UTF-8 is replaced rather than
/// treated as a read failure. Used for piped input and in tests.
pub struct BufReadSource<R> {
    reader: R,
}

impl<R: BufRead> BufReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for BufReadSource<R> {
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> io::Result<ReadLine> {
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(ReadLine::Eof);
        }
        let mut line = String::from_utf8_lossy(&buf).into_owned();
        if !line.ends_with('\n') {
            line.push('\n');
        }
        Ok(ReadLine::Line(line))
    }
}

/// Line editor for interactive terminals.
///
/// The editor renders the prompt itself. Lines are not recorded in any
/// history.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str, _stdout: &mut dyn Write) -> io::Result<ReadLine> {
        match self.editor.readline(prompt) {
            Ok(mut line) => {
                line.push('\n');
                Ok(ReadLine::Line(line))
            }
            Err(ReadlineError::Eof) => Ok(ReadLine::Eof),
            // Ctrl-C abandons the line being edited.
            Err(ReadlineError::Interrupted) => Ok(ReadLine::Line("\n".to_string())),
            Err(ReadlineError::Io(err)) => Err(err),
            Err(err) => Err(io::Error::other(err.to_string())),
        }
    }
}

/// Memory-backed writer for capturing shell output.
///
/// Clones share the same buffer, so one handle can be given to the
/// interpreter and another kept to inspect what was written.
#[derive(Clone, Default)]
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }

    /// Return the collected text and empty the buffer.
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.buf.borrow_mut());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}
