use std::io::{self, IsTerminal};
use tinysh::{BufReadSource, EditorSource, Interpreter, LineSource};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `TINYSH_LOG=debug`.
const LOG_ENV: &str = "TINYSH_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let interpreter = Interpreter::default();
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    let editor = if io::stdin().is_terminal() {
        match EditorSource::new() {
            Ok(editor) => Some(editor),
            Err(err) => {
                tracing::warn!(%err, "line editor unavailable, reading stdin directly");
                None
            }
        }
    } else {
        None
    };
    let mut input: Box<dyn LineSource> = match editor {
        Some(editor) => Box::new(editor),
        None => Box::new(BufReadSource::new(io::stdin().lock())),
    };

    let code = match interpreter.repl(input.as_mut(), &mut stdout, &mut stderr) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Unrecoverable error: {err:#}");
            1
        }
    };
    drop(input);
    std::process::exit(code);
}
