use crate::command::{Context, ExecutableCommand, Outcome, Output};
use crate::error::{CommandNotFound, describe_io_error};
use crate::parser::CommandRequest;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Ordered list of directories consulted to resolve a command name.
///
/// Parsed once at start-up; directory order decides precedence when the same
/// name exists in several directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Split a `PATH`-style list using the platform separator.
    ///
    /// Empty entries are kept and resolve relative to the current directory.
    pub fn parse(raw: &OsStr) -> Self {
        Self {
            dirs: std::env::split_paths(raw).collect(),
        }
    }

    pub fn from_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Resolve a command name to an existing file.
    ///
    /// Behavior:
    /// - Empty name: never found.
    /// - Absolute name: returned as is if it exists.
    /// - Any other name, including `./foo` and `bin/sh`: each directory is
    ///   joined with the name in order and the first existing entry wins.
    ///
    /// Only existence is checked, not the executable bit.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, CommandNotFound> {
        let not_found = || CommandNotFound {
            name: name.to_string(),
        };
        let path = Path::new(name);

        let found = if name.is_empty() {
            None
        } else if path.is_absolute() {
            find_by_path(path).map(Path::to_path_buf)
        } else {
            self.find_in_dirs(path)
        };

        match found {
            Some(found) => {
                tracing::trace!(name, path = %found.display(), "resolved command");
                Ok(found)
            }
            None => Err(not_found()),
        }
    }

    fn find_in_dirs(&self, name: &Path) -> Option<PathBuf> {
        self.dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| find_by_path(candidate).is_some())
    }
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

/// Command that is not a builtin: resolved through the search path and run
/// as a child process.
pub struct ExternalCommand;

impl ExternalCommand {
    /// Resolve and run `command`, capturing everything it writes.
    ///
    /// The child's exit status is not inspected; a failing program is
    /// indistinguishable from a succeeding one at this layer.
    pub fn run(command: &str, arguments: &[String], search_path: &SearchPath) -> Output {
        let executable = match search_path.resolve(command) {
            Ok(path) => path,
            Err(_) => return Output::stderr(format!("{command}: command not found\n")),
        };

        let mut child = Command::new(&executable);
        child
            .args(arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        set_program_name(&mut child, command);

        tracing::debug!(path = %executable.display(), ?arguments, "spawning external command");
        match child.output() {
            Ok(output) => {
                tracing::debug!(status = %output.status, "external command finished");
                Output {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }
            }
            Err(err) => {
                tracing::warn!(%err, path = %executable.display(), "failed to spawn");
                Output::stderr(format!("{command}: {}\n", describe_io_error(&err)))
            }
        }
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(&self, request: &CommandRequest, ctx: &Context<'_>) -> Outcome {
        Self::run(&request.command, &request.arguments, ctx.env.search_path()).into()
    }
}

/// Programs see the name they were invoked by, not the resolved path.
#[cfg(unix)]
fn set_program_name(cmd: &mut Command, name: &str) {
    use std::os::unix::process::CommandExt;
    cmd.arg0(name);
}

#[cfg(not(unix))]
fn set_program_name(_cmd: &mut Command, _name: &str) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }

    #[test]
    fn test_parse_splits_in_order() {
        let path = SearchPath::parse(OsStr::new("/usr/local/bin:/usr/bin:/bin"));
        assert_eq!(
            path.dirs(),
            [
                PathBuf::from("/usr/local/bin"),
                PathBuf::from("/usr/bin"),
                PathBuf::from("/bin")
            ]
        );
    }

    #[test]
    fn test_first_directory_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        File::create(first.path().join("tool")).unwrap();
        File::create(second.path().join("tool")).unwrap();

        let path = SearchPath::from_dirs([first.path(), second.path()]);
        assert_eq!(path.resolve("tool").unwrap(), first.path().join("tool"));

        let reversed = SearchPath::from_dirs([second.path(), first.path()]);
        assert_eq!(reversed.resolve("tool").unwrap(), second.path().join("tool"));
    }

    #[test]
    fn test_skips_directories_without_the_name() {
        let empty = TempDir::new().unwrap();
        let with_tool = TempDir::new().unwrap();
        File::create(with_tool.path().join("tool")).unwrap();

        let path = SearchPath::from_dirs([empty.path(), with_tool.path()]);
        assert_eq!(path.resolve("tool").unwrap(), with_tool.path().join("tool"));
    }

    #[test]
    fn test_existence_is_enough() {
        // no executable bit on a freshly created file
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("data.txt")).unwrap();
        let path = SearchPath::from_dirs([dir.path()]);
        assert!(path.resolve("data.txt").is_ok());
    }

    #[test]
    fn test_not_found() {
        let dir = TempDir::new().unwrap();
        let path = SearchPath::from_dirs([dir.path()]);
        assert_eq!(
            path.resolve("nonexistentcmd123"),
            Err(CommandNotFound {
                name: "nonexistentcmd123".to_string()
            })
        );
    }

    #[test]
    fn test_empty_name_is_never_found() {
        let dir = TempDir::new().unwrap();
        let path = SearchPath::from_dirs([dir.path()]);
        assert!(path.resolve("").is_err());
    }

    #[test]
    fn test_absolute_name_skips_search() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("prog");
        File::create(&file).unwrap();

        let path = SearchPath::default();
        let name = file.to_string_lossy().to_string();
        assert_eq!(path.resolve(&name).unwrap(), file);
        assert!(path.resolve(&format!("{name}-missing")).is_err());
    }

    #[test]
    fn test_relative_name_is_joined_onto_each_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("bin")).unwrap();
        File::create(dir.path().join("bin").join("tool")).unwrap();

        let path = SearchPath::from_dirs([dir.path()]);
        assert_eq!(path.resolve("bin/tool").unwrap(), dir.path().join("bin/tool"));
        assert!(path.resolve("./bin/tool").is_ok());
        // not looked up relative to the working directory
        assert!(SearchPath::default().resolve("src/lib.rs").is_err());
    }

    #[test]
    fn test_missing_command_is_not_spawned() {
        let output = ExternalCommand::run("nonexistentcmd123", &[], &SearchPath::default());
        assert_eq!(output, Output::stderr("nonexistentcmd123: command not found\n"));
    }

    #[test]
    #[cfg(unix)]
    fn test_captures_stdout_and_stderr() {
        let dir = TempDir::new().unwrap();
        write_script(dir.path(), "both", r#"echo "out:$1"; echo "err:$2" >&2; exit 3"#);

        let path = SearchPath::from_dirs([dir.path()]);
        let args = vec!["a".to_string(), "b c".to_string()];
        let output = ExternalCommand::run("both", &args, &path);
        assert_eq!(output.stdout, "out:a\n");
        assert_eq!(output.stderr, "err:b c\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_spawn_failure_is_reported() {
        // exists, but not executable
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("plain"), "not a program").unwrap();
        let path = SearchPath::from_dirs([dir.path()]);
        let output = ExternalCommand::run("plain", &[], &path);
        assert_eq!(output.stdout, "");
        assert_eq!(output.stderr, "plain: Permission denied\n");
    }
}
