use crate::command::{Context, ExecutableCommand, Outcome, Output};
use crate::error::describe_io_error;
use crate::external::ExternalCommand;
use crate::parser::CommandRequest;
use std::collections::HashMap;
use std::env;

/// Built-in commands known to the shell at compile time.
///
/// Builtins run in-process and report their output as text instead of
/// writing to a stream.
pub(crate) trait BuiltinCommand: ExecutableCommand + 'static {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name(&self) -> &'static str;
}

/// Mapping from command name to builtin handler.
///
/// Built once at start-up and only read afterwards. Names that are not
/// registered resolve to [`ExternalCommand`].
pub struct Registry {
    builtins: HashMap<&'static str, Box<dyn ExecutableCommand>>,
}

impl Registry {
    fn empty() -> Self {
        Self {
            builtins: HashMap::new(),
        }
    }

    fn register<T: BuiltinCommand>(&mut self, command: T) {
        self.builtins.insert(command.name(), Box::new(command));
    }

    /// Whether `name` is a builtin a user can refer to.
    ///
    /// The empty no-op entry is internal and does not count.
    pub fn is_builtin(&self, name: &str) -> bool {
        !name.is_empty() && self.builtins.contains_key(name)
    }

    /// Names of all user-visible builtins, sorted.
    #[cfg(test)]
    fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .builtins
            .keys()
            .copied()
            .filter(|name| !name.is_empty())
            .collect();
        names.sort_unstable();
        names
    }

    /// Look up the handler for `name`, falling back to external execution.
    pub fn resolve(&self, name: &str) -> &dyn ExecutableCommand {
        match self.builtins.get(name) {
            Some(builtin) => {
                tracing::trace!(name, "dispatching builtin");
                builtin.as_ref()
            }
            None => {
                tracing::trace!(name, "dispatching external command");
                &ExternalCommand
            }
        }
    }
}

impl Default for Registry {
    /// The standard builtins: the empty no-op, `exit`, `echo`, `pwd`, `cd`
    /// and `type`.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Noop);
        registry.register(Exit);
        registry.register(Echo);
        registry.register(Pwd);
        registry.register(Cd);
        registry.register(Type);
        registry
    }
}

/// Empty command line.
pub struct Noop;

impl BuiltinCommand for Noop {
    fn name(&self) -> &'static str {
        ""
    }
}

impl ExecutableCommand for Noop {
    fn execute(&self, _request: &CommandRequest, _ctx: &Context<'_>) -> Outcome {
        Outcome::Done(Output::default())
    }
}

/// Exit shell process with status 0. Arguments are ignored.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }
}

impl ExecutableCommand for Exit {
    fn execute(&self, _request: &CommandRequest, _ctx: &Context<'_>) -> Outcome {
        Outcome::Exit(0)
    }
}

/// Write the arguments to standard output, separated by spaces, followed by
/// a newline.
pub struct Echo;

impl BuiltinCommand for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }
}

impl ExecutableCommand for Echo {
    fn execute(&self, request: &CommandRequest, _ctx: &Context<'_>) -> Outcome {
        Output::stdout(format!("{}\n", request.arguments.join(" "))).into()
    }
}

/// Print the current working directory.
pub struct Pwd;

impl BuiltinCommand for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }
}

impl ExecutableCommand for Pwd {
    fn execute(&self, request: &CommandRequest, _ctx: &Context<'_>) -> Outcome {
        if !request.arguments.is_empty() {
            return Output::stderr("pwd: too many arguments\n").into();
        }
        match env::current_dir() {
            Ok(dir) => Output::stdout(format!("{}\n", dir.display())).into(),
            Err(err) => Output::stderr(format!("pwd: {}\n", describe_io_error(&err))).into(),
        }
    }
}

/// Change the current working directory.
///
/// With no argument, or with `~`, changes to `HOME`.
pub struct Cd;

impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }
}

impl ExecutableCommand for Cd {
    fn execute(&self, request: &CommandRequest, ctx: &Context<'_>) -> Outcome {
        let target = match request.arguments.as_slice() {
            [] => ctx.env.home(),
            [arg] if arg == "~" => ctx.env.home(),
            [arg] => arg.clone(),
            _ => return Output::stderr("chdir too many arguments\n").into(),
        };

        match env::set_current_dir(&target) {
            Ok(()) => {
                tracing::debug!(%target, "changed directory");
                Output::default().into()
            }
            Err(err) => {
                Output::stderr(format!("{target}: {}\n", describe_io_error(&err))).into()
            }
        }
    }
}

/// Describe how each argument would be interpreted as a command name.
pub struct Type;

impl BuiltinCommand for Type {
    fn name(&self) -> &'static str {
        "type"
    }
}

impl ExecutableCommand for Type {
    fn execute(&self, request: &CommandRequest, ctx: &Context<'_>) -> Outcome {
        let mut output = Output::default();
        for name in &request.arguments {
            if ctx.registry.is_builtin(name) {
                output.stdout.push_str(&format!("{name} is a shell builtin\n"));
                continue;
            }
            match ctx.env.search_path().resolve(name) {
                Ok(path) => output
                    .stdout
                    .push_str(&format!("{name} is {}\n", path.display())),
                Err(not_found) => output.stderr.push_str(&format!("{not_found}\n")),
            }
        }
        output.into()
    }
}
