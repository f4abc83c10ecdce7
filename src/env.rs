use crate::external::SearchPath;
use std::collections::HashMap;
use std::env as stdenv;

/// Read-only view of the process environment used by the interpreter.
///
/// The search path is parsed from `PATH` once, when the environment is
/// captured. Other variables are looked up live, so `HOME` reflects the
/// process environment at the moment `cd` runs. Overrides set through
/// [`Environment::set_var`] shadow the process environment; they exist for
/// embedding and tests and are never written back to the process.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    overrides: HashMap<String, String>,
    search_path: SearchPath,
}

impl Environment {
    /// Capture the search path from the current process `PATH`.
    pub fn from_process() -> Self {
        let search_path = stdenv::var_os("PATH")
            .map(|raw| SearchPath::parse(&raw))
            .unwrap_or_default();
        tracing::debug!(dirs = search_path.dirs().len(), "captured search path");
        Self::with_search_path(search_path)
    }

    /// Environment with an explicit search path and no overrides.
    pub fn with_search_path(search_path: SearchPath) -> Self {
        Self {
            overrides: HashMap::new(),
            search_path,
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the overrides first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.overrides
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Shadow a variable for this environment only.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.overrides.insert(key.into(), val.into());
    }

    /// Target of a bare `cd`. An unset `HOME` is treated as an empty path.
    pub fn home(&self) -> String {
        self.get_var("HOME").unwrap_or_default()
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }
}
