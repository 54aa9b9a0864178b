//! Read access to environment variables.

use std::collections::HashMap;

#[cfg(test)]
#[path = "environment_tests.rs"]
mod tests;

/// Looks up environment variables by name.
pub trait EnvironmentReader: Send + Sync {
    /// Returns the value of `name` if it is set. A variable that is set to the
    /// empty string is still returned.
    fn var(&self, name: &str) -> Option<String>;
}

/// The environment of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl EnvironmentReader for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        // A set variable is always found. Invalid unicode is replaced.
        std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
    }
}

impl EnvironmentReader for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}
