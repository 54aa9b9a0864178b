//! Layered lookup of configuration values.
//!
//! A value called `NAME` is looked up in this order, and the first hit wins:
//!
//! 1. The plugin namespaced variable, e.g. `BUILDKITE_PLUGIN_CREATE_GITHUB_APP_TOKEN_NAME`.
//! 2. The plain environment variable `NAME`.
//! 3. The agent secret store, if the caller allows the secret fallback.
//! 4. The default value, if it is not empty.

use std::fmt;

use tracing::debug;

use crate::environment::EnvironmentReader;
use crate::errors::Error;
use crate::secret_store::SecretStore;

#[cfg(test)]
#[path = "config_resolver_tests.rs"]
mod tests;

/// Prefix Buildkite gives the configuration options of this plugin.
pub const PLUGIN_PREFIX: &str = "BUILDKITE_PLUGIN_CREATE_GITHUB_APP_TOKEN_";

/// Which source produced a configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrigin {
    PluginEnvironment,
    Environment,
    SecretStore,
    Default,
}

impl fmt::Display for ValueOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ValueOrigin::PluginEnvironment => "plugin environment variable",
            ValueOrigin::Environment => "environment variable",
            ValueOrigin::SecretStore => "agent secret",
            ValueOrigin::Default => "default value",
        };
        f.write_str(text)
    }
}

/// A configuration value and where it came from.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    pub value: String,
    pub origin: ValueOrigin,
}

impl ResolvedValue {
    fn new(value: String, origin: ValueOrigin) -> Self {
        Self { value, origin }
    }
}

// Values may be private keys, so only their size is shown.
impl fmt::Debug for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedValue")
            .field("value", &format_args!("<{} bytes>", self.value.len()))
            .field("origin", &self.origin)
            .finish()
    }
}

/// Resolves configuration values from the environment and the secret store.
pub struct ConfigResolver<'a> {
    prefix: &'a str,
    environment: &'a dyn EnvironmentReader,
    secrets: &'a dyn SecretStore,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(
        prefix: &'a str,
        environment: &'a dyn EnvironmentReader,
        secrets: &'a dyn SecretStore,
    ) -> Self {
        Self {
            prefix,
            environment,
            secrets,
        }
    }

    /// Looks up `name`, returning `None` if no source has a value.
    ///
    /// The secret store is only consulted when `allow_secret_fallback` is set
    /// and neither environment variable exists. An empty `default_value` means
    /// there is no default.
    pub fn resolve(
        &self,
        name: &str,
        default_value: &str,
        allow_secret_fallback: bool,
    ) -> Option<ResolvedValue> {
        let resolved = self.lookup(name, default_value, allow_secret_fallback);
        match &resolved {
            Some(r) => debug!(name = name, origin = %r.origin, "Resolved configuration value"),
            None => debug!(name = name, "Configuration value not found"),
        }
        resolved
    }

    /// Looks up a value that has no default and must be present.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigMissing` if no source has a value for `name`.
    pub fn require(&self, name: &str, allow_secret_fallback: bool) -> Result<ResolvedValue, Error> {
        self.resolve(name, "", allow_secret_fallback)
            .ok_or_else(|| Error::ConfigMissing(name.to_string()))
    }

    fn lookup(
        &self,
        name: &str,
        default_value: &str,
        allow_secret_fallback: bool,
    ) -> Option<ResolvedValue> {
        let namespaced = format!("{}{}", self.prefix, name);
        if let Some(value) = self.environment.var(&namespaced) {
            return Some(ResolvedValue::new(value, ValueOrigin::PluginEnvironment));
        }

        if let Some(value) = self.environment.var(name) {
            return Some(ResolvedValue::new(value, ValueOrigin::Environment));
        }

        if allow_secret_fallback {
            if let Some(value) = self.secrets.get_secret(name) {
                return Some(ResolvedValue::new(value, ValueOrigin::SecretStore));
            }
        }

        if !default_value.is_empty() {
            return Some(ResolvedValue::new(
                default_value.to_string(),
                ValueOrigin::Default,
            ));
        }

        None
    }
}
