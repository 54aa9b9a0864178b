//! Secrets held by the CI agent.

use tracing::debug;

use crate::command_runner::CommandRunner;

#[cfg(test)]
#[path = "secret_store_tests.rs"]
mod tests;

/// A source of named secrets.
pub trait SecretStore: Send + Sync {
    /// Returns the secret called `name`, or `None` if it cannot be retrieved.
    ///
    /// Failures are not reported to the caller. A store that cannot answer is
    /// treated the same as a store that does not hold the secret.
    fn get_secret(&self, name: &str) -> Option<String>;
}

/// Reads secrets with `<agent> secret get <name>`.
pub struct AgentSecretStore<'a> {
    runner: &'a dyn CommandRunner,
    agent: &'a str,
}

impl<'a> AgentSecretStore<'a> {
    pub fn new(runner: &'a dyn CommandRunner, agent: &'a str) -> Self {
        Self { runner, agent }
    }
}

impl SecretStore for AgentSecretStore<'_> {
    fn get_secret(&self, name: &str) -> Option<String> {
        let output = match self.runner.run(self.agent, &["secret", "get", name]) {
            Ok(output) => output,
            Err(e) => {
                debug!(name = name, agent = self.agent, error = %e, "Could not run the agent to retrieve secret");
                return None;
            }
        };

        if !output.success {
            debug!(
                name = name,
                exit_code = ?output.exit_code,
                "Agent could not retrieve secret"
            );
            return None;
        }

        let value = output.stdout.trim();
        if value.is_empty() {
            debug!(name = name, "Agent returned an empty secret");
            return None;
        }

        Some(value.to_string())
    }
}
