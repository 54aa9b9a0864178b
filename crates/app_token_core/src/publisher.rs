//! Publishing the token to the job environment.

use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info};

use crate::command_runner::CommandRunner;
use crate::errors::Error;

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;

/// Sets environment variables for the current job with `<agent> env set NAME=VALUE`.
///
/// Variables set this way are visible to the remaining steps of the job.
pub struct AgentEnvironmentPublisher<'a> {
    runner: &'a dyn CommandRunner,
    agent: &'a str,
}

impl<'a> AgentEnvironmentPublisher<'a> {
    pub fn new(runner: &'a dyn CommandRunner, agent: &'a str) -> Self {
        Self { runner, agent }
    }

    /// Sets `name` to `value` in the job environment.
    ///
    /// # Errors
    ///
    /// Returns `Error::Publish` with the combined output of the agent if the
    /// command fails, or with the I/O error if the agent cannot be started.
    pub fn publish(&self, name: &str, value: &SecretString) -> Result<(), Error> {
        info!(name = name, "Setting environment variable for current job");

        let assignment = format!("{}={}", name, value.expose_secret());
        let output = self
            .runner
            .run(self.agent, &["env", "set", assignment.as_str()])
            .map_err(|e| {
                error!(name = name, agent = self.agent, error = %e, "Failed to run the agent");
                Error::Publish {
                    name: name.to_string(),
                    output: e.to_string(),
                }
            })?;

        if !output.success {
            error!(
                name = name,
                exit_code = ?output.exit_code,
                "Agent failed to set environment variable"
            );
            return Err(Error::Publish {
                name: name.to_string(),
                output: output.combined(),
            });
        }

        info!(name = name, "Successfully set environment variable");
        Ok(())
    }
}
