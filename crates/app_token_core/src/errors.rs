//! Error types for the token issuing run.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that end a token issuing run.
///
/// Every variant is terminal. The run is a single idempotent CI step, so the
/// caller reports the error and exits instead of retrying.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required configuration value was not found in any source.
    #[error("Required environment variable {0} not set")]
    ConfigMissing(String),

    /// A configuration value was found but cannot be used.
    #[error("Invalid value for {name}: {reason}")]
    InvalidSetting { name: String, reason: String },

    /// Parsing the App credentials, signing or the token exchange failed.
    #[error(transparent)]
    GitHub(#[from] github_client::Error),

    /// The agent could not set the environment variable for the job.
    ///
    /// `output` holds the combined stdout and stderr of the agent command.
    #[error("Failed to set environment variable {name}: {output}")]
    Publish { name: String, output: String },
}
