//! Issues a GitHub App installation access token for a CI job.
//!
//! A run resolves the App credentials, signs an App identity assertion,
//! exchanges it for an installation access token and publishes the token to
//! the job environment through the CI agent:
//!
//! ```text
//! resolve config -> sign assertion -> list installations -> create token -> publish
//! ```
//!
//! Every step runs once and in order. The first error ends the run; nothing
//! is retried and nothing is written before the final publish step.

use chrono::{DateTime, Utc};
use github_client::{AppIdentity, GitHubClient, TokenExchanger};
use secrecy::ExposeSecret;
use tracing::{info, instrument};

pub mod command_runner;
pub mod config_resolver;
pub mod environment;
pub mod errors;
pub mod publisher;
pub mod secret_store;
pub mod settings;

pub use command_runner::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use config_resolver::{ConfigResolver, ResolvedValue, ValueOrigin, PLUGIN_PREFIX};
pub use environment::{EnvironmentReader, ProcessEnvironment};
pub use errors::Error;
pub use publisher::AgentEnvironmentPublisher;
pub use secret_store::{AgentSecretStore, SecretStore};
pub use settings::TokenSettings;

#[cfg(test)]
mod test_support;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// The agent binary used for secrets and for setting job variables.
pub const DEFAULT_AGENT_BINARY: &str = "buildkite-agent";

/// Process level options of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Program invoked as `<agent> secret get` and `<agent> env set`.
    pub agent_binary: String,
    /// Prefix of the plugin namespaced configuration variables.
    pub plugin_prefix: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            agent_binary: DEFAULT_AGENT_BINARY.to_string(),
            plugin_prefix: PLUGIN_PREFIX.to_string(),
        }
    }
}

/// What a successful run did. Contains no secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub app_id: u64,
    pub installation_id: u64,
    /// The environment variable that now holds the token.
    pub env_var_name: String,
    pub token_expires_at: Option<DateTime<Utc>>,
}

/// Issues an installation access token and publishes it to the job.
///
/// # Arguments
///
/// * `options` - Agent binary and plugin prefix.
/// * `environment` - Source of the environment variables.
/// * `runner` - Runs the agent for secret lookups and for publishing.
///
/// # Errors
///
/// Returns the first error of any step. Configuration errors are raised
/// before any request is sent to GitHub.
#[instrument(skip_all, fields(agent = %options.agent_binary))]
pub async fn run(
    options: &RunOptions,
    environment: &dyn EnvironmentReader,
    runner: &dyn CommandRunner,
) -> Result<RunReport, Error> {
    let secrets = AgentSecretStore::new(runner, &options.agent_binary);
    let resolver = ConfigResolver::new(&options.plugin_prefix, environment, &secrets);
    let settings = TokenSettings::resolve(&resolver)?;

    let identity = AppIdentity::parse(&settings.app_id, settings.private_key.expose_secret())?;
    info!(app_id = identity.app_id(), "Creating GitHub App assertion");
    let assertion = identity.sign(Utc::now())?;

    let client = GitHubClient::new(&settings.api_url);
    let token = TokenExchanger::new(&client).exchange(&assertion).await?;

    info!(
        env_var_name = %settings.env_var_name,
        "Setting Buildkite environment variable"
    );
    AgentEnvironmentPublisher::new(runner, &options.agent_binary)
        .publish(&settings.env_var_name, token.value())?;

    Ok(RunReport {
        app_id: identity.app_id(),
        installation_id: token.installation_id(),
        env_var_name: settings.env_var_name,
        token_expires_at: token.expires_at(),
    })
}
