use clap::Parser;

use app_token_core::{
    run, Error, ProcessEnvironment, RunOptions, RunReport, SystemCommandRunner,
    DEFAULT_AGENT_BINARY, PLUGIN_PREFIX,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// Environment variable holding the log filter directives.
const LOG_ENV_VAR: &str = "APP_TOKEN_LOG";

/// Create a GitHub App installation token and expose it to the Buildkite job
#[derive(Parser, Debug)]
#[command(name = "create-github-app-token", version)]
#[command(about = "Create a GitHub App installation token for a Buildkite job", long_about = None)]
struct Cli {
    /// Agent binary used for `secret get` and `env set`
    #[arg(long, env = "APP_TOKEN_AGENT_BINARY", default_value = DEFAULT_AGENT_BINARY)]
    agent_binary: String,

    /// Prefix of the plugin configuration variables
    #[arg(long, default_value = PLUGIN_PREFIX)]
    plugin_prefix: String,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            agent_binary: self.agent_binary.clone(),
            plugin_prefix: self.plugin_prefix.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging. stdout belongs to the agent.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let result = run(&cli.run_options(), &ProcessEnvironment, &SystemCommandRunner).await;
    std::process::exit(exit_code(&result));
}

/// Logs the outcome of a run and returns the process exit code.
fn exit_code(result: &Result<RunReport, Error>) -> i32 {
    match result {
        Ok(report) => {
            info!(
                app_id = report.app_id,
                installation_id = report.installation_id,
                env_var_name = %report.env_var_name,
                "Installation token is available to the job"
            );
            0
        }
        Err(e) => {
            error!("Error: {e}");
            1
        }
    }
}
