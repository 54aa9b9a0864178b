//! Crate for issuing GitHub App installation access tokens.
//!
//! This crate signs the App identity assertion (a JWT) from the App ID and
//! private key, and trades it for an installation access token through the
//! GitHub REST API:
//!
//! 1. `GET /app/installations` to discover where the App is installed.
//! 2. `POST /app/installations/{id}/access_tokens` for the first installation.
//!
//! Both calls use the assertion as the bearer credential.

use async_trait::async_trait;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::{Octocrab, Result as OctocrabResult};
use secrecy::ExposeSecret;
use tracing::{error, info, instrument};

pub mod app_identity;
pub use app_identity::{AppIdentity, SignedAssertion};

pub mod errors;
pub use errors::{Error, ExchangeStep};

pub mod exchange;
pub use exchange::TokenExchanger;

pub mod models;
pub use models::{Installation, InstallationToken};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Base URL of the public GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// The two App level endpoints the token exchange needs.
///
/// Implemented by [`GitHubClient`] against the real API and by in-memory
/// fakes in tests.
#[async_trait]
pub trait InstallationApi: Send + Sync {
    /// Lists the installations of the App that signed `assertion`.
    ///
    /// # Errors
    /// Returns `Error::Exchange` with `ExchangeStep::ListInstallations` if the
    /// call fails.
    async fn list_installations(
        &self,
        assertion: &SignedAssertion,
    ) -> Result<Vec<Installation>, Error>;

    /// Creates an access token scoped to `installation_id`.
    ///
    /// # Errors
    /// Returns `Error::Exchange` with `ExchangeStep::CreateAccessToken` if the
    /// call fails.
    async fn create_installation_token(
        &self,
        assertion: &SignedAssertion,
        installation_id: u64,
    ) -> Result<InstallationToken, Error>;
}

/// A client for the GitHub App endpoints, authenticated per call with a
/// signed App assertion.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    base_uri: String,
}

impl GitHubClient {
    /// Creates a client for the REST API rooted at `base_uri`.
    ///
    /// # Arguments
    ///
    /// * `base_uri` - e.g. [`DEFAULT_API_URL`] or `https://ghe.example.com/api/v3`.
    pub fn new(base_uri: &str) -> Self {
        Self {
            base_uri: base_uri.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Builds an octocrab client that sends `assertion` as the bearer token.
    ///
    /// Retries are disabled. A failed call is reported once and ends the run.
    fn client_for(
        &self,
        assertion: &SignedAssertion,
        step: ExchangeStep,
    ) -> Result<Octocrab, Error> {
        Octocrab::builder()
            .add_retry_config(RetryConfig::None)
            .base_uri(self.base_uri.as_str())
            .map_err(|e| {
                error!(base_uri = %self.base_uri, error = %e, "Invalid GitHub API base URI");
                Error::ClientBuild {
                    step,
                    message: e.to_string(),
                }
            })?
            .personal_token(assertion.value().expose_secret().to_string())
            .build()
            .map_err(|e| {
                error!(error = ?e, "Failed to build Octocrab client with the App assertion");
                Error::ClientBuild {
                    step,
                    message: e.to_string(),
                }
            })
    }
}

#[async_trait]
impl InstallationApi for GitHubClient {
    #[instrument(skip(self, assertion), fields(app_id = assertion.app_id()))]
    async fn list_installations(
        &self,
        assertion: &SignedAssertion,
    ) -> Result<Vec<Installation>, Error> {
        info!("Listing installations for GitHub App using JWT authentication");

        let client = self.client_for(assertion, ExchangeStep::ListInstallations)?;
        let result: OctocrabResult<Vec<Installation>> =
            client.get("/app/installations", None::<&()>).await;

        match result {
            Ok(installations) => {
                info!(
                    count = installations.len(),
                    "Successfully retrieved installations for GitHub App"
                );
                Ok(installations)
            }
            Err(e) => {
                error!(
                    "Failed to list installations - this likely means JWT authentication failed"
                );
                Err(exchange_error(
                    ExchangeStep::ListInstallations,
                    "Failed to list installations",
                    e,
                ))
            }
        }
    }

    #[instrument(skip(self, assertion), fields(app_id = assertion.app_id()))]
    async fn create_installation_token(
        &self,
        assertion: &SignedAssertion,
        installation_id: u64,
    ) -> Result<InstallationToken, Error> {
        info!(
            installation_id = installation_id,
            "Requesting installation token from GitHub API"
        );

        let client = self.client_for(assertion, ExchangeStep::CreateAccessToken)?;
        let path = format!("/app/installations/{installation_id}/access_tokens");
        let result: OctocrabResult<models::AccessTokenResponse> =
            client.post(path, None::<&()>).await;

        match result {
            Ok(response) => {
                info!(
                    installation_id = installation_id,
                    expires_at = ?response.expires_at,
                    "Successfully retrieved installation token"
                );
                Ok(InstallationToken::from_response(installation_id, response))
            }
            Err(e) => {
                error!(
                    installation_id = installation_id,
                    "Failed to get installation token from GitHub API"
                );
                Err(exchange_error(
                    ExchangeStep::CreateAccessToken,
                    "Failed to get installation token",
                    e,
                ))
            }
        }
    }
}

fn exchange_error(step: ExchangeStep, context: &str, e: octocrab::Error) -> Error {
    let message = match &e {
        octocrab::Error::GitHub { source, .. } => source.message.clone(),
        other => other.to_string(),
    };
    log_octocrab_error(context, e);
    Error::Exchange { step, message }
}

fn log_octocrab_error(message: &str, e: octocrab::Error) {
    match e {
        octocrab::Error::GitHub { source, backtrace } => {
            let err = source;
            error!(
                error_message = err.message,
                status_code = %err.status_code,
                backtrace = backtrace.to_string(),
                "{}. Received an error from GitHub",
                message
            )
        }
        octocrab::Error::UriParse { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}. Failed to parse URI.",
            message
        ),
        octocrab::Error::Uri { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}, Failed to parse URI.",
            message
        ),
        octocrab::Error::Json { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}. The response body was not the expected JSON.",
            message
        ),
        _ => error!(error_message = e.to_string(), message),
    };
}
