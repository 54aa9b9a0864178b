//! Error types for GitHub App authentication operations.
//!
//! This module defines the errors that can occur while turning GitHub App
//! credentials into an installation access token: parsing the credentials,
//! signing the App identity assertion and talking to the GitHub REST API.

use std::fmt;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// The remote call that was being made when an exchange failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeStep {
    /// `GET /app/installations`
    ListInstallations,
    /// `POST /app/installations/{id}/access_tokens`
    CreateAccessToken,
}

impl fmt::Display for ExchangeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeStep::ListInstallations => write!(f, "list installations"),
            ExchangeStep::CreateAccessToken => write!(f, "create installation access token"),
        }
    }
}

/// Errors that can occur while issuing an installation access token.
///
/// None of these errors are retried. Each one ends the current run.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::Error;
///
/// match exchanger.exchange(&assertion).await {
///     Ok(token) => publish(token),
///     Err(Error::NoInstallation { app_id }) => eprintln!("App {app_id} is not installed"),
///     Err(err) => eprintln!("Other error: {err}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The GitHub App ID is not an unsigned 64-bit decimal number.
    #[error("Invalid app ID '{value}': {reason}")]
    InvalidAppId { value: String, reason: String },

    /// The private key is not a PEM encoded RSA key.
    ///
    /// Both PKCS#1 (`BEGIN RSA PRIVATE KEY`) and PKCS#8 (`BEGIN PRIVATE KEY`)
    /// documents are accepted.
    #[error("Failed to parse private key: {0}")]
    InvalidPrivateKey(String),

    /// The App identity assertion could not be signed.
    ///
    /// This happens when the key material is structurally invalid even though
    /// it was framed as PEM, or when the signing primitive itself fails.
    #[error("Failed to sign JWT: {0}")]
    Signing(String),

    /// The GitHub App is not installed on any account or organization.
    #[error("No installations found for app ID {app_id}")]
    NoInstallation { app_id: u64 },

    /// The HTTP client for the GitHub API could not be constructed.
    ///
    /// `step` is the remote call the client was being built for.
    #[error("Failed to create GitHub client to {step}: {message}")]
    ClientBuild { step: ExchangeStep, message: String },

    /// One of the remote calls of the token exchange failed.
    #[error("Failed to {step}: {message}")]
    Exchange { step: ExchangeStep, message: String },
}
