//! Data models for the GitHub App installation endpoints.
//!
//! Only the fields this crate relies on are modelled. GitHub returns much
//! larger documents; unknown fields are ignored during deserialization.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// The account (user or organization) an App is installed on.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Account {
    /// The login name of the account
    pub login: String,
}

/// A GitHub App installation as returned by `GET /app/installations`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Installation {
    /// The unique ID of the installation
    pub id: u64,
    /// The account where the app is installed, if GitHub reported one
    pub account: Option<Account>,
}

impl Installation {
    /// The login of the account the App is installed on, for logging.
    pub fn account_login(&self) -> &str {
        self.account
            .as_ref()
            .map(|a| a.login.as_str())
            .unwrap_or("<unknown>")
    }
}

/// Response body of `POST /app/installations/{id}/access_tokens`.
#[derive(Deserialize)]
pub(crate) struct AccessTokenResponse {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// An installation access token.
///
/// GitHub issues these with a lifetime of one hour. The value is only held
/// long enough to hand it to the job environment.
#[derive(Debug)]
pub struct InstallationToken {
    installation_id: u64,
    value: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

impl InstallationToken {
    pub fn new(installation_id: u64, value: SecretString, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            installation_id,
            value,
            expires_at,
        }
    }

    pub(crate) fn from_response(installation_id: u64, response: AccessTokenResponse) -> Self {
        Self::new(
            installation_id,
            SecretString::from(response.token),
            response.expires_at,
        )
    }

    /// The installation this token is scoped to.
    pub fn installation_id(&self) -> u64 {
        self.installation_id
    }

    pub fn value(&self) -> &SecretString {
        &self.value
    }

    /// Expiry as reported by GitHub.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}
