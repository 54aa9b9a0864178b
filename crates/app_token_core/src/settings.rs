//! The configuration of a token issuing run.

use secrecy::SecretString;
use tracing::info;
use url::Url;

use crate::config_resolver::{ConfigResolver, ResolvedValue};
use crate::errors::Error;

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

pub const APP_ID_KEY: &str = "APP_ID";
pub const PRIVATE_KEY_KEY: &str = "PRIVATE_KEY";
pub const ENV_VAR_NAME_KEY: &str = "ENV_VAR_NAME";
pub const API_URL_KEY: &str = "GITHUB_API_URL";

/// Variable the token is published under when `ENV_VAR_NAME` is not set.
pub const DEFAULT_ENV_VAR_NAME: &str = "GITHUB_TOKEN";

/// Resolved inputs of a run. Built once and not changed afterwards.
#[derive(Debug)]
pub struct TokenSettings {
    /// The GitHub App ID, unparsed.
    pub app_id: String,
    /// PEM encoded private key of the App.
    pub private_key: SecretString,
    /// Name of the environment variable that receives the token.
    pub env_var_name: String,
    /// Base URL of the GitHub REST API.
    pub api_url: String,
}

impl TokenSettings {
    /// Resolves all settings.
    ///
    /// `APP_ID` and `PRIVATE_KEY` are required and may come from the agent's
    /// secret store. `ENV_VAR_NAME` and `GITHUB_API_URL` have defaults and are
    /// only read from the environment.
    ///
    /// # Errors
    ///
    /// - `Error::ConfigMissing` if `APP_ID` or `PRIVATE_KEY` is not found.
    /// - `Error::InvalidSetting` if the variable name is empty or the API URL
    ///   is not an absolute http(s) URL.
    pub fn resolve(resolver: &ConfigResolver<'_>) -> Result<Self, Error> {
        let app_id = resolver.require(APP_ID_KEY, true)?;
        log_origin(APP_ID_KEY, &app_id);

        let private_key = resolver.require(PRIVATE_KEY_KEY, true)?;
        log_origin(PRIVATE_KEY_KEY, &private_key);

        let env_var_name = resolver
            .resolve(ENV_VAR_NAME_KEY, DEFAULT_ENV_VAR_NAME, false)
            .ok_or_else(|| Error::ConfigMissing(ENV_VAR_NAME_KEY.to_string()))?;
        log_origin(ENV_VAR_NAME_KEY, &env_var_name);
        let env_var_name = validate_env_var_name(env_var_name.value)?;

        let api_url = resolver
            .resolve(API_URL_KEY, github_client::DEFAULT_API_URL, false)
            .ok_or_else(|| Error::ConfigMissing(API_URL_KEY.to_string()))?;
        log_origin(API_URL_KEY, &api_url);
        let api_url = validate_api_url(api_url.value)?;

        Ok(Self {
            app_id: app_id.value,
            private_key: SecretString::from(private_key.value),
            env_var_name,
            api_url,
        })
    }
}

fn log_origin(name: &str, resolved: &ResolvedValue) {
    info!(name = name, origin = %resolved.origin, "Resolved configuration value");
}

fn validate_env_var_name(name: String) -> Result<String, Error> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(invalid(ENV_VAR_NAME_KEY, "the variable name is empty"));
    }
    if name.contains('=') || name.chars().any(char::is_whitespace) {
        return Err(invalid(
            ENV_VAR_NAME_KEY,
            "the variable name must not contain '=' or whitespace",
        ));
    }
    Ok(name)
}

fn validate_api_url(value: String) -> Result<String, Error> {
    let url = Url::parse(value.trim()).map_err(|e| invalid(API_URL_KEY, &e.to_string()))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(invalid(API_URL_KEY, "only http and https URLs are supported"));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn invalid(name: &str, reason: &str) -> Error {
    Error::InvalidSetting {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
