//! Exchange of a signed App assertion for an installation access token.

use tracing::{error, info, instrument};

use crate::{Error, InstallationApi, InstallationToken, SignedAssertion};

#[cfg(test)]
#[path = "exchange_tests.rs"]
mod tests;

/// Trades an App identity assertion for an installation access token.
///
/// The App is expected to be installed exactly once. When GitHub lists more
/// than one installation the first one in list order is used.
pub struct TokenExchanger<'a, A: InstallationApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: InstallationApi + ?Sized> TokenExchanger<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Lists the App's installations and creates a token for the first one.
    ///
    /// # Errors
    ///
    /// - `Error::NoInstallation` if the App is not installed anywhere. The
    ///   token endpoint is not called in that case.
    /// - `Error::Exchange` naming the remote call that failed.
    #[instrument(skip(self, assertion), fields(app_id = assertion.app_id()))]
    pub async fn exchange(&self, assertion: &SignedAssertion) -> Result<InstallationToken, Error> {
        let installations = self.api.list_installations(assertion).await?;

        let installation = installations.first().ok_or_else(|| {
            error!(
                app_id = assertion.app_id(),
                "No installation found - the GitHub App is not installed on any account"
            );
            Error::NoInstallation {
                app_id: assertion.app_id(),
            }
        })?;

        if installations.len() > 1 {
            info!(
                installation_count = installations.len(),
                installation_id = installation.id,
                "App has several installations, using the first one listed"
            );
        }

        info!(
            installation_id = installation.id,
            account_login = installation.account_login(),
            "Selected installation"
        );

        self.api
            .create_installation_token(assertion, installation.id)
            .await
    }
}
