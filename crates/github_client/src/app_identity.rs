//! GitHub App identity and the signed assertion that proves it.
//!
//! GitHub Apps authenticate as themselves with a short-lived JWT signed with
//! the App's RSA private key. GitHub rejects assertions that are valid for
//! more than ten minutes, and it compares `iat` against its own clock, so the
//! issue time is moved 60 seconds into the past.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::Error;

#[cfg(test)]
#[path = "app_identity_tests.rs"]
mod tests;

/// How far `iat` is moved into the past, in seconds.
pub const ASSERTION_BACKDATE_SECONDS: i64 = 60;

/// How long an assertion stays valid after it was generated, in seconds.
pub const ASSERTION_LIFETIME_SECONDS: i64 = 600;

#[derive(Debug, Serialize, Deserialize)]
struct AppClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

/// The credentials of a GitHub App: its numeric ID and its RSA signing key.
pub struct AppIdentity {
    app_id: u64,
    key: EncodingKey,
}

impl AppIdentity {
    /// Parses an App ID and a PEM encoded RSA private key.
    ///
    /// # Arguments
    ///
    /// * `app_id` - The numeric GitHub App ID, as a decimal string.
    /// * `private_key_pem` - The App's private key in PKCS#1 or PKCS#8 PEM form.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidAppId` if the App ID is not an unsigned integer and
    /// `Error::InvalidPrivateKey` if the key is not a PEM encoded RSA key.
    pub fn parse(app_id: &str, private_key_pem: &str) -> Result<Self, Error> {
        let app_id = app_id
            .trim()
            .parse::<u64>()
            .map_err(|e| Error::InvalidAppId {
                value: app_id.to_string(),
                reason: e.to_string(),
            })?;

        if !private_key_pem.contains("-----BEGIN") {
            error!(app_id = app_id, "Private key does not contain a PEM block");
            return Err(Error::InvalidPrivateKey(
                "no PEM block containing the private key was found".to_string(),
            ));
        }

        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).map_err(|e| {
            error!(
                app_id = app_id,
                error = %e,
                "Failed to parse RSA private key - key format is invalid"
            );
            Error::InvalidPrivateKey(e.to_string())
        })?;

        debug!(app_id = app_id, "Parsed GitHub App private key");

        Ok(Self { app_id, key })
    }

    /// Creates an identity from an already decoded signing key.
    pub fn from_parts(app_id: u64, key: EncodingKey) -> Self {
        Self { app_id, key }
    }

    pub fn app_id(&self) -> u64 {
        self.app_id
    }

    /// Signs an App identity assertion relative to `now`.
    ///
    /// The assertion carries only `iss` (the App ID), `iat` (`now` minus
    /// [`ASSERTION_BACKDATE_SECONDS`]) and `exp` (`now` plus
    /// [`ASSERTION_LIFETIME_SECONDS`]) and is signed with RS256.
    ///
    /// # Errors
    ///
    /// Returns `Error::Signing` if the key cannot be used for RSA signing.
    /// No partial assertion is ever returned.
    pub fn sign(&self, now: DateTime<Utc>) -> Result<SignedAssertion, Error> {
        let issued_at = now - TimeDelta::seconds(ASSERTION_BACKDATE_SECONDS);
        let expires_at = now + TimeDelta::seconds(ASSERTION_LIFETIME_SECONDS);

        let claims = AppClaims {
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.app_id.to_string(),
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.key).map_err(|e| {
            error!(app_id = self.app_id, error = %e, "Failed to sign App JWT");
            Error::Signing(e.to_string())
        })?;

        debug!(
            app_id = self.app_id,
            issued_at = %issued_at,
            expires_at = %expires_at,
            "Signed App identity assertion"
        );

        Ok(SignedAssertion {
            app_id: self.app_id,
            value: SecretString::from(token),
            generated_at: now,
            issued_at,
            expires_at,
        })
    }
}

impl std::fmt::Debug for AppIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppIdentity")
            .field("app_id", &self.app_id)
            .field("key", &"<REDACTED>")
            .finish()
    }
}

/// A signed, short-lived JWT proving the caller is the GitHub App.
///
/// Used as the bearer credential for the App level endpoints. It is never
/// written anywhere and is dropped once the installation token is issued.
#[derive(Debug)]
pub struct SignedAssertion {
    app_id: u64,
    value: SecretString,
    generated_at: DateTime<Utc>,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SignedAssertion {
    /// The App ID used as the issuer of this assertion.
    pub fn app_id(&self) -> u64 {
        self.app_id
    }

    pub fn value(&self) -> &SecretString {
        &self.value
    }

    /// The wall-clock time the assertion was signed at.
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Time between signing and `exp`. Always [`ASSERTION_LIFETIME_SECONDS`].
    pub fn lifetime(&self) -> TimeDelta {
        self.expires_at - self.generated_at
    }
}
