//! OAuth code exchange with the chat platform.
//!
//! When a user installs the chat app, the platform redirects to the relay with
//! a temporary `code`. The code is exchanged for an access token by calling the
//! platform's `oauth.access` method with the app's client credentials.

use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info, instrument};
use url::Url;

use crate::errors::Error;

#[cfg(test)]
#[path = "oauth_tests.rs"]
mod tests;

/// Client for the platform's `oauth.access` endpoint.
#[derive(Debug)]
pub struct OAuthClient {
    http: reqwest::Client,
    access_url: Url,
    client_id: String,
    client_secret: SecretString,
}

impl OAuthClient {
    /// Creates a new OAuth client.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if `access_url` is not an absolute URL.
    pub fn new(
        http: reqwest::Client,
        access_url: &str,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Result<Self, Error> {
        let access_url = Url::parse(access_url).map_err(|e| Error::InvalidUrl {
            url: access_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            http,
            access_url,
            client_id: client_id.into(),
            client_secret,
        })
    }

    /// Exchanges an authorization code and returns the platform's JSON answer
    /// unchanged.
    ///
    /// The platform reports logical failures (`"ok": false`) with a success
    /// status; those are passed through as regular responses.
    ///
    /// # Errors
    ///
    /// - `Error::Transport` if the endpoint cannot be reached
    /// - `Error::UnexpectedStatus` for non-success HTTP statuses
    /// - `Error::Deserialization` if the answer is not JSON
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> Result<serde_json::Value, Error> {
        info!(client_id = %self.client_id, "Exchanging OAuth code");

        let response = self
            .http
            .get(self.access_url.clone())
            .query(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = status.as_u16(), "OAuth exchange failed");
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
