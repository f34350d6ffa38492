//! GitHub OAuth web flow.
//!
//! Three calls: build the authorize URL the login route redirects to, trade
//! the callback `code` for an access token, and read the signed-in user's
//! profile with that token.

use crate::config::AppConfig;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

mod error;

pub use error::OAuthError;

/// Path of the authorize endpoint under the OAuth base URL.
pub const AUTHORIZE_PATH: &str = "/login/oauth/authorize";

/// Path of the token endpoint under the OAuth base URL.
pub const TOKEN_PATH: &str = "/login/oauth/access_token";

/// An OAuth access token. Scoped to a single request.
#[derive(Debug, Clone)]
pub struct AccessToken {
    secret: SecretString,
    token_type: Option<String>,
    scope: Option<String>,
}

impl AccessToken {
    /// Wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(token.into()),
            token_type: None,
            scope: None,
        }
    }

    /// The raw token.
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// True for a blank token, which is never sent upstream.
    pub fn is_empty(&self) -> bool {
        self.secret.expose_secret().trim().is_empty()
    }

    /// Token type reported by the provider, usually `bearer`.
    pub fn token_type(&self) -> Option<&str> {
        self.token_type.as_deref()
    }

    /// Scopes granted by the user.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("token {}", self.secret.expose_secret())
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// Token endpoint response. GitHub answers 200 even for rejected codes and
/// puts the failure in `error`.
#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth client for the GitHub web application flow.
#[derive(Clone)]
pub struct OAuthClient {
    http: Client,
    config: Arc<AppConfig>,
}

impl OAuthClient {
    /// Creates a client sharing the given connection pool.
    pub fn new(http: Client, config: Arc<AppConfig>) -> Self {
        Self { http, config }
    }

    /// URL the user is sent to for consent.
    pub fn authorize_url(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("scope", &self.config.scope)
            .append_pair("client_id", self.config.client_id())
            .append_pair("redirect_uri", &self.config.callback_url)
            .finish();

        format!(
            "{}{}?{}",
            self.config.oauth_base_url.trim_end_matches('/'),
            AUTHORIZE_PATH,
            query
        )
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// An empty code fails with [`OAuthError::MissingCode`] without any
    /// network call.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken, OAuthError> {
        if code.trim().is_empty() {
            return Err(OAuthError::MissingCode);
        }

        let url = format!(
            "{}{}",
            self.config.oauth_base_url.trim_end_matches('/'),
            TOKEN_PATH
        );
        let body = TokenRequest {
            client_id: self.config.client_id(),
            client_secret: self.config.client_secret().expose_secret(),
            code,
        };

        debug!(url = %url, "Exchanging authorization code");

        let response = self
            .http
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(OAuthError::Network)?;

        let status = response.status();
        let text = response.text().await.map_err(OAuthError::Network)?;

        let parsed = match serde_json::from_str::<TokenResponse>(&text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(OAuthError::UnexpectedStatus {
                    status: status.as_u16(),
                    body: text,
                })
            }
            Err(e) => {
                return Err(OAuthError::InvalidResponse {
                    message: e.to_string(),
                })
            }
        };

        if let Some(error) = parsed.error {
            warn!(error = %error, "Token exchange rejected by provider");
            return Err(OAuthError::Provider {
                error,
                description: parsed.error_description,
            });
        }

        if !status.is_success() {
            return Err(OAuthError::UnexpectedStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let secret = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(OAuthError::EmptyToken)?;

        Ok(AccessToken {
            secret: SecretString::new(secret),
            token_type: parsed.token_type,
            scope: parsed.scope,
        })
    }

    /// Fetches the authenticated user's profile as raw JSON text.
    #[instrument(skip(self, token))]
    pub async fn fetch_user_profile(&self, token: &AccessToken) -> Result<String, OAuthError> {
        let url = format!("{}/user", self.config.api_base_url.trim_end_matches('/'));

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, token.authorization_header())
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", &self.config.api_version)
            .send()
            .await
            .map_err(OAuthError::Network)?;

        let status = response.status();
        let body = response.text().await.map_err(OAuthError::Network)?;

        if !status.is_success() {
            return Err(OAuthError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        debug!(bytes = body.len(), "Fetched user profile");
        Ok(body)
    }
}
