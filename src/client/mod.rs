//! GitHub REST client.
//!
//! A thin wrapper over `reqwest` that attaches the user's token and the
//! GitHub media-type headers to every call and turns non-2xx answers into
//! [`GitHubError`]. Typed operations live on the services in
//! [`crate::services`].

use crate::config::AppConfig;
use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult};
use crate::oauth::AccessToken;
use crate::observability::redact_header;
use crate::services::{GitDataService, PullRequestsService, RepositoriesService};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

/// GitHub error response format.
#[derive(Debug, serde::Deserialize)]
struct GitHubErrorResponse {
    message: String,
    documentation_url: Option<String>,
}

/// Builds the connection pool shared by the OAuth and REST clients.
pub fn build_http_client(config: &AppConfig) -> GitHubResult<Client> {
    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| GitHubError::configuration(format!("Failed to create HTTP client: {}", e)))
}

/// GitHub API client acting on behalf of one user.
pub struct GitHubClient {
    http: Client,
    base_url: String,
    api_version: String,
    auth_header: SecretString,
}

impl GitHubClient {
    /// Creates a client for the given token.
    pub fn new(http: Client, config: &AppConfig, token: &AccessToken) -> Self {
        Self {
            http,
            base_url: config.api_base_url.clone(),
            api_version: config.api_version.clone(),
            auth_header: SecretString::new(token.authorization_header()),
        }
    }

    // Service accessors

    /// Gets the repositories service.
    pub fn repositories(&self) -> RepositoriesService<'_> {
        RepositoriesService::new(self)
    }

    /// Gets the Git data service.
    pub fn git_data(&self) -> GitDataService<'_> {
        GitDataService::new(self)
    }

    /// Gets the pull requests service.
    pub fn pull_requests(&self) -> PullRequestsService<'_> {
        PullRequestsService::new(self)
    }

    // HTTP methods

    /// Makes a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> GitHubResult<T> {
        self.request(Method::GET, path, Option::<&()>::None).await
    }

    /// Makes a POST request.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> GitHubResult<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Makes a PUT request.
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> GitHubResult<T> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// Makes a DELETE request.
    pub async fn delete(&self, path: &str) -> GitHubResult<()> {
        let url = self.build_url(path);
        self.execute_request(Method::DELETE, &url, Option::<&()>::None)
            .await?;
        Ok(())
    }

    // Internal methods

    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> GitHubResult<T> {
        let url = self.build_url(path);
        let response = self.execute_request(method, &url, body).await?;

        response.json().await.map_err(|e| {
            GitHubError::deserialization(format!("Failed to deserialize response: {}", e))
        })
    }

    async fn execute_request<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> GitHubResult<Response> {
        let auth_header = self.auth_header.expose_secret();

        debug!(
            method = %method,
            url = %url,
            authorization = %redact_header(AUTHORIZATION.as_str(), auth_header),
            "GitHub API request"
        );

        let mut request = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, auth_header)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", &self.api_version);

        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(|e| {
                GitHubError::new(
                    GitHubErrorKind::InvalidParameter,
                    format!("Failed to serialize request body: {}", e),
                )
            })?;
            request = request.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        let response = request.send().await.map_err(GitHubError::from_transport)?;

        let status = response.status();
        debug!(status = status.as_u16(), "GitHub API response");

        if !status.is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        Ok(response)
    }

    fn build_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    async fn handle_error_response(response: Response) -> GitHubError {
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-github-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let error_body = response.json::<GitHubErrorResponse>().await.ok();

        let message = error_body
            .as_ref()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| format!("HTTP {} error", status.as_u16()));

        let documentation_url = error_body.and_then(|e| e.documentation_url);

        GitHubError::from_response(status.as_u16(), message, documentation_url, request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> GitHubClient {
        let config = AppConfig::builder()
            .client_id("id")
            .client_secret("secret")
            .api_base_url(base_url)
            .build()
            .unwrap();
        GitHubClient::new(Client::new(), &config, &AccessToken::new("tok_abc"))
    }

    #[test]
    fn test_build_url() {
        let client = client("https://api.github.com");

        assert_eq!(
            client.build_url("/repos/owner/repo"),
            "https://api.github.com/repos/owner/repo"
        );
        assert_eq!(
            client.build_url("repos/owner/repo"),
            "https://api.github.com/repos/owner/repo"
        );
    }

    #[test]
    fn test_build_url_trailing_slash() {
        let client = client("http://127.0.0.1:9999/");
        assert_eq!(client.build_url("/user"), "http://127.0.0.1:9999/user");
    }

    #[test]
    fn test_build_http_client() {
        let config = AppConfig::builder()
            .client_id("id")
            .client_secret("secret")
            .build()
            .unwrap();
        assert!(build_http_client(&config).is_ok());
    }
}
