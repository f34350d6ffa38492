//! Pull requests.

use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::types::PullRequest;
use serde::Serialize;

/// Service for pull request operations.
pub struct PullRequestsService<'a> {
    client: &'a GitHubClient,
}

impl<'a> PullRequestsService<'a> {
    /// Creates a new pull requests service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Creates a pull request.
    pub async fn create(
        &self,
        owner: &str,
        repo: &str,
        request: &CreatePullRequestRequest,
    ) -> GitHubResult<PullRequest> {
        self.client
            .post(&format!("/repos/{}/{}/pulls", owner, repo), request)
            .await
    }
}

/// Request to create a pull request.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePullRequestRequest {
    /// PR title.
    pub title: String,
    /// Head branch.
    pub head: String,
    /// Base branch.
    pub base: String,
    /// PR body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Whether to allow maintainer edits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainer_can_modify: Option<bool>,
    /// Whether to create as draft.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
}
