//! Repository contents.

use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::services::encode_path;
use crate::types::Content;
use serde::{Deserialize, Serialize};

/// Service for repository content operations.
pub struct RepositoriesService<'a> {
    client: &'a GitHubClient,
}

impl<'a> RepositoriesService<'a> {
    /// Creates a new repositories service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Gets repository contents (file or directory).
    pub async fn get_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> GitHubResult<Content> {
        let mut url = format!("/repos/{}/{}/contents/{}", owner, repo, encode_path(path));
        if let Some(r) = git_ref {
            let encoded: String = url::form_urlencoded::byte_serialize(r.as_bytes()).collect();
            url = format!("{}?ref={}", url, encoded);
        }
        self.client.get(&url).await
    }

    /// Creates or updates a file.
    pub async fn create_or_update_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        request: &CreateOrUpdateFileRequest,
    ) -> GitHubResult<FileCommitResponse> {
        self.client
            .put(
                &format!("/repos/{}/{}/contents/{}", owner, repo, encode_path(path)),
                request,
            )
            .await
    }
}

/// Request to create or update a file.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrUpdateFileRequest {
    /// Commit message.
    pub message: String,
    /// File content (base64 encoded).
    pub content: String,
    /// SHA of the file being replaced (for updates).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    /// Branch name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Committer information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committer: Option<CommitAuthor>,
}

/// Commit author information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    /// Author name.
    pub name: String,
    /// Author email.
    pub email: String,
}

/// Response from file commit operations.
#[derive(Debug, Clone, Deserialize)]
pub struct FileCommitResponse {
    /// The committed content.
    pub content: Option<Content>,
    /// The commit.
    pub commit: FileCommit,
}

/// Commit information from file operations.
#[derive(Debug, Clone, Deserialize)]
pub struct FileCommit {
    /// Commit SHA.
    pub sha: String,
    /// Commit message.
    #[serde(default)]
    pub message: Option<String>,
    /// Commit URL.
    #[serde(default)]
    pub html_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_file_request_omits_sha() {
        let request = CreateOrUpdateFileRequest {
            message: "add".to_string(),
            content: "aGk=".to_string(),
            sha: None,
            branch: Some("main_1".to_string()),
            committer: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("sha").is_none());
        assert!(value.get("committer").is_none());
        assert_eq!(value["branch"], "main_1");
    }

    #[test]
    fn test_file_commit_response() {
        let response: FileCommitResponse = serde_json::from_value(json!({
            "content": null,
            "commit": {
                "sha": "7638417db6d59f3c431d3e1f261cc637155684cd",
                "message": "update",
                "html_url": "https://github.com/octocat/hello/commit/7638417"
            }
        }))
        .unwrap();

        assert!(response.content.is_none());
        assert_eq!(response.commit.sha, "7638417db6d59f3c431d3e1f261cc637155684cd");
    }
}
