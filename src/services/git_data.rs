//! Git references.

use crate::client::GitHubClient;
use crate::errors::GitHubResult;
use crate::services::encode_path;
use serde::{Deserialize, Serialize};

/// Service for Git reference operations.
pub struct GitDataService<'a> {
    client: &'a GitHubClient,
}

impl<'a> GitDataService<'a> {
    /// Creates a new Git Data service.
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Gets a single reference, e.g. `heads/main`.
    pub async fn get_ref(
        &self,
        owner: &str,
        repo: &str,
        ref_name: &str,
    ) -> GitHubResult<GitReference> {
        let ref_path = ref_name.strip_prefix("refs/").unwrap_or(ref_name);
        self.client
            .get(&format!(
                "/repos/{}/{}/git/ref/{}",
                owner,
                repo,
                encode_path(ref_path)
            ))
            .await
    }

    /// Gets the reference of a branch.
    pub async fn get_branch_ref(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> GitHubResult<GitReference> {
        self.get_ref(owner, repo, &format!("heads/{}", branch)).await
    }

    /// Creates a reference.
    pub async fn create_ref(
        &self,
        owner: &str,
        repo: &str,
        ref_name: &str,
        sha: &str,
    ) -> GitHubResult<GitReference> {
        let request = CreateRefRequest {
            ref_name: if ref_name.starts_with("refs/") {
                ref_name.to_string()
            } else {
                format!("refs/{}", ref_name)
            },
            sha: sha.to_string(),
        };
        self.client
            .post(&format!("/repos/{}/{}/git/refs", owner, repo), &request)
            .await
    }

    /// Deletes a reference.
    pub async fn delete_ref(&self, owner: &str, repo: &str, ref_name: &str) -> GitHubResult<()> {
        let ref_path = ref_name.strip_prefix("refs/").unwrap_or(ref_name);
        self.client
            .delete(&format!(
                "/repos/{}/{}/git/refs/{}",
                owner,
                repo,
                encode_path(ref_path)
            ))
            .await
    }
}

/// A Git reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitReference {
    /// The reference name (e.g., "refs/heads/main").
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// The object the reference points to.
    pub object: GitObject,
}

/// A Git object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitObject {
    /// The SHA of the object.
    pub sha: String,
    /// The type of object (commit, tree, blob, tag).
    #[serde(rename = "type", default)]
    pub object_type: Option<String>,
}

/// Request to create a reference.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRefRequest {
    /// The reference name (must start with "refs/").
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// The SHA to point the reference to.
    pub sha: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_deserializes() {
        let reference: GitReference = serde_json::from_value(json!({
            "ref": "refs/heads/main",
            "node_id": "MDM6UmVmcmVmcy9oZWFkcy9tYWlu",
            "url": "https://api.github.com/repos/octocat/hello/git/refs/heads/main",
            "object": {
                "type": "commit",
                "sha": "aa218f56b14c9653891f9e74264a383fa43fefbd",
                "url": "https://api.github.com/repos/octocat/hello/git/commits/aa218f5"
            }
        }))
        .unwrap();

        assert_eq!(reference.ref_name, "refs/heads/main");
        assert_eq!(reference.object.sha, "aa218f56b14c9653891f9e74264a383fa43fefbd");
        assert_eq!(reference.object.object_type.as_deref(), Some("commit"));
    }

    #[test]
    fn test_create_ref_request_uses_ref_key() {
        let request = CreateRefRequest {
            ref_name: "refs/heads/main_1700000000".to_string(),
            sha: "abc".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"ref": "refs/heads/main_1700000000", "sha": "abc"})
        );
    }
}
