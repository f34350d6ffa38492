//! GitHub API response types.

use serde::{Deserialize, Serialize};

/// Repository content (file or directory entry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Content type.
    #[serde(rename = "type")]
    pub content_type: ContentType,
    /// Content encoding.
    #[serde(default)]
    pub encoding: Option<String>,
    /// Content size.
    #[serde(default)]
    pub size: u64,
    /// Content name.
    pub name: String,
    /// Content path.
    pub path: String,
    /// Content (base64 encoded for files).
    #[serde(default)]
    pub content: Option<String>,
    /// Git blob SHA.
    pub sha: String,
    /// HTML URL.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Content type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// File content.
    File,
    /// Directory content.
    Dir,
    /// Symbolic link.
    Symlink,
    /// Git submodule.
    Submodule,
}

/// Pull request state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    /// Open.
    Open,
    /// Closed.
    Closed,
}

/// Head or base of a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Branch name.
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Commit SHA.
    pub sha: String,
}

/// A pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR ID.
    pub id: u64,
    /// PR number.
    pub number: u32,
    /// PR title.
    pub title: String,
    /// PR body.
    #[serde(default)]
    pub body: Option<String>,
    /// PR state.
    pub state: PullRequestState,
    /// Head branch info.
    pub head: PullRequestRef,
    /// Base branch info.
    pub base: PullRequestRef,
    /// Web URL of the PR.
    pub html_url: String,
    /// Whether maintainers may push to the head branch.
    #[serde(default)]
    pub maintainer_can_modify: bool,
}
