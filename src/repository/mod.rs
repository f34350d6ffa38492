//! Repository operations used by the pull request workflow.
//!
//! [`RepositoryOps`] is the seam between the workflow and GitHub. The
//! production implementation, [`GitHubRepository`], maps each operation to
//! one REST call; tests substitute a recording fake.

use crate::client::GitHubClient;
use crate::config::RepositoryTarget;
use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult};
use crate::services::{CommitAuthor, CreateOrUpdateFileRequest, CreatePullRequestRequest};
use crate::types::ContentType;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, info};

/// A single-file commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdate {
    /// Branch the commit lands on.
    pub branch: String,
    /// Repository path of the file.
    pub path: String,
    /// Current blob SHA. `None` creates the file.
    pub sha: Option<String>,
    /// New file content, plain text.
    pub content: String,
    /// Committer identity.
    pub committer: CommitAuthor,
    /// Commit message.
    pub message: String,
}

/// A pull request to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDraft {
    /// Branch with the changes.
    pub head: String,
    /// Branch to merge into.
    pub base: String,
    /// Title.
    pub title: String,
    /// Body.
    pub body: String,
}

/// Operations on the target repository.
#[async_trait]
pub trait RepositoryOps: Send + Sync {
    /// Returns the commit SHA at the tip of `branch`.
    async fn resolve_branch_sha(&self, branch: &str) -> GitHubResult<String>;

    /// Creates branch `new_name` pointing at `from_sha`. Fails if it exists.
    async fn create_branch(&self, new_name: &str, from_sha: &str) -> GitHubResult<()>;

    /// Returns the blob SHA of `path` on `branch`.
    async fn get_file_sha(&self, branch: &str, path: &str) -> GitHubResult<String>;

    /// Commits new file content and returns the commit SHA.
    async fn commit_file(&self, update: &FileUpdate) -> GitHubResult<String>;

    /// Opens a pull request and returns its web URL.
    async fn create_pull_request(&self, draft: &PullRequestDraft) -> GitHubResult<String>;

    /// Deletes branch `name`.
    async fn delete_branch(&self, name: &str) -> GitHubResult<()>;
}

/// [`RepositoryOps`] backed by the GitHub REST API.
pub struct GitHubRepository {
    client: GitHubClient,
    owner: String,
    repo: String,
}

impl GitHubRepository {
    /// Creates a repository handle for the configured target.
    pub fn new(client: GitHubClient, target: &RepositoryTarget) -> Self {
        Self {
            client,
            owner: target.owner.clone(),
            repo: target.repo.clone(),
        }
    }

    /// `owner/repo`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

#[async_trait]
impl RepositoryOps for GitHubRepository {
    async fn resolve_branch_sha(&self, branch: &str) -> GitHubResult<String> {
        let reference = self
            .client
            .git_data()
            .get_branch_ref(&self.owner, &self.repo, branch)
            .await?;
        debug!(branch, sha = %reference.object.sha, "Resolved branch");
        Ok(reference.object.sha)
    }

    async fn create_branch(&self, new_name: &str, from_sha: &str) -> GitHubResult<()> {
        self.client
            .git_data()
            .create_ref(
                &self.owner,
                &self.repo,
                &format!("refs/heads/{}", new_name),
                from_sha,
            )
            .await?;
        info!(repo = %self.full_name(), branch = new_name, from = from_sha, "Created branch");
        Ok(())
    }

    async fn get_file_sha(&self, branch: &str, path: &str) -> GitHubResult<String> {
        let content = self
            .client
            .repositories()
            .get_contents(&self.owner, &self.repo, path, Some(branch))
            .await?;

        if content.content_type != ContentType::File {
            return Err(GitHubError::new(
                GitHubErrorKind::InvalidParameter,
                format!("'{}' is not a file", path),
            ));
        }

        Ok(content.sha)
    }

    async fn commit_file(&self, update: &FileUpdate) -> GitHubResult<String> {
        let request = CreateOrUpdateFileRequest {
            message: update.message.clone(),
            content: STANDARD.encode(update.content.as_bytes()),
            sha: update.sha.clone(),
            branch: Some(update.branch.clone()),
            committer: Some(update.committer.clone()),
        };

        let response = self
            .client
            .repositories()
            .create_or_update_file(&self.owner, &self.repo, &update.path, &request)
            .await?;

        info!(
            branch = %update.branch,
            path = %update.path,
            commit = %response.commit.sha,
            "Committed file"
        );
        Ok(response.commit.sha)
    }

    async fn create_pull_request(&self, draft: &PullRequestDraft) -> GitHubResult<String> {
        let request = CreatePullRequestRequest {
            title: draft.title.clone(),
            head: draft.head.clone(),
            base: draft.base.clone(),
            body: Some(draft.body.clone()),
            maintainer_can_modify: Some(true),
            draft: None,
        };

        let pull_request = self
            .client
            .pull_requests()
            .create(&self.owner, &self.repo, &request)
            .await?;

        info!(number = pull_request.number, url = %pull_request.html_url, "Opened pull request");
        Ok(pull_request.html_url)
    }

    async fn delete_branch(&self, name: &str) -> GitHubResult<()> {
        self.client
            .git_data()
            .delete_ref(&self.owner, &self.repo, &format!("heads/{}", name))
            .await?;
        info!(repo = %self.full_name(), branch = name, "Deleted branch");
        Ok(())
    }
}
