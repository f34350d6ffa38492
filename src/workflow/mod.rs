//! The branch, commit and pull request sequence run after login.
//!
//! Steps run in a fixed order and each consumes the previous step's output:
//!
//! 1. resolve the base branch tip
//! 2. create `<prefix>_<unix-ts>` from it
//! 3. read the target file's blob SHA on the new branch
//! 4. commit new content with that SHA
//! 5. open a pull request from the new branch into the base branch
//!
//! The first failure stops the run. What happens to a branch created before
//! the failure is decided by [`CleanupPolicy`].

use crate::config::RepositoryTarget;
use crate::errors::{GitHubError, GitHubErrorKind};
use crate::repository::{FileUpdate, PullRequestDraft, RepositoryOps};
use crate::services::CommitAuthor;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// Name stamped into commit messages and pull request text.
pub const APP_NAME: &str = "github-login-pr";

/// Named workflow steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowStep {
    /// Look up the base branch tip.
    ResolveBaseSha,
    /// Create the working branch.
    CreateBranch,
    /// Read the target file's blob SHA.
    GetFileSha,
    /// Commit the new file content.
    CommitFile,
    /// Open the pull request.
    CreatePullRequest,
}

impl WorkflowStep {
    /// Stable snake_case name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResolveBaseSha => "resolve_base_sha",
            Self::CreateBranch => "create_branch",
            Self::GetFileSha => "get_file_sha",
            Self::CommitFile => "commit_file",
            Self::CreatePullRequest => "create_pull_request",
        }
    }

    /// Short human description, safe to show to the user.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ResolveBaseSha => "resolving the base branch",
            Self::CreateBranch => "creating the branch",
            Self::GetFileSha => "reading the file",
            Self::CommitFile => "committing the file",
            Self::CreatePullRequest => "opening the pull request",
        }
    }

    fn branch_exists_after_failure(&self) -> bool {
        !matches!(self, Self::ResolveBaseSha | Self::CreateBranch)
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with the working branch when a later step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPolicy {
    /// Leave the branch in place.
    #[default]
    Disabled,
    /// Delete the branch, best effort.
    DeleteBranch,
}

impl CleanupPolicy {
    /// Policy for the `CLEANUP_ON_FAILURE` setting.
    pub fn from_flag(enabled: bool) -> Self {
        if enabled {
            Self::DeleteBranch
        } else {
            Self::Disabled
        }
    }
}

/// Result of the cleanup hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// Nothing had been created yet.
    NotNeeded,
    /// Cleanup disabled; the branch was left behind.
    Skipped {
        /// Abandoned branch.
        branch: String,
    },
    /// The branch was deleted.
    Deleted {
        /// Deleted branch.
        branch: String,
    },
    /// Deleting the branch failed.
    Failed {
        /// Branch that could not be deleted.
        branch: String,
        /// Deletion error.
        error: String,
    },
}

/// A failed workflow run.
#[derive(Debug, Error)]
#[error("workflow step {step} failed: {source}")]
pub struct WorkflowError {
    /// Step that failed.
    pub step: WorkflowStep,
    /// Upstream error.
    #[source]
    pub source: GitHubError,
    /// What the cleanup hook did.
    pub cleanup: CleanupOutcome,
}

/// A completed workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOutcome {
    /// Branch created for the change.
    pub branch: String,
    /// Base branch tip the branch was cut from.
    pub base_sha: String,
    /// Blob SHA of the file before the commit, `None` if it was created.
    pub file_sha: Option<String>,
    /// SHA of the new commit.
    pub commit_sha: String,
    /// Web URL of the pull request.
    pub pull_request_url: String,
}

/// Branch name for a run started at `now`.
pub fn branch_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}", prefix, now.timestamp())
}

/// HTTP-date style timestamp, e.g. `Tue, 14 Nov 2023 22:13:20 GMT`.
pub fn rfc1123(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// File content committed by a run at `now`.
pub fn file_content(now: DateTime<Utc>) -> String {
    format!(
        "This is the content of my file. File updated at {}",
        rfc1123(now)
    )
}

/// Commit message for a run at `now`.
pub fn commit_message(now: DateTime<Utc>) -> String {
    format!("Commit from {} at {}", APP_NAME, rfc1123(now))
}

/// Pull request title for a run at `now`.
pub fn pull_request_title(now: DateTime<Utc>) -> String {
    format!("Pull request from {} at {}", APP_NAME, rfc1123(now))
}

/// Pull request body.
pub fn pull_request_body() -> String {
    format!("This is pull request raised by {} app.", APP_NAME)
}

/// Branch, commit and pull request sequence against one repository.
#[derive(Debug, Clone)]
pub struct PullRequestWorkflow {
    target: RepositoryTarget,
    committer: CommitAuthor,
    cleanup: CleanupPolicy,
}

impl PullRequestWorkflow {
    /// Creates a workflow for the given repository and committer.
    pub fn new(target: RepositoryTarget, committer: CommitAuthor) -> Self {
        Self {
            target,
            committer,
            cleanup: CleanupPolicy::default(),
        }
    }

    /// Sets the cleanup policy.
    pub fn with_cleanup(mut self, policy: CleanupPolicy) -> Self {
        self.cleanup = policy;
        self
    }

    /// Runs every step against `repo`, stamping names and text with `now`.
    #[instrument(skip_all, fields(owner = %self.target.owner, repo = %self.target.repo))]
    pub async fn run<R>(&self, repo: &R, now: DateTime<Utc>) -> Result<WorkflowOutcome, WorkflowError>
    where
        R: RepositoryOps + ?Sized,
    {
        let base = &self.target.base_branch;
        let branch = branch_name(&self.target.branch_prefix, now);

        let base_sha = match repo.resolve_branch_sha(base).await {
            Ok(sha) => sha,
            Err(e) => return Err(self.fail(repo, WorkflowStep::ResolveBaseSha, &branch, e).await),
        };

        if let Err(e) = repo.create_branch(&branch, &base_sha).await {
            return Err(self.fail(repo, WorkflowStep::CreateBranch, &branch, e).await);
        }

        let file_sha = match repo.get_file_sha(&branch, &self.target.file_path).await {
            Ok(sha) => Some(sha),
            Err(e) if e.kind() == GitHubErrorKind::NotFound => {
                info!(path = %self.target.file_path, "File not on branch, creating it");
                None
            }
            Err(e) => return Err(self.fail(repo, WorkflowStep::GetFileSha, &branch, e).await),
        };

        let update = FileUpdate {
            branch: branch.clone(),
            path: self.target.file_path.clone(),
            sha: file_sha.clone(),
            content: file_content(now),
            committer: self.committer.clone(),
            message: commit_message(now),
        };
        let commit_sha = match repo.commit_file(&update).await {
            Ok(sha) => sha,
            Err(e) => return Err(self.fail(repo, WorkflowStep::CommitFile, &branch, e).await),
        };

        let draft = PullRequestDraft {
            head: branch.clone(),
            base: base.clone(),
            title: pull_request_title(now),
            body: pull_request_body(),
        };
        let pull_request_url = match repo.create_pull_request(&draft).await {
            Ok(url) => url,
            Err(e) => {
                return Err(self
                    .fail(repo, WorkflowStep::CreatePullRequest, &branch, e)
                    .await)
            }
        };

        Ok(WorkflowOutcome {
            branch,
            base_sha,
            file_sha,
            commit_sha,
            pull_request_url,
        })
    }

    async fn fail<R>(
        &self,
        repo: &R,
        step: WorkflowStep,
        branch: &str,
        source: GitHubError,
    ) -> WorkflowError
    where
        R: RepositoryOps + ?Sized,
    {
        error!(step = %step, error = %source, "Workflow step failed");

        let cleanup = if !step.branch_exists_after_failure() {
            CleanupOutcome::NotNeeded
        } else {
            match self.cleanup {
                CleanupPolicy::Disabled => {
                    warn!(branch, "Cleanup disabled, branch left behind");
                    CleanupOutcome::Skipped {
                        branch: branch.to_string(),
                    }
                }
                CleanupPolicy::DeleteBranch => match repo.delete_branch(branch).await {
                    Ok(()) => CleanupOutcome::Deleted {
                        branch: branch.to_string(),
                    },
                    Err(e) => {
                        error!(branch, error = %e, "Failed to delete branch");
                        CleanupOutcome::Failed {
                            branch: branch.to_string(),
                            error: e.to_string(),
                        }
                    }
                },
            }
        };

        WorkflowError {
            step,
            source,
            cleanup,
        }
    }
}
