//! # GitHub Login PR
//!
//! A small web service that signs a user in with GitHub OAuth and then,
//! acting as that user:
//! - reads their profile
//! - cuts a fresh branch from the base branch of a configured repository
//! - commits an updated file to it
//! - opens a pull request back into the base branch
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use github_login_pr::{server, AppConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let state = server::AppState::new(config)?;
//!     server::serve(state).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// OAuth web flow
pub mod oauth;

// HTTP client and API services
pub mod client;
pub mod services;

// Repository seam and the pull request sequence
pub mod repository;
pub mod workflow;

// HTTP routes and response bodies
pub mod render;
pub mod server;

// Observability
pub mod observability;

// Re-exports for convenience
pub use client::GitHubClient;
pub use config::{AppConfig, AppConfigBuilder, ConfigError, RepositoryTarget};
pub use errors::{GitHubError, GitHubErrorKind, GitHubResult};
pub use oauth::{AccessToken, OAuthClient, OAuthError};
pub use repository::{GitHubRepository, RepositoryOps};
pub use workflow::{CleanupPolicy, PullRequestWorkflow, WorkflowError, WorkflowStep};
