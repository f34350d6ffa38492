//! Application configuration.
//!
//! The whole service is driven by one [`AppConfig`], built once at startup
//! (usually through [`AppConfig::from_env`]) and shared read-only with every
//! request handler. The OAuth client id and secret are required; everything
//! else has a default.

use crate::observability::LogFormat;
use crate::services::CommitAuthor;
use secrecy::{ExposeSecret, SecretString};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

pub mod error;

pub use error::ConfigError;

/// File read into the process environment at startup, if present.
pub const ENV_FILE: &str = "githubapp.env";

/// Environment variable holding the OAuth app client id.
pub const CLIENT_ID_ENV: &str = "CLIENT_ID";

/// Environment variable holding the OAuth app client secret.
pub const CLIENT_SECRET_ENV: &str = "CLIENT_SECRET";

/// Default GitHub web base URL (authorize and token endpoints).
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://github.com";

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Default GitHub API version (date-based).
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Default User-Agent header. GitHub rejects API calls without one.
pub const DEFAULT_USER_AGENT: &str = concat!("github-login-pr/", env!("CARGO_PKG_VERSION"));

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Default OAuth callback URL.
pub const DEFAULT_CALLBACK_URL: &str = "http://localhost:8080/login/github/callback";

/// Default OAuth scope.
pub const DEFAULT_SCOPE: &str = "repo";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_OWNER: &str = "vinayakshnd";
const DEFAULT_REPO: &str = "newrepo";
const DEFAULT_FILE_PATH: &str = "myNewFile.md";
const DEFAULT_BASE_BRANCH: &str = "main";
const DEFAULT_COMMITTER_NAME: &str = "Vinayak Shinde";
const DEFAULT_COMMITTER_EMAIL: &str = "vinayakshnd@gmail.com";

/// The repository the service commits to and opens pull requests against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryTarget {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Path of the file that gets rewritten on every run.
    pub file_path: String,
    /// Branch the new branch is cut from and the pull request targets.
    pub base_branch: String,
    /// Prefix for new branch names, `<prefix>_<unix-timestamp>`.
    pub branch_prefix: String,
}

impl Default for RepositoryTarget {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
            file_path: DEFAULT_FILE_PATH.to_string(),
            base_branch: DEFAULT_BASE_BRANCH.to_string(),
            branch_prefix: DEFAULT_BASE_BRANCH.to_string(),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    client_id: String,
    client_secret: SecretString,
    /// Callback URL registered with the OAuth app.
    pub callback_url: String,
    /// OAuth scope requested on the authorize redirect.
    pub scope: String,
    /// Base URL of the OAuth provider (authorize and token endpoints).
    pub oauth_base_url: String,
    /// Base URL of the REST API.
    pub api_base_url: String,
    /// `X-GitHub-Api-Version` header value.
    pub api_version: String,
    /// User-Agent header value.
    pub user_agent: String,
    /// Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Timeout applied to every outgoing request.
    pub timeout: Duration,
    /// Connect timeout applied to every outgoing request.
    pub connect_timeout: Duration,
    /// Repository the workflow operates on.
    pub target: RepositoryTarget,
    /// Committer recorded on the file update.
    pub committer: CommitAuthor,
    /// Delete the freshly created branch when a later step fails.
    pub cleanup_on_failure: bool,
    /// Log output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::new()
    }

    /// Reads the configuration from the process environment.
    ///
    /// `CLIENT_ID` and `CLIENT_SECRET` are required. See the crate README
    /// for the optional variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads `KEY=value` lines from `path` into the process environment.
    ///
    /// Variables already set are not overridden. Returns `false` when the
    /// file does not exist.
    pub fn load_env_file(path: impl AsRef<Path>) -> Result<bool, ConfigError> {
        let path = path.as_ref();
        match dotenvy::from_filename(path) {
            Ok(_) => Ok(true),
            Err(dotenvy::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ConfigError::EnvFile {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Reads the configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let client_id = get(CLIENT_ID_ENV).ok_or_else(|| ConfigError::missing(CLIENT_ID_ENV))?;
        let client_secret =
            get(CLIENT_SECRET_ENV).ok_or_else(|| ConfigError::missing(CLIENT_SECRET_ENV))?;

        let mut builder = Self::builder()
            .client_id(client_id)
            .client_secret(client_secret);

        if let Some(v) = get("BIND_ADDR") {
            let addr = v
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::invalid(format!("BIND_ADDR '{}': {}", v, e)))?;
            builder = builder.bind_addr(addr);
        }
        if let Some(v) = get("OAUTH_CALLBACK_URL") {
            builder = builder.callback_url(v);
        }
        if let Some(v) = get("OAUTH_SCOPE") {
            builder = builder.scope(v);
        }
        if let Some(v) = get("GITHUB_OAUTH_URL") {
            builder = builder.oauth_base_url(v);
        }
        if let Some(v) = get("GITHUB_API_URL") {
            builder = builder.api_base_url(v);
        }
        if let Some(v) = get("HTTP_TIMEOUT_SECS") {
            let secs = v
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid(format!("HTTP_TIMEOUT_SECS '{}': {}", v, e)))?;
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(v) = get("CLEANUP_ON_FAILURE") {
            builder = builder.cleanup_on_failure(parse_bool("CLEANUP_ON_FAILURE", &v)?);
        }
        if let Some(v) = get("LOG_FORMAT") {
            builder = builder.log_format(v.parse()?);
        }

        let mut target = RepositoryTarget::default();
        if let Some(v) = get("GITHUB_REPO_OWNER") {
            target.owner = v;
        }
        if let Some(v) = get("GITHUB_REPO_NAME") {
            target.repo = v;
        }
        if let Some(v) = get("GITHUB_FILE_PATH") {
            target.file_path = v;
        }
        if let Some(v) = get("GITHUB_BASE_BRANCH") {
            target.branch_prefix = v.clone();
            target.base_branch = v;
        }
        if let Some(v) = get("GITHUB_BRANCH_PREFIX") {
            target.branch_prefix = v;
        }
        builder = builder.target(target);

        let mut committer = CommitAuthor {
            name: DEFAULT_COMMITTER_NAME.to_string(),
            email: DEFAULT_COMMITTER_EMAIL.to_string(),
        };
        if let Some(v) = get("GITHUB_COMMITTER_NAME") {
            committer.name = v;
        }
        if let Some(v) = get("GITHUB_COMMITTER_EMAIL") {
            committer.email = v;
        }

        builder.committer(committer).build()
    }

    /// OAuth app client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// OAuth app client secret.
    pub fn client_secret(&self) -> &SecretString {
        &self.client_secret
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::missing(CLIENT_ID_ENV));
        }
        if self.client_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::missing(CLIENT_SECRET_ENV));
        }

        for (name, value) in [
            ("callback URL", &self.callback_url),
            ("OAuth base URL", &self.oauth_base_url),
            ("API base URL", &self.api_base_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(ConfigError::invalid(format!(
                    "{} must start with http:// or https://, got '{}'",
                    name, value
                )));
            }
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::invalid("Timeout must be greater than zero"));
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::invalid("User-Agent is required by GitHub API"));
        }

        let target = &self.target;
        for (name, value) in [
            ("repository owner", &target.owner),
            ("repository name", &target.repo),
            ("file path", &target.file_path),
            ("base branch", &target.base_branch),
            ("branch prefix", &target.branch_prefix),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid(format!("{} cannot be empty", name)));
            }
        }

        Ok(())
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(format!(
            "{} must be a boolean, got '{}'",
            name, value
        ))),
    }
}

/// Builder for [`AppConfig`].
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<String>,
    callback_url: Option<String>,
    scope: Option<String>,
    oauth_base_url: Option<String>,
    api_base_url: Option<String>,
    api_version: Option<String>,
    user_agent: Option<String>,
    bind_addr: Option<SocketAddr>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    target: Option<RepositoryTarget>,
    committer: Option<CommitAuthor>,
    cleanup_on_failure: bool,
    log_format: Option<LogFormat>,
}

impl AppConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the OAuth client id.
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Sets the OAuth client secret.
    pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Sets the OAuth callback URL.
    pub fn callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    /// Sets the requested OAuth scope.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Sets the OAuth provider base URL.
    pub fn oauth_base_url(mut self, url: impl Into<String>) -> Self {
        self.oauth_base_url = Some(url.into());
        self
    }

    /// Sets the REST API base URL.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the API version header.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the listen address.
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the target repository.
    pub fn target(mut self, target: RepositoryTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the committer identity.
    pub fn committer(mut self, committer: CommitAuthor) -> Self {
        self.committer = Some(committer);
        self
    }

    /// Enables branch deletion when the workflow fails after creating it.
    pub fn cleanup_on_failure(mut self, enabled: bool) -> Self {
        self.cleanup_on_failure = enabled;
        self
    }

    /// Sets the log format.
    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.log_format = Some(format);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let client_id = self
            .client_id
            .ok_or_else(|| ConfigError::missing(CLIENT_ID_ENV))?;
        let client_secret = self
            .client_secret
            .ok_or_else(|| ConfigError::missing(CLIENT_SECRET_ENV))?;

        let bind_addr = match self.bind_addr {
            Some(addr) => addr,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|e| ConfigError::invalid(format!("default bind address: {}", e)))?,
        };

        let config = AppConfig {
            client_id,
            client_secret: SecretString::new(client_secret),
            callback_url: self
                .callback_url
                .unwrap_or_else(|| DEFAULT_CALLBACK_URL.to_string()),
            scope: self.scope.unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            oauth_base_url: self
                .oauth_base_url
                .unwrap_or_else(|| DEFAULT_OAUTH_BASE_URL.to_string()),
            api_base_url: self
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            bind_addr,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            target: self.target.unwrap_or_default(),
            committer: self.committer.unwrap_or_else(|| CommitAuthor {
                name: DEFAULT_COMMITTER_NAME.to_string(),
                email: DEFAULT_COMMITTER_EMAIL.to_string(),
            }),
            cleanup_on_failure: self.cleanup_on_failure,
            log_format: self.log_format.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
