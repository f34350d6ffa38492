//! Error types for the GitHub REST client.

use std::fmt;
use thiserror::Error;

/// Result type alias for GitHub operations.
pub type GitHubResult<T> = Result<T, GitHubError>;

/// Error kinds for categorizing GitHub errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// Invalid client configuration.
    InvalidConfiguration,
    /// Invalid parameter passed by the caller.
    InvalidParameter,

    /// Bad credentials (401).
    BadCredentials,
    /// Access forbidden (403).
    Forbidden,

    /// Request validation failed (400).
    ValidationError,
    /// Unprocessable entity (422), e.g. a ref that already exists or a stale blob SHA.
    UnprocessableEntity,
    /// Resource not found (404).
    NotFound,
    /// Resource conflict (409).
    Conflict,

    /// Connection failed.
    ConnectionFailed,
    /// Request timeout.
    Timeout,

    /// Server side failure (5xx).
    ServerError,

    /// Failed to deserialize response.
    DeserializationError,

    /// Anything else.
    Unknown,
}

impl fmt::Display for GitHubErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidConfiguration => "invalid_configuration",
            Self::InvalidParameter => "invalid_parameter",
            Self::BadCredentials => "bad_credentials",
            Self::Forbidden => "forbidden",
            Self::ValidationError => "validation_error",
            Self::UnprocessableEntity => "unprocessable_entity",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::ConnectionFailed => "connection_failed",
            Self::Timeout => "timeout",
            Self::ServerError => "server_error",
            Self::DeserializationError => "deserialization_error",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// GitHub API error with detailed information.
#[derive(Error, Debug)]
pub struct GitHubError {
    kind: GitHubErrorKind,
    message: String,
    status_code: Option<u16>,
    request_id: Option<String>,
    documentation_url: Option<String>,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for GitHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(code) = self.status_code {
            write!(f, " (HTTP {})", code)?;
        }
        if let Some(ref id) = self.request_id {
            write!(f, " [request_id: {}]", id)?;
        }
        Ok(())
    }
}

impl GitHubError {
    /// Creates a new GitHub error.
    pub fn new(kind: GitHubErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            request_id: None,
            documentation_url: None,
            cause: None,
        }
    }

    /// Sets the HTTP status code.
    pub fn with_status(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Sets the GitHub request ID.
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Sets the documentation URL.
    pub fn with_documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }

    /// Sets the underlying cause.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Gets the error kind.
    pub fn kind(&self) -> GitHubErrorKind {
        self.kind
    }

    /// Gets the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the HTTP status code.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Gets the request ID.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Gets the documentation URL.
    pub fn documentation_url(&self) -> Option<&str> {
        self.documentation_url.as_deref()
    }

    /// Creates an error from an HTTP status code and GitHub error response.
    pub fn from_response(
        status: u16,
        message: String,
        documentation_url: Option<String>,
        request_id: Option<String>,
    ) -> Self {
        let kind = Self::kind_from_status(status);
        let mut error = Self::new(kind, message).with_status(status);

        if let Some(url) = documentation_url {
            error = error.with_documentation_url(url);
        }
        if let Some(id) = request_id {
            error = error.with_request_id(id);
        }

        error
    }

    /// Maps HTTP status code to error kind.
    fn kind_from_status(status: u16) -> GitHubErrorKind {
        match status {
            400 => GitHubErrorKind::ValidationError,
            401 => GitHubErrorKind::BadCredentials,
            403 => GitHubErrorKind::Forbidden,
            404 => GitHubErrorKind::NotFound,
            409 => GitHubErrorKind::Conflict,
            422 => GitHubErrorKind::UnprocessableEntity,
            500..=599 => GitHubErrorKind::ServerError,
            _ => GitHubErrorKind::Unknown,
        }
    }

    // Convenience constructors

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::InvalidConfiguration, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::NotFound, message).with_status(404)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::Timeout, message)
    }

    /// Creates a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::DeserializationError, message)
    }

    /// Maps a transport failure from reqwest.
    pub fn from_transport(error: reqwest::Error) -> Self {
        let mapped = if error.is_timeout() {
            Self::timeout(format!("Request timed out: {}", error))
        } else if error.is_connect() {
            Self::new(
                GitHubErrorKind::ConnectionFailed,
                format!("Connection failed: {}", error),
            )
        } else {
            Self::new(GitHubErrorKind::Unknown, format!("Request failed: {}", error))
        };
        mapped.with_cause(error)
    }
}
