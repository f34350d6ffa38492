//! OAuth error types.

use thiserror::Error;

/// Errors raised by the OAuth login flow.
///
/// Every variant ends in the unauthorized response at the route layer; they
/// are kept distinct for logging.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// The callback carried no authorization code.
    #[error("Authorization code missing from callback")]
    MissingCode,

    /// Transport failure talking to the provider.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The provider answered with a body that could not be parsed.
    #[error("Invalid token response: {message}")]
    InvalidResponse {
        /// Parser message.
        message: String,
    },

    /// The provider rejected the request, e.g. `bad_verification_code`
    /// for an expired or already redeemed code.
    #[error("Provider rejected request: {error}{}", describe(.description))]
    Provider {
        /// OAuth error code.
        error: String,
        /// Human readable description, when given.
        description: Option<String>,
    },

    /// The token response parsed but carried no access token.
    #[error("Token response contained no access token")]
    EmptyToken,

    /// Non-success HTTP status.
    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

fn describe(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" ({})", d))
        .unwrap_or_default()
}

impl OAuthError {
    /// Short code for log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingCode => "missing_code",
            Self::Network(_) => "network",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::Provider { .. } => "provider",
            Self::EmptyToken => "empty_token",
            Self::UnexpectedStatus { .. } => "unexpected_status",
        }
    }
}
