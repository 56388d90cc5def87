use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoonslaError {
    #[error("Slack API error: {0}")]
    SlackApi(String),

    #[error("Directory load failed: {0}")]
    Directory(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MoonslaError {
    /// Slack error codes that mean the credential will never work
    const AUTH_ERROR_CODES: [&'static str; 4] = [
        "invalid_auth",
        "not_authed",
        "account_inactive",
        "token_revoked",
    ];

    /// Whether this error was caused by a rejected credential
    pub fn is_auth_failure(&self) -> bool {
        match self {
            MoonslaError::SlackApi(msg) | MoonslaError::Directory(msg) => {
                is_auth_failure_message(msg)
            }
            _ => false,
        }
    }
}

/// Check a raw Slack error message for one of the authentication error codes
pub fn is_auth_failure_message(msg: &str) -> bool {
    MoonslaError::AUTH_ERROR_CODES
        .iter()
        .any(|code| msg.contains(code))
}

pub type Result<T> = std::result::Result<T, MoonslaError>;
