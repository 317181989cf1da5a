//! Discord-specific error handling for the janitor.
//!
//! Serenity errors are classified once, at the API boundary, into an
//! [`Error`] carrying a [`DiscordErrorCode`]. `log_error` then logs at the
//! level that classification calls for: permanent failures (missing
//! permissions, deleted channels) at `error!`, everything else at `warn!`.

use forum_types::DiscordErrorCode;
use serenity::http::HttpError;
use thiserror::Error;
use tracing::{error, warn};

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by forum API calls.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Discord API error {code:?} (HTTP {status}): {message}")]
    Api {
        code: DiscordErrorCode,
        status: u16,
        message: String,
    },

    #[error("Rate limited")]
    RateLimited,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("channel {0} is not a guild channel")]
    NotGuildChannel(u64),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// The Discord error code this failure maps to.
    pub fn code(&self) -> DiscordErrorCode {
        match self {
            Self::Api { code, .. } => *code,
            Self::RateLimited => DiscordErrorCode::RateLimited,
            Self::Transport(_) => DiscordErrorCode::NetworkError,
            Self::NotGuildChannel(_) => DiscordErrorCode::UnknownChannel,
            Self::Config(_) => DiscordErrorCode::Unknown,
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.code().is_permanent()
    }

    fn from_http(err: &HttpError) -> Self {
        match err {
            HttpError::UnsuccessfulRequest(resp) => {
                let status = resp.status_code.as_u16();
                if status == 429 {
                    return Self::RateLimited;
                }
                Self::Api {
                    code: DiscordErrorCode::from_raw(resp.error.code as u32),
                    status,
                    message: resp.error.message.clone(),
                }
            }
            // Request-level failures (DNS, TLS, connection reset) are not Discord API errors
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<serenity::Error> for Error {
    fn from(err: serenity::Error) -> Self {
        match &err {
            serenity::Error::Http(http_err) => Self::from_http(http_err),
            _ => Self::Transport(err.to_string()),
        }
    }
}

/// Log a failed API call at the appropriate level.
///
/// - Permanent errors → `error!`
/// - Rate limits and transient errors → `warn!`
pub fn log_error(context: &str, err: &Error) {
    let code = err.code();
    if code.is_permanent() {
        error!(?code, "{}: {}", context, err);
    } else {
        warn!(?code, retryable = code.is_retryable(), "{}: {}", context, err);
    }
}
