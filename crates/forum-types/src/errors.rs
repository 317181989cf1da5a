//! Discord API error taxonomy.
//!
//! Maps the Discord JSON error codes the janitor can run into while
//! listing, editing and deleting to named variants, so callers can pick a
//! log level without string matching.

/// High-level category of a Discord API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limit hit; wait before retrying.
    RateLimit,
    /// Target resource (guild, channel, message …) not found.
    NotFound,
    /// Insufficient bot permissions for the requested action.
    PermissionDenied,
    /// Malformed or semantically invalid input.
    InvalidInput,
    /// Network or I/O error (transient).
    Network,
    /// Unknown or uncategorised error.
    Unknown,
}

/// Discord-specific error code (subset relevant to thread housekeeping).
///
/// See <https://discord.com/developers/docs/topics/opcodes-and-status-codes#json>;
/// everything not listed falls through to [`DiscordErrorCode::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscordErrorCode {
    // ── Not found ─────────────────────────────────────────────────────────────
    /// 10003: Unknown channel.
    UnknownChannel,
    /// 10004: Unknown guild.
    UnknownGuild,
    /// 10007: Unknown member.
    UnknownMember,
    /// 10008: Unknown message (likely deleted).
    UnknownMessage,
    /// 10013: Unknown user.
    UnknownUser,
    /// 10062: Unknown interaction (token expired or already acknowledged).
    UnknownInteraction,

    // ── Permission errors ──────────────────────────────────────────────────────
    /// 50001: Missing access.
    MissingAccess,
    /// 50013: Missing permissions.
    MissingPermissions,

    // ── Rate limiting ──────────────────────────────────────────────────────────
    /// HTTP 429: Global or per-route rate limit.
    RateLimited,

    // ── Input errors ───────────────────────────────────────────────────────────
    /// 50035: Invalid form body (e.g. too many applied tags).
    InvalidFormBody,
    /// 160005 / 50083: Thread is locked or archived.
    ThreadLocked,
    /// 40060: Interaction has already been acknowledged.
    AlreadyAcknowledged,

    // ── Auth ───────────────────────────────────────────────────────────────────
    /// 50014 / 40001: Invalid or expired token.
    InvalidToken,

    // ── Server errors ──────────────────────────────────────────────────────────
    /// 130000: API resource overloaded.
    ApiOverloaded,

    // ── Client errors ─────────────────────────────────────────────────────────
    /// Network or I/O error on the client side.
    NetworkError,

    /// Any Discord JSON error code not listed above.
    Unknown,
}

impl DiscordErrorCode {
    /// Derive the code from a raw Discord JSON error code integer.
    pub fn from_raw(code: u32) -> Self {
        match code {
            10003 => Self::UnknownChannel,
            10004 => Self::UnknownGuild,
            10007 => Self::UnknownMember,
            10008 => Self::UnknownMessage,
            10013 => Self::UnknownUser,
            10062 => Self::UnknownInteraction,
            40001 | 50014 => Self::InvalidToken,
            40060 => Self::AlreadyAcknowledged,
            50001 => Self::MissingAccess,
            50013 => Self::MissingPermissions,
            50035 => Self::InvalidFormBody,
            50083 | 160005 => Self::ThreadLocked,
            130000 => Self::ApiOverloaded,
            _ => Self::Unknown,
        }
    }

    /// The high-level category for this code.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownChannel
            | Self::UnknownGuild
            | Self::UnknownMember
            | Self::UnknownMessage
            | Self::UnknownUser
            | Self::UnknownInteraction => ErrorCategory::NotFound,

            Self::MissingAccess | Self::MissingPermissions => ErrorCategory::PermissionDenied,

            Self::RateLimited => ErrorCategory::RateLimit,

            Self::InvalidFormBody | Self::ThreadLocked | Self::AlreadyAcknowledged => {
                ErrorCategory::InvalidInput
            }

            Self::NetworkError => ErrorCategory::Network,

            Self::InvalidToken | Self::ApiOverloaded | Self::Unknown => ErrorCategory::Unknown,
        }
    }

    /// True if repeating the same call cannot succeed without an outside change.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::NotFound | ErrorCategory::PermissionDenied
        ) || matches!(self, Self::InvalidToken)
    }

    /// True if the next sweep has a fair chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::NetworkError | Self::ApiOverloaded
        )
    }
}
