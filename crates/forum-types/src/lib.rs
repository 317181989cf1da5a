//! Shared types for forum thread housekeeping on Discord

pub mod errors;
pub mod policies;
pub mod types;

pub use errors::{DiscordErrorCode, ErrorCategory};
pub use policies::ModeratorPolicy;
pub use types::*;
