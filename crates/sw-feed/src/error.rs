use std::fmt;

/// Classified feed failure.
///
/// Only [`FeedError::Unauthorized`] is fatal: bad credentials will not fix
/// themselves, so the caller stops polling until restarted. Everything else
/// is recoverable and the next tick simply tries again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The marketplace rejected the API key (401 / 403).
    Unauthorized,
    /// Any other non-2xx status.
    Unavailable { status: u16 },
    /// Network failure, timeout, or a payload that could not be decoded.
    Transport(String),
}

impl FeedError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, FeedError::Unauthorized)
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Unauthorized => write!(f, "feed unauthorized: api key rejected"),
            FeedError::Unavailable { status } => {
                write!(f, "feed unavailable: http status={status}")
            }
            FeedError::Transport(msg) => write!(f, "feed transport error: {msg}"),
        }
    }
}

impl std::error::Error for FeedError {}
