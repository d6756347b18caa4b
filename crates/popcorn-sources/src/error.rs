use thiserror::Error;

/// Message shown for any failure to reach or understand the provider.
pub const FETCH_FAILED_MESSAGE: &str = "Something went wrong with fetching movies";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Something went wrong with fetching movies")]
    Transport(#[source] reqwest::Error),

    #[error("Something went wrong with fetching movies")]
    BadStatus(u16),

    #[error("Something went wrong with fetching movies")]
    Decode(#[source] serde_json::Error),

    #[error("Movie not found")]
    NotFound,

    #[error("request cancelled")]
    Cancelled,
}

/// Coarse classification the session layer acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NetworkFailure,
    NotFound,
    Cancelled,
}

impl SourceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SourceError::Transport(_) | SourceError::BadStatus(_) | SourceError::Decode(_) => {
                ErrorKind::NetworkFailure
            }
            SourceError::NotFound => ErrorKind::NotFound,
            SourceError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(SourceError::BadStatus(500).to_string(), FETCH_FAILED_MESSAGE);
        assert_eq!(SourceError::NotFound.to_string(), "Movie not found");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(SourceError::BadStatus(503).kind(), ErrorKind::NetworkFailure);
        assert_eq!(SourceError::NotFound.kind(), ErrorKind::NotFound);
        assert!(SourceError::Cancelled.is_cancelled());
        assert!(!SourceError::NotFound.is_cancelled());
    }
}
