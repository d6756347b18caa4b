use serde::Serialize;

/// Lifecycle of one search or detail request.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum SessionState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> Default for SessionState<T> {
    fn default() -> Self {
        SessionState::Idle
    }
}

impl<T> SessionState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    /// Success and Error are terminal until the next request starts.
    pub fn is_settled(&self) -> bool {
        matches!(self, SessionState::Success(_) | SessionState::Error(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            SessionState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionState::Error(message) => Some(message),
            _ => None,
        }
    }
}
