//! Error categories surfaced to clients as `error` packets

/// Result type for room and gateway operations
pub type GameResult<T> = std::result::Result<T, GameError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Malformed input: wrong shape, empty or oversized text
    #[error("{0}")]
    Validation(String),

    /// The caller may not perform this action now
    #[error("{0}")]
    Authorization(String),

    /// Unknown room code or player id
    #[error("{0}")]
    NotFound(String),

    /// Anything unexpected; the detail is logged, not sent
    #[error("Something went wrong, please try again")]
    Internal(String),
}

impl GameError {
    pub fn validation(msg: impl Into<String>) -> Self {
        GameError::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        GameError::Authorization(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        GameError::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        GameError::Internal(msg.into())
    }

    pub fn category(&self) -> &'static str {
        match self {
            GameError::Validation(_) => "validation",
            GameError::Authorization(_) => "authorization",
            GameError::NotFound(_) => "not-found",
            GameError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message() {
        assert_eq!(
            GameError::unauthorized("Only host can start the game").to_string(),
            "Only host can start the game"
        );
        let internal = GameError::internal("room index out of sync");
        assert_eq!(
            internal.to_string(),
            "Something went wrong, please try again"
        );
        assert_eq!(internal.category(), "internal");
    }
}
