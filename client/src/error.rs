//! Client error types

use shared::frame::FrameError;
use std::io;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Cache error: {0}")]
    Cache(#[from] serde_json::Error),

    #[error("Connection rejected: {0}")]
    Rejected(String),

    #[error("Unexpected reply during handshake: {0}")]
    Handshake(&'static str),

    #[error("{0}")]
    InvalidCommand(String),
}
