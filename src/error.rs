use thiserror::Error;

use crate::config::ConfigError;
use crate::livekit::ApiError;
use crate::llm::tools::ToolError;
use crate::session::SessionError;
use crate::vad::VadError;

pub type Result<T> = std::result::Result<T, CallError>;

#[derive(Error, Debug)]
pub enum CallError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LiveKit API error: {0}")]
    Api(#[from] ApiError),

    #[error("Action error: {0}")]
    Action(#[from] ToolError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("VAD error: {0}")]
    Vad(#[from] VadError),

    #[error("Room not found: {0}")]
    RoomNotFound(String),
}
