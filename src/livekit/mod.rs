//! LiveKit server API used to place calls and inspect rooms.
//!
//! [`ControlPlane`] is the seam the dialer and the worker talk to;
//! [`LiveKitApi`] implements it with the `livekit-api` service clients.

use async_trait::async_trait;
use livekit_api::services::{ServiceError, TwirpError, TwirpErrorCode};
use thiserror::Error;

pub mod client;

pub use client::LiveKitApi;
pub use livekit_protocol::{
    AgentDispatch, CreateAgentDispatchRequest, CreateSipParticipantRequest, SipParticipantInfo,
};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Service(#[from] ServiceError),
    #[error("API client is closed")]
    Closed,
}

impl ApiError {
    /// Error code and message as returned by the server
    pub fn twirp(&self) -> Option<&TwirpErrorCode> {
        match self {
            ApiError::Service(ServiceError::Twirp(TwirpError::Twirp(code))) => Some(code),
            _ => None,
        }
    }
}

/// The room a job runs in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Room {
    pub sid: String,
    pub name: String,
    pub metadata: String,
}

impl Room {
    pub fn new(name: impl Into<String>, metadata: impl Into<String>) -> Self {
        Self {
            sid: String::new(),
            name: name.into(),
            metadata: metadata.into(),
        }
    }
}

impl From<livekit_protocol::Room> for Room {
    fn from(room: livekit_protocol::Room) -> Self {
        Self {
            sid: room.sid,
            name: room.name,
            metadata: room.metadata,
        }
    }
}

/// Platform control API operations
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Assign a named agent to a room
    async fn create_dispatch(
        &self,
        request: CreateAgentDispatchRequest,
    ) -> Result<AgentDispatch, ApiError>;

    /// Dial a number through a SIP trunk into a room
    async fn create_sip_participant(
        &self,
        request: CreateSipParticipantRequest,
    ) -> Result<SipParticipantInfo, ApiError>;

    /// Look up a room by name
    async fn get_room(&self, name: &str) -> Result<Option<Room>, ApiError>;

    /// Release the client. Later requests fail with [`ApiError::Closed`].
    async fn close(&self);
}
