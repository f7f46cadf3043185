//! Outbound phone calls with a scripted voice agent on LiveKit.
//!
//! The `make-call` binary dispatches the agent into a new room and has a SIP
//! trunk dial the destination into it. The `outbound-agent` binary runs the
//! agent side: prewarm the VAD once, then personalize and start a session for
//! each room it is handed.

pub mod agent;
pub mod config;
pub mod dialer;
pub mod error;
pub mod livekit;
pub mod llm;
pub mod metadata;
pub mod session;
pub mod vad;
pub mod worker;

pub use error::{CallError, Result};
