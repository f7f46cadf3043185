//! Agent worker: prewarm once per process, then one entrypoint run per room.

use std::sync::Arc;

use crate::agent::OutboundCallAgent;
use crate::config::AgentSettings;
use crate::error::{CallError, Result};
use crate::livekit::{ControlPlane, Room};
use crate::metadata::{CallMetadata, MetadataResolution};
use crate::session::{AgentSession, SessionConfig, SessionFactory};
use crate::vad::{load_silero, VADConfig, VadError, VoiceActivityDetector};

/// State loaded once per worker process and shared read-only by every job
pub struct ProcessContext {
    pub vad: Arc<dyn VoiceActivityDetector>,
}

impl ProcessContext {
    pub fn new(vad: Arc<dyn VoiceActivityDetector>) -> Self {
        Self { vad }
    }
}

/// Load the Silero VAD before any call arrives
pub fn prewarm(config: VADConfig) -> std::result::Result<ProcessContext, VadError> {
    let vad = load_silero(config)?;
    warm_up(vad.as_ref())?;
    Ok(ProcessContext::new(vad))
}

/// Run one silent window through the detector so the first call does not
/// pay the inference start-up cost
pub fn warm_up(vad: &dyn VoiceActivityDetector) -> std::result::Result<f32, VadError> {
    let silence = vec![0i16; vad.config().chunk_size()];
    let probability = vad.speech_probability(&silence)?;
    log::debug!("{} warm-up speech probability: {:.3}", vad.name(), probability);
    Ok(probability)
}

/// One dispatched room handed to the entrypoint
pub struct JobContext {
    pub room: Room,
    pub process: Arc<ProcessContext>,
}

/// Run the agent for one call.
///
/// Malformed room metadata is not an error; the call goes ahead with the
/// configured defaults. The returned session owns the agent, and the call
/// lasts as long as the caller holds it.
pub async fn entrypoint(
    ctx: &JobContext,
    settings: &AgentSettings,
    sessions: &dyn SessionFactory,
) -> Result<Box<dyn AgentSession>> {
    let room = ctx.room.name.as_str();

    let metadata = match CallMetadata::resolve(&ctx.room.metadata, &settings.defaults) {
        MetadataResolution::Parsed(metadata) => {
            log::info!(room = room; "Call metadata: {}", metadata.to_json());
            metadata
        }
        MetadataResolution::Empty(metadata) => {
            log::debug!(room = room; "Room has no metadata, using defaults");
            metadata
        }
        MetadataResolution::Invalid { metadata, reason } => {
            log::warn!(room = room; "Could not parse room metadata: {}", reason);
            metadata
        }
    };

    let agent = Arc::new(
        OutboundCallAgent::new(
            metadata.caller_name,
            metadata.company_name,
            settings.prompt_variant,
        )
        .in_room(room),
    );

    let config = SessionConfig::from_settings(settings, Arc::clone(&ctx.process.vad));
    let session = sessions.create_session(config);

    log::info!(room = room; "Starting agent session");
    session.start(agent, &ctx.room).await?;

    Ok(session)
}

/// Holds the prewarmed process state and runs jobs against it
pub struct AgentServer {
    process: Arc<ProcessContext>,
    settings: AgentSettings,
    sessions: Box<dyn SessionFactory>,
}

impl AgentServer {
    pub fn new(
        process: ProcessContext,
        settings: AgentSettings,
        sessions: Box<dyn SessionFactory>,
    ) -> Self {
        Self {
            process: Arc::new(process),
            settings,
            sessions,
        }
    }

    /// Run `setup_fnc` (the prewarm hook) and build a server around its result.
    /// A failing hook stops the worker before it takes any job.
    pub fn setup<F>(
        setup_fnc: F,
        settings: AgentSettings,
        sessions: Box<dyn SessionFactory>,
    ) -> Result<Self>
    where
        F: FnOnce() -> std::result::Result<ProcessContext, VadError>,
    {
        let process = setup_fnc()?;
        log::info!("Worker prewarmed (vad: {})", process.vad.name());
        Ok(Self::new(process, settings, sessions))
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn job(&self, room: Room) -> JobContext {
        JobContext {
            room,
            process: Arc::clone(&self.process),
        }
    }

    pub async fn run_job(&self, room: Room) -> Result<Box<dyn AgentSession>> {
        let ctx = self.job(room);
        entrypoint(&ctx, &self.settings, self.sessions.as_ref()).await
    }

    /// Look up `room_name` on the server and run the agent with its metadata
    pub async fn connect<A>(&self, api: &A, room_name: &str) -> Result<Box<dyn AgentSession>>
    where
        A: ControlPlane + ?Sized,
    {
        let room = api
            .get_room(room_name)
            .await?
            .ok_or_else(|| CallError::RoomNotFound(room_name.to_string()))?;
        self.run_job(room).await
    }
}
