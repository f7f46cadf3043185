//! Conversation sessions.
//!
//! A session binds one [`OutboundCallAgent`] to one room and drives the
//! speech pipeline. Speech recognition, synthesis and turn scheduling belong
//! to the platform; this module only names the models a session uses and the
//! two calls the agent makes into it.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::agent::OutboundCallAgent;
use crate::config::AgentSettings;
use crate::livekit::Room;
use crate::vad::VoiceActivityDetector;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session has not been started")]
    NotStarted,
    #[error("Session was already started")]
    AlreadyStarted,
    #[error("Session backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SttSpec {
    pub model: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSpec {
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtsSpec {
    pub model: String,
    pub voice: String,
}

/// Everything a session backend needs to run one call
#[derive(Clone)]
pub struct SessionConfig {
    pub stt: SttSpec,
    pub llm: LlmSpec,
    pub tts: TtsSpec,
    /// The process-wide detector loaded during prewarm
    pub vad: Arc<dyn VoiceActivityDetector>,
}

impl SessionConfig {
    pub fn from_settings(settings: &AgentSettings, vad: Arc<dyn VoiceActivityDetector>) -> Self {
        Self {
            stt: SttSpec {
                model: settings.stt_model.clone(),
                language: settings.stt_language.clone(),
            },
            llm: LlmSpec {
                model: settings.llm_model.clone(),
            },
            tts: TtsSpec {
                model: settings.tts_model.clone(),
                voice: settings.tts_voice.clone(),
            },
            vad,
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("stt", &self.stt)
            .field("llm", &self.llm)
            .field("tts", &self.tts)
            .field("vad", &self.vad.name())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyOptions {
    /// Whether the caller can talk over the generated reply
    pub allow_interruptions: bool,
}

impl Default for ReplyOptions {
    fn default() -> Self {
        Self {
            allow_interruptions: true,
        }
    }
}

/// A running conversation in one room
#[async_trait]
pub trait AgentSession: Send + Sync {
    /// Bind `agent` to `room` and start the pipeline.
    /// Implementations call [`OutboundCallAgent::on_enter`] once the agent is live.
    async fn start(&self, agent: Arc<OutboundCallAgent>, room: &Room) -> Result<(), SessionError>;

    /// Ask the model to produce the next spoken turn
    fn generate_reply(&self, options: ReplyOptions) -> Result<(), SessionError>;

    /// The agent this session owns, once started
    fn agent(&self) -> Option<Arc<OutboundCallAgent>>;
}

/// Creates sessions for the worker, one per call
pub trait SessionFactory: Send + Sync {
    fn create_session(&self, config: SessionConfig) -> Box<dyn AgentSession>;
}

/// Session backend that runs on the local terminal.
///
/// Logs the pipeline it was configured with and prints each reply request;
/// the greeting stands in for the model's first turn.
pub struct ConsoleSession {
    config: SessionConfig,
    agent: OnceCell<Arc<OutboundCallAgent>>,
    replies: Mutex<Vec<String>>,
}

impl ConsoleSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            agent: OnceCell::new(),
            replies: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replies spoken so far
    pub fn replies(&self) -> Vec<String> {
        self.replies
            .lock()
            .map(|replies| replies.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AgentSession for ConsoleSession {
    async fn start(&self, agent: Arc<OutboundCallAgent>, room: &Room) -> Result<(), SessionError> {
        self.agent
            .set(Arc::clone(&agent))
            .map_err(|_| SessionError::AlreadyStarted)?;

        log::info!(
            room = room.name.as_str();
            "🎧 Console session started (stt: {} [{}], llm: {}, tts: {} voice {}, vad: {})",
            self.config.stt.model,
            self.config.stt.language,
            self.config.llm.model,
            self.config.tts.model,
            self.config.tts.voice,
            self.config.vad.name()
        );
        log::debug!(room = room.name.as_str(); "Agent instructions:\n{}", agent.instructions());
        log::debug!(
            room = room.name.as_str();
            "Agent tools: {:?}",
            agent
                .tools()
                .get_tools()
                .iter()
                .map(|tool| tool.name.as_str())
                .collect::<Vec<_>>()
        );

        agent.on_enter(self)
    }

    fn generate_reply(&self, options: ReplyOptions) -> Result<(), SessionError> {
        let agent = self.agent.get().ok_or(SessionError::NotStarted)?;
        let reply = agent.greeting();

        log::info!(
            room = agent.room();
            "Generating reply (interruptions {})",
            if options.allow_interruptions {
                "allowed"
            } else {
                "disabled"
            }
        );
        println!("🗣️  {}", reply);

        self.replies
            .lock()
            .map_err(|_| SessionError::Backend("reply log poisoned".to_string()))?
            .push(reply);
        Ok(())
    }

    fn agent(&self) -> Option<Arc<OutboundCallAgent>> {
        self.agent.get().cloned()
    }
}

/// Builds [`ConsoleSession`]s
pub struct ConsoleSessionFactory;

impl SessionFactory for ConsoleSessionFactory {
    fn create_session(&self, config: SessionConfig) -> Box<dyn AgentSession> {
        Box::new(ConsoleSession::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::prompts::PromptVariant;
    use crate::vad::{VADConfig, VadError};

    struct SilentVad(VADConfig);

    impl VoiceActivityDetector for SilentVad {
        fn name(&self) -> &str {
            "silent"
        }

        fn config(&self) -> &VADConfig {
            &self.0
        }

        fn speech_probability(&self, _audio: &[i16]) -> Result<f32, VadError> {
            Ok(0.0)
        }
    }

    fn config() -> SessionConfig {
        SessionConfig::from_settings(
            &AgentSettings::default(),
            Arc::new(SilentVad(VADConfig::default())),
        )
    }

    #[test]
    fn test_config_from_default_settings() {
        let config = config();
        assert_eq!(config.stt.model, "deepgram/nova-3");
        assert_eq!(config.stt.language, "multi");
        assert_eq!(config.llm.model, "openai/gpt-4.1-mini");
        assert_eq!(config.tts.model, "cartesia/sonic-3");
        assert_eq!(config.tts.voice, "9626c31c-bec5-4cca-baa8-f8ba9e84c8bc");
        assert!(format!("{:?}", config).contains("silent"));
    }

    #[tokio::test]
    async fn test_console_session_greets_once_started() {
        let session = ConsoleSession::new(config());
        assert!(matches!(
            session.generate_reply(ReplyOptions::default()),
            Err(SessionError::NotStarted)
        ));

        let agent = Arc::new(OutboundCallAgent::new(
            "Oktivo AI",
            "Oktivo",
            PromptVariant::Standard,
        ));
        session
            .start(Arc::clone(&agent), &Room::new("call-0000-1", ""))
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&session.agent().unwrap(), &agent));

        let replies = session.replies();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("This is a call from Oktivo"));
    }

    #[tokio::test]
    async fn test_console_session_starts_once() {
        let session = ConsoleSession::new(config());
        let agent = Arc::new(OutboundCallAgent::new(
            "Oktivo AI",
            "Oktivo",
            PromptVariant::Standard,
        ));
        let room = Room::new("call-0000-1", "");

        session.start(Arc::clone(&agent), &room).await.unwrap();
        assert!(matches!(
            session.start(agent, &room).await,
            Err(SessionError::AlreadyStarted)
        ));
    }
}
