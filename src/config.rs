use secrecy::{ExposeSecret, SecretBox};
use std::env;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::llm::prompts::PromptVariant;

pub const DEFAULT_AGENT_NAME: &str = "outbound-agent";
pub const TRUNK_ID_PREFIX: &str = "ST_";

pub const DEFAULT_CALLER_NAME: &str = "Oktivo AI";
pub const DEFAULT_COMPANY_NAME: &str = "Oktivo";
pub const DEFAULT_CALL_PURPOSE: &str = "demo call";

pub const DEFAULT_STT_MODEL: &str = "deepgram/nova-3";
pub const DEFAULT_STT_LANGUAGE: &str = "multi";
pub const DEFAULT_LLM_MODEL: &str = "openai/gpt-4.1-mini";
pub const DEFAULT_TTS_MODEL: &str = "cartesia/sonic-3";
pub const DEFAULT_TTS_VOICE: &str = "9626c31c-bec5-4cca-baa8-f8ba9e84c8bc";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("SIP_OUTBOUND_TRUNK_ID not configured. Check your .env file.")]
    TrunkNotConfigured,
    #[error("Invalid SIP outbound trunk id '{0}': expected prefix 'ST_'")]
    InvalidTrunkId(String),
    #[error("Invalid LiveKit URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Credentials for the LiveKit server API
#[derive(Debug)]
pub struct LiveKitCredentials {
    pub url: Url,
    pub api_key: String,
    pub api_secret: SecretBox<String>,
}

impl LiveKitCredentials {
    /// Load credentials from `LIVEKIT_URL`, `LIVEKIT_API_KEY` and `LIVEKIT_API_SECRET`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let url = required_var("LIVEKIT_URL")?;
        let api_key = required_var("LIVEKIT_API_KEY")?;
        let api_secret = required_var("LIVEKIT_API_SECRET")?;

        Self::new(&url, api_key, api_secret)
    }

    pub fn new(url: &str, api_key: String, api_secret: String) -> Result<Self, ConfigError> {
        Ok(Self {
            url: http_base_url(url)?,
            api_key,
            api_secret: SecretBox::new(Box::new(api_secret)),
        })
    }

    /// Get the API secret (use only when signing tokens)
    pub fn api_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }
}

/// Map a LiveKit websocket URL onto the HTTP base the server API listens on.
pub fn http_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    let scheme = match url.scheme() {
        "ws" | "http" => "http",
        "wss" | "https" => "https",
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    };
    url.set_scheme(scheme)
        .map_err(|_| invalid("cannot change scheme".to_string()))?;
    Ok(url)
}

/// Settings used by the call-initiation program
#[derive(Debug, Clone)]
pub struct DialerConfig {
    pub agent_name: String,
    pub outbound_trunk_id: Option<String>,
}

impl DialerConfig {
    /// Load from `LIVEKIT_AGENT_NAME` and `SIP_OUTBOUND_TRUNK_ID`.
    ///
    /// The trunk id is not validated here; [`DialerConfig::trunk_id`] does that
    /// right before a call is placed.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Self {
            agent_name: env::var("LIVEKIT_AGENT_NAME")
                .unwrap_or_else(|_| DEFAULT_AGENT_NAME.to_string()),
            outbound_trunk_id: env::var("SIP_OUTBOUND_TRUNK_ID").ok(),
        }
    }

    /// The validated outbound trunk id
    pub fn trunk_id(&self) -> Result<&str, ConfigError> {
        validate_trunk_id(self.outbound_trunk_id.as_deref())
    }
}

impl Default for DialerConfig {
    fn default() -> Self {
        Self {
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            outbound_trunk_id: None,
        }
    }
}

pub fn validate_trunk_id(trunk_id: Option<&str>) -> Result<&str, ConfigError> {
    match trunk_id {
        None => Err(ConfigError::TrunkNotConfigured),
        Some(id) if id.trim().is_empty() => Err(ConfigError::TrunkNotConfigured),
        Some(id) if !id.starts_with(TRUNK_ID_PREFIX) => {
            Err(ConfigError::InvalidTrunkId(id.to_string()))
        }
        Some(id) => Ok(id),
    }
}

/// Personalization used when a call does not carry its own values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Personalization {
    pub caller_name: String,
    pub company_name: String,
    pub call_purpose: String,
}

impl Personalization {
    /// Load defaults from `DEFAULT_CALLER_NAME`, `DEFAULT_COMPANY_NAME` and
    /// `DEFAULT_CALL_PURPOSE`, falling back to the built-in values.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Self {
            caller_name: var_or("DEFAULT_CALLER_NAME", DEFAULT_CALLER_NAME),
            company_name: var_or("DEFAULT_COMPANY_NAME", DEFAULT_COMPANY_NAME),
            call_purpose: var_or("DEFAULT_CALL_PURPOSE", DEFAULT_CALL_PURPOSE),
        }
    }
}

impl Default for Personalization {
    fn default() -> Self {
        Self {
            caller_name: DEFAULT_CALLER_NAME.to_string(),
            company_name: DEFAULT_COMPANY_NAME.to_string(),
            call_purpose: DEFAULT_CALL_PURPOSE.to_string(),
        }
    }
}

/// Settings for the agent worker
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub prompt_variant: PromptVariant,
    pub defaults: Personalization,
    pub stt_model: String,
    pub stt_language: String,
    pub llm_model: String,
    pub tts_model: String,
    pub tts_voice: String,
}

impl AgentSettings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let prompt_variant = match env::var("AGENT_PROMPT_VARIANT") {
            Ok(raw) => PromptVariant::from_str(raw.trim()).map_err(|_| {
                ConfigError::InvalidValue {
                    var: "AGENT_PROMPT_VARIANT".to_string(),
                    reason: format!("unknown prompt variant '{}'", raw),
                }
            })?,
            Err(_) => PromptVariant::default(),
        };

        Ok(Self {
            prompt_variant,
            defaults: Personalization::load(),
            stt_model: var_or("AGENT_STT_MODEL", DEFAULT_STT_MODEL),
            stt_language: var_or("AGENT_STT_LANGUAGE", DEFAULT_STT_LANGUAGE),
            llm_model: var_or("AGENT_LLM_MODEL", DEFAULT_LLM_MODEL),
            tts_model: var_or("AGENT_TTS_MODEL", DEFAULT_TTS_MODEL),
            tts_voice: var_or("AGENT_TTS_VOICE", DEFAULT_TTS_VOICE),
        })
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            prompt_variant: PromptVariant::default(),
            defaults: Personalization::default(),
            stt_model: DEFAULT_STT_MODEL.to_string(),
            stt_language: DEFAULT_STT_LANGUAGE.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            tts_voice: DEFAULT_TTS_VOICE.to_string(),
        }
    }
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(name.to_string())),
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Load LiveKit credentials with helpful error messages for development
pub fn load_credentials() -> Result<LiveKitCredentials, ConfigError> {
    match LiveKitCredentials::load() {
        Ok(credentials) => {
            log::info!("Loaded LiveKit credentials for {}", credentials.url);
            Ok(credentials)
        }
        Err(ConfigError::MissingEnvVar(var)) => {
            log::error!("Missing required environment variable: {}", var);
            log::error!("Create a .env file in the project root with:");
            log::error!("{}=...", var);
            Err(ConfigError::MissingEnvVar(var))
        }
        Err(e) => {
            log::error!("Configuration error: {}", e);
            Err(e)
        }
    }
}
