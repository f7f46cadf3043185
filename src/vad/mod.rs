//! Voice Activity Detection (VAD) Module
//!
//! The worker loads one Silero model per process during prewarm and hands it
//! to every call session. Silero VAD runs on 32ms windows at 8kHz or 16kHz.

use std::sync::Arc;
use strum::{Display, EnumString};
use thiserror::Error;

pub mod silero;
pub use silero::SileroVAD;

#[derive(Error, Debug)]
pub enum VadError {
    #[error("Failed to load VAD model: {0}")]
    Load(String),
    #[error("Invalid audio: {0}")]
    InvalidAudio(String),
    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Sample rates supported by Silero VAD
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub enum VADSampleRate {
    #[strum(serialize = "8kHz")]
    Rate8kHz = 8000,
    #[strum(serialize = "16kHz")]
    Rate16kHz = 16000,
}

impl From<VADSampleRate> for u32 {
    fn from(rate: VADSampleRate) -> Self {
        rate as u32
    }
}

impl VADSampleRate {
    /// Samples per model window: 32ms at either rate
    pub fn chunk_size(&self) -> usize {
        match self {
            VADSampleRate::Rate8kHz => 256,
            VADSampleRate::Rate16kHz => 512,
        }
    }
}

/// Configuration for Silero Voice Activity Detection
#[derive(Debug, Clone)]
pub struct VADConfig {
    /// Sample rate (8kHz or 16kHz)
    pub sample_rate: VADSampleRate,
}

impl VADConfig {
    pub fn chunk_size(&self) -> usize {
        self.sample_rate.chunk_size()
    }
}

impl Default for VADConfig {
    fn default() -> Self {
        Self {
            sample_rate: VADSampleRate::Rate16kHz,
        }
    }
}

/// A loaded detector shared by every session in the worker process
pub trait VoiceActivityDetector: Send + Sync {
    /// Model name for logs
    fn name(&self) -> &str;

    fn config(&self) -> &VADConfig;

    /// Highest speech probability over the chunks in `audio`
    fn speech_probability(&self, audio: &[i16]) -> Result<f32, VadError>;
}

/// Load the Silero model once for sharing across sessions
pub fn load_silero(config: VADConfig) -> Result<Arc<dyn VoiceActivityDetector>, VadError> {
    let vad = SileroVAD::load(config)?;
    Ok(Arc::new(vad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_sizes() {
        assert_eq!(VADConfig::default().chunk_size(), 512);
        assert_eq!(VADSampleRate::Rate8kHz.chunk_size(), 256);
        assert_eq!(u32::from(VADSampleRate::Rate8kHz), 8000);
        assert_eq!(VADSampleRate::Rate16kHz.to_string(), "16kHz");
    }
}
