//! Silero VAD implementation
//!
//! Wraps the `voice_activity_detector` crate. The model is built once and
//! never replaced; the mutex only serialises access to its recurrent state.

use std::sync::Mutex;
use voice_activity_detector::VoiceActivityDetector as SileroModel;

use super::{VADConfig, VADSampleRate, VadError, VoiceActivityDetector};

pub struct SileroVAD {
    model: Mutex<SileroModel>,
    config: VADConfig,
}

impl SileroVAD {
    pub fn load(config: VADConfig) -> Result<Self, VadError> {
        let sample_rate = match config.sample_rate {
            VADSampleRate::Rate8kHz => 8000,
            VADSampleRate::Rate16kHz => 16000,
        };
        let chunk_size = config.chunk_size();

        let model = SileroModel::builder()
            .sample_rate(sample_rate)
            .chunk_size(chunk_size)
            .build()
            .map_err(|e| VadError::Load(format!("Failed to create Silero VAD: {}", e)))?;

        log::info!(
            "Silero VAD loaded (sample_rate: {}Hz, chunk_size: {} samples)",
            sample_rate,
            chunk_size
        );

        Ok(Self {
            model: Mutex::new(model),
            config,
        })
    }
}

impl VoiceActivityDetector for SileroVAD {
    fn name(&self) -> &str {
        "silero"
    }

    fn config(&self) -> &VADConfig {
        &self.config
    }

    fn speech_probability(&self, audio: &[i16]) -> Result<f32, VadError> {
        if audio.is_empty() {
            return Err(VadError::InvalidAudio("no samples".to_string()));
        }

        let mut model = self
            .model
            .lock()
            .map_err(|_| VadError::Inference("VAD state poisoned".to_string()))?;

        let probability = audio
            .chunks(self.config.chunk_size())
            .map(|chunk| model.predict(chunk.iter().copied()))
            .fold(0.0f32, f32::max);

        Ok(probability)
    }
}
