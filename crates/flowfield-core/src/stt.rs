//! **Speech-to-Text** for uploaded voice prompts.
//!
//! Clips arrive as WAV bytes and are decoded to 16 kHz mono f32 before inference.
//! Implement `SpeechToText` for any backend; `WhisperStt` (feature `whisper`) runs a local
//! ggml model.

use crate::config::GatewayConfig;
use std::io::Cursor;
use std::sync::Arc;
use thiserror::Error;

/// Sample rate the recognizer expects.
pub const SAMPLE_RATE: u32 = 16_000;

pub type SttResult<T> = Result<T, SttError>;

#[derive(Error, Debug)]
pub enum SttError {
    #[error("Audio format error: {0}")]
    Format(String),

    #[error("Whisper load failed: {0}")]
    ModelLoad(String),

    #[error("Whisper inference failed: {0}")]
    Inference(String),
}

impl From<hound::Error> for SttError {
    fn from(err: hound::Error) -> Self {
        SttError::Format(err.to_string())
    }
}

/// Decoded mono PCM, normalised to [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioClip {
    /// Decode a WAV file held in memory. Multi-channel audio is averaged down to mono.
    pub fn from_wav_bytes(bytes: &[u8]) -> SttResult<Self> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        if spec.sample_rate != SAMPLE_RATE {
            return Err(SttError::Format(format!(
                "expected {} Hz audio, got {} Hz",
                SAMPLE_RATE, spec.sample_rate
            )));
        }
        if spec.channels == 0 {
            return Err(SttError::Format("WAV header declares zero channels".to_string()));
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let channels = spec.channels as usize;
        let samples = if channels == 1 {
            interleaved
        } else {
            interleaved
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect()
        };

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
        })
    }

    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Backend for converting a clip to text. Blocking; call from `spawn_blocking`.
pub trait SpeechToText: Send + Sync {
    /// Return an empty string when nothing was recognised.
    fn transcribe(&self, clip: &AudioClip) -> SttResult<String>;
}

#[cfg(feature = "whisper")]
mod whisper_stt {
    use super::*;
    use std::sync::Mutex;
    use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

    /// Local Whisper STT over a ggml model (e.g. ggml-base.en.bin).
    pub struct WhisperStt {
        #[allow(dead_code)]
        context: WhisperContext,
        state: Mutex<whisper_rs::WhisperState>,
        language: String,
    }

    impl WhisperStt {
        pub fn new(model_path: &str, language: &str) -> SttResult<Self> {
            let params = WhisperContextParameters::default();
            let context = WhisperContext::new_with_params(model_path, params)
                .map_err(|e| SttError::ModelLoad(e.to_string()))?;
            let state = context
                .create_state()
                .map_err(|e| SttError::ModelLoad(format!("state init: {}", e)))?;
            Ok(Self {
                context,
                state: Mutex::new(state),
                language: language.to_string(),
            })
        }
    }

    impl SpeechToText for WhisperStt {
        fn transcribe(&self, clip: &AudioClip) -> SttResult<String> {
            if clip.samples.is_empty() {
                return Ok(String::new());
            }
            let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
            params.set_print_progress(false);
            params.set_print_realtime(false);
            params.set_no_timestamps(true);
            params.set_language(Some(self.language.as_str()));

            let mut state = self
                .state
                .lock()
                .map_err(|e| SttError::Inference(format!("lock poisoned: {}", e)))?;
            state
                .full(params, &clip.samples)
                .map_err(|e| SttError::Inference(e.to_string()))?;
            let text = state
                .as_iter()
                .filter_map(|seg| seg.to_str().ok().map(|s| s.trim().to_string()))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            Ok(text)
        }
    }
}

#[cfg(feature = "whisper")]
pub use whisper_stt::WhisperStt;

/// Best available recognizer, or `None` when transcription is not possible in this process.
pub fn create_stt(config: &GatewayConfig) -> Option<Arc<dyn SpeechToText>> {
    let path = config
        .whisper_model_path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    let Some(path) = path else {
        tracing::warn!(target: "flowfield::stt", "WHISPER_MODEL_PATH not set; /transcribe disabled");
        return None;
    };

    #[cfg(feature = "whisper")]
    {
        tracing::info!(target: "flowfield::stt", "Loading Whisper model: {} ({})", path, config.whisper_language);
        match WhisperStt::new(path, &config.whisper_language) {
            Ok(w) => {
                tracing::info!(target: "flowfield::stt", "Whisper model loaded successfully.");
                Some(Arc::new(w) as Arc<dyn SpeechToText>)
            }
            Err(e) => {
                tracing::error!(target: "flowfield::stt", "Error loading Whisper model: {}", e);
                None
            }
        }
    }
    #[cfg(not(feature = "whisper"))]
    {
        tracing::warn!(
            target: "flowfield::stt",
            "WHISPER_MODEL_PATH={} set but built without the `whisper` feature; /transcribe disabled",
            path
        );
        None
    }
}
