//! Speech transduction boundary.
//!
//! Text-to-speech and speech-to-text are one-shot operations keyed by
//! session so a pending operation can be cancelled when its session goes
//! away. A failure here degrades the conversation to text-only; it never
//! aborts it.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Speech transduction is not available")]
    Unavailable,

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Speech transcription failed: {0}")]
    Transcription(String),

    #[error("Speech operation was cancelled")]
    Cancelled,
}

/// Synthesized audio for one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechAudio {
    pub mime_type: String,
    pub data: Vec<u8>,
}

pub trait SpeechTransducer: Send + Sync {
    fn synthesize(&self, session_id: Uuid, text: &str) -> Result<SpeechAudio, SpeechError>;
    fn transcribe(&self, session_id: Uuid, audio: &[u8]) -> Result<String, SpeechError>;
    fn cancel(&self, session_id: Uuid);
}

/// No-op transducer for text-only deployments.
pub struct NullSpeech;

impl SpeechTransducer for NullSpeech {
    fn synthesize(&self, _session_id: Uuid, _text: &str) -> Result<SpeechAudio, SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn transcribe(&self, _session_id: Uuid, _audio: &[u8]) -> Result<String, SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn cancel(&self, _session_id: Uuid) {}
}

/// Test double that echoes text through as audio bytes.
pub struct MockSpeech;

impl SpeechTransducer for MockSpeech {
    fn synthesize(&self, _session_id: Uuid, text: &str) -> Result<SpeechAudio, SpeechError> {
        Ok(SpeechAudio {
            mime_type: "audio/mpeg".to_string(),
            data: text.as_bytes().to_vec(),
        })
    }

    fn transcribe(&self, _session_id: Uuid, audio: &[u8]) -> Result<String, SpeechError> {
        String::from_utf8(audio.to_vec()).map_err(|e| SpeechError::Transcription(e.to_string()))
    }

    fn cancel(&self, _session_id: Uuid) {}
}
