//! Recording transcription adapters.

pub mod fixed;
pub mod whisper;

pub use fixed::StaticTranscriber;
pub use whisper::WhisperTranscriber;
