//! Audio resources
//!
//! Decoding (`DecodedAudio`), upload (`AudioBuffer`), playback
//! (`AudioSource`), the output context and microphone capture.

pub mod format;
pub mod decoder;
pub mod buffer;
pub mod source;
pub mod context;
pub mod capture;

pub use format::{format_for_channels, AudioFormat};
pub use decoder::{AudioContainer, DecodedAudio};
pub use buffer::AudioBuffer;
pub use source::{AudioSource, MAX_TIME_OFFSET};
pub use context::AudioContext;
pub use capture::{record, Recording};
