//! AL-like audio capability surface.
//!
//! Same contract as the graphics surface: calls never fail directly,
//! failures are queued and drained with `take_error`.

use std::fmt;
use glam::Vec3;
use crate::audio::AudioFormat;
use crate::device::NativeHandle;
use crate::error::{Error, NativeError, Result};

/// Audio error-queue codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioErrorCode {
    InvalidName,
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    OutOfMemory,
    InvalidDevice,
    InvalidContext,
    Unknown(i32),
}

impl AudioErrorCode {
    pub fn name(&self) -> &'static str {
        match self {
            AudioErrorCode::InvalidName => "AL_INVALID_NAME",
            AudioErrorCode::InvalidEnum => "AL_INVALID_ENUM",
            AudioErrorCode::InvalidValue => "AL_INVALID_VALUE",
            AudioErrorCode::InvalidOperation => "AL_INVALID_OPERATION",
            AudioErrorCode::OutOfMemory => "AL_OUT_OF_MEMORY",
            AudioErrorCode::InvalidDevice => "ALC_INVALID_DEVICE",
            AudioErrorCode::InvalidContext => "ALC_INVALID_CONTEXT",
            AudioErrorCode::Unknown(_) => "AL_UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for AudioErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioErrorCode::Unknown(code) => write!(f, "{} (0x{:04X})", self.name(), code),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Integer properties readable from an audio buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferProperty {
    /// Sample rate in Hz
    Frequency,
    /// Bits per sample
    Bits,
    Channels,
    /// Size of the PCM data in bytes
    Size,
}

pub trait AudioDevice {
    /// Pop the oldest pending error code, if any
    fn take_error(&mut self) -> Option<AudioErrorCode>;

    // ===== Device and context =====

    /// Open the default output device; `NONE` on failure
    fn open_device(&mut self) -> NativeHandle;
    fn create_context(&mut self, device: NativeHandle) -> NativeHandle;
    /// Make `context` current; `NONE` clears. Returns false on failure
    fn make_context_current(&mut self, context: NativeHandle) -> bool;
    fn destroy_context(&mut self, context: NativeHandle);
    fn close_device(&mut self, device: NativeHandle) -> bool;
    /// Runtime lookup of a named enumerator; 0 or -1 when unknown
    fn enum_value(&mut self, name: &str) -> i32;

    // ===== Buffers =====

    fn create_buffer(&mut self) -> NativeHandle;
    /// Upload interleaved signed 16-bit PCM
    fn buffer_data(&mut self, buffer: NativeHandle, format: AudioFormat, samples: &[i16], sample_rate: u32);
    fn buffer_property(&mut self, buffer: NativeHandle, property: BufferProperty) -> i32;
    fn delete_buffer(&mut self, buffer: NativeHandle);

    // ===== Sources =====

    fn create_source(&mut self) -> NativeHandle;
    /// Attach `buffer` to `source`; `NONE` detaches
    fn source_buffer(&mut self, source: NativeHandle, buffer: NativeHandle);
    fn source_position(&mut self, source: NativeHandle, position: Vec3);
    /// Playback position in seconds
    fn source_offset(&mut self, source: NativeHandle, seconds: f32);
    fn source_play(&mut self, source: NativeHandle);
    fn source_stop(&mut self, source: NativeHandle);
    fn source_pause(&mut self, source: NativeHandle);
    fn source_rewind(&mut self, source: NativeHandle);
    fn delete_source(&mut self, source: NativeHandle);

    // ===== Capture =====

    /// Open the default capture device; `NONE` on failure
    fn capture_open(&mut self, sample_rate: u32, format: AudioFormat, buffer_samples: usize) -> NativeHandle;
    fn capture_start(&mut self, device: NativeHandle);
    /// Number of sample frames ready to read
    fn capture_available(&mut self, device: NativeHandle) -> usize;
    /// Fill `samples` from the capture queue
    fn capture_read(&mut self, device: NativeHandle, samples: &mut [i16]);
    fn capture_stop(&mut self, device: NativeHandle);
    fn capture_close(&mut self, device: NativeHandle) -> bool;
}

/// Drain one error code after `call`, logging `"<call>: <CODE>"` on failure
pub fn check_audio<D: AudioDevice + ?Sized>(device: &mut D, call: &'static str) -> Result<()> {
    match device.take_error() {
        None => Ok(()),
        Some(code) => {
            crate::engine_error!("lumen::AudioDevice", "{}: {}", call, code);
            Err(Error::Native {
                call,
                code: NativeError::Audio(code),
            })
        }
    }
}
