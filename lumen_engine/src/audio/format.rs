//! Channel count to native PCM format.

use crate::device::{check_audio, AudioDevice};

/// Native 16-bit PCM format enumerator; 0 is "unsupported"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AudioFormat(i32);

impl AudioFormat {
    pub const UNSUPPORTED: AudioFormat = AudioFormat(0);
    pub const MONO16: AudioFormat = AudioFormat(0x1101);
    pub const STEREO16: AudioFormat = AudioFormat(0x1103);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> i32 {
        self.0
    }

    pub fn is_supported(self) -> bool {
        self.0 != 0
    }
}

/// Format for interleaved 16-bit PCM with `channels` channels.
///
/// Mono and stereo are fixed; 4, 6, 7 and 8 channels are looked up on the
/// device by name because not every backend has them. Anything else, or a
/// lookup that fails or answers -1, gives `UNSUPPORTED`.
pub fn format_for_channels<D: AudioDevice + ?Sized>(device: &mut D, channels: u16) -> AudioFormat {
    let name = match channels {
        1 => return AudioFormat::MONO16,
        2 => return AudioFormat::STEREO16,
        4 => "AL_FORMAT_QUAD16",
        6 => "AL_FORMAT_51CHN16",
        7 => "AL_FORMAT_61CHN16",
        8 => "AL_FORMAT_71CHN16",
        _ => return AudioFormat::UNSUPPORTED,
    };

    let raw = device.enum_value(name);
    if check_audio(device, "enum_value").is_err() || raw == -1 {
        return AudioFormat::UNSUPPORTED;
    }
    AudioFormat(raw)
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
