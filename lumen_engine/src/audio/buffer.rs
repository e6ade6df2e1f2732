//! Native audio buffers filled with decoded PCM.

use std::path::Path;
use crate::audio::{format_for_channels, DecodedAudio};
use crate::device::{check_audio, null_handle, AudioDevice, BufferProperty, NativeHandle, Rollback};
use crate::error::Result;
use crate::engine_bail;

const SOURCE: &str = "lumen::AudioBuffer";

pub(crate) fn release_buffer<D: AudioDevice + ?Sized>(device: &mut D, buffer: NativeHandle) {
    device.delete_buffer(buffer);
    let _ = check_audio(device, "delete_buffer");
}

/// Owner of one native audio buffer
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AudioBuffer {
    handle: NativeHandle,
}

impl AudioBuffer {
    /// Decode `path` and upload it.
    ///
    /// Decoding happens first; nothing native is touched if it fails.
    pub fn create<D: AudioDevice + ?Sized>(device: &mut D, path: impl AsRef<Path>) -> Result<Self> {
        let audio = DecodedAudio::open(path)?;
        Self::from_pcm(device, &audio)
    }

    /// Upload decoded PCM.
    ///
    /// A channel count with no native format is refused before any buffer
    /// is allocated.
    pub fn from_pcm<D: AudioDevice + ?Sized>(device: &mut D, audio: &DecodedAudio) -> Result<Self> {
        let format = format_for_channels(device, audio.channels());
        if !format.is_supported() {
            engine_bail!(
                SOURCE,
                Unsupported,
                "No native format for {} channels",
                audio.channels()
            );
        }

        let mut rollback = Rollback::new(device);
        let handle = rollback.device().create_buffer();
        rollback.defer(handle, release_buffer::<D>);

        let device = rollback.device();
        check_audio(device, "create_buffer")?;
        if handle.is_none() {
            return Err(null_handle(SOURCE, "create_buffer"));
        }

        device.buffer_data(handle, format, audio.samples(), audio.sample_rate());
        check_audio(device, "buffer_data")?;
        rollback.commit();

        crate::engine_debug!(
            SOURCE,
            "Audio buffer {} uploaded ({} channels, {} Hz, {} frames)",
            handle,
            audio.channels(),
            audio.sample_rate(),
            audio.frame_count()
        );
        Ok(Self { handle })
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_some()
    }

    /// Sample rate in Hz
    pub fn frequency<D: AudioDevice + ?Sized>(&self, device: &mut D) -> i32 {
        self.property(device, BufferProperty::Frequency)
    }

    pub fn bits<D: AudioDevice + ?Sized>(&self, device: &mut D) -> i32 {
        self.property(device, BufferProperty::Bits)
    }

    pub fn channel_count<D: AudioDevice + ?Sized>(&self, device: &mut D) -> i32 {
        self.property(device, BufferProperty::Channels)
    }

    /// PCM size in bytes
    pub fn size<D: AudioDevice + ?Sized>(&self, device: &mut D) -> i32 {
        self.property(device, BufferProperty::Size)
    }

    /// Playback length in seconds, or `f32::MIN_POSITIVE` when any of the
    /// four properties reads as 0
    pub fn duration_seconds<D: AudioDevice + ?Sized>(&self, device: &mut D) -> f32 {
        let frequency = self.frequency(device);
        let bits = self.bits(device);
        let channels = self.channel_count(device);
        let size = self.size(device);

        let bytes_per_second = frequency as f32 * channels as f32 * (bits / 8) as f32;
        if frequency == 0 || bits == 0 || channels == 0 || size == 0 || bytes_per_second == 0.0 {
            return f32::MIN_POSITIVE;
        }
        size as f32 / bytes_per_second
    }

    fn property<D: AudioDevice + ?Sized>(&self, device: &mut D, property: BufferProperty) -> i32 {
        if self.handle.is_none() {
            return 0;
        }
        let value = device.buffer_property(self.handle, property);
        match check_audio(device, "buffer_property") {
            Ok(()) => value,
            Err(_) => 0,
        }
    }

    /// Release the native buffer. Fails while a source still holds it.
    pub fn destroy<D: AudioDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }
        device.delete_buffer(self.handle);
        check_audio(device, "delete_buffer")?;
        self.handle = NativeHandle::NONE;
        Ok(())
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
