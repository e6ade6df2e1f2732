//! Playback voices.
//!
//! A source is created bound to one buffer. Teardown is ordered: stop,
//! detach the buffer, delete. If a step fails the later ones are not
//! attempted and the source keeps its handle.

use glam::Vec3;
use crate::audio::AudioBuffer;
use crate::device::{check_audio, null_handle, AudioDevice, NativeHandle, Rollback};
use crate::error::Result;
use crate::engine_bail;

const SOURCE: &str = "lumen::AudioSource";

/// Upper bound accepted by `set_time`, in seconds
pub const MAX_TIME_OFFSET: f32 = 100.0;

fn release_source<D: AudioDevice + ?Sized>(device: &mut D, source: NativeHandle) {
    device.delete_source(source);
    let _ = check_audio(device, "delete_source");
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct AudioSource {
    handle: NativeHandle,
}

impl AudioSource {
    /// Allocate a source and attach `buffer`.
    ///
    /// An empty buffer is refused before any native call.
    pub fn create<D: AudioDevice + ?Sized>(device: &mut D, buffer: &AudioBuffer) -> Result<Self> {
        if !buffer.is_valid() {
            engine_bail!(SOURCE, InvalidResource, "Cannot create a source for an empty buffer");
        }

        let mut rollback = Rollback::new(device);
        let handle = rollback.device().create_source();
        rollback.defer(handle, release_source::<D>);

        let device = rollback.device();
        check_audio(device, "create_source")?;
        if handle.is_none() {
            return Err(null_handle(SOURCE, "create_source"));
        }

        device.source_buffer(handle, buffer.handle());
        check_audio(device, "source_buffer")?;
        rollback.commit();

        crate::engine_debug!(SOURCE, "Source {} bound to buffer {}", handle, buffer.handle());
        Ok(Self { handle })
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_some()
    }

    pub fn play<D: AudioDevice + ?Sized>(&self, device: &mut D) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }
        device.source_play(self.handle);
        check_audio(device, "source_play")
    }

    pub fn stop<D: AudioDevice + ?Sized>(&self, device: &mut D) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }
        device.source_stop(self.handle);
        check_audio(device, "source_stop")
    }

    pub fn pause<D: AudioDevice + ?Sized>(&self, device: &mut D) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }
        device.source_pause(self.handle);
        check_audio(device, "source_pause")
    }

    pub fn rewind<D: AudioDevice + ?Sized>(&self, device: &mut D) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }
        device.source_rewind(self.handle);
        check_audio(device, "source_rewind")
    }

    pub fn set_position<D: AudioDevice + ?Sized>(&self, device: &mut D, position: Vec3) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }
        device.source_position(self.handle, position);
        check_audio(device, "source_position")
    }

    /// Seek to `seconds`, clamped to `[f32::MIN_POSITIVE, MAX_TIME_OFFSET]`
    pub fn set_time<D: AudioDevice + ?Sized>(&self, device: &mut D, seconds: f32) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }
        device.source_offset(self.handle, clamp_time(seconds));
        check_audio(device, "source_offset")
    }

    /// Stop, detach and delete the source. Calling it again is a no-op.
    pub fn destroy<D: AudioDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }

        device.source_stop(self.handle);
        if let Err(e) = check_audio(device, "source_stop") {
            crate::engine_warn!(SOURCE, "Source {} kept: stop failed", self.handle);
            return Err(e);
        }

        device.source_buffer(self.handle, NativeHandle::NONE);
        if let Err(e) = check_audio(device, "source_buffer") {
            crate::engine_warn!(SOURCE, "Source {} kept: buffer detach failed", self.handle);
            return Err(e);
        }

        device.delete_source(self.handle);
        check_audio(device, "delete_source")?;
        self.handle = NativeHandle::NONE;
        Ok(())
    }
}

/// NaN falls to the lower bound
pub(crate) fn clamp_time(seconds: f32) -> f32 {
    if !(seconds >= f32::MIN_POSITIVE) {
        f32::MIN_POSITIVE
    } else if seconds > MAX_TIME_OFFSET {
        MAX_TIME_OFFSET
    } else {
        seconds
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
