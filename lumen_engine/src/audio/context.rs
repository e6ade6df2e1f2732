//! Output device and current audio context.

use crate::device::{check_audio, refused, AudioDevice, NativeHandle, Rollback};
use crate::error::Result;
use crate::engine_bail;

const SOURCE: &str = "lumen::AudioContext";

fn release_device<D: AudioDevice + ?Sized>(device: &mut D, handle: NativeHandle) {
    if !device.close_device(handle) {
        let _ = check_audio(device, "close_device");
        crate::engine_warn!(SOURCE, "Output device {} could not be closed", handle);
    }
}

fn release_context<D: AudioDevice + ?Sized>(device: &mut D, context: NativeHandle) {
    device.destroy_context(context);
    let _ = check_audio(device, "destroy_context");
}

/// The default output device with one context made current on it
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AudioContext {
    device: NativeHandle,
    context: NativeHandle,
}

impl AudioContext {
    /// Open the default device, create a context and make it current.
    ///
    /// On failure everything opened so far is released in reverse order.
    pub fn create<D: AudioDevice + ?Sized>(device: &mut D) -> Result<Self> {
        let mut rollback = Rollback::new(device);

        let output = rollback.device().open_device();
        rollback.defer(output, release_device::<D>);
        check_audio(rollback.device(), "open_device")?;
        if output.is_none() {
            engine_bail!(SOURCE, InitializationFailed, "open_device: no output device");
        }

        let context = rollback.device().create_context(output);
        rollback.defer(context, release_context::<D>);
        check_audio(rollback.device(), "create_context")?;
        if context.is_none() {
            engine_bail!(SOURCE, InitializationFailed, "create_context: no context for device {}", output);
        }

        let current = rollback.device().make_context_current(context);
        check_audio(rollback.device(), "make_context_current")?;
        if !current {
            engine_bail!(SOURCE, InitializationFailed, "make_context_current: context {} refused", context);
        }
        rollback.commit();

        crate::engine_info!(SOURCE, "Audio context {} current on device {}", context, output);
        Ok(Self {
            device: output,
            context,
        })
    }

    /// Output device handle
    pub fn device(&self) -> NativeHandle {
        self.device
    }

    pub fn context(&self) -> NativeHandle {
        self.context
    }

    pub fn is_valid(&self) -> bool {
        self.device.is_some() && self.context.is_some()
    }

    /// Clear the current context, destroy it and close the device.
    ///
    /// Each handle is zeroed once its release succeeded, so a failed
    /// teardown can be retried.
    pub fn destroy<D: AudioDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        if self.device.is_none() && self.context.is_none() {
            return Ok(());
        }

        if !device.make_context_current(NativeHandle::NONE) {
            check_audio(device, "make_context_current")?;
            return Err(refused(SOURCE, "make_context_current"));
        }

        if self.context.is_some() {
            device.destroy_context(self.context);
            check_audio(device, "destroy_context")?;
            self.context = NativeHandle::NONE;
        }

        if self.device.is_some() {
            if !device.close_device(self.device) {
                check_audio(device, "close_device")?;
                return Err(refused(SOURCE, "close_device"));
            }
            self.device = NativeHandle::NONE;
        }

        crate::engine_debug!(SOURCE, "Audio context released");
        Ok(())
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
