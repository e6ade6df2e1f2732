//! Microphone recording into a playable buffer.
//!
//! The capture device is polled until the configured duration worth of
//! mono samples has been read or the poll budget runs out, whichever
//! comes first. Polls that find nothing sleep for `poll_interval`.

use std::thread;
use crate::audio::{AudioBuffer, AudioFormat, AudioSource, DecodedAudio};
use crate::config::CaptureConfig;
use crate::device::{check_audio, null_handle, AudioDevice, NativeHandle, Rollback};
use crate::error::Result;

const SOURCE: &str = "lumen::AudioCapture";

/// Stop and close a capture device
fn release_capture<D: AudioDevice + ?Sized>(device: &mut D, capture: NativeHandle) {
    device.capture_stop(capture);
    let _ = check_audio(device, "capture_stop");
    if !device.capture_close(capture) {
        let _ = check_audio(device, "capture_close");
        crate::engine_warn!(SOURCE, "Capture device {} could not be closed", capture);
    }
}

/// A finished recording, ready to play
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Recording {
    buffer: AudioBuffer,
    source: AudioSource,
}

impl Recording {
    pub fn buffer(&self) -> &AudioBuffer {
        &self.buffer
    }

    pub fn source(&self) -> &AudioSource {
        &self.source
    }

    /// Release the source, then the buffer it holds
    pub fn destroy<D: AudioDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        self.source.destroy(device)?;
        self.buffer.destroy(device)
    }
}

/// Record `config.duration` of mono 16-bit audio from the default capture
/// device.
///
/// The capture device is closed before the samples are uploaded, on every
/// path. If the poll budget runs out first, the samples read so far are
/// kept.
pub fn record<D: AudioDevice + ?Sized>(device: &mut D, config: &CaptureConfig) -> Result<Recording> {
    let samples = capture_samples(device, config)?;
    let audio = DecodedAudio::from_pcm(samples, 1, config.sample_rate)?;

    let mut buffer = AudioBuffer::from_pcm(device, &audio)?;
    let source = match AudioSource::create(device, &buffer) {
        Ok(source) => source,
        Err(e) => {
            let _ = buffer.destroy(device);
            return Err(e);
        }
    };

    crate::engine_info!(
        SOURCE,
        "Recorded {} samples at {} Hz into buffer {}",
        audio.frame_count(),
        config.sample_rate,
        buffer.handle()
    );
    Ok(Recording { buffer, source })
}

fn capture_samples<D: AudioDevice + ?Sized>(device: &mut D, config: &CaptureConfig) -> Result<Vec<i16>> {
    let target = config.target_samples();

    // Never committed: the capture device is released on every path
    let mut guard = Rollback::new(device);
    let capture = guard
        .device()
        .capture_open(config.sample_rate, AudioFormat::MONO16, config.device_buffer_samples);
    guard.defer(capture, release_capture::<D>);

    let device = guard.device();
    check_audio(device, "capture_open")?;
    if capture.is_none() {
        return Err(null_handle(SOURCE, "capture_open"));
    }

    device.capture_start(capture);
    check_audio(device, "capture_start")?;

    let mut samples = vec![0i16; target];
    let mut collected = 0;
    let mut polls = 0;
    while collected < target && polls < config.max_polls {
        polls += 1;

        let available = device.capture_available(capture);
        check_audio(device, "capture_available")?;
        if available == 0 {
            thread::sleep(config.poll_interval);
            continue;
        }

        let count = available.min(target - collected);
        device.capture_read(capture, &mut samples[collected..collected + count]);
        check_audio(device, "capture_read")?;
        collected += count;
    }

    if collected < target {
        crate::engine_warn!(
            SOURCE,
            "Poll budget of {} exhausted after {} of {} samples",
            config.max_polls,
            collected,
            target
        );
        samples.truncate(collected);
    }
    Ok(samples)
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
