//! Mock audio device for unit tests (no sound hardware required)
//!
//! Follows the strict native rules the engine depends on: a buffer
//! attached to a source cannot be deleted or refilled, a playing source
//! cannot change its buffer, unknown formats are rejected without storing
//! anything. The capture device replays `capture_input`.

use std::collections::VecDeque;
use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::audio::AudioFormat;
use crate::device::{AudioDevice, AudioErrorCode, BufferProperty, NativeHandle};

pub const FORMAT_QUAD16: i32 = 0x1205;
pub const FORMAT_51CHN16: i32 = 0x120B;
pub const FORMAT_61CHN16: i32 = 0x120E;
pub const FORMAT_71CHN16: i32 = 0x1211;

// ============================================================================
// Mock objects
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MockAudioBuffer {
    pub format: AudioFormat,
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceState {
    #[default]
    Initial,
    Playing,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, Default)]
pub struct MockSource {
    pub buffer: NativeHandle,
    pub state: SourceState,
    pub position: Vec3,
    pub offset: f32,
}

#[derive(Debug, Clone, Default)]
pub struct MockCapture {
    pub sample_rate: u32,
    pub format: AudioFormat,
    pub buffer_samples: usize,
    pub started: bool,
    ready: usize,
}

#[derive(Debug, Clone)]
struct MockFault {
    call: &'static str,
    nth: usize,
    code: AudioErrorCode,
}

// ============================================================================
// Mock AudioDevice
// ============================================================================

#[derive(Debug, Default)]
pub struct MockAudioDevice {
    next_handle: u32,
    pub output_devices: FxHashSet<NativeHandle>,
    /// context -> owning output device
    pub contexts: FxHashMap<NativeHandle, NativeHandle>,
    pub current_context: NativeHandle,
    pub buffers: FxHashMap<NativeHandle, MockAudioBuffer>,
    pub sources: FxHashMap<NativeHandle, MockSource>,
    pub captures: FxHashMap<NativeHandle, MockCapture>,

    /// Samples the capture device produces, in order
    pub capture_input: VecDeque<i16>,
    /// Samples that become ready per `capture_available` poll
    pub capture_chunk: usize,
    /// Enumerators returned by `enum_value`
    pub enums: FxHashMap<String, i32>,

    pub calls: Vec<String>,
    errors: VecDeque<AudioErrorCode>,
    faults: Vec<MockFault>,
    call_counts: FxHashMap<&'static str, usize>,
}

impl MockAudioDevice {
    pub fn new() -> Self {
        let mut enums = FxHashMap::default();
        enums.insert("AL_FORMAT_QUAD16".to_string(), FORMAT_QUAD16);
        enums.insert("AL_FORMAT_51CHN16".to_string(), FORMAT_51CHN16);
        enums.insert("AL_FORMAT_61CHN16".to_string(), FORMAT_61CHN16);
        enums.insert("AL_FORMAT_71CHN16".to_string(), FORMAT_71CHN16);
        Self {
            enums,
            capture_chunk: 256,
            ..Self::default()
        }
    }

    /// Make the `nth` (1-based) invocation of `call` fail with `code`
    pub fn fail_call(&mut self, call: &'static str, nth: usize, code: AudioErrorCode) {
        self.faults.push(MockFault { call, nth, code });
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.call_counts.get(call).copied().unwrap_or(0)
    }

    /// Live buffers, sources, contexts, output and capture devices
    pub fn live_handles(&self) -> usize {
        self.output_devices.len()
            + self.contexts.len()
            + self.buffers.len()
            + self.sources.len()
            + self.captures.len()
    }

    pub fn pending_errors(&self) -> usize {
        self.errors.len()
    }

    fn enter(&mut self, call: &'static str, detail: String) -> bool {
        if detail.is_empty() {
            self.calls.push(call.to_string());
        } else {
            self.calls.push(format!("{} {}", call, detail));
        }

        let count = self.call_counts.entry(call).or_insert(0);
        *count += 1;
        let count = *count;

        if let Some(fault) = self.faults.iter().find(|f| f.call == call && f.nth == count) {
            let code = fault.code;
            self.errors.push_back(code);
            return true;
        }
        false
    }

    fn raise(&mut self, code: AudioErrorCode) {
        self.errors.push_back(code);
    }

    fn allocate(&mut self) -> NativeHandle {
        self.next_handle += 1;
        NativeHandle::new(self.next_handle)
    }

    fn channels_of(format: AudioFormat) -> Option<u32> {
        match format.raw() {
            raw if raw == AudioFormat::MONO16.raw() => Some(1),
            raw if raw == AudioFormat::STEREO16.raw() => Some(2),
            FORMAT_QUAD16 => Some(4),
            FORMAT_51CHN16 => Some(6),
            FORMAT_61CHN16 => Some(7),
            FORMAT_71CHN16 => Some(8),
            _ => None,
        }
    }

    fn buffer_in_use(&self, buffer: NativeHandle) -> bool {
        self.sources.values().any(|source| source.buffer == buffer)
    }

    fn set_state(&mut self, source: NativeHandle, state: SourceState) {
        match self.sources.get_mut(&source) {
            Some(mock) => mock.state = state,
            None => self.raise(AudioErrorCode::InvalidName),
        }
    }
}

impl AudioDevice for MockAudioDevice {
    fn take_error(&mut self) -> Option<AudioErrorCode> {
        self.errors.pop_front()
    }

    // ===== Device and context =====

    fn open_device(&mut self) -> NativeHandle {
        if self.enter("open_device", String::new()) {
            return NativeHandle::NONE;
        }
        let handle = self.allocate();
        self.output_devices.insert(handle);
        handle
    }

    fn create_context(&mut self, device: NativeHandle) -> NativeHandle {
        if self.enter("create_context", device.to_string()) {
            return NativeHandle::NONE;
        }
        if !self.output_devices.contains(&device) {
            self.raise(AudioErrorCode::InvalidDevice);
            return NativeHandle::NONE;
        }
        let handle = self.allocate();
        self.contexts.insert(handle, device);
        handle
    }

    fn make_context_current(&mut self, context: NativeHandle) -> bool {
        if self.enter("make_context_current", context.to_string()) {
            return false;
        }
        if context.is_some() && !self.contexts.contains_key(&context) {
            self.raise(AudioErrorCode::InvalidContext);
            return false;
        }
        self.current_context = context;
        true
    }

    fn destroy_context(&mut self, context: NativeHandle) {
        if self.enter("destroy_context", context.to_string()) {
            return;
        }
        if !self.contexts.contains_key(&context) || self.current_context == context {
            self.raise(AudioErrorCode::InvalidContext);
            return;
        }
        self.contexts.remove(&context);
    }

    fn close_device(&mut self, device: NativeHandle) -> bool {
        if self.enter("close_device", device.to_string()) {
            return false;
        }
        if !self.output_devices.contains(&device) {
            self.raise(AudioErrorCode::InvalidDevice);
            return false;
        }
        if self.contexts.values().any(|owner| *owner == device) {
            return false;
        }
        self.output_devices.remove(&device);
        true
    }

    fn enum_value(&mut self, name: &str) -> i32 {
        if self.enter("enum_value", name.to_string()) {
            return 0;
        }
        self.enums.get(name).copied().unwrap_or(0)
    }

    // ===== Buffers =====

    fn create_buffer(&mut self) -> NativeHandle {
        if self.enter("create_buffer", String::new()) {
            return NativeHandle::NONE;
        }
        let handle = self.allocate();
        self.buffers.insert(handle, MockAudioBuffer::default());
        handle
    }

    fn buffer_data(&mut self, buffer: NativeHandle, format: AudioFormat, samples: &[i16], sample_rate: u32) {
        if self.enter("buffer_data", format!("{} 0x{:04X} {} samples", buffer, format.raw(), samples.len())) {
            return;
        }
        if !self.buffers.contains_key(&buffer) {
            self.raise(AudioErrorCode::InvalidName);
            return;
        }
        let Some(channels) = Self::channels_of(format) else {
            self.raise(AudioErrorCode::InvalidEnum);
            return;
        };
        if sample_rate == 0 || samples.len() % channels as usize != 0 {
            self.raise(AudioErrorCode::InvalidValue);
            return;
        }
        if self.buffer_in_use(buffer) {
            self.raise(AudioErrorCode::InvalidOperation);
            return;
        }
        if let Some(mock) = self.buffers.get_mut(&buffer) {
            *mock = MockAudioBuffer {
                format,
                samples: samples.to_vec(),
                sample_rate,
                channels,
            };
        }
    }

    fn buffer_property(&mut self, buffer: NativeHandle, property: BufferProperty) -> i32 {
        if self.enter("buffer_property", format!("{} {:?}", buffer, property)) {
            return 0;
        }
        let Some(mock) = self.buffers.get(&buffer) else {
            self.raise(AudioErrorCode::InvalidName);
            return 0;
        };
        match property {
            BufferProperty::Frequency => mock.sample_rate as i32,
            BufferProperty::Bits => 16,
            BufferProperty::Channels => mock.channels.max(1) as i32,
            BufferProperty::Size => (mock.samples.len() * 2) as i32,
        }
    }

    fn delete_buffer(&mut self, buffer: NativeHandle) {
        if self.enter("delete_buffer", buffer.to_string()) {
            return;
        }
        if !self.buffers.contains_key(&buffer) {
            self.raise(AudioErrorCode::InvalidName);
            return;
        }
        if self.buffer_in_use(buffer) {
            self.raise(AudioErrorCode::InvalidOperation);
            return;
        }
        self.buffers.remove(&buffer);
    }

    // ===== Sources =====

    fn create_source(&mut self) -> NativeHandle {
        if self.enter("create_source", String::new()) {
            return NativeHandle::NONE;
        }
        let handle = self.allocate();
        self.sources.insert(handle, MockSource::default());
        handle
    }

    fn source_buffer(&mut self, source: NativeHandle, buffer: NativeHandle) {
        if self.enter("source_buffer", format!("{} {}", source, buffer)) {
            return;
        }
        if buffer.is_some() && !self.buffers.contains_key(&buffer) {
            self.raise(AudioErrorCode::InvalidValue);
            return;
        }
        let code = match self.sources.get_mut(&source) {
            None => Some(AudioErrorCode::InvalidName),
            Some(mock) if matches!(mock.state, SourceState::Playing | SourceState::Paused) => {
                Some(AudioErrorCode::InvalidOperation)
            }
            Some(mock) => {
                mock.buffer = buffer;
                mock.state = SourceState::Initial;
                mock.offset = 0.0;
                None
            }
        };
        if let Some(code) = code {
            self.raise(code);
        }
    }

    fn source_position(&mut self, source: NativeHandle, position: Vec3) {
        if self.enter("source_position", format!("{} {}", source, position)) {
            return;
        }
        match self.sources.get_mut(&source) {
            Some(mock) => mock.position = position,
            None => self.raise(AudioErrorCode::InvalidName),
        }
    }

    fn source_offset(&mut self, source: NativeHandle, seconds: f32) {
        if self.enter("source_offset", format!("{} {}", source, seconds)) {
            return;
        }
        if !(seconds >= 0.0) {
            self.raise(AudioErrorCode::InvalidValue);
            return;
        }
        match self.sources.get_mut(&source) {
            Some(mock) => mock.offset = seconds,
            None => self.raise(AudioErrorCode::InvalidName),
        }
    }

    fn source_play(&mut self, source: NativeHandle) {
        if self.enter("source_play", source.to_string()) {
            return;
        }
        self.set_state(source, SourceState::Playing);
    }

    fn source_stop(&mut self, source: NativeHandle) {
        if self.enter("source_stop", source.to_string()) {
            return;
        }
        self.set_state(source, SourceState::Stopped);
    }

    fn source_pause(&mut self, source: NativeHandle) {
        if self.enter("source_pause", source.to_string()) {
            return;
        }
        self.set_state(source, SourceState::Paused);
    }

    fn source_rewind(&mut self, source: NativeHandle) {
        if self.enter("source_rewind", source.to_string()) {
            return;
        }
        self.set_state(source, SourceState::Initial);
        if let Some(mock) = self.sources.get_mut(&source) {
            mock.offset = 0.0;
        }
    }

    fn delete_source(&mut self, source: NativeHandle) {
        if self.enter("delete_source", source.to_string()) {
            return;
        }
        if self.sources.remove(&source).is_none() {
            self.raise(AudioErrorCode::InvalidName);
        }
    }

    // ===== Capture =====

    fn capture_open(&mut self, sample_rate: u32, format: AudioFormat, buffer_samples: usize) -> NativeHandle {
        if self.enter("capture_open", format!("{} 0x{:04X} {}", sample_rate, format.raw(), buffer_samples)) {
            return NativeHandle::NONE;
        }
        if Self::channels_of(format).is_none() || sample_rate == 0 || buffer_samples == 0 {
            self.raise(AudioErrorCode::InvalidValue);
            return NativeHandle::NONE;
        }
        let handle = self.allocate();
        self.captures.insert(
            handle,
            MockCapture {
                sample_rate,
                format,
                buffer_samples,
                started: false,
                ready: 0,
            },
        );
        handle
    }

    fn capture_start(&mut self, device: NativeHandle) {
        if self.enter("capture_start", device.to_string()) {
            return;
        }
        match self.captures.get_mut(&device) {
            Some(capture) => capture.started = true,
            None => self.raise(AudioErrorCode::InvalidDevice),
        }
    }

    fn capture_available(&mut self, device: NativeHandle) -> usize {
        if self.enter("capture_available", device.to_string()) {
            return 0;
        }
        let remaining = self.capture_input.len();
        let chunk = self.capture_chunk;
        match self.captures.get_mut(&device) {
            Some(capture) if capture.started => {
                capture.ready = (capture.ready + chunk).min(remaining);
                capture.ready
            }
            Some(capture) => capture.ready,
            None => {
                self.raise(AudioErrorCode::InvalidDevice);
                0
            }
        }
    }

    fn capture_read(&mut self, device: NativeHandle, samples: &mut [i16]) {
        if self.enter("capture_read", format!("{} {}", device, samples.len())) {
            return;
        }
        let code = match self.captures.get_mut(&device) {
            None => Some(AudioErrorCode::InvalidDevice),
            Some(capture) if samples.len() > capture.ready => Some(AudioErrorCode::InvalidValue),
            Some(capture) => {
                capture.ready -= samples.len();
                None
            }
        };
        if let Some(code) = code {
            self.raise(code);
            return;
        }
        for sample in samples.iter_mut() {
            *sample = self.capture_input.pop_front().unwrap_or(0);
        }
    }

    fn capture_stop(&mut self, device: NativeHandle) {
        if self.enter("capture_stop", device.to_string()) {
            return;
        }
        match self.captures.get_mut(&device) {
            Some(capture) => capture.started = false,
            None => self.raise(AudioErrorCode::InvalidDevice),
        }
    }

    fn capture_close(&mut self, device: NativeHandle) -> bool {
        if self.enter("capture_close", device.to_string()) {
            return false;
        }
        if self.captures.remove(&device).is_none() {
            self.raise(AudioErrorCode::InvalidDevice);
            return false;
        }
        true
    }
}

#[cfg(test)]
#[path = "mock_audio_device_tests.rs"]
mod tests;
