//! Engine configuration
//!
//! Plain data with defaults and `with_*` builders. Nothing is read from
//! the environment or from files.

use std::time::Duration;
use crate::log::LogSeverity;

/// Microphone capture parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Capture rate in Hz (mono, 16-bit)
    pub sample_rate: u32,
    /// Size of the native capture ring, in samples
    pub device_buffer_samples: usize,
    /// Length of the recording
    pub duration: Duration,
    /// Sleep between polls that found no samples
    pub poll_interval: Duration,
    /// Upper bound on polls, whatever the device delivers
    pub max_polls: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            device_buffer_samples: 1024,
            duration: Duration::from_secs(5),
            poll_interval: Duration::from_millis(1),
            max_polls: 10_000,
        }
    }
}

impl CaptureConfig {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_polls(mut self, max_polls: usize) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Number of mono samples a full recording holds
    pub fn target_samples(&self) -> usize {
        (self.sample_rate as f64 * self.duration.as_secs_f64()).round() as usize
    }
}

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Shown in the startup log line
    pub app_name: String,
    /// Entries below this severity are dropped
    pub min_log_severity: LogSeverity,
    /// Byte capacity used when reading shader/program diagnostic logs
    pub info_log_capacity: usize,
    pub capture: CaptureConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_name: "lumen".to_string(),
            min_log_severity: LogSeverity::Info,
            info_log_capacity: 1024,
            capture: CaptureConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_min_log_severity(mut self, severity: LogSeverity) -> Self {
        self.min_log_severity = severity;
        self
    }

    pub fn with_info_log_capacity(mut self, capacity: usize) -> Self {
        self.info_log_capacity = capacity;
        self
    }

    pub fn with_capture(mut self, capture: CaptureConfig) -> Self {
        self.capture = capture;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
