//! Lumen Engine - owner of the native devices
//!
//! The engine context is an explicit value: `Engine::initialize` takes the
//! graphics and audio devices, brings up the audio context and hands back
//! an `Engine` that owns them. Dropping the engine tears the context down.
//! Logging is the only process-wide state.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::audio::{AudioContext, Recording};
use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::device::{AudioDevice, GraphicsDevice};
use crate::error::Result;
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use crate::object::{Object, ObjectDesc};

// ===== INTERNAL STATE =====

struct LoggerState {
    logger: Box<dyn Logger>,
    min_severity: LogSeverity,
}

/// Global logger (initialized with DefaultLogger at Trace)
static LOGGER: OnceLock<RwLock<LoggerState>> = OnceLock::new();

fn logger_state() -> &'static RwLock<LoggerState> {
    LOGGER.get_or_init(|| {
        RwLock::new(LoggerState {
            logger: Box::new(DefaultLogger),
            min_severity: LogSeverity::Trace,
        })
    })
}

// ===== PUBLIC API =====

/// Engine context
///
/// # Example
///
/// ```ignore
/// let mut engine = Engine::initialize(EngineConfig::default(), graphics, audio)?;
///
/// let object = engine.create_object(&ObjectDesc::default()
///     .with_vertex_shader("shaders/basic.vert")
///     .with_fragment_shader("shaders/basic.frag")
///     .with_texture("textures/crate.png"))?;
///
/// engine.draw_object(&object, &Camera::new_3d())?;
/// ```
pub struct Engine {
    config: EngineConfig,
    graphics: Box<dyn GraphicsDevice>,
    audio: Box<dyn AudioDevice>,
    audio_context: AudioContext,
}

impl Engine {
    /// Take ownership of the devices and make an audio context current
    pub fn initialize(
        config: EngineConfig,
        graphics: Box<dyn GraphicsDevice>,
        mut audio: Box<dyn AudioDevice>,
    ) -> Result<Self> {
        Engine::set_min_severity(config.min_log_severity);

        let audio_context = AudioContext::create(audio.as_mut())?;

        crate::engine_info!("lumen::Engine", "'{}' initialized", config.app_name);

        Ok(Self {
            config,
            graphics,
            audio,
            audio_context,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graphics(&mut self) -> &mut dyn GraphicsDevice {
        self.graphics.as_mut()
    }

    pub fn audio(&mut self) -> &mut dyn AudioDevice {
        self.audio.as_mut()
    }

    pub fn audio_context(&self) -> &AudioContext {
        &self.audio_context
    }

    /// Load shaders, textures and mesh of an object
    pub fn create_object(&mut self, desc: &ObjectDesc) -> Result<Object> {
        Object::create(self.graphics.as_mut(), desc, self.config.info_log_capacity)
    }

    pub fn draw_object(&mut self, object: &Object, camera: &Camera) -> Result<()> {
        object.draw(self.graphics.as_mut(), camera)
    }

    /// Record from the default capture device with the configured settings
    pub fn record(&mut self) -> Result<Recording> {
        crate::audio::record(self.audio.as_mut(), &self.config.capture)
    }

    /// Tear down the audio context and release the devices
    pub fn shutdown(self) {
        crate::engine_info!("lumen::Engine", "'{}' shutting down", self.config.app_name);
    }

    // ===== LOGGING API =====

    /// Replace the global logger
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lumen_engine::lumen::{Engine, log::MemoryLogger};
    ///
    /// let logger = MemoryLogger::new();
    /// Engine::set_logger(logger.clone());
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut state) = logger_state().write() {
            state.logger = Box::new(logger);
        }
    }

    /// Restore `DefaultLogger` and the Trace threshold
    pub fn reset_logger() {
        if let Ok(mut state) = logger_state().write() {
            state.logger = Box::new(DefaultLogger);
            state.min_severity = LogSeverity::Trace;
        }
    }

    /// Drop entries below `severity`
    pub fn set_min_severity(severity: LogSeverity) {
        if let Ok(mut state) = logger_state().write() {
            state.min_severity = severity;
        }
    }

    pub fn min_severity() -> LogSeverity {
        match logger_state().read() {
            Ok(state) => state.min_severity,
            Err(_) => LogSeverity::Trace,
        }
    }

    /// Logging entry point of the engine_* macros (no file:line)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        });
    }

    /// Logging entry point of engine_error! (with file:line)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        });
    }

    fn dispatch(entry: LogEntry) {
        if let Ok(state) = logger_state().read() {
            if entry.severity >= state.min_severity {
                state.logger.log(&entry);
            }
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // Failures are already reported by the context itself
        let _ = self.audio_context.destroy(self.audio.as_mut());
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
