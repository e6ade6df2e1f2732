//! Error types for the Lumen engine
//!
//! Every fallible create/load operation returns `Result<T>`. The value on
//! success always carries a non-zero native handle; `Error` says which step
//! failed and, for native failures, which call and code.

use std::fmt;
use crate::device::{AudioErrorCode, GraphicsErrorCode, ShaderStage};

/// Result type for Lumen engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Code drained from a native error queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeError {
    Graphics(GraphicsErrorCode),
    Audio(AudioErrorCode),
    /// A create call returned no handle and queued no code
    NullHandle,
    /// A call returned false and queued no code
    Refused,
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeError::Graphics(code) => write!(f, "{}", code),
            NativeError::Audio(code) => write!(f, "{}", code),
            NativeError::NullHandle => write!(f, "no handle returned"),
            NativeError::Refused => write!(f, "call refused"),
        }
    }
}

/// Lumen engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Image, scene, audio or shader file could not be read or decoded
    DecodeFailed(String),

    /// A native call left an error code in its queue
    Native {
        call: &'static str,
        code: NativeError,
    },

    /// Shader compilation reported failure
    CompileFailed {
        stage: ShaderStage,
        log: String,
    },

    /// Program linking reported failure
    LinkFailed(String),

    /// Container, channel layout or encoding the engine cannot handle
    Unsupported(String),

    /// Operation on a resource that holds no native handle
    InvalidResource(String),

    /// Device or context bring-up failed
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DecodeFailed(msg) => write!(f, "Decode failed: {}", msg),
            Error::Native { call, code } => write!(f, "Native error in {}: {}", call, code),
            Error::CompileFailed { stage, log } => {
                write!(f, "Compilation of {} shader failed: {}", stage, log)
            }
            Error::LinkFailed(log) => write!(f, "Program link failed: {}", log),
            Error::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
