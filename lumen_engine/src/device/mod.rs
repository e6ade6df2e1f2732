//! Native capability surfaces.
//!
//! The engine never talks to a driver directly. Every native call goes
//! through `GraphicsDevice` or `AudioDevice`, and every mutating call is
//! followed by an error-queue check (`check_graphics` / `check_audio`).

pub mod handle;
pub mod graphics;
pub mod audio;
pub mod rollback;

#[cfg(test)]
pub mod mock_graphics_device;

#[cfg(test)]
pub mod mock_audio_device;

pub use handle::NativeHandle;
pub use graphics::{
    check_graphics, BufferTarget, GraphicsDevice, GraphicsErrorCode, PixelFormat, ShaderStage,
    TextureFilter, TextureParameter, TextureWrap,
};
pub use audio::{check_audio, AudioDevice, AudioErrorCode, BufferProperty};
pub use rollback::Rollback;

use crate::error::{Error, NativeError};

/// Error for a create call that returned `NONE` without queuing a code
pub(crate) fn null_handle(source: &str, call: &'static str) -> Error {
    crate::engine_error!(source, "{}: returned no handle", call);
    Error::Native {
        call,
        code: NativeError::NullHandle,
    }
}

/// Error for a call that reported failure through its return value only
pub(crate) fn refused(source: &str, call: &'static str) -> Error {
    crate::engine_error!(source, "{}: refused", call);
    Error::Native {
        call,
        code: NativeError::Refused,
    }
}
