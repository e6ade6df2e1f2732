/*!
# Lumen Engine

Thin resource and audio layer over a GL-like graphics device and an
AL-like audio device.

The engine decodes assets (images, animated GIFs, glTF scenes, shader
sources, wav/flac/mp3/ogg audio), uploads them through the device
traits and hands back small handle-owning values. Every multi-step
acquisition either completes or releases everything it acquired.

## Architecture

- **GraphicsDevice / AudioDevice**: native capability surfaces with error queues
- **Texture / AnimatedTexture / Shader / Program / Mesh**: graphics resources
- **AudioBuffer / AudioSource / AudioContext**: audio resources
- **Object**: program + textures + mesh + transform
- **Camera**: projection and view matrices

The window, the native libraries and the frame loop belong to the caller.
*/

// Internal modules
mod error;
mod engine;
mod config;
pub mod log;
pub mod device;
pub mod camera;
pub mod resource;
pub mod audio;
pub mod object;

// Main lumen namespace module
pub mod lumen {
    // Error types
    pub use crate::error::{Error, NativeError, Result};

    // Engine context
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::{CaptureConfig, EngineConfig};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger, MemoryLogger};
    }

    // Native capability surfaces
    pub mod device {
        pub use crate::device::*;
    }

    // Graphics resources
    pub mod resource {
        pub use crate::resource::*;
    }

    // Audio resources
    pub mod audio {
        pub use crate::audio::*;
    }

    pub use crate::camera::Camera;
    pub use crate::object::{Object, ObjectDesc};
}

// Re-export math library at crate root
pub use glam;
