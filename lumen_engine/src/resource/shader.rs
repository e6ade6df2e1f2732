//! Shader stages compiled from source files.

use std::fs;
use std::path::Path;
use crate::device::{check_graphics, null_handle, GraphicsDevice, NativeHandle, Rollback, ShaderStage};
use crate::error::{Error, Result};
use crate::{engine_bail, engine_err};

const SOURCE: &str = "lumen::Shader";

pub(crate) fn release_shader<D: GraphicsDevice + ?Sized>(device: &mut D, shader: NativeHandle) {
    device.delete_shader(shader);
    let _ = check_graphics(device, "delete_shader");
}

/// One compiled shader stage
#[derive(Debug, PartialEq, Eq)]
pub struct Shader {
    handle: NativeHandle,
    stage: ShaderStage,
}

impl Shader {
    /// Read `path` and compile it as `stage`.
    ///
    /// An unreadable file fails before any native call. Compilation
    /// success is not checked here, see `check`.
    pub fn create<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        path: impl AsRef<Path>,
        stage: ShaderStage,
    ) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            engine_err!(SOURCE, DecodeFailed, "Failed to read {} shader '{}': {}", stage, path.display(), e)
        })?;
        Self::from_source(device, &source, stage)
    }

    /// Create, set source and compile
    pub fn from_source<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        source: &str,
        stage: ShaderStage,
    ) -> Result<Self> {
        let mut rollback = Rollback::new(device);

        let handle = rollback.device().create_shader(stage);
        rollback.defer(handle, release_shader::<D>);

        let device = rollback.device();
        check_graphics(device, "create_shader")?;
        if handle.is_none() {
            return Err(null_handle(SOURCE, "create_shader"));
        }

        device.shader_source(handle, source);
        check_graphics(device, "shader_source")?;

        device.compile_shader(handle);
        check_graphics(device, "compile_shader")?;

        rollback.commit();
        Ok(Self { handle, stage })
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_some()
    }

    /// Query the compile status; on failure report the info log, read with
    /// a buffer of `log_capacity` bytes.
    pub fn check<D: GraphicsDevice + ?Sized>(&self, device: &mut D, log_capacity: usize) -> Result<()> {
        if self.handle.is_none() {
            engine_bail!(SOURCE, InvalidResource, "{} shader has no handle", self.stage);
        }

        let compiled = device.shader_compile_status(self.handle);
        check_graphics(device, "shader_compile_status")?;
        if compiled {
            return Ok(());
        }

        let log = device.shader_info_log(self.handle, log_capacity);
        check_graphics(device, "shader_info_log")?;

        crate::engine_error!(SOURCE, "[SHADER_COMPILATION_ERROR]: {} shader\n{}", self.stage, log);
        Err(Error::CompileFailed {
            stage: self.stage,
            log,
        })
    }

    pub fn destroy<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }
        device.delete_shader(self.handle);
        check_graphics(device, "delete_shader")?;
        self.handle = NativeHandle::NONE;
        Ok(())
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
