//! Linked shader programs and their per-draw uniform setup.
//!
//! `Program::build` is the usual entry point: it compiles every stage,
//! links them, and always releases the intermediate shaders. Any stage
//! that fails releases the stages before it.

use std::path::Path;
use glam::Mat4;
use crate::camera::Camera;
use crate::device::{check_graphics, null_handle, GraphicsDevice, NativeHandle, Rollback, ShaderStage};
use crate::error::{Error, Result};
use crate::resource::shader::{release_shader, Shader};
use crate::engine_bail;

const SOURCE: &str = "lumen::Program";

pub const PROJECTION_UNIFORM: &str = "projection";
pub const VIEW_UNIFORM: &str = "view";
pub const MODEL_UNIFORM: &str = "model";

pub(crate) fn release_program<D: GraphicsDevice + ?Sized>(device: &mut D, program: NativeHandle) {
    device.delete_program(program);
    let _ = check_graphics(device, "delete_program");
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Program {
    handle: NativeHandle,
}

impl Program {
    /// Attach every valid shader and link.
    ///
    /// Link success is not checked here, see `check`.
    pub fn create<'s, D, I>(device: &mut D, shaders: I) -> Result<Self>
    where
        D: GraphicsDevice + ?Sized,
        I: IntoIterator<Item = &'s Shader>,
    {
        let mut rollback = Rollback::new(device);

        let handle = rollback.device().create_program();
        rollback.defer(handle, release_program::<D>);

        let device = rollback.device();
        check_graphics(device, "create_program")?;
        if handle.is_none() {
            return Err(null_handle(SOURCE, "create_program"));
        }

        for shader in shaders.into_iter().filter(|shader| shader.is_valid()) {
            device.attach_shader(handle, shader.handle());
            check_graphics(device, "attach_shader")?;
        }

        device.link_program(handle);
        check_graphics(device, "link_program")?;

        rollback.commit();
        Ok(Self { handle })
    }

    /// Compile `stages` in order, link them and check the result.
    ///
    /// The stage shaders are released once the program is linked, whether
    /// linking succeeded or not.
    pub fn build<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        stages: &[(ShaderStage, &Path)],
        log_capacity: usize,
    ) -> Result<Self> {
        let mut program = {
            let mut transient = Rollback::new(&mut *device);
            let mut shaders = Vec::with_capacity(stages.len());

            for &(stage, path) in stages {
                let shader = Shader::create(transient.device(), path, stage)?;
                transient.defer(shader.handle(), release_shader::<D>);
                shader.check(transient.device(), log_capacity)?;
                shaders.push(shader);
            }

            Self::create(transient.device(), &shaders)?
        };

        if let Err(e) = program.check(device, log_capacity) {
            let _ = program.destroy(device);
            return Err(e);
        }

        crate::engine_debug!(SOURCE, "Program {} linked from {} stages", program.handle, stages.len());
        Ok(program)
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_some()
    }

    /// Query the link status; on failure report the info log
    pub fn check<D: GraphicsDevice + ?Sized>(&self, device: &mut D, log_capacity: usize) -> Result<()> {
        if self.handle.is_none() {
            engine_bail!(SOURCE, InvalidResource, "program has no handle");
        }

        let linked = device.program_link_status(self.handle);
        check_graphics(device, "program_link_status")?;
        if linked {
            return Ok(());
        }

        let log = device.program_info_log(self.handle, log_capacity);
        check_graphics(device, "program_info_log")?;

        crate::engine_error!(SOURCE, "[PROGRAM_LINK_ERROR]: program {}\n{}", self.handle, log);
        Err(Error::LinkFailed(log))
    }

    /// Make the program current and write the camera and model matrices.
    ///
    /// Uniforms the program does not declare are skipped by the device.
    /// A program without handle does nothing.
    pub fn bind<D: GraphicsDevice + ?Sized>(&self, device: &mut D, camera: &Camera, model: &Mat4) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }

        device.use_program(self.handle);
        check_graphics(device, "use_program")?;

        let matrices = [
            (PROJECTION_UNIFORM, camera.projection_matrix()),
            (VIEW_UNIFORM, camera.view_matrix()),
            (MODEL_UNIFORM, model),
        ];
        for (name, matrix) in matrices {
            let location = device.uniform_location(self.handle, name);
            check_graphics(device, "uniform_location")?;
            device.uniform_matrix4(location, &matrix.to_cols_array());
            check_graphics(device, "uniform_matrix4")?;
        }
        Ok(())
    }

    /// Write an integer uniform (sampler units) of the current program
    pub fn set_int<D: GraphicsDevice + ?Sized>(&self, device: &mut D, name: &str, value: i32) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }
        let location = device.uniform_location(self.handle, name);
        check_graphics(device, "uniform_location")?;
        device.uniform_int(location, value);
        check_graphics(device, "uniform_int")
    }

    /// Clear the current program
    pub fn unbind<D: GraphicsDevice + ?Sized>(device: &mut D) -> Result<()> {
        device.use_program(NativeHandle::NONE);
        check_graphics(device, "use_program")
    }

    pub fn destroy<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }
        device.delete_program(self.handle);
        check_graphics(device, "delete_program")?;
        self.handle = NativeHandle::NONE;
        Ok(())
    }
}

#[cfg(test)]
#[path = "program_tests.rs"]
mod tests;
