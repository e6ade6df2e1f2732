//! Drawable objects: a linked program, its textures, a mesh and a transform.
//!
//! `Object::create` builds the parts in a fixed order (program, textures,
//! mesh). If any part fails, everything built before it is released, so a
//! failed creation leaves no native handle behind.

use std::path::{Path, PathBuf};
use glam::{EulerRot, Mat4, Quat, Vec3};
use crate::camera::Camera;
use crate::device::{GraphicsDevice, Rollback, ShaderStage};
use crate::error::Result;
use crate::resource::mesh::release_vertex_array;
use crate::resource::program::release_program;
use crate::resource::texture::release_texture;
use crate::resource::{Mesh, Program, Texture};

const SOURCE: &str = "lumen::Object";

/// Sampler uniforms bound to texture units 0 and 1 on every draw
pub const SAMPLER_UNIFORMS: [&str; 2] = ["texture_diffuse1", "texture_diffuse2"];

// ===== DESCRIPTOR =====

/// Files an object is built from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectDesc {
    pub vertex_shader: Option<PathBuf>,
    pub geometry_shader: Option<PathBuf>,
    pub fragment_shader: Option<PathBuf>,
    /// glTF scene; the unit quad when `None`
    pub mesh: Option<PathBuf>,
    /// Bound to texture units 0, 1, ... in order
    pub textures: Vec<PathBuf>,
}

impl ObjectDesc {
    pub fn with_vertex_shader(mut self, path: impl Into<PathBuf>) -> Self {
        self.vertex_shader = Some(path.into());
        self
    }

    pub fn with_geometry_shader(mut self, path: impl Into<PathBuf>) -> Self {
        self.geometry_shader = Some(path.into());
        self
    }

    pub fn with_fragment_shader(mut self, path: impl Into<PathBuf>) -> Self {
        self.fragment_shader = Some(path.into());
        self
    }

    pub fn with_mesh(mut self, path: impl Into<PathBuf>) -> Self {
        self.mesh = Some(path.into());
        self
    }

    pub fn with_texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.textures.push(path.into());
        self
    }

    /// Present shader stages in pipeline order
    pub fn stages(&self) -> Vec<(ShaderStage, &Path)> {
        [
            (ShaderStage::Vertex, &self.vertex_shader),
            (ShaderStage::Geometry, &self.geometry_shader),
            (ShaderStage::Fragment, &self.fragment_shader),
        ]
        .into_iter()
        .filter_map(|(stage, path)| path.as_deref().map(|path| (stage, path)))
        .collect()
    }
}

// ===== OBJECT =====

#[derive(Debug, PartialEq)]
pub struct Object {
    position: Vec3,
    /// Euler angles in radians, applied X then Y then Z
    rotation: Vec3,
    scale: Vec3,
    matrix: Mat4,
    program: Program,
    mesh: Mesh,
    textures: Vec<Texture>,
}

impl Default for Object {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            matrix: Mat4::IDENTITY,
            program: Program::default(),
            mesh: Mesh::default(),
            textures: Vec::new(),
        }
    }
}

impl Object {
    /// Build program, textures and mesh from `desc`.
    ///
    /// `log_capacity` bounds the compile and link logs read on failure.
    pub fn create<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        desc: &ObjectDesc,
        log_capacity: usize,
    ) -> Result<Self> {
        let mut rollback = Rollback::new(device);

        let program = Program::build(rollback.device(), &desc.stages(), log_capacity)?;
        rollback.defer(program.handle(), release_program::<D>);

        let mut textures = Vec::with_capacity(desc.textures.len());
        for path in &desc.textures {
            let texture = Texture::create(rollback.device(), path)?;
            rollback.defer(texture.handle(), release_texture::<D>);
            textures.push(texture);
        }

        let mesh = Mesh::create(rollback.device(), desc.mesh.as_deref())?;
        rollback.defer(mesh.handle(), release_vertex_array::<D>);
        rollback.commit();

        crate::engine_debug!(
            SOURCE,
            "Object built: program {}, mesh {}, {} textures",
            program.handle(),
            mesh.handle(),
            textures.len()
        );

        Ok(Self {
            program,
            mesh,
            textures,
            ..Self::default()
        })
    }

    /// Bind textures and program, then draw the mesh
    pub fn draw<D: GraphicsDevice + ?Sized>(&self, device: &mut D, camera: &Camera) -> Result<()> {
        for (unit, texture) in self.textures.iter().enumerate() {
            texture.bind(device, unit as u32)?;
        }

        self.program.bind(device, camera, &self.matrix)?;
        for (unit, name) in SAMPLER_UNIFORMS.iter().enumerate() {
            self.program.set_int(device, name, unit as i32)?;
        }

        self.mesh.draw(device)
    }

    /// Recompute the model matrix as translation * rotation * scale
    pub fn update_matrix(&mut self) {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        self.matrix = Mat4::from_scale_rotation_translation(self.scale, rotation, self.position);
    }

    /// Replace the model matrix; position, rotation and scale are left as is
    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.matrix = matrix;
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    /// Release textures, mesh and program, then reset to the default.
    ///
    /// Parts released before a failure stay released; calling it again
    /// picks up where it stopped.
    pub fn destroy<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        for texture in &mut self.textures {
            texture.destroy(device)?;
        }
        self.mesh.destroy(device)?;
        self.program.destroy(device)?;

        *self = Self::default();
        Ok(())
    }
}

#[cfg(test)]
#[path = "object_tests.rs"]
mod tests;
