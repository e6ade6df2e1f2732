//! Draw-ready geometry.
//!
//! `MeshData` is the CPU side: flat per-attribute float arrays plus
//! optional `u32` indices. `Mesh` owns the vertex array built from it.
//!
//! # Attribute slots
//!
//! | slot | attribute  | components |
//! |------|------------|------------|
//! | 0    | position   | 3          |
//! | 1    | normal     | 3          |
//! | 2    | tex coord  | 2          |
//! | 3    | color      | 4          |
//! | 4    | tangent    | 3          |
//! | 5    | bitangent  | 3          |
//!
//! The vertex and index buffers used while building a mesh are staging
//! objects: they are deleted as soon as the vertex array is unbound, on
//! success and failure alike. Only the vertex array survives.

use std::path::Path;
use bitflags::bitflags;
use crate::device::{check_graphics, null_handle, BufferTarget, GraphicsDevice, NativeHandle, Rollback};
use crate::error::Result;
use crate::resource::gltf_loader;
use crate::engine_bail;

const SOURCE: &str = "lumen::Mesh";

// ============================================================================
// VERTEX ATTRIBUTES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttribute {
    Position,
    Normal,
    TexCoord,
    Color,
    Tangent,
    Bitangent,
}

impl VertexAttribute {
    /// Every attribute in slot order
    pub const ALL: [VertexAttribute; 6] = [
        VertexAttribute::Position,
        VertexAttribute::Normal,
        VertexAttribute::TexCoord,
        VertexAttribute::Color,
        VertexAttribute::Tangent,
        VertexAttribute::Bitangent,
    ];

    pub fn slot(self) -> u32 {
        match self {
            VertexAttribute::Position => 0,
            VertexAttribute::Normal => 1,
            VertexAttribute::TexCoord => 2,
            VertexAttribute::Color => 3,
            VertexAttribute::Tangent => 4,
            VertexAttribute::Bitangent => 5,
        }
    }

    /// Floats per vertex
    pub fn components(self) -> u32 {
        match self {
            VertexAttribute::TexCoord => 2,
            VertexAttribute::Color => 4,
            _ => 3,
        }
    }

    pub fn flag(self) -> VertexAttributes {
        VertexAttributes::from_bits_truncate(1 << self.slot())
    }
}

bitflags! {
    /// Set of attributes present in a mesh
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VertexAttributes: u8 {
        const POSITION  = 1 << 0;
        const NORMAL    = 1 << 1;
        const TEX_COORD = 1 << 2;
        const COLOR     = 1 << 3;
        const TANGENT   = 1 << 4;
        const BITANGENT = 1 << 5;
    }
}

// ============================================================================
// MESH DATA
// ============================================================================

/// Decoded geometry, one flat array per present attribute
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertex_count: usize,
    pub positions: Option<Vec<f32>>,
    pub normals: Option<Vec<f32>>,
    pub tex_coords: Option<Vec<f32>>,
    pub colors: Option<Vec<f32>>,
    pub tangents: Option<Vec<f32>>,
    pub bitangents: Option<Vec<f32>>,
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    /// Unit quad in the XY plane: 4 vertices, 2 triangles, white
    pub fn quad() -> Self {
        Self {
            vertex_count: 4,
            positions: Some(vec![
                -1.0, 1.0, 0.0, //
                1.0, 1.0, 0.0, //
                1.0, -1.0, 0.0, //
                -1.0, -1.0, 0.0,
            ]),
            tex_coords: Some(vec![
                0.0, 0.0, //
                1.0, 0.0, //
                1.0, 1.0, //
                0.0, 1.0,
            ]),
            colors: Some(vec![1.0; 16]),
            indices: Some(vec![0, 1, 2, 2, 3, 0]),
            ..Default::default()
        }
    }

    /// Decode every mesh primitive of a glTF file, see `gltf_loader`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        gltf_loader::load(path.as_ref())
    }

    pub fn attribute(&self, attribute: VertexAttribute) -> Option<&[f32]> {
        let values = match attribute {
            VertexAttribute::Position => &self.positions,
            VertexAttribute::Normal => &self.normals,
            VertexAttribute::TexCoord => &self.tex_coords,
            VertexAttribute::Color => &self.colors,
            VertexAttribute::Tangent => &self.tangents,
            VertexAttribute::Bitangent => &self.bitangents,
        };
        values.as_deref()
    }

    pub fn attributes(&self) -> VertexAttributes {
        VertexAttribute::ALL
            .into_iter()
            .filter(|&attribute| self.attribute(attribute).is_some())
            .fold(VertexAttributes::empty(), |set, attribute| set | attribute.flag())
    }

    /// Check array lengths against `vertex_count` and index range
    pub fn validate(&self) -> Result<()> {
        if self.positions.is_none() || self.vertex_count == 0 {
            engine_bail!(SOURCE, DecodeFailed, "Mesh data has no vertices");
        }

        for attribute in VertexAttribute::ALL {
            let Some(values) = self.attribute(attribute) else {
                continue;
            };
            let expected = self.vertex_count * attribute.components() as usize;
            if values.len() != expected {
                engine_bail!(
                    SOURCE,
                    DecodeFailed,
                    "{:?} holds {} floats, expected {} for {} vertices",
                    attribute,
                    values.len(),
                    expected,
                    self.vertex_count
                );
            }
        }

        if let Some(indices) = &self.indices {
            if let Some(&index) = indices.iter().find(|&&index| index as usize >= self.vertex_count) {
                engine_bail!(
                    SOURCE,
                    DecodeFailed,
                    "Index {} out of range for {} vertices",
                    index,
                    self.vertex_count
                );
            }
        }
        Ok(())
    }

    /// Concatenate `other` after `self`, rebasing its indices.
    ///
    /// An attribute survives only if both sides have it.
    pub(crate) fn append(&mut self, other: MeshData) {
        let base = self.vertex_count as u32;

        concat(&mut self.positions, other.positions);
        concat(&mut self.normals, other.normals);
        concat(&mut self.tex_coords, other.tex_coords);
        concat(&mut self.colors, other.colors);
        concat(&mut self.tangents, other.tangents);
        concat(&mut self.bitangents, other.bitangents);
        concat(
            &mut self.indices,
            other.indices.map(|indices| indices.into_iter().map(|index| index + base).collect()),
        );
        self.vertex_count += other.vertex_count;
    }
}

fn concat<T>(dst: &mut Option<Vec<T>>, src: Option<Vec<T>>) {
    *dst = match (dst.take(), src) {
        (Some(mut dst), Some(src)) => {
            dst.extend(src);
            Some(dst)
        }
        _ => None,
    };
}

// ============================================================================
// MESH
// ============================================================================

pub(crate) fn release_vertex_array<D: GraphicsDevice + ?Sized>(device: &mut D, vertex_array: NativeHandle) {
    device.delete_vertex_array(vertex_array);
    let _ = check_graphics(device, "delete_vertex_array");
}

fn release_buffer<D: GraphicsDevice + ?Sized>(device: &mut D, buffer: NativeHandle) {
    device.delete_buffer(buffer);
    let _ = check_graphics(device, "delete_buffer");
}

/// Create a buffer on `target`, bind it and fill it with `bytes`
fn upload_buffer<D: GraphicsDevice + ?Sized>(
    staging: &mut Rollback<'_, D>,
    target: BufferTarget,
    bytes: &[u8],
) -> Result<NativeHandle> {
    let buffer = staging.device().create_buffer();
    staging.defer(buffer, release_buffer::<D>);

    let device = staging.device();
    check_graphics(device, "create_buffer")?;
    if buffer.is_none() {
        return Err(null_handle(SOURCE, "create_buffer"));
    }

    device.bind_buffer(target, buffer);
    check_graphics(device, "bind_buffer")?;
    device.buffer_data(target, bytes);
    check_graphics(device, "buffer_data")?;
    Ok(buffer)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Mesh {
    handle: NativeHandle,
    index_count: u32,
    attributes: VertexAttributes,
}

impl Mesh {
    /// Build from a glTF file, or the unit quad when `path` is `None`
    pub fn create<D: GraphicsDevice + ?Sized>(device: &mut D, path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let data = MeshData::open(path)?;
                Self::from_data(device, &data)
            }
            None => Self::quad(device),
        }
    }

    pub fn quad<D: GraphicsDevice + ?Sized>(device: &mut D) -> Result<Self> {
        Self::from_data(device, &MeshData::quad())
    }

    pub fn from_data<D: GraphicsDevice + ?Sized>(device: &mut D, data: &MeshData) -> Result<Self> {
        data.validate()?;

        let mut rollback = Rollback::new(device);

        let handle = rollback.device().create_vertex_array();
        rollback.defer(handle, release_vertex_array::<D>);

        let device = rollback.device();
        check_graphics(device, "create_vertex_array")?;
        if handle.is_none() {
            return Err(null_handle(SOURCE, "create_vertex_array"));
        }
        device.bind_vertex_array(handle);
        check_graphics(device, "bind_vertex_array")?;

        let index_count = {
            let mut staging = Rollback::new(rollback.device());

            for attribute in VertexAttribute::ALL {
                let Some(values) = data.attribute(attribute) else {
                    continue;
                };
                upload_buffer(&mut staging, BufferTarget::Vertex, bytemuck::cast_slice(values))?;

                let device = staging.device();
                device.enable_vertex_attribute(attribute.slot());
                check_graphics(device, "enable_vertex_attribute")?;
                device.vertex_attribute_pointer(attribute.slot(), attribute.components());
                check_graphics(device, "vertex_attribute_pointer")?;
            }

            let index_count = match &data.indices {
                Some(indices) => {
                    upload_buffer(&mut staging, BufferTarget::Index, bytemuck::cast_slice(indices))?;
                    indices.len() as u32
                }
                None => 0,
            };

            let device = staging.device();
            device.bind_vertex_array(NativeHandle::NONE);
            check_graphics(device, "bind_vertex_array")?;
            index_count
        };
        rollback.commit();

        let attributes = data.attributes();
        crate::engine_debug!(
            SOURCE,
            "Mesh {} built ({} vertices, {} indices, {:?})",
            handle,
            data.vertex_count,
            index_count,
            attributes
        );

        Ok(Self {
            handle,
            index_count,
            attributes,
        })
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn attributes(&self) -> VertexAttributes {
        self.attributes
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_some()
    }

    /// Bind, draw every index as triangles, unbind
    pub fn draw<D: GraphicsDevice + ?Sized>(&self, device: &mut D) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }
        device.bind_vertex_array(self.handle);
        check_graphics(device, "bind_vertex_array")?;
        device.draw_indexed(self.index_count);
        check_graphics(device, "draw_indexed")?;
        device.bind_vertex_array(NativeHandle::NONE);
        check_graphics(device, "bind_vertex_array")
    }

    pub fn destroy<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }
        device.delete_vertex_array(self.handle);
        check_graphics(device, "delete_vertex_array")?;
        *self = Self::default();
        Ok(())
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
