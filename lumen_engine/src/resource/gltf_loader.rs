//! glTF decoding into `MeshData`.
//!
//! Every primitive of every mesh is decoded and concatenated in document
//! order. Only these encodings are read:
//!
//! | attribute    | encoding         |
//! |--------------|------------------|
//! | `POSITION`   | f32 VEC3         |
//! | `NORMAL`     | f32 VEC3         |
//! | `TANGENT`    | f32 VEC4         |
//! | `TEXCOORD_0` | f32 VEC2         |
//! | `COLOR_0`    | u16 VEC3 / VEC4  |
//! | indices      | u16 SCALAR       |
//!
//! Any other attribute or encoding is skipped without error; the mesh
//! simply lacks it. Only a document or buffer that cannot be loaded fails.

use std::path::Path;
use glam::Vec3;
use gltf::Semantic;
use crate::error::Result;
use crate::resource::accessor::{normalize_color_channel, AccessorView, ComponentType};
use crate::resource::mesh::MeshData;
use crate::engine_err;

const SOURCE: &str = "lumen::GltfLoader";

pub(crate) fn load(path: &Path) -> Result<MeshData> {
    let gltf::Gltf { document, blob } = gltf::Gltf::open(path).map_err(|e| {
        engine_err!(SOURCE, DecodeFailed, "Failed to parse '{}': {}", path.display(), e)
    })?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob).map_err(|e| {
        engine_err!(SOURCE, DecodeFailed, "Failed to load buffers of '{}': {}", path.display(), e)
    })?;

    let mut merged: Option<MeshData> = None;
    let mut primitive_count = 0;
    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let data = decode_primitive(&primitive, &buffers)?;
            primitive_count += 1;
            merged = Some(match merged.take() {
                Some(mut merged) => {
                    merged.append(data);
                    merged
                }
                None => data,
            });
        }
    }

    let data = merged.ok_or_else(|| {
        engine_err!(SOURCE, DecodeFailed, "'{}' contains no mesh primitive", path.display())
    })?;

    crate::engine_debug!(
        SOURCE,
        "Decoded '{}': {} primitives, {} vertices",
        path.display(),
        primitive_count,
        data.vertex_count
    );
    Ok(data)
}

fn decode_primitive(primitive: &gltf::Primitive<'_>, buffers: &[gltf::buffer::Data]) -> Result<MeshData> {
    let mut data = MeshData::default();
    let mut tangents: Option<Vec<f32>> = None;

    for (semantic, accessor) in primitive.attributes() {
        let Some(view) = AccessorView::from_accessor(&accessor, buffers)? else {
            continue;
        };

        match (semantic, view.component_type(), view.components()) {
            (Semantic::Positions, ComponentType::F32, 3) => {
                data.positions = Some(view.read::<f32>()?);
                data.vertex_count = view.count();
            }
            (Semantic::Normals, ComponentType::F32, 3) => {
                data.normals = Some(view.read::<f32>()?);
            }
            (Semantic::Tangents, ComponentType::F32, 4) => {
                tangents = Some(view.read::<f32>()?);
            }
            (Semantic::TexCoords(0), ComponentType::F32, 2) => {
                data.tex_coords = Some(view.read::<f32>()?);
            }
            (Semantic::Colors(0), ComponentType::U16, components @ (3 | 4)) => {
                let channels = view.read::<u16>()?;
                data.colors = Some(rgba_colors(&channels, components));
            }
            _ => {}
        }
    }

    if let Some(tangents) = tangents {
        data.bitangents = data.normals.as_deref().map(|normals| bitangents(normals, &tangents));
        data.tangents = Some(tangents.chunks_exact(4).flat_map(|t| [t[0], t[1], t[2]]).collect());
    }

    if let Some(accessor) = primitive.indices() {
        if let Some(view) = AccessorView::from_accessor(&accessor, buffers)? {
            if view.component_type() == ComponentType::U16 && view.components() == 1 {
                let indices = view.read::<u16>()?;
                data.indices = Some(indices.into_iter().map(u32::from).collect());
            }
        }
    }

    Ok(data)
}

/// Normalized RGBA from u16 channels; alpha is 1 for RGB input
fn rgba_colors(channels: &[u16], components: usize) -> Vec<f32> {
    channels
        .chunks_exact(components)
        .flat_map(|color| {
            let channel = |i: usize| color.get(i).map_or(1.0, |&value| normalize_color_channel(value));
            [channel(0), channel(1), channel(2), channel(3)]
        })
        .collect()
}

/// `cross(normal, tangent.xyz) * tangent.w` per vertex
fn bitangents(normals: &[f32], tangents: &[f32]) -> Vec<f32> {
    normals
        .chunks_exact(3)
        .zip(tangents.chunks_exact(4))
        .flat_map(|(n, t)| {
            let bitangent = Vec3::new(n[0], n[1], n[2]).cross(Vec3::new(t[0], t[1], t[2])) * t[3];
            bitangent.to_array()
        })
        .collect()
}

#[cfg(test)]
#[path = "gltf_loader_tests.rs"]
mod tests;
