//! Graphics resources
//!
//! Each resource owns one native handle (a set of handles for animated
//! textures). `T::default()` is the empty value; `destroy` releases the
//! handle and can be called again safely.

pub mod texture;
pub mod animated_texture;
pub mod shader;
pub mod program;
pub mod mesh;
pub mod accessor;
mod gltf_loader;

pub use texture::{DecodedImage, Texture};
pub use animated_texture::{AnimatedTexture, DecodedAnimation};
pub use shader::Shader;
pub use program::{Program, MODEL_UNIFORM, PROJECTION_UNIFORM, VIEW_UNIFORM};
pub use mesh::{Mesh, MeshData, VertexAttribute, VertexAttributes};
pub use accessor::{normalize_color_channel, AccessorView, ComponentType};
