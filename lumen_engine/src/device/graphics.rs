//! GL-like graphics capability surface.
//!
//! Methods mirror the native calls one to one. None of them report
//! failure directly: a failing call records an error code that the next
//! `take_error` returns, exactly like a native error queue.

use std::fmt;
use crate::device::NativeHandle;
use crate::error::{Error, NativeError, Result};

// ============================================================================
// Error codes
// ============================================================================

/// Graphics error-queue codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphicsErrorCode {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    InvalidFramebufferOperation,
    OutOfMemory,
    StackUnderflow,
    StackOverflow,
    Unknown(u32),
}

impl GraphicsErrorCode {
    /// Symbolic name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            GraphicsErrorCode::InvalidEnum => "GL_INVALID_ENUM",
            GraphicsErrorCode::InvalidValue => "GL_INVALID_VALUE",
            GraphicsErrorCode::InvalidOperation => "GL_INVALID_OPERATION",
            GraphicsErrorCode::InvalidFramebufferOperation => "GL_INVALID_FRAMEBUFFER_OPERATION",
            GraphicsErrorCode::OutOfMemory => "GL_OUT_OF_MEMORY",
            GraphicsErrorCode::StackUnderflow => "GL_STACK_UNDERFLOW",
            GraphicsErrorCode::StackOverflow => "GL_STACK_OVERFLOW",
            GraphicsErrorCode::Unknown(_) => "GL_UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for GraphicsErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsErrorCode::Unknown(code) => write!(f, "{} (0x{:04X})", self.name(), code),
            _ => write!(f, "{}", self.name()),
        }
    }
}

// ============================================================================
// Parameter enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    LinearMipmapLinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureParameter {
    WrapS(TextureWrap),
    WrapT(TextureWrap),
    MinFilter(TextureFilter),
    MagFilter(TextureFilter),
}

/// Internal storage format of texture images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Geometry,
    Fragment,
}

impl ShaderStage {
    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Buffer binding points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data
    Vertex,
    /// Element indices
    Index,
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

pub trait GraphicsDevice {
    /// Pop the oldest pending error code, if any
    fn take_error(&mut self) -> Option<GraphicsErrorCode>;

    // ===== Textures =====

    fn create_texture(&mut self) -> NativeHandle;
    fn texture_parameter(&mut self, texture: NativeHandle, parameter: TextureParameter);
    /// Allocate immutable storage for `levels` mip levels
    fn texture_storage(
        &mut self,
        texture: NativeHandle,
        levels: u32,
        format: PixelFormat,
        width: u32,
        height: u32,
    );
    /// Upload the full level-0 image
    fn texture_sub_image(&mut self, texture: NativeHandle, width: u32, height: u32, pixels: &[u8]);
    fn generate_mipmap(&mut self, texture: NativeHandle);
    /// Width and height of level 0
    fn texture_level_size(&mut self, texture: NativeHandle) -> (i32, i32);
    fn active_texture(&mut self, unit: u32);
    /// Bind to the active unit; `NONE` unbinds
    fn bind_texture(&mut self, texture: NativeHandle);
    fn delete_texture(&mut self, texture: NativeHandle);

    // ===== Shaders =====

    fn create_shader(&mut self, stage: ShaderStage) -> NativeHandle;
    fn shader_source(&mut self, shader: NativeHandle, source: &str);
    fn compile_shader(&mut self, shader: NativeHandle);
    fn shader_compile_status(&mut self, shader: NativeHandle) -> bool;
    /// Diagnostic log, truncated to `capacity` bytes
    fn shader_info_log(&mut self, shader: NativeHandle, capacity: usize) -> String;
    fn delete_shader(&mut self, shader: NativeHandle);

    // ===== Programs =====

    fn create_program(&mut self) -> NativeHandle;
    fn attach_shader(&mut self, program: NativeHandle, shader: NativeHandle);
    fn link_program(&mut self, program: NativeHandle);
    fn program_link_status(&mut self, program: NativeHandle) -> bool;
    fn program_info_log(&mut self, program: NativeHandle, capacity: usize) -> String;
    /// Make `program` current; `NONE` clears the current program
    fn use_program(&mut self, program: NativeHandle);
    /// Location of a uniform, or -1 if the program has none by that name
    fn uniform_location(&mut self, program: NativeHandle, name: &str) -> i32;
    /// Write a column-major 4x4 matrix into the current program
    fn uniform_matrix4(&mut self, location: i32, matrix: &[f32; 16]);
    fn uniform_int(&mut self, location: i32, value: i32);
    fn delete_program(&mut self, program: NativeHandle);

    // ===== Vertex arrays and buffers =====

    fn create_vertex_array(&mut self) -> NativeHandle;
    /// `NONE` unbinds
    fn bind_vertex_array(&mut self, vertex_array: NativeHandle);
    fn create_buffer(&mut self) -> NativeHandle;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: NativeHandle);
    /// Upload bytes to the buffer bound at `target`
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]);
    fn enable_vertex_attribute(&mut self, slot: u32);
    /// Describe tightly packed f32 data of the bound vertex buffer
    fn vertex_attribute_pointer(&mut self, slot: u32, components: u32);
    fn delete_buffer(&mut self, buffer: NativeHandle);
    fn delete_vertex_array(&mut self, vertex_array: NativeHandle);
    /// Draw triangles with `index_count` u32 indices from the bound vertex array
    fn draw_indexed(&mut self, index_count: u32);
}

/// Drain one error code after `call`.
///
/// Logs `"<call>: <CODE>"` and returns `Error::Native` when the queue was
/// not empty.
pub fn check_graphics<D: GraphicsDevice + ?Sized>(device: &mut D, call: &'static str) -> Result<()> {
    match device.take_error() {
        None => Ok(()),
        Some(code) => {
            crate::engine_error!("lumen::GraphicsDevice", "{}: {}", call, code);
            Err(Error::Native {
                call,
                code: NativeError::Graphics(code),
            })
        }
    }
}
