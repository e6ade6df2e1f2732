//! Mock graphics device for unit tests (no GPU required)
//!
//! Keeps a table of live objects and an error queue with the same rules a
//! strict native driver applies: operations on unknown names queue
//! `GL_INVALID_VALUE`/`GL_INVALID_OPERATION`, deleting a name twice is an
//! error. Any call can be made to fail on its n-th invocation with
//! `fail_call`.

use std::collections::VecDeque;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::device::{
    BufferTarget, GraphicsDevice, GraphicsErrorCode, NativeHandle, PixelFormat, ShaderStage,
    TextureParameter,
};

// ============================================================================
// Mock objects
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MockTexture {
    pub width: u32,
    pub height: u32,
    pub levels: u32,
    pub parameters: Vec<TextureParameter>,
    pub pixels: Vec<u8>,
    pub mipmapped: bool,
}

#[derive(Debug, Clone)]
pub struct MockShader {
    pub stage: ShaderStage,
    pub source: String,
    pub compiled: bool,
    pub log: String,
}

#[derive(Debug, Clone, Default)]
pub struct MockProgram {
    pub attached: Vec<NativeHandle>,
    pub linked: bool,
    pub log: String,
    /// Uniform names; the location is the index
    pub uniforms: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MockAttribute {
    pub components: u32,
    pub data: Vec<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct MockVertexArray {
    pub enabled: FxHashSet<u32>,
    pub attributes: FxHashMap<u32, MockAttribute>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Matrix4([f32; 16]),
    Int(i32),
}

#[derive(Debug, Clone)]
struct MockFault {
    call: &'static str,
    nth: usize,
    code: GraphicsErrorCode,
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

#[derive(Debug, Default)]
pub struct MockGraphicsDevice {
    next_handle: u32,
    pub textures: FxHashMap<NativeHandle, MockTexture>,
    pub shaders: FxHashMap<NativeHandle, MockShader>,
    pub programs: FxHashMap<NativeHandle, MockProgram>,
    pub vertex_arrays: FxHashMap<NativeHandle, MockVertexArray>,
    pub buffers: FxHashMap<NativeHandle, Vec<u8>>,

    /// Every call in order, with its arguments
    pub calls: Vec<String>,
    /// Uniform writes resolved to names of the current program
    pub uniform_writes: Vec<(String, UniformValue)>,
    /// (vertex array, index count) of every draw
    pub draws: Vec<(NativeHandle, u32)>,

    pub active_unit: u32,
    pub bound_textures: FxHashMap<u32, NativeHandle>,
    pub current_program: NativeHandle,
    pub bound_vertex_array: NativeHandle,
    bound_buffers: FxHashMap<BufferTarget, NativeHandle>,

    errors: VecDeque<GraphicsErrorCode>,
    faults: Vec<MockFault>,
    call_counts: FxHashMap<&'static str, usize>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `nth` (1-based) invocation of `call` fail with `code`.
    ///
    /// A failing create returns `NONE`; any other failing call has no
    /// effect besides queuing the code.
    pub fn fail_call(&mut self, call: &'static str, nth: usize, code: GraphicsErrorCode) {
        self.faults.push(MockFault { call, nth, code });
    }

    /// Number of times `call` was invoked
    pub fn call_count(&self, call: &str) -> usize {
        self.call_counts.get(call).copied().unwrap_or(0)
    }

    /// Total number of live native objects
    pub fn live_handles(&self) -> usize {
        self.textures.len()
            + self.shaders.len()
            + self.programs.len()
            + self.vertex_arrays.len()
            + self.buffers.len()
    }

    /// Codes still queued
    pub fn pending_errors(&self) -> usize {
        self.errors.len()
    }

    /// Value of the last write to uniform `name`
    pub fn last_uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniform_writes
            .iter()
            .rev()
            .find(|(uniform, _)| uniform == name)
            .map(|(_, value)| value)
    }

    fn enter(&mut self, call: &'static str, detail: String) -> bool {
        if detail.is_empty() {
            self.calls.push(call.to_string());
        } else {
            self.calls.push(format!("{} {}", call, detail));
        }

        let count = self.call_counts.entry(call).or_insert(0);
        *count += 1;
        let count = *count;

        if let Some(fault) = self.faults.iter().find(|f| f.call == call && f.nth == count) {
            let code = fault.code;
            self.errors.push_back(code);
            return true;
        }
        false
    }

    fn raise(&mut self, code: GraphicsErrorCode) {
        self.errors.push_back(code);
    }

    fn allocate(&mut self) -> NativeHandle {
        self.next_handle += 1;
        NativeHandle::new(self.next_handle)
    }

    fn bound_buffer(&self, target: BufferTarget) -> NativeHandle {
        self.bound_buffers.get(&target).copied().unwrap_or(NativeHandle::NONE)
    }
}

fn declared_uniforms(source: &str) -> Vec<String> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("uniform "))
        .filter_map(|line| line.trim_end_matches(';').split_whitespace().last())
        .map(str::to_string)
        .collect()
}

impl GraphicsDevice for MockGraphicsDevice {
    fn take_error(&mut self) -> Option<GraphicsErrorCode> {
        self.errors.pop_front()
    }

    // ===== Textures =====

    fn create_texture(&mut self) -> NativeHandle {
        if self.enter("create_texture", String::new()) {
            return NativeHandle::NONE;
        }
        let handle = self.allocate();
        self.textures.insert(handle, MockTexture::default());
        handle
    }

    fn texture_parameter(&mut self, texture: NativeHandle, parameter: TextureParameter) {
        if self.enter("texture_parameter", format!("{} {:?}", texture, parameter)) {
            return;
        }
        match self.textures.get_mut(&texture) {
            Some(mock) => mock.parameters.push(parameter),
            None => self.raise(GraphicsErrorCode::InvalidOperation),
        }
    }

    fn texture_storage(
        &mut self,
        texture: NativeHandle,
        levels: u32,
        format: PixelFormat,
        width: u32,
        height: u32,
    ) {
        if self.enter("texture_storage", format!("{} {}x{}", texture, width, height)) {
            return;
        }
        let code = match self.textures.get_mut(&texture) {
            None => Some(GraphicsErrorCode::InvalidOperation),
            Some(_) if width == 0 || height == 0 || levels == 0 => Some(GraphicsErrorCode::InvalidValue),
            Some(mock) if mock.levels != 0 => Some(GraphicsErrorCode::InvalidOperation),
            Some(mock) => {
                mock.width = width;
                mock.height = height;
                mock.levels = levels;
                mock.pixels = vec![0; width as usize * height as usize * format.bytes_per_pixel()];
                None
            }
        };
        if let Some(code) = code {
            self.raise(code);
        }
    }

    fn texture_sub_image(&mut self, texture: NativeHandle, width: u32, height: u32, pixels: &[u8]) {
        if self.enter("texture_sub_image", format!("{} {}x{}", texture, width, height)) {
            return;
        }
        let code = match self.textures.get_mut(&texture) {
            None => Some(GraphicsErrorCode::InvalidOperation),
            Some(mock) if mock.levels == 0 => Some(GraphicsErrorCode::InvalidOperation),
            Some(mock) if width > mock.width || height > mock.height => {
                Some(GraphicsErrorCode::InvalidValue)
            }
            Some(_) if pixels.len() < width as usize * height as usize * 4 => {
                Some(GraphicsErrorCode::InvalidValue)
            }
            Some(mock) => {
                let len = width as usize * height as usize * 4;
                mock.pixels[..len].copy_from_slice(&pixels[..len]);
                None
            }
        };
        if let Some(code) = code {
            self.raise(code);
        }
    }

    fn generate_mipmap(&mut self, texture: NativeHandle) {
        if self.enter("generate_mipmap", texture.to_string()) {
            return;
        }
        let ready = match self.textures.get_mut(&texture) {
            Some(mock) if mock.levels != 0 => {
                mock.mipmapped = true;
                true
            }
            _ => false,
        };
        if !ready {
            self.raise(GraphicsErrorCode::InvalidOperation);
        }
    }

    fn texture_level_size(&mut self, texture: NativeHandle) -> (i32, i32) {
        if self.enter("texture_level_size", texture.to_string()) {
            return (0, 0);
        }
        match self.textures.get(&texture) {
            Some(mock) => (mock.width as i32, mock.height as i32),
            None => {
                self.raise(GraphicsErrorCode::InvalidValue);
                (0, 0)
            }
        }
    }

    fn active_texture(&mut self, unit: u32) {
        if self.enter("active_texture", unit.to_string()) {
            return;
        }
        if unit >= 32 {
            self.raise(GraphicsErrorCode::InvalidEnum);
            return;
        }
        self.active_unit = unit;
    }

    fn bind_texture(&mut self, texture: NativeHandle) {
        if self.enter("bind_texture", texture.to_string()) {
            return;
        }
        if texture.is_some() && !self.textures.contains_key(&texture) {
            self.raise(GraphicsErrorCode::InvalidOperation);
            return;
        }
        self.bound_textures.insert(self.active_unit, texture);
    }

    fn delete_texture(&mut self, texture: NativeHandle) {
        if self.enter("delete_texture", texture.to_string()) {
            return;
        }
        if self.textures.remove(&texture).is_none() {
            self.raise(GraphicsErrorCode::InvalidValue);
            return;
        }
        self.bound_textures.retain(|_, bound| *bound != texture);
    }

    // ===== Shaders =====

    fn create_shader(&mut self, stage: ShaderStage) -> NativeHandle {
        if self.enter("create_shader", stage.to_string()) {
            return NativeHandle::NONE;
        }
        let handle = self.allocate();
        self.shaders.insert(
            handle,
            MockShader {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        handle
    }

    fn shader_source(&mut self, shader: NativeHandle, source: &str) {
        if self.enter("shader_source", shader.to_string()) {
            return;
        }
        match self.shaders.get_mut(&shader) {
            Some(mock) => mock.source = source.to_string(),
            None => self.raise(GraphicsErrorCode::InvalidValue),
        }
    }

    fn compile_shader(&mut self, shader: NativeHandle) {
        if self.enter("compile_shader", shader.to_string()) {
            return;
        }
        match self.shaders.get_mut(&shader) {
            Some(mock) => {
                if mock.source.trim().is_empty() {
                    mock.compiled = false;
                    mock.log = "0:0: error: empty shader source".to_string();
                } else if let Some(line) = mock.source.lines().position(|l| l.contains("#error")) {
                    mock.compiled = false;
                    mock.log = format!("0:{}: error: #error directive", line + 1);
                } else {
                    mock.compiled = true;
                    mock.log.clear();
                }
            }
            None => self.raise(GraphicsErrorCode::InvalidValue),
        }
    }

    fn shader_compile_status(&mut self, shader: NativeHandle) -> bool {
        if self.enter("shader_compile_status", shader.to_string()) {
            return false;
        }
        match self.shaders.get(&shader) {
            Some(mock) => mock.compiled,
            None => {
                self.raise(GraphicsErrorCode::InvalidValue);
                false
            }
        }
    }

    fn shader_info_log(&mut self, shader: NativeHandle, capacity: usize) -> String {
        if self.enter("shader_info_log", shader.to_string()) {
            return String::new();
        }
        match self.shaders.get(&shader) {
            Some(mock) => mock.log.chars().take(capacity).collect(),
            None => {
                self.raise(GraphicsErrorCode::InvalidValue);
                String::new()
            }
        }
    }

    fn delete_shader(&mut self, shader: NativeHandle) {
        if self.enter("delete_shader", shader.to_string()) {
            return;
        }
        if self.shaders.remove(&shader).is_none() {
            self.raise(GraphicsErrorCode::InvalidValue);
        }
    }

    // ===== Programs =====

    fn create_program(&mut self) -> NativeHandle {
        if self.enter("create_program", String::new()) {
            return NativeHandle::NONE;
        }
        let handle = self.allocate();
        self.programs.insert(handle, MockProgram::default());
        handle
    }

    fn attach_shader(&mut self, program: NativeHandle, shader: NativeHandle) {
        if self.enter("attach_shader", format!("{} {}", program, shader)) {
            return;
        }
        if !self.shaders.contains_key(&shader) {
            self.raise(GraphicsErrorCode::InvalidValue);
            return;
        }
        let code = match self.programs.get_mut(&program) {
            Some(mock) if mock.attached.contains(&shader) => Some(GraphicsErrorCode::InvalidOperation),
            Some(mock) => {
                mock.attached.push(shader);
                None
            }
            None => Some(GraphicsErrorCode::InvalidValue),
        };
        if let Some(code) = code {
            self.raise(code);
        }
    }

    fn link_program(&mut self, program: NativeHandle) {
        if self.enter("link_program", program.to_string()) {
            return;
        }
        let Some(mock) = self.programs.get(&program) else {
            self.raise(GraphicsErrorCode::InvalidValue);
            return;
        };

        let mut uniforms = Vec::new();
        let mut log = String::new();
        if mock.attached.is_empty() {
            log = "error: no shaders attached".to_string();
        }
        for shader in &mock.attached {
            match self.shaders.get(shader) {
                Some(attached) if attached.compiled => {
                    for name in declared_uniforms(&attached.source) {
                        if !uniforms.contains(&name) {
                            uniforms.push(name);
                        }
                    }
                }
                _ => {
                    log = format!("error: shader {} is not compiled", shader);
                    break;
                }
            }
        }

        if let Some(mock) = self.programs.get_mut(&program) {
            mock.linked = log.is_empty();
            mock.uniforms = if mock.linked { uniforms } else { Vec::new() };
            mock.log = log;
        }
    }

    fn program_link_status(&mut self, program: NativeHandle) -> bool {
        if self.enter("program_link_status", program.to_string()) {
            return false;
        }
        match self.programs.get(&program) {
            Some(mock) => mock.linked,
            None => {
                self.raise(GraphicsErrorCode::InvalidValue);
                false
            }
        }
    }

    fn program_info_log(&mut self, program: NativeHandle, capacity: usize) -> String {
        if self.enter("program_info_log", program.to_string()) {
            return String::new();
        }
        match self.programs.get(&program) {
            Some(mock) => mock.log.chars().take(capacity).collect(),
            None => {
                self.raise(GraphicsErrorCode::InvalidValue);
                String::new()
            }
        }
    }

    fn use_program(&mut self, program: NativeHandle) {
        if self.enter("use_program", program.to_string()) {
            return;
        }
        if program.is_none() {
            self.current_program = program;
            return;
        }
        match self.programs.get(&program) {
            Some(mock) if mock.linked => self.current_program = program,
            Some(_) => self.raise(GraphicsErrorCode::InvalidOperation),
            None => self.raise(GraphicsErrorCode::InvalidValue),
        }
    }

    fn uniform_location(&mut self, program: NativeHandle, name: &str) -> i32 {
        if self.enter("uniform_location", format!("{} {}", program, name)) {
            return -1;
        }
        match self.programs.get(&program) {
            Some(mock) if mock.linked => mock
                .uniforms
                .iter()
                .position(|uniform| uniform == name)
                .map(|location| location as i32)
                .unwrap_or(-1),
            Some(_) => {
                self.raise(GraphicsErrorCode::InvalidOperation);
                -1
            }
            None => {
                self.raise(GraphicsErrorCode::InvalidValue);
                -1
            }
        }
    }

    fn uniform_matrix4(&mut self, location: i32, matrix: &[f32; 16]) {
        if self.enter("uniform_matrix4", location.to_string()) {
            return;
        }
        self.write_uniform(location, UniformValue::Matrix4(*matrix));
    }

    fn uniform_int(&mut self, location: i32, value: i32) {
        if self.enter("uniform_int", format!("{} {}", location, value)) {
            return;
        }
        self.write_uniform(location, UniformValue::Int(value));
    }

    fn delete_program(&mut self, program: NativeHandle) {
        if self.enter("delete_program", program.to_string()) {
            return;
        }
        if self.programs.remove(&program).is_none() {
            self.raise(GraphicsErrorCode::InvalidValue);
            return;
        }
        if self.current_program == program {
            self.current_program = NativeHandle::NONE;
        }
    }

    // ===== Vertex arrays and buffers =====

    fn create_vertex_array(&mut self) -> NativeHandle {
        if self.enter("create_vertex_array", String::new()) {
            return NativeHandle::NONE;
        }
        let handle = self.allocate();
        self.vertex_arrays.insert(handle, MockVertexArray::default());
        handle
    }

    fn bind_vertex_array(&mut self, vertex_array: NativeHandle) {
        if self.enter("bind_vertex_array", vertex_array.to_string()) {
            return;
        }
        if vertex_array.is_some() && !self.vertex_arrays.contains_key(&vertex_array) {
            self.raise(GraphicsErrorCode::InvalidOperation);
            return;
        }
        self.bound_vertex_array = vertex_array;
    }

    fn create_buffer(&mut self) -> NativeHandle {
        if self.enter("create_buffer", String::new()) {
            return NativeHandle::NONE;
        }
        let handle = self.allocate();
        self.buffers.insert(handle, Vec::new());
        handle
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: NativeHandle) {
        if self.enter("bind_buffer", format!("{:?} {}", target, buffer)) {
            return;
        }
        if buffer.is_some() && !self.buffers.contains_key(&buffer) {
            self.raise(GraphicsErrorCode::InvalidOperation);
            return;
        }
        self.bound_buffers.insert(target, buffer);
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        if self.enter("buffer_data", format!("{:?} {} bytes", target, data.len())) {
            return;
        }
        let buffer = self.bound_buffer(target);
        let Some(storage) = self.buffers.get_mut(&buffer) else {
            self.raise(GraphicsErrorCode::InvalidOperation);
            return;
        };
        *storage = data.to_vec();

        // The element buffer binding is vertex array state
        if target == BufferTarget::Index {
            if let Some(vertex_array) = self.vertex_arrays.get_mut(&self.bound_vertex_array) {
                vertex_array.indices = data
                    .chunks_exact(4)
                    .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect();
            }
        }
    }

    fn enable_vertex_attribute(&mut self, slot: u32) {
        if self.enter("enable_vertex_attribute", slot.to_string()) {
            return;
        }
        match self.vertex_arrays.get_mut(&self.bound_vertex_array) {
            Some(vertex_array) if slot < 16 => {
                vertex_array.enabled.insert(slot);
            }
            Some(_) => self.raise(GraphicsErrorCode::InvalidValue),
            None => self.raise(GraphicsErrorCode::InvalidOperation),
        }
    }

    fn vertex_attribute_pointer(&mut self, slot: u32, components: u32) {
        if self.enter("vertex_attribute_pointer", format!("{} {}", slot, components)) {
            return;
        }
        if !(1..=4).contains(&components) || slot >= 16 {
            self.raise(GraphicsErrorCode::InvalidValue);
            return;
        }
        let buffer = self.bound_buffer(BufferTarget::Vertex);
        let Some(bytes) = self.buffers.get(&buffer) else {
            self.raise(GraphicsErrorCode::InvalidOperation);
            return;
        };
        let data: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        match self.vertex_arrays.get_mut(&self.bound_vertex_array) {
            Some(vertex_array) => {
                vertex_array.attributes.insert(slot, MockAttribute { components, data });
            }
            None => self.raise(GraphicsErrorCode::InvalidOperation),
        }
    }

    fn delete_buffer(&mut self, buffer: NativeHandle) {
        if self.enter("delete_buffer", buffer.to_string()) {
            return;
        }
        if self.buffers.remove(&buffer).is_none() {
            self.raise(GraphicsErrorCode::InvalidValue);
            return;
        }
        self.bound_buffers.retain(|_, bound| *bound != buffer);
    }

    fn delete_vertex_array(&mut self, vertex_array: NativeHandle) {
        if self.enter("delete_vertex_array", vertex_array.to_string()) {
            return;
        }
        if self.vertex_arrays.remove(&vertex_array).is_none() {
            self.raise(GraphicsErrorCode::InvalidValue);
            return;
        }
        if self.bound_vertex_array == vertex_array {
            self.bound_vertex_array = NativeHandle::NONE;
        }
    }

    fn draw_indexed(&mut self, index_count: u32) {
        if self.enter("draw_indexed", index_count.to_string()) {
            return;
        }
        match self.vertex_arrays.get(&self.bound_vertex_array) {
            Some(vertex_array) if index_count as usize <= vertex_array.indices.len() => {
                self.draws.push((self.bound_vertex_array, index_count));
            }
            _ => self.raise(GraphicsErrorCode::InvalidOperation),
        }
    }
}

impl MockGraphicsDevice {
    fn write_uniform(&mut self, location: i32, value: UniformValue) {
        if location == -1 {
            return;
        }
        let name = match self.programs.get(&self.current_program) {
            Some(program) => program.uniforms.get(location as usize).cloned(),
            None => None,
        };
        match name {
            Some(name) => self.uniform_writes.push((name, value)),
            None => self.raise(GraphicsErrorCode::InvalidOperation),
        }
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
