/// Mock GraphicsDevice for tests (no GPU required)
///
/// Emulates the device state machine closely enough to observe resource
/// behavior: handle allocation and release, one current object per binding
/// class, queued error codes, shader compile/link, uniform locations, and
/// indexed draws resolved through the bound vertex array's attribute
/// pointers. Every state-changing call is recorded as a `DeviceCall`.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::device::diagnostics::{INVALID_ENUM, INVALID_OPERATION, INVALID_VALUE, NO_ERROR};
use crate::device::{
    AttributePointer, BufferTarget, BufferUsage, ClearFlags, DeviceHandle, ElementType,
    GpuContext, GraphicsDevice, PrimitiveTopology, RendererConfig, SamplerDesc, ShaderStage,
    UniformValue, UNIFORM_NOT_FOUND,
};

/// Number of texture units the mock exposes
pub const MOCK_TEXTURE_UNITS: u32 = 32;

// ============================================================================
// Recorded data
// ============================================================================

/// Device object class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Buffer,
    VertexArray,
    Shader,
    Program,
    Texture,
}

/// One recorded state-changing device call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    CreateBuffer(DeviceHandle),
    BindBuffer(BufferTarget, DeviceHandle),
    BufferData(BufferTarget, usize),
    DeleteBuffer(DeviceHandle),
    CreateVertexArray(DeviceHandle),
    BindVertexArray(DeviceHandle),
    DeleteVertexArray(DeviceHandle),
    EnableVertexAttribArray(u32),
    VertexAttribPointer(AttributePointer),
    CreateShader(ShaderStage, DeviceHandle),
    ShaderSource(DeviceHandle),
    CompileShader(DeviceHandle),
    DeleteShader(DeviceHandle),
    CreateProgram(DeviceHandle),
    AttachShader(DeviceHandle, DeviceHandle),
    DetachShader(DeviceHandle, DeviceHandle),
    LinkProgram(DeviceHandle),
    ValidateProgram(DeviceHandle),
    UseProgram(DeviceHandle),
    DeleteProgram(DeviceHandle),
    GetUniformLocation(DeviceHandle, String),
    SetUniform(i32, UniformValue),
    CreateTexture(DeviceHandle),
    ActiveTexture(u32),
    BindTexture(DeviceHandle),
    TextureSampling(SamplerDesc),
    TexImage2D(u32, u32),
    DeleteTexture(DeviceHandle),
    ClearColor([f32; 4]),
    Clear(ClearFlags),
    SetAlphaBlending(bool),
    DrawElements(PrimitiveTopology, u32, u32),
}

/// Attribute values of one vertex, keyed by attribute slot
pub type ResolvedVertex = BTreeMap<u32, Vec<f32>>;

/// An indexed draw as the device saw it
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub topology: PrimitiveTopology,
    pub program: DeviceHandle,
    pub vertex_array: DeviceHandle,
    pub index_buffer: DeviceHandle,
    /// Index values read from the index buffer
    pub indices: Vec<u32>,
    /// One entry per index, attributes decoded through their pointers
    pub vertices: Vec<ResolvedVertex>,
}

/// Attribute pointer plus the vertex buffer it captured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturedAttribute {
    pub pointer: AttributePointer,
    pub buffer: DeviceHandle,
    pub enabled: bool,
}

// ============================================================================
// Internal state
// ============================================================================

#[derive(Debug)]
struct MockShader {
    source: String,
    compiled: bool,
    info_log: String,
    stage: ShaderStage,
}

#[derive(Debug, Default)]
struct MockProgram {
    shaders: Vec<DeviceHandle>,
    linked: bool,
    info_log: String,
    /// Uniform names, location = position
    uniforms: Vec<String>,
    values: FxHashMap<i32, UniformValue>,
}

#[derive(Debug, Default)]
struct MockVertexArray {
    enabled: Vec<u32>,
    pointers: BTreeMap<u32, (AttributePointer, DeviceHandle)>,
}

#[derive(Debug, Default)]
struct MockTexture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    sampler: Option<SamplerDesc>,
}

#[derive(Debug, Default)]
struct MockState {
    next_handle: u32,
    fail_allocations: bool,
    fail_validation: bool,
    objects: FxHashMap<DeviceHandle, ObjectKind>,
    released: Vec<(ObjectKind, DeviceHandle)>,
    double_releases: u32,

    buffers: FxHashMap<DeviceHandle, Vec<u8>>,
    vertex_arrays: FxHashMap<DeviceHandle, MockVertexArray>,
    shaders: FxHashMap<DeviceHandle, MockShader>,
    programs: FxHashMap<DeviceHandle, MockProgram>,
    textures: FxHashMap<DeviceHandle, MockTexture>,

    vertex_buffer_slot: DeviceHandle,
    index_buffer_slot: DeviceHandle,
    vertex_array_slot: DeviceHandle,
    program_slot: DeviceHandle,
    active_unit: u32,
    texture_units: FxHashMap<u32, DeviceHandle>,

    clear_color: [f32; 4],
    blending: bool,

    errors: VecDeque<u32>,
    calls: Vec<DeviceCall>,
    uniform_queries: u32,
    draws: Vec<DrawRecord>,
}

impl MockState {
    fn allocate(&mut self, kind: ObjectKind) -> DeviceHandle {
        if self.fail_allocations {
            return DeviceHandle::NULL;
        }
        self.next_handle += 1;
        let handle = DeviceHandle(self.next_handle);
        self.objects.insert(handle, kind);
        handle
    }

    fn is_kind(&self, handle: DeviceHandle, kind: ObjectKind) -> bool {
        self.objects.get(&handle) == Some(&kind)
    }

    /// Release bookkeeping; `false` when the handle was not live
    fn release(&mut self, handle: DeviceHandle, kind: ObjectKind) -> bool {
        if handle == DeviceHandle::NULL {
            return false;
        }
        if !self.is_kind(handle, kind) {
            self.double_releases += 1;
            self.errors.push_back(INVALID_VALUE);
            return false;
        }
        self.objects.remove(&handle);
        self.released.push((kind, handle));
        true
    }

    fn slot(&mut self, target: BufferTarget) -> &mut DeviceHandle {
        match target {
            BufferTarget::Vertex => &mut self.vertex_buffer_slot,
            BufferTarget::Index => &mut self.index_buffer_slot,
        }
    }

    fn resolve_vertex(&self, array: &MockVertexArray, index: u32) -> Option<ResolvedVertex> {
        let mut vertex = ResolvedVertex::new();
        for slot in &array.enabled {
            let Some((pointer, buffer)) = array.pointers.get(slot) else {
                continue;
            };
            let data = self.buffers.get(buffer)?;
            let size = pointer.element_type.size_bytes() as usize;
            let base = pointer.offset as usize + index as usize * pointer.stride as usize;
            let mut values = Vec::with_capacity(pointer.component_count as usize);
            for component in 0..pointer.component_count as usize {
                let start = base + component * size;
                let bytes = data.get(start..start + size)?;
                values.push(decode_component(pointer.element_type, pointer.normalized, bytes));
            }
            vertex.insert(*slot, values);
        }
        Some(vertex)
    }
}

fn decode_component(element_type: ElementType, normalized: bool, bytes: &[u8]) -> f32 {
    match element_type {
        ElementType::Float32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        ElementType::UInt32 => {
            let value = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            if normalized { value as f32 / u32::MAX as f32 } else { value as f32 }
        }
        ElementType::UInt8 => {
            if normalized { bytes[0] as f32 / 255.0 } else { bytes[0] as f32 }
        }
    }
}

/// Uniform names declared as `uniform <type> <name>;` in `source`
fn declared_uniforms(source: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in source.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(pos) = tokens.iter().position(|t| *t == "uniform") else {
            continue;
        };
        if let Some(name) = tokens.get(pos + 2) {
            let name = name.trim_end_matches(';');
            let name = name.split('[').next().unwrap_or(name);
            if !name.is_empty() {
                names.push(name.to_string());
            }
        }
    }
    names
}

// ============================================================================
// Mock device
// ============================================================================

/// Recording mock device
#[derive(Debug, Default)]
pub struct MockGraphicsDevice {
    state: RefCell<MockState>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh mock plus a validating context around it
    pub fn with_context() -> (Rc<Self>, Rc<GpuContext>) {
        let config = RendererConfig {
            enable_validation: true,
            app_name: "Mock".to_string(),
            ..RendererConfig::default()
        };
        Self::with_config(config)
    }

    pub fn with_config(config: RendererConfig) -> (Rc<Self>, Rc<GpuContext>) {
        let device = Rc::new(Self::new());
        let ctx = GpuContext::new(device.clone(), config);
        (device, ctx)
    }

    // ===== TEST CONTROLS =====

    /// Make every subsequent create call return `DeviceHandle::NULL`
    pub fn set_fail_allocations(&self, fail: bool) {
        self.state.borrow_mut().fail_allocations = fail;
    }

    /// Make `validate_program` fail on linked programs
    pub fn set_fail_validation(&self, fail: bool) {
        self.state.borrow_mut().fail_validation = fail;
    }

    /// Queue an error code as if the device had raised it
    pub fn inject_error(&self, code: u32) {
        self.state.borrow_mut().errors.push_back(code);
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    // ===== INSPECTION =====

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state.borrow().calls.clone()
    }

    pub fn count_calls(&self, predicate: impl Fn(&DeviceCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn pending_errors(&self) -> Vec<u32> {
        self.state.borrow().errors.iter().copied().collect()
    }

    /// Number of `get_uniform_location` queries that reached the device
    pub fn uniform_queries(&self) -> u32 {
        self.state.borrow().uniform_queries
    }

    pub fn is_live(&self, handle: DeviceHandle) -> bool {
        self.state.borrow().objects.contains_key(&handle)
    }

    pub fn live_count(&self, kind: ObjectKind) -> usize {
        self.state.borrow().objects.values().filter(|k| **k == kind).count()
    }

    /// Successful releases, in order
    pub fn released(&self) -> Vec<(ObjectKind, DeviceHandle)> {
        self.state.borrow().released.clone()
    }

    pub fn release_count(&self, handle: DeviceHandle) -> usize {
        self.state.borrow().released.iter().filter(|(_, h)| *h == handle).count()
    }

    /// Delete calls naming a handle that was not live
    pub fn double_releases(&self) -> u32 {
        self.state.borrow().double_releases
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> DeviceHandle {
        *self.state.borrow_mut().slot(target)
    }

    pub fn bound_vertex_array(&self) -> DeviceHandle {
        self.state.borrow().vertex_array_slot
    }

    pub fn current_program(&self) -> DeviceHandle {
        self.state.borrow().program_slot
    }

    pub fn active_texture_unit(&self) -> u32 {
        self.state.borrow().active_unit
    }

    pub fn bound_texture_on(&self, unit: u32) -> DeviceHandle {
        self.state.borrow().texture_units.get(&unit).copied().unwrap_or(DeviceHandle::NULL)
    }

    pub fn buffer_contents(&self, buffer: DeviceHandle) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer).cloned()
    }

    /// Attribute pointers captured by `array`, ordered by slot
    pub fn captured_attributes(&self, array: DeviceHandle) -> Vec<CapturedAttribute> {
        let state = self.state.borrow();
        let Some(vao) = state.vertex_arrays.get(&array) else {
            return Vec::new();
        };
        vao.pointers
            .iter()
            .map(|(slot, (pointer, buffer))| CapturedAttribute {
                pointer: *pointer,
                buffer: *buffer,
                enabled: vao.enabled.contains(slot),
            })
            .collect()
    }

    /// Last value uploaded to uniform `name` of `program`
    pub fn uniform_value(&self, program: DeviceHandle, name: &str) -> Option<UniformValue> {
        let state = self.state.borrow();
        let program = state.programs.get(&program)?;
        let location = program.uniforms.iter().position(|u| u == name)? as i32;
        program.values.get(&location).copied()
    }

    /// (width, height, pixel byte count, sampling) of a texture
    pub fn texture_info(&self, texture: DeviceHandle) -> Option<(u32, u32, usize, Option<SamplerDesc>)> {
        let state = self.state.borrow();
        state.textures.get(&texture).map(|t| (t.width, t.height, t.pixels.len(), t.sampler))
    }

    /// Uploaded RGBA8 rows, bottom row first
    pub fn texture_pixels(&self, texture: DeviceHandle) -> Option<Vec<u8>> {
        self.state.borrow().textures.get(&texture).map(|t| t.pixels.clone())
    }

    pub fn current_clear_color(&self) -> [f32; 4] {
        self.state.borrow().clear_color
    }

    pub fn is_blending_enabled(&self) -> bool {
        self.state.borrow().blending
    }

    pub fn draws(&self) -> Vec<DrawRecord> {
        self.state.borrow().draws.clone()
    }

    fn record(&self, call: DeviceCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn get_error(&self) -> u32 {
        self.state.borrow_mut().errors.pop_front().unwrap_or(NO_ERROR)
    }

    // ===== BUFFERS =====

    fn create_buffer(&self) -> DeviceHandle {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let handle = state.allocate(ObjectKind::Buffer);
        if handle.is_valid() {
            state.buffers.insert(handle, Vec::new());
        }
        state.calls.push(DeviceCall::CreateBuffer(handle));
        handle
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: DeviceHandle) {
        self.record(DeviceCall::BindBuffer(target, buffer));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if buffer.is_valid() && !state.is_kind(buffer, ObjectKind::Buffer) {
            state.errors.push_back(INVALID_OPERATION);
            return;
        }
        *state.slot(target) = buffer;
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], _usage: BufferUsage) {
        self.record(DeviceCall::BufferData(target, data.len()));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let bound = *state.slot(target);
        match state.buffers.get_mut(&bound) {
            Some(store) => *store = data.to_vec(),
            None => state.errors.push_back(INVALID_OPERATION),
        }
    }

    fn delete_buffer(&self, buffer: DeviceHandle) {
        self.record(DeviceCall::DeleteBuffer(buffer));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if state.release(buffer, ObjectKind::Buffer) {
            state.buffers.remove(&buffer);
            for target in [BufferTarget::Vertex, BufferTarget::Index] {
                let slot = state.slot(target);
                if *slot == buffer {
                    *slot = DeviceHandle::NULL;
                }
            }
        }
    }

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&self) -> DeviceHandle {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let handle = state.allocate(ObjectKind::VertexArray);
        if handle.is_valid() {
            state.vertex_arrays.insert(handle, MockVertexArray::default());
        }
        state.calls.push(DeviceCall::CreateVertexArray(handle));
        handle
    }

    fn bind_vertex_array(&self, array: DeviceHandle) {
        self.record(DeviceCall::BindVertexArray(array));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if array.is_valid() && !state.is_kind(array, ObjectKind::VertexArray) {
            state.errors.push_back(INVALID_OPERATION);
            return;
        }
        state.vertex_array_slot = array;
    }

    fn delete_vertex_array(&self, array: DeviceHandle) {
        self.record(DeviceCall::DeleteVertexArray(array));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if state.release(array, ObjectKind::VertexArray) {
            state.vertex_arrays.remove(&array);
            if state.vertex_array_slot == array {
                state.vertex_array_slot = DeviceHandle::NULL;
            }
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(DeviceCall::EnableVertexAttribArray(index));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let current = state.vertex_array_slot;
        match state.vertex_arrays.get_mut(&current) {
            Some(vao) => {
                if !vao.enabled.contains(&index) {
                    vao.enabled.push(index);
                }
            }
            None => state.errors.push_back(INVALID_OPERATION),
        }
    }

    fn vertex_attrib_pointer(&self, pointer: &AttributePointer) {
        self.record(DeviceCall::VertexAttribPointer(*pointer));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if !(1..=4).contains(&pointer.component_count) {
            state.errors.push_back(INVALID_VALUE);
            return;
        }
        let buffer = state.vertex_buffer_slot;
        let current = state.vertex_array_slot;
        if !buffer.is_valid() {
            state.errors.push_back(INVALID_OPERATION);
            return;
        }
        match state.vertex_arrays.get_mut(&current) {
            Some(vao) => {
                vao.pointers.insert(pointer.index, (*pointer, buffer));
            }
            None => state.errors.push_back(INVALID_OPERATION),
        }
    }

    // ===== SHADERS / PROGRAMS =====

    fn create_shader(&self, stage: ShaderStage) -> DeviceHandle {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let handle = state.allocate(ObjectKind::Shader);
        if handle.is_valid() {
            state.shaders.insert(handle, MockShader {
                source: String::new(),
                compiled: false,
                info_log: String::new(),
                stage,
            });
        }
        state.calls.push(DeviceCall::CreateShader(stage, handle));
        handle
    }

    fn shader_source(&self, shader: DeviceHandle, source: &str) {
        self.record(DeviceCall::ShaderSource(shader));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        match state.shaders.get_mut(&shader) {
            Some(s) => s.source = source.to_string(),
            None => state.errors.push_back(INVALID_VALUE),
        }
    }

    fn compile_shader(&self, shader: DeviceHandle) {
        self.record(DeviceCall::CompileShader(shader));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let Some(s) = state.shaders.get_mut(&shader) else {
            state.errors.push_back(INVALID_VALUE);
            return;
        };
        let error_line = s.source.lines().find(|l| l.trim_start().starts_with("#error"));
        if s.source.trim().is_empty() {
            s.compiled = false;
            s.info_log = format!("0:1: error: empty {:?} shader source", s.stage);
        } else if let Some(line) = error_line {
            s.compiled = false;
            s.info_log = format!("0:1: error: {}", line.trim());
        } else {
            s.compiled = true;
            s.info_log.clear();
        }
    }

    fn shader_compile_status(&self, shader: DeviceHandle) -> bool {
        self.state.borrow().shaders.get(&shader).map(|s| s.compiled).unwrap_or(false)
    }

    fn shader_info_log(&self, shader: DeviceHandle) -> String {
        self.state.borrow().shaders.get(&shader).map(|s| s.info_log.clone()).unwrap_or_default()
    }

    fn delete_shader(&self, shader: DeviceHandle) {
        self.record(DeviceCall::DeleteShader(shader));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if state.release(shader, ObjectKind::Shader) {
            state.shaders.remove(&shader);
        }
    }

    fn create_program(&self) -> DeviceHandle {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let handle = state.allocate(ObjectKind::Program);
        if handle.is_valid() {
            state.programs.insert(handle, MockProgram::default());
        }
        state.calls.push(DeviceCall::CreateProgram(handle));
        handle
    }

    fn attach_shader(&self, program: DeviceHandle, shader: DeviceHandle) {
        self.record(DeviceCall::AttachShader(program, shader));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if !state.is_kind(shader, ObjectKind::Shader) {
            state.errors.push_back(INVALID_VALUE);
            return;
        }
        match state.programs.get_mut(&program) {
            Some(p) if !p.shaders.contains(&shader) => p.shaders.push(shader),
            Some(_) => state.errors.push_back(INVALID_OPERATION),
            None => state.errors.push_back(INVALID_VALUE),
        }
    }

    fn detach_shader(&self, program: DeviceHandle, shader: DeviceHandle) {
        self.record(DeviceCall::DetachShader(program, shader));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        match state.programs.get_mut(&program) {
            Some(p) => match p.shaders.iter().position(|s| *s == shader) {
                Some(pos) => {
                    p.shaders.remove(pos);
                }
                None => state.errors.push_back(INVALID_OPERATION),
            },
            None => state.errors.push_back(INVALID_VALUE),
        }
    }

    fn link_program(&self, program: DeviceHandle) {
        self.record(DeviceCall::LinkProgram(program));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let Some(attached) = state.programs.get(&program).map(|p| p.shaders.clone()) else {
            state.errors.push_back(INVALID_VALUE);
            return;
        };

        let mut vertex = 0;
        let mut fragment = 0;
        let mut all_compiled = true;
        let mut uniforms: Vec<String> = Vec::new();
        for handle in &attached {
            if let Some(shader) = state.shaders.get(handle) {
                match shader.stage {
                    ShaderStage::Vertex => vertex += 1,
                    ShaderStage::Fragment => fragment += 1,
                }
                all_compiled &= shader.compiled;
                for name in declared_uniforms(&shader.source) {
                    if !uniforms.contains(&name) {
                        uniforms.push(name);
                    }
                }
            }
        }

        let info_log = if !all_compiled {
            Some("link error: attached shader failed to compile".to_string())
        } else if vertex != 1 || fragment != 1 {
            Some(format!(
                "link error: expected one vertex and one fragment stage, got {} and {}",
                vertex, fragment
            ))
        } else {
            None
        };

        if let Some(p) = state.programs.get_mut(&program) {
            p.values.clear();
            match info_log {
                Some(log) => {
                    p.linked = false;
                    p.info_log = log;
                    p.uniforms.clear();
                }
                None => {
                    p.linked = true;
                    p.info_log.clear();
                    p.uniforms = uniforms;
                }
            }
        }
    }

    fn program_link_status(&self, program: DeviceHandle) -> bool {
        self.state.borrow().programs.get(&program).map(|p| p.linked).unwrap_or(false)
    }

    fn program_info_log(&self, program: DeviceHandle) -> String {
        self.state.borrow().programs.get(&program).map(|p| p.info_log.clone()).unwrap_or_default()
    }

    fn validate_program(&self, program: DeviceHandle) -> bool {
        self.record(DeviceCall::ValidateProgram(program));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let fail_validation = state.fail_validation;
        let Some(p) = state.programs.get_mut(&program) else {
            state.errors.push_back(INVALID_VALUE);
            return false;
        };
        if !p.linked {
            return false;
        }
        if fail_validation {
            p.info_log = "validation error: program cannot execute in the current state".to_string();
            return false;
        }
        true
    }

    fn use_program(&self, program: DeviceHandle) {
        self.record(DeviceCall::UseProgram(program));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if program.is_valid() && !state.programs.get(&program).map(|p| p.linked).unwrap_or(false) {
            state.errors.push_back(INVALID_OPERATION);
            return;
        }
        state.program_slot = program;
    }

    fn delete_program(&self, program: DeviceHandle) {
        self.record(DeviceCall::DeleteProgram(program));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if state.release(program, ObjectKind::Program) {
            state.programs.remove(&program);
            if state.program_slot == program {
                state.program_slot = DeviceHandle::NULL;
            }
        }
    }

    fn get_uniform_location(&self, program: DeviceHandle, name: &str) -> i32 {
        self.record(DeviceCall::GetUniformLocation(program, name.to_string()));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.uniform_queries += 1;
        let location = match state.programs.get(&program) {
            Some(p) if p.linked => p.uniforms.iter().position(|u| u == name).map(|i| i as i32),
            _ => {
                state.errors.push_back(INVALID_OPERATION);
                return UNIFORM_NOT_FOUND;
            }
        };
        location.unwrap_or(UNIFORM_NOT_FOUND)
    }

    fn set_uniform(&self, location: i32, value: &UniformValue) {
        self.record(DeviceCall::SetUniform(location, *value));
        if location == UNIFORM_NOT_FOUND {
            return;
        }
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let current = state.program_slot;
        match state.programs.get_mut(&current) {
            Some(p) if location >= 0 && (location as usize) < p.uniforms.len() => {
                p.values.insert(location, *value);
            }
            _ => state.errors.push_back(INVALID_OPERATION),
        }
    }

    // ===== TEXTURES =====

    fn create_texture(&self) -> DeviceHandle {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let handle = state.allocate(ObjectKind::Texture);
        if handle.is_valid() {
            state.textures.insert(handle, MockTexture::default());
        }
        state.calls.push(DeviceCall::CreateTexture(handle));
        handle
    }

    fn active_texture(&self, unit: u32) {
        self.record(DeviceCall::ActiveTexture(unit));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if unit >= MOCK_TEXTURE_UNITS {
            state.errors.push_back(INVALID_ENUM);
            return;
        }
        state.active_unit = unit;
    }

    fn bind_texture(&self, texture: DeviceHandle) {
        self.record(DeviceCall::BindTexture(texture));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if texture.is_valid() && !state.is_kind(texture, ObjectKind::Texture) {
            state.errors.push_back(INVALID_OPERATION);
            return;
        }
        let unit = state.active_unit;
        state.texture_units.insert(unit, texture);
    }

    fn texture_sampling(&self, sampler: &SamplerDesc) {
        self.record(DeviceCall::TextureSampling(*sampler));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let bound = state.texture_units.get(&state.active_unit).copied().unwrap_or_default();
        match state.textures.get_mut(&bound) {
            Some(t) => t.sampler = Some(*sampler),
            None => state.errors.push_back(INVALID_OPERATION),
        }
    }

    fn tex_image_2d(&self, width: u32, height: u32, pixels: &[u8]) {
        self.record(DeviceCall::TexImage2D(width, height));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if pixels.len() != width as usize * height as usize * 4 {
            state.errors.push_back(INVALID_VALUE);
            return;
        }
        let bound = state.texture_units.get(&state.active_unit).copied().unwrap_or_default();
        match state.textures.get_mut(&bound) {
            Some(t) => {
                t.width = width;
                t.height = height;
                t.pixels = pixels.to_vec();
            }
            None => state.errors.push_back(INVALID_OPERATION),
        }
    }

    fn delete_texture(&self, texture: DeviceHandle) {
        self.record(DeviceCall::DeleteTexture(texture));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if state.release(texture, ObjectKind::Texture) {
            state.textures.remove(&texture);
            for bound in state.texture_units.values_mut() {
                if *bound == texture {
                    *bound = DeviceHandle::NULL;
                }
            }
        }
    }

    // ===== FRAME =====

    fn clear_color(&self, rgba: [f32; 4]) {
        self.record(DeviceCall::ClearColor(rgba));
        self.state.borrow_mut().clear_color = rgba;
    }

    fn clear(&self, flags: ClearFlags) {
        self.record(DeviceCall::Clear(flags));
    }

    fn set_alpha_blending(&self, enabled: bool) {
        self.record(DeviceCall::SetAlphaBlending(enabled));
        self.state.borrow_mut().blending = enabled;
    }

    fn draw_elements(&self, topology: PrimitiveTopology, count: u32, first_index: u32) {
        self.record(DeviceCall::DrawElements(topology, count, first_index));
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        let program = state.program_slot;
        let vertex_array = state.vertex_array_slot;
        let index_buffer = state.index_buffer_slot;
        if !program.is_valid() || !vertex_array.is_valid() || !index_buffer.is_valid() {
            state.errors.push_back(INVALID_OPERATION);
            return;
        }

        let index_bytes = state.buffers.get(&index_buffer).cloned().unwrap_or_default();
        let start = first_index as usize * 4;
        let end = start + count as usize * 4;
        let Some(range) = index_bytes.get(start..end) else {
            state.errors.push_back(INVALID_OPERATION);
            return;
        };
        let indices: Vec<u32> = range
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        let vertices: Option<Vec<ResolvedVertex>> = match state.vertex_arrays.get(&vertex_array) {
            Some(vao) => indices.iter().map(|i| state.resolve_vertex(vao, *i)).collect(),
            None => None,
        };
        let Some(vertices) = vertices else {
            state.errors.push_back(INVALID_OPERATION);
            return;
        };

        state.draws.push(DrawRecord {
            topology,
            program,
            vertex_array,
            index_buffer,
            indices,
            vertices,
        });
    }
}

#[cfg(test)]
#[path = "mock_device_tests.rs"]
mod tests;
