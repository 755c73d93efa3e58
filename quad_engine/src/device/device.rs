/// GraphicsDevice trait - handle-based, state-machine device interface
///
/// Mirrors the native graphics API one call per method: objects are named by
/// `DeviceHandle`, and every bind call replaces the single "current" object
/// of its class. Errors are not returned from calls; they are queued on the
/// device and drained with `get_error` (see `diagnostics`).

use bitflags::bitflags;
use crate::device::DeviceHandle;

// ============================================================================
// Common device types
// ============================================================================

/// Buffer binding class (each class has one shared "current buffer" slot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data
    Vertex,
    /// Element indices
    Index,
}

/// Upload frequency hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    StaticDraw,
    DynamicDraw,
}

/// Scalar type of a vertex attribute component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Float32,
    UInt32,
    UInt8,
}

impl ElementType {
    /// Size of one component in bytes
    pub fn size_bytes(self) -> u32 {
        match self {
            ElementType::Float32 => 4,
            ElementType::UInt32 => 4,
            ElementType::UInt8 => 1,
        }
    }
}

/// Attribute pointer declaration for the currently bound vertex array/buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributePointer {
    /// Attribute slot
    pub index: u32,
    /// Components per vertex (1..=4)
    pub component_count: u32,
    pub element_type: ElementType,
    pub normalized: bool,
    /// Byte distance between consecutive vertices
    pub stride: u32,
    /// Byte offset of the first component inside a vertex
    pub offset: u32,
}

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Value uploaded to a uniform location
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2(glam::Vec2),
    Vec3(glam::Vec3),
    Vec4(glam::Vec4),
    Mat4(glam::Mat4),
}

/// Location returned for a uniform the program does not expose
pub const UNIFORM_NOT_FOUND: i32 = -1;

/// Texture minification/magnification filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

/// Texture coordinate wrap mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    Repeat,
    ClampToEdge,
}

/// Sampling state applied to the currently bound texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerDesc {
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub wrap_s: TextureWrap,
    pub wrap_t: TextureWrap,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self {
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            wrap_s: TextureWrap::ClampToEdge,
            wrap_t: TextureWrap::ClampToEdge,
        }
    }
}

bitflags! {
    /// Framebuffer planes cleared by `GraphicsDevice::clear`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Primitive assembly mode for indexed draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
    LineList,
    PointList,
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Device interface implemented by backends (glow) and by the mock device.
///
/// All methods take `&self`: the device is a shared, implicitly stateful
/// context. Creation methods return `DeviceHandle::NULL` on failure. Indexed
/// draws always read 32-bit unsigned indices from the bound index buffer.
pub trait GraphicsDevice {
    // ===== DIAGNOSTICS =====

    /// Pop the oldest pending error code, `0` when none is pending
    fn get_error(&self) -> u32;

    // ===== BUFFERS =====

    fn create_buffer(&self) -> DeviceHandle;
    /// Make `buffer` current for `target`; `NULL` clears the slot
    fn bind_buffer(&self, target: BufferTarget, buffer: DeviceHandle);
    /// Replace the data store of the buffer currently bound to `target`
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    fn delete_buffer(&self, buffer: DeviceHandle);

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&self) -> DeviceHandle;
    fn bind_vertex_array(&self, array: DeviceHandle);
    fn delete_vertex_array(&self, array: DeviceHandle);
    fn enable_vertex_attrib_array(&self, index: u32);
    /// Record `pointer` against the current vertex array and vertex buffer
    fn vertex_attrib_pointer(&self, pointer: &AttributePointer);

    // ===== SHADERS / PROGRAMS =====

    fn create_shader(&self, stage: ShaderStage) -> DeviceHandle;
    fn shader_source(&self, shader: DeviceHandle, source: &str);
    fn compile_shader(&self, shader: DeviceHandle);
    fn shader_compile_status(&self, shader: DeviceHandle) -> bool;
    fn shader_info_log(&self, shader: DeviceHandle) -> String;
    fn delete_shader(&self, shader: DeviceHandle);

    fn create_program(&self) -> DeviceHandle;
    fn attach_shader(&self, program: DeviceHandle, shader: DeviceHandle);
    fn detach_shader(&self, program: DeviceHandle, shader: DeviceHandle);
    fn link_program(&self, program: DeviceHandle);
    fn program_link_status(&self, program: DeviceHandle) -> bool;
    fn program_info_log(&self, program: DeviceHandle) -> String;
    /// Check a linked program against the current state; the reason for a
    /// failure is left in `program_info_log`. Devices without a validation
    /// entry point report success.
    fn validate_program(&self, _program: DeviceHandle) -> bool {
        true
    }
    fn use_program(&self, program: DeviceHandle);
    fn delete_program(&self, program: DeviceHandle);

    /// Location of `name` in `program`, `UNIFORM_NOT_FOUND` when absent
    fn get_uniform_location(&self, program: DeviceHandle, name: &str) -> i32;
    /// Upload to `location` of the current program; `-1` is silently ignored
    fn set_uniform(&self, location: i32, value: &UniformValue);

    // ===== TEXTURES =====

    fn create_texture(&self) -> DeviceHandle;
    /// Select the texture unit subsequent `bind_texture` calls affect
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, texture: DeviceHandle);
    fn texture_sampling(&self, sampler: &SamplerDesc);
    /// Upload tightly packed RGBA8 pixels to the bound 2D texture
    fn tex_image_2d(&self, width: u32, height: u32, pixels: &[u8]);
    fn delete_texture(&self, texture: DeviceHandle);

    // ===== FRAME =====

    fn clear_color(&self, rgba: [f32; 4]);
    fn clear(&self, flags: ClearFlags);
    /// Enable (source-alpha, one-minus-source-alpha) blending, or disable blending
    fn set_alpha_blending(&self, enabled: bool);
    /// Draw `count` indices from the bound index buffer starting at `first_index`
    fn draw_elements(&self, topology: PrimitiveTopology, count: u32, first_index: u32);
}
