/// GlowDevice - GraphicsDevice over a current OpenGL context
///
/// The caller creates the window and the GL context (glutin, sdl2, web) and
/// hands the loaded `glow::Context` over. Engine handles are the raw GL
/// object names; `DeviceHandle::NULL` maps to "no object".

use std::num::NonZeroU32;

use glow::HasContext;
use quad_engine::{engine_error, engine_info};
use quad_engine::quad::{Error, Result};
use quad_engine::quad::device::{
    AttributePointer, BufferTarget, BufferUsage, ClearFlags, DeviceHandle, GraphicsDevice,
    PrimitiveTopology, SamplerDesc, ShaderStage, UniformValue, UNIFORM_NOT_FOUND,
};

use crate::glow_format::{
    buffer_target_to_gl, buffer_usage_to_gl, clear_flags_to_gl, element_type_to_gl,
    shader_stage_to_gl, texture_filter_to_gl, texture_unit_to_gl, texture_wrap_to_gl,
    topology_to_gl,
};

/// Engine handle -> native GL object, `None` for `NULL`
fn native<T>(handle: DeviceHandle, wrap: fn(NonZeroU32) -> T) -> Option<T> {
    NonZeroU32::new(handle.raw()).map(wrap)
}

/// Native creation result -> engine handle, logging the driver message on failure
fn issued(result: std::result::Result<NonZeroU32, String>, what: &str) -> DeviceHandle {
    match result {
        Ok(name) => DeviceHandle(name.get()),
        Err(message) => {
            engine_error!("quad::GlowDevice", "{} failed: {}", what, message);
            DeviceHandle::NULL
        }
    }
}

/// Vertex array objects are core from desktop GL 3.0 and GLES 3.0
fn require_vertex_arrays(is_embedded: bool, major: u32, minor: u32) -> Result<()> {
    if major < 3 {
        return Err(Error::InitializationFailed(format!(
            "OpenGL {}3.0 or newer required, context is {}.{}",
            if is_embedded { "ES " } else { "" },
            major,
            minor
        )));
    }
    Ok(())
}

pub struct GlowDevice {
    gl: glow::Context,
}

impl GlowDevice {
    /// Wrap a loaded context. The context must be current on this thread for
    /// the lifetime of the device.
    ///
    /// # Errors
    ///
    /// `Error::InitializationFailed` for contexts older than GL 3.0 or
    /// GLES 3.0 (vertex array objects are required).
    pub fn new(gl: glow::Context) -> Result<Self> {
        let version = gl.version();
        require_vertex_arrays(version.is_embedded, version.major, version.minor)?;
        engine_info!(
            "quad::GlowDevice",
            "OpenGL {}{}.{} {}",
            if version.is_embedded { "ES " } else { "" },
            version.major,
            version.minor,
            version.vendor_info
        );
        Ok(Self { gl })
    }

    /// Raw context, for calls the engine does not wrap
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }
}

// All `unsafe` blocks below are plain GL calls; the handles passed are either
// names this device issued or `None`.
impl GraphicsDevice for GlowDevice {
    fn get_error(&self) -> u32 {
        unsafe { self.gl.get_error() }
    }

    // ===== BUFFERS =====

    fn create_buffer(&self) -> DeviceHandle {
        issued(unsafe { self.gl.create_buffer() }.map(|b| b.0), "create_buffer")
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: DeviceHandle) {
        unsafe {
            self.gl.bind_buffer(buffer_target_to_gl(target), native(buffer, glow::NativeBuffer));
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe {
            self.gl.buffer_data_u8_slice(buffer_target_to_gl(target), data, buffer_usage_to_gl(usage));
        }
    }

    fn delete_buffer(&self, buffer: DeviceHandle) {
        if let Some(buffer) = native(buffer, glow::NativeBuffer) {
            unsafe { self.gl.delete_buffer(buffer) }
        }
    }

    // ===== VERTEX ARRAYS =====

    fn create_vertex_array(&self) -> DeviceHandle {
        issued(unsafe { self.gl.create_vertex_array() }.map(|v| v.0), "create_vertex_array")
    }

    fn bind_vertex_array(&self, array: DeviceHandle) {
        unsafe { self.gl.bind_vertex_array(native(array, glow::NativeVertexArray)) }
    }

    fn delete_vertex_array(&self, array: DeviceHandle) {
        if let Some(array) = native(array, glow::NativeVertexArray) {
            unsafe { self.gl.delete_vertex_array(array) }
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_pointer(&self, pointer: &AttributePointer) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                pointer.index,
                pointer.component_count as i32,
                element_type_to_gl(pointer.element_type),
                pointer.normalized,
                pointer.stride as i32,
                pointer.offset as i32,
            );
        }
    }

    // ===== SHADERS / PROGRAMS =====

    fn create_shader(&self, stage: ShaderStage) -> DeviceHandle {
        issued(
            unsafe { self.gl.create_shader(shader_stage_to_gl(stage)) }.map(|s| s.0),
            "create_shader",
        )
    }

    fn shader_source(&self, shader: DeviceHandle, source: &str) {
        if let Some(shader) = native(shader, glow::NativeShader) {
            unsafe { self.gl.shader_source(shader, source) }
        }
    }

    fn compile_shader(&self, shader: DeviceHandle) {
        if let Some(shader) = native(shader, glow::NativeShader) {
            unsafe { self.gl.compile_shader(shader) }
        }
    }

    fn shader_compile_status(&self, shader: DeviceHandle) -> bool {
        native(shader, glow::NativeShader)
            .map(|shader| unsafe { self.gl.get_shader_compile_status(shader) })
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: DeviceHandle) -> String {
        native(shader, glow::NativeShader)
            .map(|shader| unsafe { self.gl.get_shader_info_log(shader) })
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: DeviceHandle) {
        if let Some(shader) = native(shader, glow::NativeShader) {
            unsafe { self.gl.delete_shader(shader) }
        }
    }

    fn create_program(&self) -> DeviceHandle {
        issued(unsafe { self.gl.create_program() }.map(|p| p.0), "create_program")
    }

    fn attach_shader(&self, program: DeviceHandle, shader: DeviceHandle) {
        if let (Some(program), Some(shader)) =
            (native(program, glow::NativeProgram), native(shader, glow::NativeShader))
        {
            unsafe { self.gl.attach_shader(program, shader) }
        }
    }

    fn detach_shader(&self, program: DeviceHandle, shader: DeviceHandle) {
        if let (Some(program), Some(shader)) =
            (native(program, glow::NativeProgram), native(shader, glow::NativeShader))
        {
            unsafe { self.gl.detach_shader(program, shader) }
        }
    }

    fn link_program(&self, program: DeviceHandle) {
        if let Some(program) = native(program, glow::NativeProgram) {
            unsafe { self.gl.link_program(program) }
        }
    }

    fn program_link_status(&self, program: DeviceHandle) -> bool {
        native(program, glow::NativeProgram)
            .map(|program| unsafe { self.gl.get_program_link_status(program) })
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: DeviceHandle) -> String {
        native(program, glow::NativeProgram)
            .map(|program| unsafe { self.gl.get_program_info_log(program) })
            .unwrap_or_default()
    }

    fn use_program(&self, program: DeviceHandle) {
        unsafe { self.gl.use_program(native(program, glow::NativeProgram)) }
    }

    fn delete_program(&self, program: DeviceHandle) {
        if let Some(program) = native(program, glow::NativeProgram) {
            unsafe { self.gl.delete_program(program) }
        }
    }

    fn get_uniform_location(&self, program: DeviceHandle, name: &str) -> i32 {
        let Some(program) = native(program, glow::NativeProgram) else {
            return UNIFORM_NOT_FOUND;
        };
        unsafe { self.gl.get_uniform_location(program, name) }
            .map(|location| location.0 as i32)
            .unwrap_or(UNIFORM_NOT_FOUND)
    }

    fn set_uniform(&self, location: i32, value: &UniformValue) {
        if location < 0 {
            return;
        }
        let location = glow::NativeUniformLocation(location as u32);
        let location = Some(&location);
        unsafe {
            match value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, *v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, *v),
                UniformValue::Vec2(v) => self.gl.uniform_2_f32(location, v.x, v.y),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(location, v.x, v.y, v.z),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32(location, v.x, v.y, v.z, v.w),
                UniformValue::Mat4(m) => {
                    self.gl.uniform_matrix_4_f32_slice(location, false, &m.to_cols_array())
                }
            }
        }
    }

    // ===== TEXTURES =====

    fn create_texture(&self) -> DeviceHandle {
        issued(unsafe { self.gl.create_texture() }.map(|t| t.0), "create_texture")
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(texture_unit_to_gl(unit)) }
    }

    fn bind_texture(&self, texture: DeviceHandle) {
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, native(texture, glow::NativeTexture)) }
    }

    fn texture_sampling(&self, sampler: &SamplerDesc) {
        let parameters = [
            (glow::TEXTURE_MIN_FILTER, texture_filter_to_gl(sampler.min_filter)),
            (glow::TEXTURE_MAG_FILTER, texture_filter_to_gl(sampler.mag_filter)),
            (glow::TEXTURE_WRAP_S, texture_wrap_to_gl(sampler.wrap_s)),
            (glow::TEXTURE_WRAP_T, texture_wrap_to_gl(sampler.wrap_t)),
        ];
        for (parameter, value) in parameters {
            unsafe { self.gl.tex_parameter_i32(glow::TEXTURE_2D, parameter, value) }
        }
    }

    fn tex_image_2d(&self, width: u32, height: u32, pixels: &[u8]) {
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(pixels),
            );
        }
    }

    fn delete_texture(&self, texture: DeviceHandle) {
        if let Some(texture) = native(texture, glow::NativeTexture) {
            unsafe { self.gl.delete_texture(texture) }
        }
    }

    // ===== FRAME =====

    fn clear_color(&self, rgba: [f32; 4]) {
        unsafe { self.gl.clear_color(rgba[0], rgba[1], rgba[2], rgba[3]) }
    }

    fn clear(&self, flags: ClearFlags) {
        unsafe { self.gl.clear(clear_flags_to_gl(flags)) }
    }

    fn set_alpha_blending(&self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::BLEND);
                self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            } else {
                self.gl.disable(glow::BLEND);
            }
        }
    }

    fn draw_elements(&self, topology: PrimitiveTopology, count: u32, first_index: u32) {
        let offset = (first_index as usize * std::mem::size_of::<u32>()) as i32;
        unsafe {
            self.gl.draw_elements(topology_to_gl(topology), count as i32, glow::UNSIGNED_INT, offset);
        }
    }
}

#[cfg(test)]
#[path = "glow_device_tests.rs"]
mod tests;
