/// Shader program - `#shader`-sectioned source, compile, link, uniform cache
///
/// Compile and link failures are soft: they are logged with the device's
/// info log and leave an invalid program (`is_valid() == false`) that binds
/// as "no program". Only device allocation failure is returned as an error.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::device::{DeviceHandle, GpuContext, ShaderStage, UniformValue, UNIFORM_NOT_FOUND};
use crate::error::{Error, Result};
use crate::{device_call, engine_bail, engine_debug, engine_error, engine_warn};

// ============================================================================
// ShaderSource
// ============================================================================

/// Vertex and fragment sources split out of one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

#[derive(Clone, Copy)]
enum Section {
    None,
    Vertex,
    Fragment,
}

impl ShaderSource {
    /// Split `text` on `#shader vertex` / `#shader fragment` directive lines
    ///
    /// Lines before the first directive are dropped. A directive naming
    /// neither stage is dropped and keeps the current section. Every kept
    /// line is terminated with `\n`; a missing section stays empty.
    pub fn parse(text: &str) -> Self {
        let mut source = Self::default();
        let mut section = Section::None;

        for line in text.lines() {
            if line.contains("#shader") {
                if line.contains("vertex") {
                    section = Section::Vertex;
                } else if line.contains("fragment") {
                    section = Section::Fragment;
                }
                continue;
            }
            let target = match section {
                Section::None => continue,
                Section::Vertex => &mut source.vertex,
                Section::Fragment => &mut source.fragment,
            };
            target.push_str(line);
            target.push('\n');
        }
        source
    }

    /// Read and parse a shader file
    ///
    /// # Errors
    ///
    /// `Error::ResourceNotFound` if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ResourceNotFound(format!("{}: {}", path.display(), e)))?;
        Ok(Self::parse(&text))
    }
}

// ============================================================================
// ShaderProgram
// ============================================================================

/// Linked vertex + fragment program
pub struct ShaderProgram {
    ctx: Rc<GpuContext>,
    handle: DeviceHandle,
    path: Option<PathBuf>,
    /// Name -> location, misses cached as `UNIFORM_NOT_FOUND`
    uniform_cache: FxHashMap<String, i32>,
}

impl ShaderProgram {
    /// Load, compile and link a `#shader`-sectioned file
    ///
    /// An unreadable file is logged and yields an invalid program.
    pub fn from_file(ctx: &Rc<GpuContext>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut program = match ShaderSource::from_file(path) {
            Ok(source) => Self::from_source(ctx, &source)?,
            Err(e) => {
                engine_error!("quad::ShaderProgram", "Cannot read shader: {}", e);
                Self::invalid(ctx)
            }
        };
        program.path = Some(path.to_path_buf());
        Ok(program)
    }

    /// Compile both stages and link them
    ///
    /// # Errors
    ///
    /// `Error::OutOfMemory` if the device cannot allocate a shader or program.
    pub fn from_source(ctx: &Rc<GpuContext>, source: &ShaderSource) -> Result<Self> {
        let vertex = compile_stage(ctx, ShaderStage::Vertex, &source.vertex)?;
        let fragment = match compile_stage(ctx, ShaderStage::Fragment, &source.fragment) {
            Ok(fragment) => fragment,
            Err(e) => {
                release_stage(ctx, vertex);
                return Err(e);
            }
        };

        let (Some(vertex), Some(fragment)) = (vertex, fragment) else {
            release_stage(ctx, vertex);
            release_stage(ctx, fragment);
            return Ok(Self::invalid(ctx));
        };

        let program = device_call!(ctx, |d| d.create_program());
        if !program.is_valid() {
            release_stage(ctx, Some(vertex));
            release_stage(ctx, Some(fragment));
            engine_bail!("quad::ShaderProgram" => Error::OutOfMemory, "Device returned no program");
        }

        device_call!(ctx, |d| d.attach_shader(program, vertex));
        device_call!(ctx, |d| d.attach_shader(program, fragment));
        device_call!(ctx, |d| d.link_program(program));
        let linked = device_call!(ctx, |d| d.program_link_status(program));
        for stage in [vertex, fragment] {
            device_call!(ctx, |d| d.detach_shader(program, stage));
            device_call!(ctx, |d| d.delete_shader(stage));
        }

        if !linked {
            let log = device_call!(ctx, |d| d.program_info_log(program));
            engine_error!("quad::ShaderProgram", "Failed to link program:\n{}", log);
            device_call!(ctx, |d| d.delete_program(program));
            return Ok(Self::invalid(ctx));
        }

        if !device_call!(ctx, |d| d.validate_program(program)) {
            let log = device_call!(ctx, |d| d.program_info_log(program));
            engine_warn!("quad::ShaderProgram", "Program {} failed validation:\n{}", program, log);
        }

        engine_debug!("quad::ShaderProgram", "Program {} linked", program);
        Ok(Self {
            ctx: Rc::clone(ctx),
            handle: program,
            path: None,
            uniform_cache: FxHashMap::default(),
        })
    }

    fn invalid(ctx: &Rc<GpuContext>) -> Self {
        Self {
            ctx: Rc::clone(ctx),
            handle: DeviceHandle::NULL,
            path: None,
            uniform_cache: FxHashMap::default(),
        }
    }

    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    /// False after a compile, link or read failure
    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    /// Source file, when loaded with `from_file`
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Make this the current program
    pub fn bind(&self) {
        device_call!(self.ctx, |d| d.use_program(self.handle));
    }

    pub fn unbind(&self) {
        device_call!(self.ctx, |d| d.use_program(DeviceHandle::NULL));
    }

    // ===== UNIFORMS =====

    /// Location of `name`, queried from the device at most once
    ///
    /// A name that does not resolve is logged once and cached as
    /// `UNIFORM_NOT_FOUND`; setting it is then a no-op on the device.
    pub fn uniform_location(&mut self, name: &str) -> i32 {
        if let Some(&location) = self.uniform_cache.get(name) {
            return location;
        }

        let location = if self.handle.is_valid() {
            device_call!(self.ctx, |d| d.get_uniform_location(self.handle, name))
        } else {
            UNIFORM_NOT_FOUND
        };
        if location == UNIFORM_NOT_FOUND {
            engine_warn!("quad::ShaderProgram", "Warning: uniform {} doesn't exist!", name);
        }
        self.uniform_cache.insert(name.to_string(), location);
        location
    }

    /// Upload `value` to `name` on the current program
    ///
    /// The program must be bound first.
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        let location = self.uniform_location(name);
        device_call!(self.ctx, |d| d.set_uniform(location, &value));
    }

    pub fn set_uniform_1i(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }

    pub fn set_uniform_1f(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    pub fn set_uniform_4f(&mut self, name: &str, v0: f32, v1: f32, v2: f32, v3: f32) {
        self.set_uniform(name, UniformValue::Vec4(glam::Vec4::new(v0, v1, v2, v3)));
    }

    pub fn set_uniform_mat4f(&mut self, name: &str, matrix: &glam::Mat4) {
        self.set_uniform(name, UniformValue::Mat4(*matrix));
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if self.handle.is_valid() {
            device_call!(self.ctx, |d| d.delete_program(self.handle));
        }
    }
}

impl std::fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("handle", &self.handle)
            .field("path", &self.path)
            .field("cached_uniforms", &self.uniform_cache.len())
            .finish()
    }
}

// ============================================================================
// Stage helpers
// ============================================================================

fn stage_name(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => "vertex",
        ShaderStage::Fragment => "fragment",
    }
}

/// Compile one stage; `Ok(None)` when compilation failed (already released)
fn compile_stage(ctx: &GpuContext, stage: ShaderStage, source: &str) -> Result<Option<DeviceHandle>> {
    let shader = device_call!(ctx, |d| d.create_shader(stage));
    if !shader.is_valid() {
        engine_bail!(
            "quad::ShaderProgram" => Error::OutOfMemory,
            "Device returned no {} shader",
            stage_name(stage)
        );
    }

    device_call!(ctx, |d| d.shader_source(shader, source));
    device_call!(ctx, |d| d.compile_shader(shader));
    if device_call!(ctx, |d| d.shader_compile_status(shader)) {
        return Ok(Some(shader));
    }

    let log = device_call!(ctx, |d| d.shader_info_log(shader));
    engine_error!(
        "quad::ShaderProgram",
        "Failed to compile {} shader:\n{}",
        stage_name(stage),
        log
    );
    device_call!(ctx, |d| d.delete_shader(shader));
    Ok(None)
}

fn release_stage(ctx: &GpuContext, shader: Option<DeviceHandle>) {
    if let Some(shader) = shader {
        device_call!(ctx, |d| d.delete_shader(shader));
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
