use super::*;
use crate::device::mock_device::{DeviceCall, MockGraphicsDevice, ObjectKind};
use crate::engine::Engine;
use crate::log::{LogEntry, LogSeverity, Logger};
use serial_test::serial;
use std::sync::{Arc, Mutex};

const VERTEX: &str = "#version 330 core\n\
layout(location = 0) in vec4 position;\n\
uniform mat4 u_MVP;\n\
void main() { gl_Position = u_MVP * position; }\n";

const FRAGMENT: &str = "#version 330 core\n\
layout(location = 0) out vec4 color;\n\
uniform vec4 u_Color;\n\
uniform sampler2D u_Texture;\n\
void main() { color = u_Color; }\n";

fn basic_source() -> ShaderSource {
    ShaderSource {
        vertex: VERTEX.to_string(),
        fragment: FRAGMENT.to_string(),
    }
}

// ============================================================================
// ShaderSource::parse
// ============================================================================

#[test]
fn test_parse_splits_sections() {
    let text = "#shader vertex\nV1\nV2\n#shader fragment\nF1\n";
    let source = ShaderSource::parse(text);
    assert_eq!(source.vertex, "V1\nV2\n");
    assert_eq!(source.fragment, "F1\n");
}

#[test]
fn test_parse_is_order_independent() {
    let forward = ShaderSource::parse("#shader vertex\nV\n#shader fragment\nF\n");
    let reversed = ShaderSource::parse("#shader fragment\nF\n#shader vertex\nV\n");
    assert_eq!(forward, reversed);
    assert_eq!(reversed.vertex, "V\n");
    assert_eq!(reversed.fragment, "F\n");
}

#[test]
fn test_parse_drops_lines_before_first_directive() {
    let source = ShaderSource::parse("// header\n\n#shader vertex\nV\n#shader fragment\nF");
    assert_eq!(source.vertex, "V\n");
    // Last line had no trailing newline, one is added
    assert_eq!(source.fragment, "F\n");
}

#[test]
fn test_parse_unknown_directive_keeps_section() {
    let source = ShaderSource::parse("#shader vertex\nA\n#shader geometry\nB\n");
    assert_eq!(source.vertex, "A\nB\n");
    assert!(source.fragment.is_empty());
}

#[test]
fn test_parse_missing_section_is_empty() {
    let source = ShaderSource::parse("#shader fragment\nF\n");
    assert!(source.vertex.is_empty());
    assert_eq!(source.fragment, "F\n");
    assert_eq!(ShaderSource::parse(""), ShaderSource::default());
}

#[test]
fn test_source_from_missing_file() {
    let result = ShaderSource::from_file("does/not/exist.shader");
    assert!(matches!(result, Err(Error::ResourceNotFound(_))));
}

#[test]
fn test_source_from_file() {
    let path = std::env::temp_dir().join(format!("quad_shader_{}.shader", std::process::id()));
    std::fs::write(&path, "#shader vertex\nV\n#shader fragment\nF\n").unwrap();
    let source = ShaderSource::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(source.vertex, "V\n");
    assert_eq!(source.fragment, "F\n");
}

// ============================================================================
// Compile / link
// ============================================================================

#[test]
fn test_from_source_links_and_releases_stages() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let program = ShaderProgram::from_source(&ctx, &basic_source()).unwrap();

    assert!(program.is_valid());
    assert!(device.is_live(program.handle()));
    assert_eq!(device.live_count(ObjectKind::Shader), 0);
    assert_eq!(device.live_count(ObjectKind::Program), 1);
    assert_eq!(ctx.diagnostic_stats().errors, 0);
}

#[test]
fn test_linked_program_is_validated() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let program = ShaderProgram::from_source(&ctx, &basic_source()).unwrap();

    let calls = device.calls();
    let link = calls.iter().position(|c| *c == DeviceCall::LinkProgram(program.handle())).unwrap();
    let validate = calls.iter().position(|c| *c == DeviceCall::ValidateProgram(program.handle())).unwrap();
    assert!(link < validate);
}

#[test]
fn test_vertex_compile_failure_yields_invalid_program() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let source = ShaderSource {
        vertex: "#error broken\n".to_string(),
        fragment: FRAGMENT.to_string(),
    };
    let program = ShaderProgram::from_source(&ctx, &source).unwrap();

    assert!(!program.is_valid());
    assert_eq!(program.handle(), DeviceHandle::NULL);
    assert_eq!(device.live_count(ObjectKind::Shader), 0);
    assert_eq!(device.live_count(ObjectKind::Program), 0);
    assert_eq!(device.double_releases(), 0);
}

#[test]
fn test_missing_fragment_section_fails_compile() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let source = ShaderSource::parse(&format!("#shader vertex\n{}", VERTEX));
    let program = ShaderProgram::from_source(&ctx, &source).unwrap();

    assert!(!program.is_valid());
    assert_eq!(device.live_count(ObjectKind::Shader), 0);
}

#[test]
fn test_allocation_failure_is_an_error() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    device.set_fail_allocations(true);
    let result = ShaderProgram::from_source(&ctx, &basic_source());
    assert!(matches!(result, Err(Error::OutOfMemory)));
    assert!(device.released().is_empty());
}

#[test]
fn test_from_file_unreadable_degrades() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let program = ShaderProgram::from_file(&ctx, "missing/basic.shader").unwrap();
    assert!(!program.is_valid());
    assert_eq!(program.path(), Some(Path::new("missing/basic.shader")));
    assert_eq!(device.live_count(ObjectKind::Program), 0);
}

#[test]
fn test_drop_releases_program_once() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let program = ShaderProgram::from_source(&ctx, &basic_source()).unwrap();
    let handle = program.handle();
    program.bind();
    drop(program);
    assert_eq!(device.release_count(handle), 1);
    assert_eq!(device.current_program(), DeviceHandle::NULL);
}

#[test]
fn test_invalid_program_drop_releases_nothing() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let source = ShaderSource::default();
    drop(ShaderProgram::from_source(&ctx, &source).unwrap());
    assert_eq!(device.double_releases(), 0);
    assert_eq!(device.live_count(ObjectKind::Program), 0);
}

// ============================================================================
// Uniforms
// ============================================================================

#[test]
fn test_uniform_location_is_cached() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let mut program = ShaderProgram::from_source(&ctx, &basic_source()).unwrap();

    let first = program.uniform_location("u_Color");
    let second = program.uniform_location("u_Color");
    assert_eq!(first, second);
    assert_eq!(first, 1);
    assert_eq!(device.uniform_queries(), 1);
}

#[test]
fn test_uniform_miss_is_cached() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let mut program = ShaderProgram::from_source(&ctx, &basic_source()).unwrap();

    assert_eq!(program.uniform_location("u_Missing"), UNIFORM_NOT_FOUND);
    assert_eq!(program.uniform_location("u_Missing"), UNIFORM_NOT_FOUND);
    assert_eq!(device.uniform_queries(), 1);
}

#[test]
fn test_invalid_program_never_queries() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let mut program = ShaderProgram::from_source(&ctx, &ShaderSource::default()).unwrap();
    assert_eq!(program.uniform_location("u_Color"), UNIFORM_NOT_FOUND);
    assert_eq!(device.uniform_queries(), 0);
}

#[test]
fn test_caches_are_per_program() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let mut a = ShaderProgram::from_source(&ctx, &basic_source()).unwrap();
    let mut b = ShaderProgram::from_source(&ctx, &basic_source()).unwrap();
    a.uniform_location("u_MVP");
    b.uniform_location("u_MVP");
    assert_eq!(device.uniform_queries(), 2);
}

#[test]
fn test_setters_upload_to_bound_program() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let mut program = ShaderProgram::from_source(&ctx, &basic_source()).unwrap();
    program.bind();

    program.set_uniform_4f("u_Color", 0.2, 0.3, 0.8, 1.0);
    program.set_uniform_1i("u_Texture", 0);
    let mvp = glam::Mat4::orthographic_rh_gl(-2.0, 2.0, -1.5, 1.5, -1.0, 1.0);
    program.set_uniform_mat4f("u_MVP", &mvp);

    let handle = program.handle();
    assert_eq!(
        device.uniform_value(handle, "u_Color"),
        Some(UniformValue::Vec4(glam::Vec4::new(0.2, 0.3, 0.8, 1.0)))
    );
    assert_eq!(device.uniform_value(handle, "u_Texture"), Some(UniformValue::Int(0)));
    assert_eq!(device.uniform_value(handle, "u_MVP"), Some(UniformValue::Mat4(mvp)));
    assert_eq!(ctx.diagnostic_stats().errors, 0);
}

#[test]
fn test_setting_missing_uniform_is_harmless() {
    let (_device, ctx) = MockGraphicsDevice::with_context();
    let mut program = ShaderProgram::from_source(&ctx, &basic_source()).unwrap();
    program.bind();
    program.set_uniform_1f("u_OptimizedOut", 1.0);
    assert_eq!(ctx.diagnostic_stats().errors, 0);
}

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

#[test]
#[serial]
fn test_uniform_miss_warns_once() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });

    let (_device, ctx) = MockGraphicsDevice::with_context();
    let mut program = ShaderProgram::from_source(&ctx, &basic_source()).unwrap();
    program.uniform_location("u_NeverDeclared");
    program.uniform_location("u_NeverDeclared");

    let warnings = entries.lock().unwrap().iter()
        .filter(|e| e.severity == LogSeverity::Warn && e.message.contains("u_NeverDeclared"))
        .count();
    Engine::reset_logger();

    assert_eq!(warnings, 1);
}

#[test]
#[serial]
fn test_validation_failure_warns_and_keeps_program() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CaptureLogger { entries: entries.clone() });

    let (device, ctx) = MockGraphicsDevice::with_context();
    device.set_fail_validation(true);
    let program = ShaderProgram::from_source(&ctx, &basic_source()).unwrap();

    let warnings: Vec<LogEntry> = entries.lock().unwrap().iter()
        .filter(|e| e.severity == LogSeverity::Warn && e.message.contains("failed validation"))
        .cloned()
        .collect();
    Engine::reset_logger();

    assert!(program.is_valid());
    assert!(device.is_live(program.handle()));
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("validation error"));
}
