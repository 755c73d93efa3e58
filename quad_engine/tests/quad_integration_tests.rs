//! Integration tests for the full quad pipeline on the mock device
//!
//! Buffers, layout, vertex array, shader file, texture and renderer wired
//! together the way an application does it. No GPU required.
//!
//! Run with: cargo test --test quad_integration_tests

use std::path::PathBuf;
use std::rc::Rc;

use quad_engine::device_call;
use quad_engine::glam::{Mat4, Vec2};
use quad_engine::quad::device::diagnostics::INVALID_OPERATION;
use quad_engine::quad::device::mock_device::{DrawRecord, ObjectKind};
use quad_engine::quad::device::{
    BufferTarget, DeviceHandle, MockGraphicsDevice, PrimitiveTopology, RendererConfig, UniformValue,
};
use quad_engine::quad::render::{FrameLoop, Presenter, Renderer};
use quad_engine::quad::resource::{
    IndexBuffer, ShaderProgram, Texture, VertexArray, VertexBuffer, VertexBufferLayout,
};

// ============================================================================
// HELPERS
// ============================================================================

fn shader_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/res/shaders/basic.shader")
}

/// Position (x, y) + texture coordinate (u, v)
const QUAD_VERTICES: [f32; 16] = [
    -0.5, -0.5, 0.0, 0.0,
     0.5, -0.5, 1.0, 0.0,
     0.5,  0.5, 1.0, 1.0,
    -0.5,  0.5, 0.0, 1.0,
];

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

fn quad_layout() -> VertexBufferLayout {
    let mut layout = VertexBufferLayout::new();
    layout.push_f32(2).push_f32(2);
    layout
}

fn position(draw: &DrawRecord, i: usize) -> Vec2 {
    let p = &draw.vertices[i][&0];
    Vec2::new(p[0], p[1])
}

/// Signed area of triangle (a, b, c); positive when counter-clockwise
fn signed_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a) * 0.5
}

struct OneShot {
    presented: u32,
}

impl Presenter for OneShot {
    fn should_close(&self) -> bool {
        self.presented > 0
    }

    fn swap_buffers(&mut self) {
        self.presented += 1;
    }

    fn poll_events(&mut self) {}
}

// ============================================================================
// END TO END
// ============================================================================

#[test]
fn test_integration_quad_draws_two_ccw_triangles() {
    let (device, ctx) = MockGraphicsDevice::with_context();

    let vb = Rc::new(VertexBuffer::new(&ctx, &QUAD_VERTICES).unwrap());
    let mut va = VertexArray::new(&ctx).unwrap();
    va.add_buffer(vb, &quad_layout());
    let ib = IndexBuffer::new(&ctx, &QUAD_INDICES).unwrap();

    let mut shader = ShaderProgram::from_file(&ctx, shader_path()).unwrap();
    assert!(shader.is_valid());
    shader.bind();
    shader.set_uniform_4f("u_Color", 0.8, 0.3, 0.8, 1.0);
    shader.set_uniform_mat4f("u_MVP", &Mat4::IDENTITY);

    let mut renderer = Renderer::new(&ctx);
    renderer.clear();
    renderer.draw(&va, &ib, &shader);

    let draws = device.draws();
    assert_eq!(draws.len(), 1);
    let draw = &draws[0];
    assert_eq!(draw.topology, PrimitiveTopology::TriangleList);
    assert_eq!(draw.indices, QUAD_INDICES.to_vec());
    assert_eq!(draw.vertices.len(), 6);

    let mut covered = 0.0;
    for triangle in 0..2 {
        let a = position(draw, triangle * 3);
        let b = position(draw, triangle * 3 + 1);
        let c = position(draw, triangle * 3 + 2);
        let area = signed_area(a, b, c);
        assert!(area > 0.0, "triangle {} is not counter-clockwise", triangle);
        covered += area;
    }
    assert!((covered - 1.0f32).abs() < 1e-6);

    // Texture coordinates come through slot 1 at offset 8
    assert_eq!(draw.vertices[2][&1], vec![1.0, 1.0]);
    assert_eq!(ctx.diagnostic_stats().errors, 0);
}

#[test]
fn test_integration_textured_frame_loop() {
    let (device, ctx) = MockGraphicsDevice::with_context();

    let vb = Rc::new(VertexBuffer::new(&ctx, &QUAD_VERTICES).unwrap());
    let mut va = VertexArray::new(&ctx).unwrap();
    va.add_buffer(vb, &quad_layout());
    let ib = IndexBuffer::new(&ctx, &QUAD_INDICES).unwrap();
    let texture = Texture::from_rgba8(&ctx, 2, 2, &[200u8; 16]).unwrap();
    let mut shader = ShaderProgram::from_file(&ctx, shader_path()).unwrap();

    let mut renderer = Renderer::new(&ctx);
    renderer.enable_blending();
    let mut presenter = OneShot { presented: 0 };

    let frames = FrameLoop::run(&mut renderer, &mut presenter, None, |renderer, frame| {
        texture.bind(0);
        shader.bind();
        shader.set_uniform_1i("u_Texture", 0);
        shader.set_uniform_4f("u_Color", frame as f32, 0.0, 0.0, 1.0);
        renderer.draw(&va, &ib, &shader);
        Ok(())
    })
    .unwrap();

    assert_eq!(frames, 1);
    assert_eq!(presenter.presented, 1);
    assert!(device.is_blending_enabled());
    assert_eq!(device.bound_texture_on(0), texture.handle());
    assert_eq!(
        device.uniform_value(shader.handle(), "u_Texture"),
        Some(UniformValue::Int(0))
    );
    assert_eq!(renderer.stats().draw_calls, 1);
    assert_eq!(renderer.stats().indices, 6);
}

#[test]
fn test_integration_everything_released_once() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    {
        let vb = Rc::new(VertexBuffer::new(&ctx, &QUAD_VERTICES).unwrap());
        let mut va = VertexArray::new(&ctx).unwrap();
        va.add_buffer(vb.clone(), &quad_layout());
        let _ib = IndexBuffer::new(&ctx, &QUAD_INDICES).unwrap();
        let _shader = ShaderProgram::from_file(&ctx, shader_path()).unwrap();
        let _texture = Texture::from_rgba8(&ctx, 1, 1, &[0u8; 4]).unwrap();
        drop(vb);
    }

    for kind in [
        ObjectKind::Buffer,
        ObjectKind::VertexArray,
        ObjectKind::Shader,
        ObjectKind::Program,
        ObjectKind::Texture,
    ] {
        assert_eq!(device.live_count(kind), 0, "{:?} leaked", kind);
    }
    assert_eq!(device.double_releases(), 0);
    // 2 buffers, 1 array, 2 stages, 1 program, 1 texture
    assert_eq!(device.released().len(), 7);
}

#[test]
fn test_integration_failed_construction_never_double_releases() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    device.set_fail_allocations(true);

    assert!(VertexBuffer::new(&ctx, &QUAD_VERTICES).is_err());
    assert!(IndexBuffer::new(&ctx, &QUAD_INDICES).is_err());
    assert!(VertexArray::new(&ctx).is_err());
    assert!(ShaderProgram::from_file(&ctx, shader_path()).is_err());
    assert!(Texture::from_rgba8(&ctx, 1, 1, &[0u8; 4]).is_err());

    assert!(device.released().is_empty());
    assert_eq!(device.double_releases(), 0);
}

// ============================================================================
// DIAGNOSTICS POLICY
// ============================================================================

#[test]
fn test_integration_traced_errors_are_counted() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    device_call!(ctx, |d| d.bind_buffer(BufferTarget::Vertex, DeviceHandle(999)));

    let stats = ctx.diagnostic_stats();
    assert_eq!(stats.traced_calls, 1);
    assert_eq!(stats.errors, 1);
    assert!(device.pending_errors().is_empty());
}

#[test]
fn test_integration_stale_errors_not_attributed_to_next_call() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    device.inject_error(INVALID_OPERATION);
    device_call!(ctx, |d| d.bind_buffer(BufferTarget::Vertex, DeviceHandle::NULL));
    assert_eq!(ctx.diagnostic_stats().errors, 0);
}

#[test]
fn test_integration_validation_disabled_leaves_errors_queued() {
    let config = RendererConfig {
        enable_validation: false,
        ..RendererConfig::default()
    };
    let (device, ctx) = MockGraphicsDevice::with_config(config);
    device_call!(ctx, |d| d.bind_buffer(BufferTarget::Vertex, DeviceHandle(999)));

    assert_eq!(ctx.diagnostic_stats().traced_calls, 0);
    assert_eq!(device.pending_errors(), vec![INVALID_OPERATION]);
}

#[test]
#[should_panic(expected = "INVALID_OPERATION (1282)")]
fn test_integration_panic_on_error() {
    let config = RendererConfig {
        enable_validation: true,
        panic_on_error: true,
        ..RendererConfig::default()
    };
    let (_device, ctx) = MockGraphicsDevice::with_config(config);
    device_call!(ctx, |d| d.bind_buffer(BufferTarget::Vertex, DeviceHandle(999)));
}
