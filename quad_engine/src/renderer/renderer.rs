/// Renderer facade - clear the frame, issue indexed draws
///
/// Owns no resources. `draw` binds program, vertex array and index buffer in
/// that order, then draws `index_buffer.count()` indices as triangles.

use std::rc::Rc;

use crate::device::{ClearFlags, GpuContext, PrimitiveTopology};
use crate::resource::{IndexBuffer, ShaderProgram, VertexArray};
use crate::{device_call, engine_trace};

/// Per-frame counters, reset by `begin_frame`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    pub draw_calls: u32,
    /// Indices submitted across all draws
    pub indices: u64,
}

pub struct Renderer {
    ctx: Rc<GpuContext>,
    clear_color: [f32; 4],
    stats: RendererStats,
}

impl Renderer {
    /// Clear color starts as `RendererConfig::clear_color`
    pub fn new(ctx: &Rc<GpuContext>) -> Self {
        Self {
            ctx: Rc::clone(ctx),
            clear_color: ctx.config().clear_color,
            stats: RendererStats::default(),
        }
    }

    pub fn context(&self) -> &Rc<GpuContext> {
        &self.ctx
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.clear_color = rgba;
    }

    /// Clear the color buffer for a new frame
    pub fn clear(&self) {
        device_call!(self.ctx, |d| d.clear_color(self.clear_color));
        device_call!(self.ctx, |d| d.clear(ClearFlags::COLOR));
    }

    /// Source-alpha / one-minus-source-alpha blending
    pub fn enable_blending(&self) {
        device_call!(self.ctx, |d| d.set_alpha_blending(true));
    }

    pub fn disable_blending(&self) {
        device_call!(self.ctx, |d| d.set_alpha_blending(false));
    }

    /// Bind all three and issue one indexed triangle draw
    ///
    /// Invalid objects are bound as "none"; the device decides what that
    /// draw does.
    pub fn draw(&mut self, vertex_array: &VertexArray, index_buffer: &IndexBuffer, shader: &ShaderProgram) {
        shader.bind();
        vertex_array.bind();
        index_buffer.bind();

        let count = index_buffer.count();
        device_call!(self.ctx, |d| d.draw_elements(PrimitiveTopology::TriangleList, count, 0));

        self.stats.draw_calls += 1;
        self.stats.indices += u64::from(count);
        engine_trace!(
            "quad::Renderer",
            "Draw {} indices (program {}, array {})",
            count,
            shader.handle(),
            vertex_array.handle()
        );
    }

    /// Reset per-frame counters
    pub fn begin_frame(&mut self) {
        self.stats = RendererStats::default();
    }

    pub fn stats(&self) -> RendererStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
