/// Engine enum -> OpenGL constant conversions

use quad_engine::quad::device::{
    BufferTarget, BufferUsage, ClearFlags, ElementType, PrimitiveTopology, ShaderStage,
    TextureFilter, TextureWrap,
};

pub(crate) fn buffer_target_to_gl(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Vertex => glow::ARRAY_BUFFER,
        BufferTarget::Index => glow::ELEMENT_ARRAY_BUFFER,
    }
}

pub(crate) fn buffer_usage_to_gl(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::StaticDraw => glow::STATIC_DRAW,
        BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
    }
}

pub(crate) fn element_type_to_gl(element_type: ElementType) -> u32 {
    match element_type {
        ElementType::Float32 => glow::FLOAT,
        ElementType::UInt32 => glow::UNSIGNED_INT,
        ElementType::UInt8 => glow::UNSIGNED_BYTE,
    }
}

pub(crate) fn shader_stage_to_gl(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

pub(crate) fn texture_filter_to_gl(filter: TextureFilter) -> i32 {
    let value = match filter {
        TextureFilter::Nearest => glow::NEAREST,
        TextureFilter::Linear => glow::LINEAR,
    };
    value as i32
}

pub(crate) fn texture_wrap_to_gl(wrap: TextureWrap) -> i32 {
    let value = match wrap {
        TextureWrap::Repeat => glow::REPEAT,
        TextureWrap::ClampToEdge => glow::CLAMP_TO_EDGE,
    };
    value as i32
}

/// Out-of-range units wrap to an invalid enum; GL reports `INVALID_ENUM`
pub(crate) fn texture_unit_to_gl(unit: u32) -> u32 {
    glow::TEXTURE0.wrapping_add(unit)
}

pub(crate) fn clear_flags_to_gl(flags: ClearFlags) -> u32 {
    let mut mask = 0;
    if flags.contains(ClearFlags::COLOR) {
        mask |= glow::COLOR_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::DEPTH) {
        mask |= glow::DEPTH_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::STENCIL) {
        mask |= glow::STENCIL_BUFFER_BIT;
    }
    mask
}

pub(crate) fn topology_to_gl(topology: PrimitiveTopology) -> u32 {
    match topology {
        PrimitiveTopology::TriangleList => glow::TRIANGLES,
        PrimitiveTopology::LineList => glow::LINES,
        PrimitiveTopology::PointList => glow::POINTS,
    }
}

#[cfg(test)]
#[path = "glow_format_tests.rs"]
mod tests;
