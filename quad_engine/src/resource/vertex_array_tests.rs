use super::*;
use crate::device::mock_device::{MockGraphicsDevice, ObjectKind};
use crate::device::{BufferTarget, ElementType};

fn position_color_layout() -> VertexBufferLayout {
    let mut layout = VertexBufferLayout::new();
    layout.push_f32(2).push_u8(4);
    layout
}

// ============================================================================
// ATTRIBUTE CAPTURE
// ============================================================================

#[test]
fn test_add_buffer_declares_every_element() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let vb = Rc::new(VertexBuffer::from_bytes(&ctx, &[0u8; 24]).unwrap());
    let mut va = VertexArray::new(&ctx).unwrap();
    va.add_buffer(vb.clone(), &position_color_layout());

    let attributes = device.captured_attributes(va.handle());
    assert_eq!(attributes.len(), 2);

    let position = attributes[0];
    assert!(position.enabled);
    assert_eq!(position.buffer, vb.handle());
    assert_eq!(position.pointer.index, 0);
    assert_eq!(position.pointer.component_count, 2);
    assert_eq!(position.pointer.element_type, ElementType::Float32);
    assert!(!position.pointer.normalized);
    assert_eq!(position.pointer.stride, 12);
    assert_eq!(position.pointer.offset, 0);

    let color = attributes[1];
    assert_eq!(color.pointer.index, 1);
    assert_eq!(color.pointer.element_type, ElementType::UInt8);
    assert!(color.pointer.normalized);
    assert_eq!(color.pointer.stride, 12);
    assert_eq!(color.pointer.offset, 8);

    assert_eq!(va.attribute_count(), 2);
    assert_eq!(ctx.diagnostic_stats().errors, 0);
}

#[test]
fn test_add_buffer_leaves_array_and_buffer_bound() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let vb = Rc::new(VertexBuffer::from_bytes(&ctx, &[0u8; 12]).unwrap());
    let other = VertexBuffer::from_bytes(&ctx, &[0u8; 12]).unwrap();
    let mut va = VertexArray::new(&ctx).unwrap();

    other.bind();
    va.add_buffer(vb.clone(), &position_color_layout());
    assert_eq!(device.bound_vertex_array(), va.handle());
    assert_eq!(device.bound_buffer(BufferTarget::Vertex), vb.handle());
}

#[test]
fn test_slots_continue_across_buffers() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let positions = Rc::new(VertexBuffer::new(&ctx, &[0.0f32; 8]).unwrap());
    let colors = Rc::new(VertexBuffer::new(&ctx, &[0u8; 16]).unwrap());

    let mut position_layout = VertexBufferLayout::new();
    position_layout.push_f32(2);
    let mut color_layout = VertexBufferLayout::new();
    color_layout.push_u8(4);

    let mut va = VertexArray::new(&ctx).unwrap();
    va.add_buffer(positions.clone(), &position_layout);
    va.add_buffer(colors.clone(), &color_layout);

    let attributes = device.captured_attributes(va.handle());
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes[0].buffer, positions.handle());
    assert_eq!(attributes[1].buffer, colors.handle());
    assert_eq!(attributes[1].pointer.index, 1);
    assert_eq!(attributes[1].pointer.offset, 0);
    assert_eq!(attributes[1].pointer.stride, 4);
    assert_eq!(va.buffers().len(), 2);
}

// ============================================================================
// OWNERSHIP / LIFETIME
// ============================================================================

#[test]
fn test_array_keeps_buffer_alive() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let mut va = VertexArray::new(&ctx).unwrap();
    let buffer_handle = {
        let vb = Rc::new(VertexBuffer::from_bytes(&ctx, &[0u8; 12]).unwrap());
        va.add_buffer(vb.clone(), &position_color_layout());
        vb.handle()
    };
    // Caller's Rc is gone, the array still holds one
    assert!(device.is_live(buffer_handle));

    let array_handle = va.handle();
    drop(va);
    assert!(!device.is_live(array_handle));
    assert!(!device.is_live(buffer_handle));
    assert_eq!(device.release_count(array_handle), 1);
    assert_eq!(device.release_count(buffer_handle), 1);
    assert_eq!(device.double_releases(), 0);
}

#[test]
fn test_allocation_failure() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    device.set_fail_allocations(true);
    assert!(matches!(VertexArray::new(&ctx), Err(Error::OutOfMemory)));
    assert_eq!(device.live_count(ObjectKind::VertexArray), 0);
    assert!(device.released().is_empty());
}

#[test]
fn test_bind_unbind() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let a = VertexArray::new(&ctx).unwrap();
    let b = VertexArray::new(&ctx).unwrap();
    a.bind();
    b.bind();
    assert_eq!(device.bound_vertex_array(), b.handle());
    b.unbind();
    assert_eq!(device.bound_vertex_array(), DeviceHandle::NULL);
}
