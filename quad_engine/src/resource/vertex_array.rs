/// Vertex array - captures buffer + layout attribute bindings
///
/// The array holds an `Rc` to every buffer it references, so a buffer lives
/// at least as long as any array that reads from it.

use std::rc::Rc;

use crate::device::{AttributePointer, DeviceHandle, GpuContext};
use crate::error::{Error, Result};
use crate::resource::buffer::VertexBuffer;
use crate::resource::layout::VertexBufferLayout;
use crate::{device_call, engine_bail, engine_debug};

pub struct VertexArray {
    ctx: Rc<GpuContext>,
    handle: DeviceHandle,
    buffers: Vec<Rc<VertexBuffer>>,
    /// Next free attribute slot
    next_attribute: u32,
}

impl VertexArray {
    /// # Errors
    ///
    /// `Error::OutOfMemory` if the device cannot allocate a vertex array.
    pub fn new(ctx: &Rc<GpuContext>) -> Result<Self> {
        let handle = device_call!(ctx, |d| d.create_vertex_array());
        if !handle.is_valid() {
            engine_bail!("quad::VertexArray" => Error::OutOfMemory, "Device returned no vertex array");
        }
        Ok(Self {
            ctx: Rc::clone(ctx),
            handle,
            buffers: Vec::new(),
            next_attribute: 0,
        })
    }

    /// Describe `buffer` to the device through `layout`
    ///
    /// Each element gets the next attribute slot; slots keep counting across
    /// calls so several buffers can feed one array.
    pub fn add_buffer(&mut self, buffer: Rc<VertexBuffer>, layout: &VertexBufferLayout) {
        self.bind();
        buffer.bind();

        let stride = layout.stride();
        let mut offset = 0u32;
        for element in layout.elements() {
            let pointer = AttributePointer {
                index: self.next_attribute,
                component_count: element.count,
                element_type: element.element_type,
                normalized: element.normalized,
                stride,
                offset,
            };
            device_call!(self.ctx, |d| d.enable_vertex_attrib_array(pointer.index));
            device_call!(self.ctx, |d| d.vertex_attrib_pointer(&pointer));
            offset += element.size_bytes();
            self.next_attribute += 1;
        }

        engine_debug!(
            "quad::VertexArray",
            "Array {} captured buffer {} ({} attributes, stride {})",
            self.handle,
            buffer.handle(),
            layout.elements().len(),
            stride
        );
        self.buffers.push(buffer);
    }

    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    /// Buffers this array reads from, in `add_buffer` order
    pub fn buffers(&self) -> &[Rc<VertexBuffer>] {
        &self.buffers
    }

    /// Number of attribute slots in use
    pub fn attribute_count(&self) -> u32 {
        self.next_attribute
    }

    /// Restore the whole captured configuration
    pub fn bind(&self) {
        device_call!(self.ctx, |d| d.bind_vertex_array(self.handle));
    }

    pub fn unbind(&self) {
        device_call!(self.ctx, |d| d.bind_vertex_array(DeviceHandle::NULL));
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        if self.handle.is_valid() {
            device_call!(self.ctx, |d| d.delete_vertex_array(self.handle));
        }
    }
}

impl std::fmt::Debug for VertexArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexArray")
            .field("handle", &self.handle)
            .field("buffers", &self.buffers.len())
            .field("attributes", &self.next_attribute)
            .finish()
    }
}

#[cfg(test)]
#[path = "vertex_array_tests.rs"]
mod tests;
