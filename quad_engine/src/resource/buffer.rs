/// Vertex and index buffers - one device allocation each
///
/// Data is uploaded once at construction and the allocation is released on
/// drop. Neither type is `Clone`: one handle, one owner. Share a vertex
/// buffer between arrays through `Rc<VertexBuffer>`.

use std::rc::Rc;

use crate::device::{BufferTarget, BufferUsage, DeviceHandle, GpuContext};
use crate::error::{Error, Result};
use crate::{device_call, engine_bail, engine_debug};

/// Allocate a buffer on `target`, bind it and upload `data`
fn create_and_upload(
    ctx: &GpuContext,
    target: BufferTarget,
    data: &[u8],
    source: &str,
) -> Result<DeviceHandle> {
    let handle = device_call!(ctx, |d| d.create_buffer());
    if !handle.is_valid() {
        engine_bail!(source => Error::OutOfMemory, "Device returned no buffer for {} bytes", data.len());
    }

    device_call!(ctx, |d| d.bind_buffer(target, handle));
    device_call!(ctx, |d| d.buffer_data(target, data, BufferUsage::StaticDraw));
    engine_debug!(source, "Buffer {} uploaded ({} bytes)", handle, data.len());
    Ok(handle)
}

// ============================================================================
// VertexBuffer
// ============================================================================

/// Per-vertex attribute data
pub struct VertexBuffer {
    ctx: Rc<GpuContext>,
    handle: DeviceHandle,
    size: usize,
}

impl VertexBuffer {
    /// Upload a slice of plain-old-data vertices
    ///
    /// # Errors
    ///
    /// `Error::OutOfMemory` if the device cannot allocate a buffer.
    pub fn new<T: bytemuck::Pod>(ctx: &Rc<GpuContext>, vertices: &[T]) -> Result<Self> {
        Self::from_bytes(ctx, bytemuck::cast_slice(vertices))
    }

    /// Upload raw bytes
    pub fn from_bytes(ctx: &Rc<GpuContext>, data: &[u8]) -> Result<Self> {
        let handle = create_and_upload(ctx, BufferTarget::Vertex, data, "quad::VertexBuffer")?;
        Ok(Self {
            ctx: Rc::clone(ctx),
            handle,
            size: data.len(),
        })
    }

    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Make this the current vertex buffer
    pub fn bind(&self) {
        device_call!(self.ctx, |d| d.bind_buffer(BufferTarget::Vertex, self.handle));
    }

    /// Clear the current vertex buffer slot
    pub fn unbind(&self) {
        device_call!(self.ctx, |d| d.bind_buffer(BufferTarget::Vertex, DeviceHandle::NULL));
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        if self.handle.is_valid() {
            device_call!(self.ctx, |d| d.delete_buffer(self.handle));
        }
    }
}

impl std::fmt::Debug for VertexBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexBuffer")
            .field("handle", &self.handle)
            .field("size", &self.size)
            .finish()
    }
}

// ============================================================================
// IndexBuffer
// ============================================================================

/// 32-bit element indices
pub struct IndexBuffer {
    ctx: Rc<GpuContext>,
    handle: DeviceHandle,
    count: u32,
}

impl IndexBuffer {
    /// Upload indices
    ///
    /// # Errors
    ///
    /// `Error::OutOfMemory` if the device cannot allocate a buffer.
    pub fn new(ctx: &Rc<GpuContext>, indices: &[u32]) -> Result<Self> {
        let count = u32::try_from(indices.len())
            .map_err(|_| Error::InvalidResource(format!("{} indices exceed u32 range", indices.len())))?;
        let handle = create_and_upload(
            ctx,
            BufferTarget::Index,
            bytemuck::cast_slice(indices),
            "quad::IndexBuffer",
        )?;
        Ok(Self {
            ctx: Rc::clone(ctx),
            handle,
            count,
        })
    }

    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    /// Number of indices, used to size draw calls
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.count as usize * std::mem::size_of::<u32>()
    }

    /// Make this the current index buffer
    pub fn bind(&self) {
        device_call!(self.ctx, |d| d.bind_buffer(BufferTarget::Index, self.handle));
    }

    /// Clear the current index buffer slot
    pub fn unbind(&self) {
        device_call!(self.ctx, |d| d.bind_buffer(BufferTarget::Index, DeviceHandle::NULL));
    }
}

impl Drop for IndexBuffer {
    fn drop(&mut self) {
        if self.handle.is_valid() {
            device_call!(self.ctx, |d| d.delete_buffer(self.handle));
        }
    }
}

impl std::fmt::Debug for IndexBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexBuffer")
            .field("handle", &self.handle)
            .field("count", &self.count)
            .finish()
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
