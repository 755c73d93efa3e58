/// Texture - one device-resident RGBA8 2D image
///
/// Sampling is fixed: linear min/mag filtering, clamp-to-edge wrapping.
/// Images are flipped on load so row 0 is the bottom row, matching the
/// device's texture-coordinate origin.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::device::{DeviceHandle, GpuContext, SamplerDesc};
use crate::error::{Error, Result};
use crate::{device_call, engine_bail, engine_debug, engine_warn};

pub struct Texture {
    ctx: Rc<GpuContext>,
    handle: DeviceHandle,
    width: u32,
    height: u32,
    /// Channels in the source image (upload is always RGBA8)
    channels: u32,
    path: Option<PathBuf>,
}

impl Texture {
    /// Decode an image file and upload it
    ///
    /// A file that cannot be opened or decoded is logged and yields an
    /// invalid texture (NULL handle, zero size) that binds as "no texture".
    ///
    /// # Errors
    ///
    /// `Error::OutOfMemory` if the device cannot allocate a texture.
    pub fn from_file(ctx: &Rc<GpuContext>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = match image::open(path) {
            Ok(image) => image,
            Err(e) => {
                engine_warn!("quad::Texture", "Failed to load '{}': {}", path.display(), e);
                return Ok(Self {
                    ctx: Rc::clone(ctx),
                    handle: DeviceHandle::NULL,
                    width: 0,
                    height: 0,
                    channels: 0,
                    path: Some(path.to_path_buf()),
                });
            }
        };

        let channels = u32::from(image.color().channel_count());
        let rgba = image.flipv().to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut texture = Self::from_rgba8(ctx, width, height, rgba.as_raw())?;
        texture.channels = channels;
        texture.path = Some(path.to_path_buf());
        Ok(texture)
    }

    /// Upload tightly packed RGBA8 pixels, bottom row first
    ///
    /// # Errors
    ///
    /// `Error::InvalidResource` if `pixels` is not `width * height * 4` bytes,
    /// `Error::OutOfMemory` if the device cannot allocate a texture.
    pub fn from_rgba8(ctx: &Rc<GpuContext>, width: u32, height: u32, pixels: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::InvalidResource(format!(
                "texture {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }

        let handle = device_call!(ctx, |d| d.create_texture());
        if !handle.is_valid() {
            engine_bail!("quad::Texture" => Error::OutOfMemory, "Device returned no texture");
        }

        let sampler = SamplerDesc::default();
        device_call!(ctx, |d| d.bind_texture(handle));
        device_call!(ctx, |d| d.texture_sampling(&sampler));
        device_call!(ctx, |d| d.tex_image_2d(width, height, pixels));
        device_call!(ctx, |d| d.bind_texture(DeviceHandle::NULL));

        engine_debug!("quad::Texture", "Texture {} uploaded ({}x{})", handle, width, height);
        Ok(Self {
            ctx: Rc::clone(ctx),
            handle,
            width,
            height,
            channels: 4,
            path: None,
        })
    }

    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Activate texture unit `slot` and attach this texture to it
    pub fn bind(&self, slot: u32) {
        device_call!(self.ctx, |d| d.active_texture(slot));
        device_call!(self.ctx, |d| d.bind_texture(self.handle));
    }

    /// Detach whatever texture is on the active unit
    pub fn unbind(&self) {
        device_call!(self.ctx, |d| d.bind_texture(DeviceHandle::NULL));
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        if self.handle.is_valid() {
            device_call!(self.ctx, |d| d.delete_texture(self.handle));
        }
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("handle", &self.handle)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .finish()
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
