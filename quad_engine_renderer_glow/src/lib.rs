/*!
# Quad Engine - OpenGL Backend

OpenGL implementation of the quad_engine `GraphicsDevice` trait, built on
glow.

Window and context creation are not part of this crate: load a
`glow::Context` with the platform layer of your choice, make it current,
then wrap it.

```no_run
use std::rc::Rc;
use quad_engine::quad::device::{GpuContext, RendererConfig};
use quad_engine_renderer_glow::GlowDevice;

# fn setup(gl: glow::Context) -> quad_engine::quad::Result<()> {
let device = Rc::new(GlowDevice::new(gl)?);
let ctx = GpuContext::new(device, RendererConfig::default());
# Ok(())
# }
```
*/

mod glow_device;
mod glow_format;

pub use glow_device::GlowDevice;

// Namespace mirroring the core crate
pub mod quad {
    pub use crate::glow_device::GlowDevice;
}
