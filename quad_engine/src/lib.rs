/*!
# Quad Engine

Handle-based rendering core for drawing textured, colored primitives through a
state-machine graphics API.

The crate owns no window and no native context. A backend crate implements
[`GraphicsDevice`](quad::device::GraphicsDevice) over a real API, the caller
wraps it in a [`GpuContext`](quad::device::GpuContext), and every resource
created from that context keeps it alive.

## Architecture

- **GraphicsDevice**: one-call-per-method device trait, errors polled with `get_error`
- **GpuContext**: shared binding context plus traced-call diagnostics (`device_call!`)
- **VertexBuffer / IndexBuffer**: immutable device buffers
- **VertexBufferLayout / VertexArray**: attribute description and capture
- **ShaderProgram**: `#shader`-sectioned source, compile, link, uniform cache
- **Texture**: image file or raw RGBA8 upload
- **Renderer / FrameLoop**: clear, draw, present

`MockGraphicsDevice` records every call and resolves indexed draws, so the
whole pipeline can be exercised without a GPU.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod device;
pub mod resource;
pub mod renderer;

// Main quad namespace module
pub mod quad {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facade
    pub use crate::engine::Engine;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Device sub-module: trait, handles, context, diagnostics, mock
    pub mod device {
        pub use crate::device::*;
        pub use crate::device::mock_device::MockGraphicsDevice;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Render sub-module
    pub mod render {
        pub use crate::renderer::*;
    }
}

// Re-export math library at crate root
pub use glam;
