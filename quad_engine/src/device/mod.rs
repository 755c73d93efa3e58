/// Device module - handle-based device interface, shared context, diagnostics

pub mod handle;
pub mod device;
pub mod context;
pub mod diagnostics;
pub mod mock_device;

pub use handle::*;
pub use device::*;
pub use context::*;
