/// Renderer module - draw facade and frame loop

pub mod renderer;
pub mod frame_loop;

pub use renderer::{Renderer, RendererStats};
pub use frame_loop::{FrameLoop, Presenter};
