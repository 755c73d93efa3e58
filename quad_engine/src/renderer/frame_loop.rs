/// Frame loop - clear, per-frame work, swap, poll
///
/// The window and native context live behind `Presenter`; the loop only
/// drives the order of operations.

use crate::engine_info;
use crate::error::Result;
use crate::renderer::Renderer;

/// Platform side of the loop (window, swap chain, event queue)
pub trait Presenter {
    /// True once the platform asked to close (window closed, etc.)
    fn should_close(&self) -> bool;

    /// Present the finished frame
    fn swap_buffers(&mut self);

    /// Process pending platform events
    fn poll_events(&mut self);
}

pub struct FrameLoop;

impl FrameLoop {
    /// Run frames until the presenter asks to close or `max_frames` is reached
    ///
    /// Each frame: `begin_frame`, `clear`, `per_frame(renderer, frame_index)`,
    /// `swap_buffers`, `poll_events`. An error from `per_frame` stops the loop
    /// before presenting that frame and is returned.
    ///
    /// Returns the number of frames presented.
    pub fn run<P, F>(
        renderer: &mut Renderer,
        presenter: &mut P,
        max_frames: Option<u64>,
        mut per_frame: F,
    ) -> Result<u64>
    where
        P: Presenter + ?Sized,
        F: FnMut(&mut Renderer, u64) -> Result<()>,
    {
        let mut frames = 0u64;
        while !presenter.should_close() && max_frames.map_or(true, |max| frames < max) {
            renderer.begin_frame();
            renderer.clear();
            per_frame(&mut *renderer, frames)?;
            presenter.swap_buffers();
            presenter.poll_events();
            frames += 1;
        }

        engine_info!("quad::FrameLoop", "Frame loop ended after {} frames", frames);
        Ok(frames)
    }
}

#[cfg(test)]
#[path = "frame_loop_tests.rs"]
mod tests;
