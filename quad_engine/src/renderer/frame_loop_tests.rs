use super::*;
use crate::device::mock_device::{DeviceCall, MockGraphicsDevice};
use crate::error::Error;

#[derive(Default)]
struct ScriptedPresenter {
    close_after: Option<u64>,
    swaps: u64,
    polls: u64,
}

impl Presenter for ScriptedPresenter {
    fn should_close(&self) -> bool {
        self.close_after.map_or(false, |n| self.polls >= n)
    }

    fn swap_buffers(&mut self) {
        self.swaps += 1;
    }

    fn poll_events(&mut self) {
        self.polls += 1;
    }
}

#[test]
fn test_runs_until_presenter_closes() {
    let (_device, ctx) = MockGraphicsDevice::with_context();
    let mut renderer = Renderer::new(&ctx);
    let mut presenter = ScriptedPresenter { close_after: Some(3), ..Default::default() };

    let frames = FrameLoop::run(&mut renderer, &mut presenter, None, |_, _| Ok(())).unwrap();

    assert_eq!(frames, 3);
    assert_eq!(presenter.swaps, 3);
    assert_eq!(presenter.polls, 3);
}

#[test]
fn test_max_frames_limits_loop() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let mut renderer = Renderer::new(&ctx);
    let mut presenter = ScriptedPresenter::default();

    let mut seen = Vec::new();
    let frames = FrameLoop::run(&mut renderer, &mut presenter, Some(4), |_, frame| {
        seen.push(frame);
        Ok(())
    })
    .unwrap();

    assert_eq!(frames, 4);
    assert_eq!(seen, vec![0, 1, 2, 3]);
    assert_eq!(device.count_calls(|c| matches!(c, DeviceCall::Clear(_))), 4);
}

#[test]
fn test_clear_happens_before_per_frame_work() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let mut renderer = Renderer::new(&ctx);
    let mut presenter = ScriptedPresenter::default();

    FrameLoop::run(&mut renderer, &mut presenter, Some(1), |renderer, _| {
        renderer.enable_blending();
        Ok(())
    })
    .unwrap();

    let calls = device.calls();
    let clear = calls.iter().position(|c| matches!(c, DeviceCall::Clear(_))).unwrap();
    let blend = calls.iter().position(|c| matches!(c, DeviceCall::SetAlphaBlending(true))).unwrap();
    assert!(clear < blend);
}

#[test]
fn test_per_frame_error_stops_before_present() {
    let (_device, ctx) = MockGraphicsDevice::with_context();
    let mut renderer = Renderer::new(&ctx);
    let mut presenter = ScriptedPresenter::default();

    let result = FrameLoop::run(&mut renderer, &mut presenter, Some(10), |_, frame| {
        if frame == 2 {
            Err(Error::InvalidResource("scene lost".to_string()))
        } else {
            Ok(())
        }
    });

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(presenter.swaps, 2);
}

#[test]
fn test_closed_presenter_runs_no_frames() {
    let (device, ctx) = MockGraphicsDevice::with_context();
    let mut renderer = Renderer::new(&ctx);
    let mut presenter = ScriptedPresenter { close_after: Some(0), ..Default::default() };

    let frames = FrameLoop::run(&mut renderer, &mut presenter, None, |_, _| Ok(())).unwrap();
    assert_eq!(frames, 0);
    assert!(device.calls().is_empty());
}
