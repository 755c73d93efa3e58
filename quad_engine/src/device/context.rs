/// GpuContext - explicit binding context shared by every resource
///
/// Resources keep an `Rc<GpuContext>` instead of reaching for an ambient
/// global device. The context is `!Send`: the device's current-object slots
/// are only coherent on the single thread that owns them.

use std::cell::Cell;
use std::rc::Rc;

use crate::device::{diagnostics, GraphicsDevice};

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Bracket traced device calls with error polling
    pub enable_validation: bool,
    /// Panic when a traced call leaves an error behind
    pub panic_on_error: bool,
    /// Color used by `Renderer::clear`
    pub clear_color: [f32; 4],
    /// Application name (log output only)
    pub app_name: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            panic_on_error: false,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            app_name: "Quad Application".to_string(),
        }
    }
}

/// Counters for traced calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticStats {
    /// Calls bracketed by error polling
    pub traced_calls: u64,
    /// Device errors attributed to traced calls
    pub errors: u64,
}

/// Shared device context
pub struct GpuContext {
    device: Rc<dyn GraphicsDevice>,
    config: RendererConfig,
    stats: Cell<DiagnosticStats>,
}

impl GpuContext {
    /// Wrap a device. The device must already have a current context.
    pub fn new(device: Rc<dyn GraphicsDevice>, config: RendererConfig) -> Rc<Self> {
        crate::engine_info!(
            "quad::GpuContext",
            "Context created for '{}' (validation {})",
            config.app_name,
            if config.enable_validation { "on" } else { "off" }
        );
        Rc::new(Self {
            device,
            config,
            stats: Cell::new(DiagnosticStats::default()),
        })
    }

    /// Underlying device (untraced access)
    pub fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn diagnostic_stats(&self) -> DiagnosticStats {
        self.stats.get()
    }

    pub fn reset_diagnostic_stats(&self) {
        self.stats.set(DiagnosticStats::default());
    }

    /// Run `f` against the device, bracketed by clear-then-check when
    /// validation is enabled. Prefer the `device_call!` macro, which fills
    /// in `call`, `file` and `line`.
    pub fn traced<R>(
        &self,
        call: &str,
        file: &'static str,
        line: u32,
        f: impl FnOnce(&dyn GraphicsDevice) -> R,
    ) -> R {
        let device = self.device.as_ref();
        if !self.config.enable_validation {
            return f(device);
        }

        diagnostics::clear_errors(device);
        let result = f(device);
        let errors = diagnostics::drain_and_log(device, call, file, line);

        let mut stats = self.stats.get();
        stats.traced_calls += 1;
        stats.errors += errors.len() as u64;
        self.stats.set(stats);

        if let (Some(&first), true) = (errors.first(), self.config.panic_on_error) {
            panic!(
                "device error after `{}` ({}:{}): {}",
                call,
                file,
                line,
                diagnostics::describe_error(first)
            );
        }
        result
    }
}

/// Issue a traced device call through a `GpuContext`
///
/// ```no_run
/// # use quad_engine::device_call;
/// # use quad_engine::quad::device::{GpuContext, BufferTarget, DeviceHandle};
/// # fn f(ctx: &GpuContext) {
/// device_call!(ctx, |d| d.bind_buffer(BufferTarget::Vertex, DeviceHandle::NULL));
/// # }
/// ```
#[macro_export]
macro_rules! device_call {
    ($ctx:expr, |$device:ident| $call:expr) => {
        $ctx.traced(stringify!($call), file!(), line!(), |$device| $call)
    };
}
