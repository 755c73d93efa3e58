//! Device error polling
//!
//! The device reports errors through a queue that is only drained on demand,
//! so an error surfaces on whatever call polls next. Every traced call is
//! bracketed by `clear_errors` (drop stale flags) and `check_and_log`
//! (attribute whatever is left to this call).

use crate::device::GraphicsDevice;
use crate::engine::Engine;
use crate::log::LogSeverity;

pub const NO_ERROR: u32 = 0;
pub const INVALID_ENUM: u32 = 0x0500;
pub const INVALID_VALUE: u32 = 0x0501;
pub const INVALID_OPERATION: u32 = 0x0502;
pub const OUT_OF_MEMORY: u32 = 0x0505;
pub const INVALID_FRAMEBUFFER_OPERATION: u32 = 0x0506;

/// Upper bound on drained flags per poll. A device without a current
/// context may report the same error forever.
const MAX_DRAIN: usize = 64;

/// Readable name of a known error code
pub fn error_name(code: u32) -> Option<&'static str> {
    match code {
        NO_ERROR => Some("NO_ERROR"),
        INVALID_ENUM => Some("INVALID_ENUM"),
        INVALID_VALUE => Some("INVALID_VALUE"),
        INVALID_OPERATION => Some("INVALID_OPERATION"),
        OUT_OF_MEMORY => Some("OUT_OF_MEMORY"),
        INVALID_FRAMEBUFFER_OPERATION => Some("INVALID_FRAMEBUFFER_OPERATION"),
        _ => None,
    }
}

/// `INVALID_OPERATION (1282)` for known codes, `0xDEAD` otherwise
pub fn describe_error(code: u32) -> String {
    match error_name(code) {
        Some(name) => format!("{} ({})", name, code),
        None => format!("{:#06X}", code),
    }
}

/// Diagnostic line for one drained error
pub fn format_error(code: u32, call: &str, file: &str, line: u32) -> String {
    format!("[GraphicsError] ({}) {} {} : {}", code, call, file, line)
}

/// Drain pending error flags without reporting them
pub fn clear_errors(device: &dyn GraphicsDevice) {
    for _ in 0..MAX_DRAIN {
        if device.get_error() == NO_ERROR {
            break;
        }
    }
}

/// Drain pending error flags, logging each against `call` and the source
/// location. Returns the drained codes in the order the device reported them.
pub fn drain_and_log(device: &dyn GraphicsDevice, call: &str, file: &str, line: u32) -> Vec<u32> {
    let mut codes = Vec::new();
    for _ in 0..MAX_DRAIN {
        let code = device.get_error();
        if code == NO_ERROR {
            break;
        }
        Engine::log(LogSeverity::Error, "quad::diagnostics", format_error(code, call, file, line));
        codes.push(code);
    }
    codes
}

/// Drain and log pending errors; `true` when the device was clean
pub fn check_and_log(device: &dyn GraphicsDevice, call: &str, file: &str, line: u32) -> bool {
    drain_and_log(device, call, file, line).is_empty()
}

#[cfg(test)]
#[path = "diagnostics_tests.rs"]
mod tests;
