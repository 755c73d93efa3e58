/// Opaque device object identifier

use std::fmt;

/// Opaque unsigned identifier issued by the device when an object is created.
///
/// Valid only between creation and explicit release. `DeviceHandle::NULL`
/// is both the "no object" binding value and the failed-creation sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DeviceHandle(pub u32);

impl DeviceHandle {
    /// Zero handle: failed creation, or "unbind" when passed to a bind call
    pub const NULL: DeviceHandle = DeviceHandle(0);

    /// Raw integer value
    pub fn raw(self) -> u32 {
        self.0
    }

    /// True for any handle other than `NULL`
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
