//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep a syscall number from being passed where a
//! stack id is expected, and make function signatures more expressive.

use std::fmt;

/// Process ID (TGID) of the traced process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID:{}", self.0)
    }
}

impl From<u32> for Pid {
    fn from(pid: u32) -> Self {
        Pid(pid)
    }
}

/// Stack trace ID from eBPF
///
/// Negative values are kernel error codes: no stack was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackId(pub i32);

impl StackId {
    /// Returns true if this stack ID is valid (non-negative)
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }

    /// Key for the `STACK_TRACES` map, `None` for a failed capture
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn as_map_key(self) -> Option<u32> {
        self.is_valid().then_some(self.0 as u32)
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Syscall number as seen by `raw_syscalls/sys_enter`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyscallId(pub u32);

impl fmt::Display for SyscallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp in nanoseconds since boot (`CLOCK_MONOTONIC`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub u64);
