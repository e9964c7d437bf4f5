//! # Shared Data Structures (eBPF ↔ Userspace)
//!
//! Defines the record the kernel-side program writes into the `EVENTS` ring
//! buffer and the constants both sides agree on. All types use `#[repr(C)]`
//! for a consistent memory layout across the kernel/userspace boundary.
//!
//! ## Key Types
//!
//! - [`SyscallEvent`] - One syscall entry observed in the target process
//!
//! ## Maps
//!
//! - `TARGET_PID` - single-slot array holding the TGID to trace
//! - `STACK_TRACES` - deduplicated user stacks, keyed by stack id
//! - `EVENTS` - ring buffer carrying [`SyscallEvent`] records

#![no_std]

/// Maximum number of stack frames to capture
///
/// Kernel eBPF programs are limited to 127 frames due to verifier constraints.
/// Stack map values are fixed arrays of this many `u64` instruction pointers,
/// zero-padded after the last captured frame.
pub const MAX_STACK_DEPTH: usize = 127;

/// Byte size of the `EVENTS` ring buffer (256 KiB)
pub const EVENTS_RING_BYTES: u32 = 256 * 1024;

/// Number of distinct stacks the `STACK_TRACES` map can hold
pub const STACK_MAP_ENTRIES: u32 = 1024;

/// Size in bytes of an encoded [`SyscallEvent`]
pub const SYSCALL_EVENT_SIZE: usize = 16;

/// Event sent from eBPF to userspace via ring buffer
///
/// The largest field comes first so the two 4-byte fields pack behind it
/// with no padding: 8 + 4 + 4 = 16 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyscallEvent {
    /// Timestamp in nanoseconds (from `bpf_ktime_get_ns()`)
    ///
    /// Monotonic clock, relative to system boot (not wall-clock time).
    pub timestamp_ns: u64,

    /// Syscall number as reported by `raw_syscalls/sys_enter`
    pub syscall_id: u32,

    /// Stack trace ID (from `STACK_TRACES` eBPF map)
    ///
    /// **Value**:
    /// - Non-negative: valid key into `STACK_TRACES`
    /// - Negative: the kernel failed to capture a stack (error code)
    pub stack_id: i32,
}

impl SyscallEvent {
    /// Decode a record from its little-endian wire form.
    ///
    /// Returns `None` unless `bytes` is exactly [`SYSCALL_EVENT_SIZE`] long.
    #[must_use]
    pub fn from_le_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != SYSCALL_EVENT_SIZE {
            return None;
        }
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&bytes[0..8]);
        let mut id = [0u8; 4];
        id.copy_from_slice(&bytes[8..12]);
        let mut stack = [0u8; 4];
        stack.copy_from_slice(&bytes[12..16]);
        Some(Self {
            timestamp_ns: u64::from_le_bytes(ts),
            syscall_id: u32::from_le_bytes(id),
            stack_id: i32::from_le_bytes(stack),
        })
    }

    /// Encode this record in its little-endian wire form.
    #[must_use]
    pub fn to_le_bytes(&self) -> [u8; SYSCALL_EVENT_SIZE] {
        let mut out = [0u8; SYSCALL_EVENT_SIZE];
        out[0..8].copy_from_slice(&self.timestamp_ns.to_le_bytes());
        out[8..12].copy_from_slice(&self.syscall_id.to_le_bytes());
        out[12..16].copy_from_slice(&self.stack_id.to_le_bytes());
        out
    }
}

/// Tracepoint arguments for `raw_syscalls/sys_enter`
///
/// Layout defined by the Linux kernel tracepoint ABI:
/// `/sys/kernel/debug/tracing/events/raw_syscalls/sys_enter/format`
#[repr(C)]
pub struct SysEnterArgs {
    /// Common tracepoint header (type, flags, preempt count, pid)
    #[allow(clippy::pub_underscore_fields)]
    pub __common: u64,

    /// Syscall number
    pub id: i64,

    /// Raw syscall arguments
    pub args: [u64; 6],
}

#[cfg(feature = "user")]
use aya::Pod;

// Pod lets userspace read and write these types as plain bytes through aya maps
#[cfg(feature = "user")]
#[allow(unsafe_code)]
unsafe impl Pod for SyscallEvent {}
