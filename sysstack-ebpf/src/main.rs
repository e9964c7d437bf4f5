//! # eBPF Kernel-Side Instrumentation
//!
//! Samples the user-space call stack of one process on every syscall entry.
//!
//! ## Programs
//!
//! - **Tracepoint**: `sys_enter` on `raw_syscalls/sys_enter`
//!
//! ## Maps (Shared with Userspace)
//!
//! - `EVENTS` - Ring buffer (256KB) carrying `SyscallEvent` records
//! - `STACK_TRACES` - Deduplicated user stacks by ID
//! - `TARGET_PID` - TGID to trace, written by userspace before attach
//!
//! ## Build
//!
//! Always compiled in release mode (debug includes incompatible formatting code):
//! ```bash
//! cargo xtask build-ebpf --release
//! ```

#![no_std]
#![no_main]
#![allow(unused_unsafe)]

use aya_ebpf::{
    helpers::{bpf_get_current_pid_tgid, bpf_ktime_get_ns},
    macros::{map, tracepoint},
    maps::{Array, RingBuf, StackTrace},
    programs::TracePointContext,
    EbpfContext,
};
use sysstack_common::{
    SysEnterArgs, SyscallEvent, EVENTS_RING_BYTES, STACK_MAP_ENTRIES,
};

// ============================================================================
// Constants
// ============================================================================

/// Stack capture flags for `bpf_get_stackid`:
///
/// - BPF_F_USER_STACK (0x100): Capture user-space stack (not kernel)
const STACK_FLAGS: u64 = 0x100;

// ============================================================================
// eBPF Maps - Shared data structures between kernel and userspace
// ============================================================================

/// Ring buffer for sending events to userspace
///
/// A full buffer makes `reserve()` fail; the event is dropped.
#[map]
static EVENTS: RingBuf = RingBuf::with_byte_size(EVENTS_RING_BYTES, 0);

/// Stack trace map for storing deduplicated stack traces by ID
///
/// - **Key**: Stack hash (computed by kernel)
/// - **Value**: 127 instruction pointers, zero-padded
#[map]
static STACK_TRACES: StackTrace = StackTrace::with_max_entries(STACK_MAP_ENTRIES, 0);

/// Slot 0 holds the TGID userspace asked us to trace (0 = nothing yet)
#[map]
static TARGET_PID: Array<u32> = Array::with_max_entries(1, 0);

// ============================================================================
// eBPF Program Hooks
// ============================================================================

#[tracepoint]
pub fn sys_enter(ctx: TracePointContext) -> u32 {
    match try_sys_enter(&ctx) {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

fn try_sys_enter(ctx: &TracePointContext) -> Result<(), i64> {
    let pid_tgid = unsafe { bpf_get_current_pid_tgid() };
    let pid = (pid_tgid >> 32) as u32;

    // Early exit: only the target process
    let target = TARGET_PID.get(0).copied().unwrap_or(0);
    if target == 0 || target != pid {
        return Ok(());
    }

    // Layout from /sys/kernel/debug/tracing/events/raw_syscalls/sys_enter/format
    let args: *const SysEnterArgs = ctx.as_ptr() as *const SysEnterArgs;
    let syscall_id = unsafe { (*args).id as u32 };

    // No stack captured; nothing useful to report
    let Ok(stack_id) = (unsafe { STACK_TRACES.get_stackid(ctx, STACK_FLAGS) }) else {
        return Ok(());
    };

    // Ring full: drop the event, not an error
    let Some(mut entry) = EVENTS.reserve::<SyscallEvent>(0) else {
        return Ok(());
    };
    entry.write(SyscallEvent {
        timestamp_ns: unsafe { bpf_ktime_get_ns() },
        syscall_id,
        stack_id: stack_id as i32,
    });
    entry.submit(0);

    Ok(())
}

#[cfg(all(not(test), target_os = "none"))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    unsafe { core::hint::unreachable_unchecked() }
}
