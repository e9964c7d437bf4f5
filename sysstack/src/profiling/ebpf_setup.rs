//! # eBPF Program Loading and Attachment
//!
//! Loads the compiled kernel program, tells it which process to trace and
//! attaches it to `raw_syscalls/sys_enter`.
//!
//! ## Functions
//!
//! - [`load_ebpf_program()`] - Load eBPF bytecode from embedded binary
//! - [`set_target_pid()`] - Write the TGID filter into `TARGET_PID`
//! - [`attach_sys_enter()`] - Attach the syscall-entry tracepoint
//!
//! The PID must be written before attaching: until then the filter holds 0
//! and every event is discarded in the kernel.

use anyhow::{Context, Result};
use aya::{include_bytes_aligned, maps::Array, programs::TracePoint, Ebpf};
use aya_log::EbpfLogger;
use log::{info, warn};

use crate::domain::{Pid, ProfilerError};

const PROGRAM_NAME: &str = "sys_enter";
const TRACEPOINT_CATEGORY: &str = "raw_syscalls";
const TRACEPOINT_NAME: &str = "sys_enter";

/// Load the eBPF program binary
///
/// Always uses the release build because debug builds with recent Rust nightlies (1.94+)
/// pull in formatting code (`LowerHex`) that's incompatible with BPF.
///
/// # Errors
/// Returns an error if the eBPF program binary cannot be loaded
pub fn load_ebpf_program() -> Result<Ebpf> {
    let bpf = Ebpf::load(include_bytes_aligned!(
        "../../../target/bpfel-unknown-none/release/sysstack"
    ))
    .map_err(|e| ProfilerError::EbpfLoadFailed(e.to_string()))?;
    Ok(bpf)
}

/// Initialize eBPF logger
pub fn init_ebpf_logger(bpf: &mut Ebpf) {
    if let Err(e) = EbpfLogger::init(bpf) {
        warn!("Failed to initialize eBPF logger: {e}");
    }
}

/// Restrict the kernel program to process `pid`
///
/// # Errors
/// Returns an error if the `TARGET_PID` map is missing or cannot be written
pub fn set_target_pid(bpf: &mut Ebpf, pid: Pid) -> Result<()> {
    let mut target: Array<_, u32> =
        Array::try_from(bpf.map_mut("TARGET_PID").ok_or(ProfilerError::MapNotFound("TARGET_PID"))?)?;
    target.set(0, pid.0, 0).context("Failed to write TARGET_PID")?;
    info!("✓ Set target PID: {}", pid.0);
    Ok(())
}

/// Load and attach the `sys_enter` program
///
/// # Errors
/// Returns an error if the program is missing, fails verification, or the
/// tracepoint cannot be attached
pub fn attach_sys_enter(bpf: &mut Ebpf) -> Result<()> {
    let program: &mut TracePoint = bpf
        .program_mut(PROGRAM_NAME)
        .ok_or(ProfilerError::ProgramNotFound(PROGRAM_NAME))?
        .try_into()?;
    program.load()?;
    program.attach(TRACEPOINT_CATEGORY, TRACEPOINT_NAME).map_err(|e| {
        ProfilerError::AttachFailed {
            category: TRACEPOINT_CATEGORY.to_string(),
            name: TRACEPOINT_NAME.to_string(),
            error: e.to_string(),
        }
    })?;
    info!("✓ Attached tracepoint: {TRACEPOINT_CATEGORY}/{TRACEPOINT_NAME}");
    Ok(())
}
