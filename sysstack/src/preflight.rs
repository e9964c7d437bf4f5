//! Pre-flight checks for sysstack
//!
//! Validates system requirements before attempting to load eBPF programs.
//! Provides clear, actionable error messages when requirements aren't met.

#![allow(unsafe_code)] // geteuid() requires unsafe

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::domain::Pid;
use crate::symbolization::perf_map::perf_map_path;

/// Minimum kernel version required for the BPF ring buffer
const MIN_KERNEL_VERSION: (u32, u32) = (5, 8);

/// Run all pre-flight checks before eBPF loading
///
/// # Errors
/// Returns an error describing the first unmet requirement
pub fn run_preflight_checks(pid: Pid, perf_map_dir: &Path, quiet: bool) -> Result<()> {
    check_privileges()?;
    check_kernel_version()?;
    check_process_exists(pid)?;
    check_proc_access(pid)?;
    check_perf_map(pid, perf_map_dir, quiet);
    Ok(())
}

/// Check if running with sufficient privileges for eBPF
fn check_privileges() -> Result<()> {
    if unsafe { libc::geteuid() } == 0 {
        return Ok(());
    }

    // CAP_BPF + CAP_PERFMON would do too, but checking them needs more
    // than libc; require root
    bail!(
        "Permission denied: sysstack requires root privileges to load eBPF programs.\n\n\
         Run with: sudo sysstack ..."
    );
}

/// Parse `major.minor` out of a `/proc/version` line
fn parse_kernel_version(version_str: &str) -> Option<(u32, u32)> {
    // "Linux version 6.1.0-arch1-1 ..."
    let release = version_str.split_whitespace().nth(2)?;
    let mut parts = release.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts
        .next()?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok()?;
    Some((major, minor))
}

/// Check if the kernel version is sufficient for eBPF features
fn check_kernel_version() -> Result<()> {
    let version_str = std::fs::read_to_string("/proc/version")
        .context("Failed to read kernel version from /proc/version")?;

    let Some((major, minor)) = parse_kernel_version(&version_str) else {
        // Can't parse, assume it's fine
        return Ok(());
    };

    if (major, minor) < MIN_KERNEL_VERSION {
        bail!(
            "Kernel version {major}.{minor} is too old.\n\n\
             sysstack requires Linux {}.{} or newer for eBPF ring buffer support.",
            MIN_KERNEL_VERSION.0,
            MIN_KERNEL_VERSION.1,
        );
    }

    Ok(())
}

/// Check if the target process exists
///
/// # Errors
/// Returns an error if `/proc/<pid>` is missing
pub fn check_process_exists(pid: Pid) -> Result<()> {
    let pid = pid.0;
    if !Path::new(&format!("/proc/{pid}")).exists() {
        bail!(
            "Process {pid} not found.\n\n\
             Is the process still running? Check with: ps -p {pid}"
        );
    }
    Ok(())
}

/// Check if we can read the process's memory maps
fn check_proc_access(pid: Pid) -> Result<()> {
    let pid = pid.0;
    let maps_path = format!("/proc/{pid}/maps");
    std::fs::read_to_string(&maps_path).with_context(|| {
        format!(
            "Cannot read {maps_path}\n\n\
             This usually means:\n\
             - The process doesn't exist (check: ps -p {pid})\n\
             - Permission denied (run with sudo)\n\
             - /proc is not mounted"
        )
    })?;
    Ok(())
}

/// Warn when no perf map exists yet; JIT frames will show as unknown
fn check_perf_map(pid: Pid, perf_map_dir: &Path, quiet: bool) {
    if quiet {
        return;
    }
    let path = perf_map_path(perf_map_dir, pid);
    if !path.is_file() {
        eprintln!(
            "warning: {} not found, JIT-compiled frames will show as [unknown] \
             (start Node.js with --perf-basic-prof)",
            path.display()
        );
    }
}
