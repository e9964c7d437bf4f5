//! Memory mapping utilities for process address space analysis
//!
//! Parses `/proc/<pid>/maps` into the file-backed regions of a process, which
//! is what lets a runtime address be translated into an offset inside the
//! binary or shared object that backs it.

use log::{debug, info, warn};
use std::fs;

use crate::domain::Pid;

/// Appended by the kernel to mappings whose file was unlinked or replaced
const DELETED_SUFFIX: &str = " (deleted)";

/// One file-backed virtual address range of a process
///
/// A line such as
/// `7f8a9b000000-7f8a9b200000 r-xp 00001000 08:01 123456 /usr/lib/libc.so.6`
/// becomes `{ start: 0x7f8a9b000000, end: 0x7f8a9b200000, file_offset: 0x1000,
/// path: "/usr/lib/libc.so.6" }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    pub start: u64,
    pub end: u64,
    pub file_offset: u64,
    pub path: String,
}

impl MemoryRegion {
    /// Check if an address falls within this region
    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end
    }

    /// Translate a runtime address in this region to an offset in the backing file
    #[must_use]
    pub fn file_offset_of(&self, addr: u64) -> u64 {
        addr.wrapping_sub(self.start).wrapping_add(self.file_offset)
    }

    /// Backing file name with the directory stripped (e.g. `libc.so.6`)
    #[must_use]
    pub fn base_name(&self) -> &str {
        base_name(&self.path)
    }
}

/// Strip everything up to and including the last `/`
#[must_use]
pub fn base_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// Read the file-backed regions of process `pid`
///
/// An unreadable listing (process gone, access denied) yields an empty list:
/// native addresses then fall back to their raw form.
#[must_use]
pub fn load_memory_maps(pid: Pid) -> Vec<MemoryRegion> {
    let maps_path = format!("/proc/{}/maps", pid.0);
    match fs::read_to_string(&maps_path) {
        Ok(maps) => {
            let regions = parse_memory_maps(&maps);
            info!("Loaded {} file-backed regions from {maps_path}", regions.len());
            regions
        }
        Err(e) => {
            warn!("Failed to read {maps_path}: {e}. Native frames will not be symbolized.");
            Vec::new()
        }
    }
}

/// Parse the text of a `/proc/<pid>/maps` listing
///
/// Lines are `start-end perms offset dev inode [pathname]`. Lines without a
/// pathname are anonymous mappings and are skipped, as is any line that does
/// not parse.
#[must_use]
pub fn parse_memory_maps(maps: &str) -> Vec<MemoryRegion> {
    maps.lines()
        .filter_map(|line| {
            let region = parse_line(line);
            if region.is_none() && !line.trim().is_empty() {
                debug!("Skipping maps line: {line}");
            }
            region
        })
        .collect()
}

fn parse_line(line: &str) -> Option<MemoryRegion> {
    let mut rest = line.trim_start();
    let mut fields = [""; 5];
    for field in &mut fields {
        let (head, tail) = split_field(rest)?;
        *field = head;
        rest = tail;
    }

    // Field 5 onward; the kernel prints paths with spaces verbatim and marks
    // unlinked files with a " (deleted)" suffix
    let path = rest.trim();
    let path = path.strip_suffix(DELETED_SUFFIX).unwrap_or(path);
    if path.is_empty() {
        return None;
    }

    let (start, end) = fields[0].split_once('-')?;
    let start = u64::from_str_radix(start, 16).ok()?;
    let end = u64::from_str_radix(end, 16).ok()?;
    let file_offset = u64::from_str_radix(fields[2], 16).ok()?;

    if start >= end {
        return None;
    }

    Some(MemoryRegion { start, end, file_offset, path: path.to_string() })
}

fn split_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    Some(s.split_once(char::is_whitespace).unwrap_or((s, "")))
}
