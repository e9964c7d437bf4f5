//! JIT symbol table from a perf map file
//!
//! Runtimes that compile code on the fly (V8 with `--perf-basic-prof`, the
//! JVM with perf-map-agent, ...) publish what they compiled to
//! `/tmp/perf-<pid>.map`, one function per line:
//!
//! ```text
//! 3fbd8a1000 250 LazyCompile:*app.get /var/www/app.js
//! ```
//!
//! The file is rewritten while the process runs, so callers reload it
//! wholesale rather than patching a previous snapshot.

use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::Pid;

/// Default directory runtimes write perf maps to
pub const DEFAULT_PERF_MAP_DIR: &str = "/tmp";

/// One JIT-compiled function: `[start, end)` and its display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedSymbol {
    pub start: u64,
    pub end: u64,
    pub name: String,
}

impl ManagedSymbol {
    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end
    }
}

/// Path of the perf map for `pid` inside `dir`
#[must_use]
pub fn perf_map_path(dir: &Path, pid: Pid) -> PathBuf {
    dir.join(format!("perf-{}.map", pid.0))
}

/// Load the perf map of `pid` from `dir`
///
/// A missing file is normal for processes without a JIT and yields an empty
/// table.
#[must_use]
pub fn load_perf_map(dir: &Path, pid: Pid) -> Vec<ManagedSymbol> {
    let path = perf_map_path(dir, pid);
    match fs::read_to_string(&path) {
        Ok(contents) => {
            let symbols = parse_perf_map(&contents);
            debug!("Loaded {} JIT symbols from {}", symbols.len(), path.display());
            symbols
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No perf map at {}", path.display());
            Vec::new()
        }
        Err(e) => {
            debug!("Failed to read {}: {e}", path.display());
            Vec::new()
        }
    }
}

/// Parse perf map text: `<hex start> <hex size> <name...>` per line
///
/// The name is the rest of the line and may contain spaces. Lines with fewer
/// than three fields, bad hex, or an empty range are skipped.
#[must_use]
pub fn parse_perf_map(contents: &str) -> Vec<ManagedSymbol> {
    contents.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<ManagedSymbol> {
    let line = line.trim();
    let (start, rest) = line.split_once(char::is_whitespace)?;
    let (size, name) = rest.trim_start().split_once(char::is_whitespace)?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let start = parse_hex(start)?;
    let size = parse_hex(size)?;
    let end = start.checked_add(size)?;
    if start >= end {
        return None;
    }

    Some(ManagedSymbol { start, end, name: name.to_string() })
}

fn parse_hex(field: &str) -> Option<u64> {
    let digits = field.strip_prefix("0x").unwrap_or(field);
    u64::from_str_radix(digits, 16).ok()
}
