//! Text rendering of syscall events and resolved frames

use std::io::{self, Write};

use super::event_processor::PipelineStats;
use crate::domain::{StackId, SyscallId};
use crate::symbolization::Resolution;

/// Write the blank separator line and the header of one event
///
/// # Errors
/// Returns any error from the underlying writer
pub fn write_event_header<W: Write>(
    out: &mut W,
    time: &str,
    name: &str,
    id: SyscallId,
    stack_id: StackId,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "[{time}] syscall={name:<15} id={id} stack_id={stack_id}")
}

/// Write one resolved frame, indented under its header
///
/// # Errors
/// Returns any error from the underlying writer
pub fn write_frame<W: Write>(out: &mut W, index: usize, resolution: &Resolution) -> io::Result<()> {
    writeln!(out, "      [{index:>2}] {resolution}")
}

/// Print pipeline counters to stderr at shutdown
pub fn display_statistics(stats: &PipelineStats) {
    eprintln!(
        "stats: events={} decode_failures={} stack_misses={} frames={} symbolized={} refreshes={}",
        stats.events,
        stats.decode_failures,
        stats.stack_misses,
        stats.frames,
        stats.symbolized,
        stats.refreshes
    );
}
