//! Stack lookup by stack id
//!
//! The kernel stores each distinct user stack once in `STACK_TRACES` and
//! puts only its id in the event. [`StackSource`] abstracts that lookup so
//! the pipeline can run against the live eBPF map or a plain `HashMap`.

use aya::maps::{MapData, StackTraceMap};
use log::debug;
use std::borrow::Borrow;
use std::collections::HashMap;

use crate::domain::StackId;
use sysstack_common::MAX_STACK_DEPTH;

/// Fetches the raw frame array recorded under a stack id
pub trait StackSource {
    /// Instruction pointers, innermost frame first; `None` when unknown
    fn stack(&self, stack_id: StackId) -> Option<Vec<u64>>;
}

impl<T: Borrow<MapData>> StackSource for StackTraceMap<T> {
    fn stack(&self, stack_id: StackId) -> Option<Vec<u64>> {
        let key = stack_id.as_map_key()?;
        match self.get(&key, 0) {
            Ok(trace) => Some(trace.frames().iter().map(|frame| frame.ip).collect()),
            Err(e) => {
                // Evicted on hash collision or never stored
                debug!("Stack {stack_id} not in STACK_TRACES: {e}");
                None
            }
        }
    }
}

impl StackSource for HashMap<StackId, Vec<u64>> {
    fn stack(&self, stack_id: StackId) -> Option<Vec<u64>> {
        self.get(&stack_id).cloned()
    }
}

/// Frames before the first zero entry, at most [`MAX_STACK_DEPTH`]
///
/// Zero is never a valid instruction pointer; the kernel pads the fixed-size
/// array with it after the last captured frame.
#[must_use]
pub fn valid_frames(frames: &[u64]) -> &[u64] {
    let frames = &frames[..frames.len().min(MAX_STACK_DEPTH)];
    let end = frames.iter().position(|&ip| ip == 0).unwrap_or(frames.len());
    &frames[..end]
}
