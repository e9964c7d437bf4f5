//! # Event Processing
//!
//! Consumes raw records from the `EVENTS` ring buffer and turns each one into
//! a header line plus one line per resolved stack frame.
//!
//! ## Per-event flow
//!
//! ```text
//! record bytes ──decode──▶ SyscallEvent
//!                            │
//!        refresh due? ───────┤ (reload perf map first)
//!                            ▼
//!                  header [time] syscall=...
//!                            │
//!        stack_id < 0 or ────┤──▶ done (stack miss)
//!        not in STACK_TRACES │
//!                            ▼
//!          frames before first 0 ──resolve_batch──▶ [ i] <resolution>
//! ```
//!
//! Decode failures are logged and counted; they never stop the loop.

use log::{debug, warn};
use std::io::{self, Write};
use std::time::{Duration, Instant};

use super::boot_clock::BootClock;
use super::event_display::{write_event_header, write_frame};
use super::stack_source::{valid_frames, StackSource};
use super::syscalls::syscall_name;
use crate::domain::{DecodeError, StackId, SyscallId, Timestamp};
use crate::symbolization::SymbolResolver;
use sysstack_common::{SyscallEvent, SYSCALL_EVENT_SIZE};

/// Default time between perf map reloads
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Elapsed-time trigger for perf map reloads
///
/// Checked once per event; there is no timer. A refresh is due only once
/// strictly more than `interval` has passed since the last one.
#[derive(Debug, Clone, Copy)]
pub struct RefreshSchedule {
    interval: Duration,
    last: Instant,
}

impl RefreshSchedule {
    #[must_use]
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self { interval, last: now }
    }

    #[must_use]
    pub fn due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last) > self.interval
    }

    pub fn mark(&mut self, now: Instant) {
        self.last = now;
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub refresh_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { refresh_interval: DEFAULT_REFRESH_INTERVAL }
    }
}

/// Counters reported at shutdown
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    /// Records decoded successfully
    pub events: u64,
    pub decode_failures: u64,
    /// Events printed without frames (failed capture or evicted stack)
    pub stack_misses: u64,
    pub frames: u64,
    /// Frames that got a function name
    pub symbolized: u64,
    pub refreshes: u64,
}

/// Decode one ring buffer record
///
/// Records longer than [`SYSCALL_EVENT_SIZE`] are accepted; the trailing
/// bytes are ignored.
///
/// # Errors
/// Returns [`DecodeError::Truncated`] if fewer than 16 bytes are available
pub fn decode_event(bytes: &[u8]) -> Result<SyscallEvent, DecodeError> {
    bytes
        .get(..SYSCALL_EVENT_SIZE)
        .and_then(SyscallEvent::from_le_bytes)
        .ok_or(DecodeError::Truncated { expected: SYSCALL_EVENT_SIZE, actual: bytes.len() })
}

/// Decodes, symbolizes and prints syscall events
pub struct EventPipeline<R, W> {
    resolver: R,
    out: W,
    clock: BootClock,
    refresh: RefreshSchedule,
    stats: PipelineStats,
}

impl<R: SymbolResolver, W: Write> EventPipeline<R, W> {
    /// The resolver is expected to hold a fresh perf map snapshot already;
    /// the first reload happens one interval from now.
    #[must_use]
    pub fn new(resolver: R, out: W, clock: BootClock, config: &PipelineConfig) -> Self {
        Self {
            resolver,
            out,
            clock,
            refresh: RefreshSchedule::new(config.refresh_interval, Instant::now()),
            stats: PipelineStats::default(),
        }
    }

    /// Decode and process one raw record
    ///
    /// # Errors
    /// Only output errors are returned; a malformed record is logged and
    /// skipped
    pub fn process_record<S: StackSource + ?Sized>(
        &mut self,
        bytes: &[u8],
        stacks: &S,
    ) -> io::Result<()> {
        match decode_event(bytes) {
            Ok(event) => self.process_event(&event, stacks),
            Err(e) => {
                warn!("Dropping event: {e}");
                self.stats.decode_failures += 1;
                Ok(())
            }
        }
    }

    /// # Errors
    /// Returns any error from the output writer
    pub fn process_event<S: StackSource + ?Sized>(
        &mut self,
        event: &SyscallEvent,
        stacks: &S,
    ) -> io::Result<()> {
        self.process_event_at(event, stacks, Instant::now())
    }

    /// [`process_event`](Self::process_event) with an explicit clock reading
    ///
    /// # Errors
    /// Returns any error from the output writer
    pub fn process_event_at<S: StackSource + ?Sized>(
        &mut self,
        event: &SyscallEvent,
        stacks: &S,
        now: Instant,
    ) -> io::Result<()> {
        self.stats.events += 1;

        if self.refresh.due(now) {
            self.resolver.refresh();
            self.refresh.mark(now);
            self.stats.refreshes += 1;
            debug!("Refreshed resolver after {:?}", self.refresh.interval());
        }

        let syscall = SyscallId(event.syscall_id);
        let stack_id = StackId(event.stack_id);
        let time = self.clock.format(Timestamp(event.timestamp_ns));
        write_event_header(&mut self.out, &time, &syscall_name(syscall), syscall, stack_id)?;

        let frames = if stack_id.is_valid() { stacks.stack(stack_id) } else { None };
        let Some(frames) = frames else {
            self.stats.stack_misses += 1;
            return Ok(());
        };

        let ips = valid_frames(&frames);
        let resolved = self.resolver.resolve_batch(ips);
        for (index, resolution) in resolved.iter().enumerate() {
            write_frame(&mut self.out, index, resolution)?;
        }
        self.stats.frames += resolved.len() as u64;
        self.stats.symbolized += resolved.iter().filter(|r| r.is_symbolized()).count() as u64;
        Ok(())
    }

    /// # Errors
    /// Returns any error from the output writer
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    #[must_use]
    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    #[must_use]
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    #[must_use]
    pub fn output(&self) -> &W {
        &self.out
    }

    #[must_use]
    pub fn into_parts(self) -> (R, W) {
        (self.resolver, self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Pid;
    use crate::symbolization::{ElfResolver, ManagedSymbol, Resolution, ResolverConfig};
    use chrono::{Local, TimeZone};
    use std::collections::HashMap;

    fn clock() -> BootClock {
        BootClock::from_boot_time(Local.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap())
    }

    fn event(syscall_id: u32, stack_id: i32) -> SyscallEvent {
        SyscallEvent { timestamp_ns: 1_500_000_000, syscall_id, stack_id }
    }

    /// Records every call so tests can check batching and refresh
    #[derive(Default)]
    struct Recorder {
        batches: Vec<Vec<u64>>,
        refreshes: usize,
    }

    impl SymbolResolver for Recorder {
        fn resolve(&mut self, ip: u64) -> Resolution {
            Resolution::Unresolved { addr: ip }
        }

        fn resolve_batch(&mut self, ips: &[u64]) -> Vec<Resolution> {
            self.batches.push(ips.to_vec());
            ips.iter().map(|&addr| Resolution::Unresolved { addr }).collect()
        }

        fn refresh(&mut self) {
            self.refreshes += 1;
        }
    }

    fn output<R: SymbolResolver>(pipeline: &EventPipeline<R, Vec<u8>>) -> String {
        String::from_utf8(pipeline.output().clone()).unwrap()
    }

    #[test]
    fn test_stack_stops_at_first_zero() {
        let resolver = ElfResolver::from_parts(
            Pid(1),
            vec![],
            vec![ManagedSymbol {
                start: 0x3f_bd8a_1000,
                end: 0x3f_bd8a_1250,
                name: "LazyCompile:*app.get".to_string(),
            }],
            ResolverConfig::default(),
        );
        let mut frames = vec![0u64; 127];
        frames[0] = 0x40_0015;
        frames[1] = 0x3f_bd8a_1100;
        let stacks = HashMap::from([(StackId(9), frames)]);

        let mut pipeline =
            EventPipeline::new(resolver, Vec::new(), clock(), &PipelineConfig::default());
        pipeline.process_event(&event(1, 9), &stacks).unwrap();

        assert_eq!(
            output(&pipeline),
            "\n[10:00:01.500000] syscall=write           id=1 stack_id=9\n\
             \x20     [ 0] 0x400015 [unknown]\n\
             \x20     [ 1] [jit] LazyCompile:*app.get\n"
        );
        assert_eq!(pipeline.stats().frames, 2);
        assert_eq!(pipeline.stats().symbolized, 1);
        assert_eq!(pipeline.stats().stack_misses, 0);
    }

    #[test]
    fn test_negative_stack_id_prints_header_only() {
        let mut pipeline =
            EventPipeline::new(Recorder::default(), Vec::new(), clock(), &PipelineConfig::default());
        let stacks: HashMap<StackId, Vec<u64>> = HashMap::new();

        pipeline.process_event(&event(0, -14), &stacks).unwrap();
        pipeline.process_event(&event(0, 5), &stacks).unwrap();

        assert_eq!(output(&pipeline).lines().filter(|l| l.starts_with('[')).count(), 2);
        assert!(!output(&pipeline).contains("      ["));
        assert_eq!(pipeline.stats().stack_misses, 2);
        assert!(pipeline.resolver().batches.is_empty());
    }

    #[test]
    fn test_unknown_syscall_name() {
        let mut pipeline =
            EventPipeline::new(Recorder::default(), Vec::new(), clock(), &PipelineConfig::default());
        let stacks: HashMap<StackId, Vec<u64>> = HashMap::new();
        pipeline.process_event(&event(9999, -1), &stacks).unwrap();
        assert!(output(&pipeline).contains("syscall=syscall_9999"));
    }

    #[test]
    fn test_short_record_is_counted_and_skipped() {
        let mut pipeline =
            EventPipeline::new(Recorder::default(), Vec::new(), clock(), &PipelineConfig::default());
        let stacks: HashMap<StackId, Vec<u64>> = HashMap::new();

        pipeline.process_record(&[0u8; 12], &stacks).unwrap();
        assert_eq!(pipeline.stats().decode_failures, 1);
        assert_eq!(pipeline.stats().events, 0);
        assert!(output(&pipeline).is_empty());

        let mut record = event(3, -1).to_le_bytes().to_vec();
        record.extend_from_slice(&[0xff; 4]);
        pipeline.process_record(&record, &stacks).unwrap();
        assert_eq!(pipeline.stats().events, 1);
        assert!(output(&pipeline).contains("syscall=close"));
    }

    #[test]
    fn test_decode_event() {
        let raw = event(257, 4).to_le_bytes();
        assert_eq!(decode_event(&raw), Ok(event(257, 4)));
        assert_eq!(
            decode_event(&raw[..15]),
            Err(DecodeError::Truncated { expected: 16, actual: 15 })
        );
    }

    #[test]
    fn test_refresh_is_strictly_after_interval() {
        let start = Instant::now();
        let mut schedule = RefreshSchedule::new(Duration::from_secs(5), start);
        assert!(!schedule.due(start));
        assert!(!schedule.due(start + Duration::from_secs(5)));
        assert!(schedule.due(start + Duration::from_millis(5_001)));

        schedule.mark(start + Duration::from_secs(6));
        assert!(!schedule.due(start + Duration::from_secs(10)));
        assert!(schedule.due(start + Duration::from_secs(12)));
    }

    #[test]
    fn test_pipeline_refreshes_once_per_interval() {
        let start = Instant::now();
        let mut pipeline =
            EventPipeline::new(Recorder::default(), Vec::new(), clock(), &PipelineConfig::default());
        let stacks: HashMap<StackId, Vec<u64>> = HashMap::new();

        pipeline.process_event_at(&event(0, -1), &stacks, start).unwrap();
        assert_eq!(pipeline.resolver().refreshes, 0);

        let later = start + Duration::from_secs(6);
        pipeline.process_event_at(&event(0, -1), &stacks, later).unwrap();
        pipeline.process_event_at(&event(0, -1), &stacks, later + Duration::from_secs(1)).unwrap();
        assert_eq!(pipeline.resolver().refreshes, 1);
        assert_eq!(pipeline.stats().refreshes, 1);
    }

    #[test]
    fn test_whole_stack_goes_in_one_batch() {
        let mut pipeline =
            EventPipeline::new(Recorder::default(), Vec::new(), clock(), &PipelineConfig::default());
        let stacks = HashMap::from([(StackId(1), vec![0x10, 0x20, 0x10, 0, 0x30])]);

        pipeline.process_event(&event(0, 1), &stacks).unwrap();
        assert_eq!(pipeline.resolver().batches, vec![vec![0x10, 0x20, 0x10]]);
    }
}
