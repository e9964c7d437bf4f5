//! Wall-clock rendering of kernel timestamps
//!
//! `bpf_ktime_get_ns()` counts nanoseconds since boot on `CLOCK_MONOTONIC`.
//! Subtracting the current uptime from the current wall time once at
//! startup gives the boot instant; each event is then shown as
//! `boot + timestamp`.

#![allow(unsafe_code)] // clock_gettime() requires unsafe

use chrono::{DateTime, Duration, Local};

use crate::domain::Timestamp;

/// Maps monotonic-since-boot timestamps onto local time
#[derive(Debug, Clone, Copy)]
pub struct BootClock {
    boot: DateTime<Local>,
}

impl BootClock {
    /// Measure the boot instant from the current uptime
    #[must_use]
    pub fn now() -> Self {
        let uptime = Duration::nanoseconds(i64::try_from(monotonic_ns()).unwrap_or(i64::MAX));
        Self { boot: Local::now() - uptime }
    }

    #[must_use]
    pub fn from_boot_time(boot: DateTime<Local>) -> Self {
        Self { boot }
    }

    #[must_use]
    pub fn wall_time(&self, ts: Timestamp) -> DateTime<Local> {
        self.boot + Duration::nanoseconds(i64::try_from(ts.0).unwrap_or(i64::MAX))
    }

    /// `HH:MM:SS.ffffff` local time of `ts`
    #[must_use]
    pub fn format(&self, ts: Timestamp) -> String {
        self.wall_time(ts).format("%H:%M:%S%.6f").to_string()
    }
}

fn monotonic_ns() -> u64 {
    let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
    // SAFETY: `ts` is a valid, writable timespec
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
    if rc != 0 {
        return 0;
    }
    u64::try_from(ts.tv_sec).unwrap_or(0) * 1_000_000_000 + u64::try_from(ts.tv_nsec).unwrap_or(0)
}
