//! Profiling core modules
//!
//! Everything between the kernel and the terminal:
//! - eBPF program loading and attachment
//! - Stack lookup in `STACK_TRACES`
//! - Event decoding, symbolization and printing
//! - Syscall names and timestamp rendering

pub mod boot_clock;
pub mod ebpf_setup;
pub mod event_display;
pub mod event_processor;
pub mod stack_source;
pub mod syscalls;

// Re-export common types
pub use boot_clock::BootClock;
pub use ebpf_setup::{attach_sys_enter, init_ebpf_logger, load_ebpf_program, set_target_pid};
pub use event_display::display_statistics;
pub use event_processor::{
    decode_event, EventPipeline, PipelineConfig, PipelineStats, RefreshSchedule,
    DEFAULT_REFRESH_INTERVAL,
};
pub use stack_source::{valid_frames, StackSource};
pub use syscalls::syscall_name;
