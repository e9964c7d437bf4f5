//! # sysstack - Syscall Stack Tracer with JIT-aware Symbolization
//!
//! sysstack attaches an eBPF program to `raw_syscalls/sys_enter`, captures
//! the user-space call stack of one process on every syscall and prints it
//! with function names. Frames can come from native code (executable and
//! shared libraries) or from code a VM compiled at runtime and listed in
//! `/tmp/perf-<pid>.map` (Node.js with `--perf-basic-prof`, JVM agents).
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Target Process                            │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ syscall entry
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     eBPF Program (Kernel)                       │
//! │  • Tracepoint: raw_syscalls/sys_enter, filtered by TARGET_PID   │
//! │  • bpf_get_stackid() → STACK_TRACES, 16-byte record → EVENTS    │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ ring buffer
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    sysstack (This Crate)                        │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │  Profiling   │──▶│    Event     │──▶│    stdout    │         │
//! │  │   (eBPF)     │   │   Pipeline   │   │              │         │
//! │  └──────────────┘   └──────┬───────┘   └──────────────┘         │
//! │                            ▼                                    │
//! │                    ┌────────────────┐                           │
//! │                    │ SymbolResolver │ ElfResolver | blazesym    │
//! │                    └────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`profiling`]: eBPF loading, stack lookup and the event pipeline
//! - [`symbolization`]: memory maps, perf maps, ELF symbol tables,
//!   demangling and the two resolver backends
//! - [`cli`]: command-line arguments
//! - [`domain`]: newtypes (`Pid`, `StackId`, `SyscallId`) and error types
//! - [`preflight`], [`process_lookup`]: startup checks and PID discovery
//!
//! ## Typical Usage
//!
//! ```bash
//! node --perf-basic-prof server.js &
//! sudo ./sysstack server.js
//! ```
//!
//! ## Key Concepts
//!
//! - **Stack id**: the kernel deduplicates stacks; events carry only an id
//! - **File offset**: runtime address translated through `/proc/<pid>/maps`
//! - **Perf map**: text file a JIT writes, one `start size name` per function

// Expose modules for testing
pub mod cli;
pub mod domain;
pub mod preflight;
pub mod process_lookup;
pub mod profiling;
pub mod symbolization;
