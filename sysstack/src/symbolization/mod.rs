//! # Symbol Resolution and Address Translation
//!
//! This module turns the raw instruction pointers captured by
//! `bpf_get_stackid()` into function names. This process is called
//! **symbolization**.
//!
//! ## The Symbolization Problem
//!
//! A user stack captured on syscall entry is a list of addresses such as
//! `0x7f8a9b02a4d1`. Each one can belong to:
//! - a **native binary**: the executable or a shared object mapped from disk,
//!   whose ELF symbol tables name its functions
//! - **JIT-compiled code**: functions a VM (V8, the JVM, ...) generated at
//!   runtime; they exist in no file, but the VM lists them in
//!   `/tmp/perf-<pid>.map`
//! - nothing we know about (anonymous memory, a VM that publishes no map)
//!
//! ## Address Translation
//!
//! Symbol tables describe a binary in its own terms, while stacks hold
//! runtime addresses. `/proc/<pid>/maps` links the two:
//!
//! ```text
//! 7f8a9b000000-7f8a9b200000 r-xp 00028000 08:01 5678 /usr/lib/libc.so.6
//! start        end               offset                path
//!
//! file_offset = ip - start + offset
//! ```
//!
//! The resulting offset is searched in the module's `.symtab` and `.dynsym`
//! tables (static first). Matches are demangled (Itanium C++ and Rust).
//!
//! ## Address Resolution Flow
//!
//! ```text
//! ip ──▶ resolution cache ──hit──▶ done
//!          │ miss
//!          ▼
//!        perf map ranges ──hit──▶ [jit] LazyCompile:*app.get
//!          │ miss
//!          ▼
//!        /proc/<pid>/maps ──miss──▶ 0x999999 [unknown]
//!          │ hit
//!          ▼
//!        ELF symbols at file_offset ──hit──▶ [native] foo (libfoo.so)
//!          │ miss
//!          ▼
//!        0x400050 [libfoo.so]
//! ```
//!
//! ## Module Structure
//!
//! - **`memory_maps`**: parses `/proc/<pid>/maps` into [`MemoryRegion`]s
//! - **`perf_map`**: parses `/tmp/perf-<pid>.map` into [`ManagedSymbol`]s
//! - **`module_cache`**: loads each ELF file's symbols once per path
//! - **`demangle`**: short names from mangled symbols
//! - **`resolution`**: the [`Resolution`] result type and its printed form
//! - **`resolver`**: the [`SymbolResolver`] trait and backend selection
//! - **`elf_resolver`**: the self-contained backend
//! - **`delegated`**: the blazesym backend (feature `delegated`)
//!
//! ## Caching
//!
//! - Modules: parsed once per path, failures included
//! - Resolutions: cached per address for the resolver's lifetime
//! - The perf map is reloaded periodically by the caller; cached JIT
//!   resolutions are **not** invalidated by a reload
//!
//! ## Limitations
//!
//! - Mappings are read once; a library loaded after start shows as unknown
//! - Stripped binaries only expose their `.dynsym` exports
//!
//! ## References
//!
//! - [Linux `/proc/pid/maps` format](https://man7.org/linux/man-pages/man5/proc.5.html)
//! - [perf map format](https://github.com/torvalds/linux/blob/master/tools/perf/Documentation/jit-interface.txt)

pub mod demangle;
#[cfg(feature = "delegated")]
pub mod delegated;
pub mod elf_resolver;
pub mod memory_maps;
pub mod module_cache;
pub mod perf_map;
pub mod resolution;
pub mod resolver;

#[cfg(feature = "delegated")]
pub use delegated::DelegatedResolver;
pub use demangle::demangle;
pub use elf_resolver::ElfResolver;
pub use memory_maps::{load_memory_maps, parse_memory_maps, MemoryRegion};
pub use module_cache::{ModuleCache, NativeSymbol, ParsedModule};
pub use perf_map::{load_perf_map, parse_perf_map, ManagedSymbol};
pub use resolution::Resolution;
pub use resolver::{build_resolver, Backend, ResolverConfig, SymbolResolver};
