//! Structured error types for sysstack
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Most symbolization failures never leave the resolver: they are logged and
//! turned into a fallback [`Resolution`](crate::symbolization::Resolution).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfilerError {
    #[error("Failed to load eBPF program: {0}")]
    EbpfLoadFailed(String),

    #[error("eBPF program {0} not found in object")]
    ProgramNotFound(&'static str),

    #[error("eBPF map {0} not found in object")]
    MapNotFound(&'static str),

    #[error("Failed to attach tracepoint {category}/{name}: {error}")]
    AttachFailed { category: String, name: String, error: String },

    #[error(transparent)]
    Aya(#[from] aya::EbpfError),

    #[error(transparent)]
    Map(#[from] aya::maps::MapError),

    #[error(transparent)]
    Program(#[from] aya::programs::ProgramError),
}

#[derive(Error, Debug)]
pub enum SymbolizeError {
    #[error("Failed to read module {path}: {source}")]
    ModuleRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse module {path}: {reason}")]
    ModuleParse { path: PathBuf, reason: String },

    #[error("Symbolization engine failed: {0}")]
    Engine(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Event record has {actual} bytes, expected at least {expected}")]
    Truncated { expected: usize, actual: usize },
}
