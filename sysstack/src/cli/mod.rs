//! Command-line interface for sysstack

pub mod args;

pub use args::Args;
