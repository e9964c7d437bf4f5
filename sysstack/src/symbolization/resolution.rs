//! Resolved frame descriptions and their printed form

use std::fmt;

/// What an instruction pointer resolved to
///
/// The `Display` form is what gets printed next to each frame; every variant
/// carries a distinct tag so JIT, native, partially resolved and unknown
/// frames can be told apart at a glance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Inside a JIT-compiled range from the perf map
    Managed { name: String },

    /// Covered by a symbol of a mapped binary
    Native { name: String, module: String },

    /// Inside a mapped binary, but no symbol covers it (or the binary could not be read)
    ModuleOnly { addr: u64, module: String },

    /// Not inside any known region
    Unresolved { addr: u64 },

    /// Resolved by the delegated engine with source location
    Located { name: String, file: String, line: Option<u32> },

    /// Resolved by the delegated engine without source location
    Named { name: String },
}

impl Resolution {
    /// True when a function name was found
    #[must_use]
    pub fn is_symbolized(&self) -> bool {
        !matches!(self, Self::ModuleOnly { .. } | Self::Unresolved { .. })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Managed { name } => write!(f, "[jit] {name}"),
            Self::Native { name, module } => write!(f, "[native] {name} ({module})"),
            Self::ModuleOnly { addr, module } => write!(f, "0x{addr:x} [{module}]"),
            Self::Unresolved { addr } => write!(f, "0x{addr:x} [unknown]"),
            Self::Located { name, file, line: Some(line) } => {
                write!(f, "[native] {name} ({file}:{line})")
            }
            Self::Located { name, file, line: None } => write!(f, "[native] {name} ({file})"),
            Self::Named { name } => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_tags() {
        let managed = Resolution::Managed { name: "LazyCompile:*app.get".to_string() };
        assert_eq!(managed.to_string(), "[jit] LazyCompile:*app.get");

        let native = Resolution::Native { name: "foo".to_string(), module: "libfoo.so".to_string() };
        assert_eq!(native.to_string(), "[native] foo (libfoo.so)");

        let partial = Resolution::ModuleOnly { addr: 0x40_0050, module: "libfoo.so".to_string() };
        assert_eq!(partial.to_string(), "0x400050 [libfoo.so]");

        let unknown = Resolution::Unresolved { addr: 0x99_9999 };
        assert_eq!(unknown.to_string(), "0x999999 [unknown]");

        let located = Resolution::Located {
            name: "uv_run".to_string(),
            file: "core.c".to_string(),
            line: Some(391),
        };
        assert_eq!(located.to_string(), "[native] uv_run (core.c:391)");
    }

    #[test]
    fn test_symbolized_classification() {
        assert!(Resolution::Named { name: "x".to_string() }.is_symbolized());
        assert!(!Resolution::Unresolved { addr: 1 }.is_symbolized());
        assert!(!Resolution::ModuleOnly { addr: 1, module: "libfoo.so".to_string() }.is_symbolized());
        assert!(Resolution::Managed { name: "f".to_string() }.is_symbolized());
    }
}
