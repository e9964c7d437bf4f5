//! The symbolization capability the event pipeline is written against
//!
//! Two backends implement it:
//! - [`ElfResolver`](super::ElfResolver): reads `/proc/<pid>/maps`, the perf
//!   map and ELF symbol tables itself
//! - `DelegatedResolver` (feature `delegated`): hands whole batches to
//!   blazesym

use std::path::{Path, PathBuf};

use super::perf_map::DEFAULT_PERF_MAP_DIR;
use super::{ElfResolver, Resolution};
use crate::domain::{Pid, SymbolizeError};

/// Turns instruction pointers of one process into [`Resolution`]s
pub trait SymbolResolver {
    /// Resolve a single address
    fn resolve(&mut self, ip: u64) -> Resolution;

    /// Resolve `ips` in order, one result per input
    ///
    /// Must return exactly what calling [`resolve`](Self::resolve) on each
    /// address in turn would; backends override it only to batch work.
    fn resolve_batch(&mut self, ips: &[u64]) -> Vec<Resolution> {
        ips.iter().map(|&ip| self.resolve(ip)).collect()
    }

    /// Pick up newly JIT-compiled code
    fn refresh(&mut self) {}
}

impl<R: SymbolResolver + ?Sized> SymbolResolver for Box<R> {
    fn resolve(&mut self, ip: u64) -> Resolution {
        (**self).resolve(ip)
    }

    fn resolve_batch(&mut self, ips: &[u64]) -> Vec<Resolution> {
        (**self).resolve_batch(ips)
    }

    fn refresh(&mut self) {
        (**self).refresh();
    }
}

/// Which [`SymbolResolver`] implementation to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Backend {
    /// Built-in ELF symbol table + perf map resolver
    #[default]
    SelfContained,
    /// Delegate to the blazesym engine
    Delegated,
}

/// Settings shared by the resolver backends
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Directory holding `perf-<pid>.map` files
    pub perf_map_dir: PathBuf,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { perf_map_dir: PathBuf::from(DEFAULT_PERF_MAP_DIR) }
    }
}

/// Build the resolver selected by `backend` for process `pid`
///
/// # Errors
/// Returns an error if the delegated backend was requested but is not
/// compiled in, or together with a perf map directory other than `/tmp`
/// (blazesym always reads `/tmp/perf-<pid>.map`)
pub fn build_resolver(
    pid: Pid,
    backend: Backend,
    config: &ResolverConfig,
) -> Result<Box<dyn SymbolResolver>, SymbolizeError> {
    if backend == Backend::Delegated && config.perf_map_dir != Path::new(DEFAULT_PERF_MAP_DIR) {
        return Err(SymbolizeError::Engine(format!(
            "the delegated backend only reads perf maps from {DEFAULT_PERF_MAP_DIR}, not {}",
            config.perf_map_dir.display()
        )));
    }

    match backend {
        Backend::SelfContained => Ok(Box::new(ElfResolver::new(pid, config.clone()))),
        #[cfg(feature = "delegated")]
        Backend::Delegated => Ok(Box::new(super::DelegatedResolver::new(pid))),
        #[cfg(not(feature = "delegated"))]
        Backend::Delegated => Err(SymbolizeError::Engine(
            "delegated backend not compiled in (enable the `delegated` feature)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts calls to check which entry point the pipeline used
    struct Echo {
        singles: usize,
    }

    impl SymbolResolver for Echo {
        fn resolve(&mut self, ip: u64) -> Resolution {
            self.singles += 1;
            Resolution::Unresolved { addr: ip }
        }
    }

    #[test]
    fn test_default_batch_maps_in_order() {
        let mut echo = Echo { singles: 0 };
        let out = echo.resolve_batch(&[3, 1, 3]);
        assert_eq!(
            out,
            vec![
                Resolution::Unresolved { addr: 3 },
                Resolution::Unresolved { addr: 1 },
                Resolution::Unresolved { addr: 3 },
            ]
        );
        assert_eq!(echo.singles, 3);
    }

    #[test]
    fn test_boxed_resolver_forwards() {
        let mut boxed: Box<dyn SymbolResolver> = Box::new(Echo { singles: 0 });
        assert_eq!(boxed.resolve(7), Resolution::Unresolved { addr: 7 });
        assert_eq!(boxed.resolve_batch(&[8]).len(), 1);
    }

    #[test]
    fn test_delegated_rejects_custom_perf_map_dir() {
        let config = ResolverConfig { perf_map_dir: PathBuf::from("/var/run/jit") };
        let err = build_resolver(Pid(1), Backend::Delegated, &config).err().unwrap();
        assert!(err.to_string().contains("/var/run/jit"));

        // The self-contained backend honors the directory
        assert!(build_resolver(Pid(1), Backend::SelfContained, &config).is_ok());
    }

    #[test]
    fn test_build_self_contained_for_missing_process() {
        let resolver = build_resolver(Pid(u32::MAX), Backend::SelfContained, &ResolverConfig::default());
        let mut resolver = resolver.unwrap();
        assert_eq!(resolver.resolve(0x1234), Resolution::Unresolved { addr: 0x1234 });
    }
}
