//! Self-contained resolver: perf map, `/proc/<pid>/maps` and ELF symbol tables
//!
//! Lookup order for an address:
//! 1. the resolution cache
//! 2. JIT ranges from the perf map
//! 3. file-backed regions; the runtime address is translated into a file
//!    offset and searched in the module's symbol tables
//! 4. otherwise unresolved
//!
//! Every outcome is cached by address. JIT reloads do **not** invalidate the
//! cache: an address resolved before its code was recompiled keeps its old
//! name. Callers that want fresh names after a reload can call
//! [`ElfResolver::clear_cache`].

use log::debug;
use std::collections::HashMap;

use super::demangle::demangle;
use super::memory_maps::{load_memory_maps, MemoryRegion};
use super::module_cache::ModuleCache;
use super::perf_map::{load_perf_map, ManagedSymbol};
use super::resolver::{ResolverConfig, SymbolResolver};
use super::Resolution;
use crate::domain::Pid;

/// Symbolizes addresses of one process without external engines
pub struct ElfResolver {
    pid: Pid,
    config: ResolverConfig,
    regions: Vec<MemoryRegion>,
    managed: Vec<ManagedSymbol>,
    modules: ModuleCache,
    cache: HashMap<u64, Resolution>,
}

impl ElfResolver {
    /// Snapshot the memory map and perf map of `pid`
    #[must_use]
    pub fn new(pid: Pid, config: ResolverConfig) -> Self {
        let regions = load_memory_maps(pid);
        let managed = load_perf_map(&config.perf_map_dir, pid);
        Self::from_parts(pid, regions, managed, config)
    }

    /// Build a resolver from already parsed snapshots
    #[must_use]
    pub fn from_parts(
        pid: Pid,
        regions: Vec<MemoryRegion>,
        managed: Vec<ManagedSymbol>,
        config: ResolverConfig,
    ) -> Self {
        Self { pid, config, regions, managed, modules: ModuleCache::new(), cache: HashMap::new() }
    }

    /// Replace the JIT table wholesale
    pub fn set_managed_symbols(&mut self, managed: Vec<ManagedSymbol>) {
        self.managed = managed;
    }

    /// Forget every cached resolution
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn managed_symbols(&self) -> &[ManagedSymbol] {
        &self.managed
    }

    #[must_use]
    pub fn modules(&self) -> &ModuleCache {
        &self.modules
    }

    /// Number of cached resolutions
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn lookup(&mut self, ip: u64) -> Resolution {
        if let Some(sym) = self.managed.iter().find(|sym| sym.contains(ip)) {
            return Resolution::Managed { name: sym.name.clone() };
        }

        let Some(region) = self.regions.iter().find(|region| region.contains(ip)) else {
            return Resolution::Unresolved { addr: ip };
        };

        let offset = region.file_offset_of(ip);
        let module = region.base_name().to_string();

        match self.modules.lookup(&region.path).and_then(|m| m.find(offset)) {
            Some(sym) => Resolution::Native { name: demangle(&sym.name).into_owned(), module },
            None => {
                debug!("0x{ip:x}: no symbol at offset 0x{offset:x} in {}", region.path);
                Resolution::ModuleOnly { addr: ip, module }
            }
        }
    }
}

impl SymbolResolver for ElfResolver {
    fn resolve(&mut self, ip: u64) -> Resolution {
        if let Some(cached) = self.cache.get(&ip) {
            return cached.clone();
        }

        let resolved = self.lookup(ip);
        self.cache.insert(ip, resolved.clone());
        resolved
    }

    /// Reload the perf map; cached resolutions are kept
    fn refresh(&mut self) {
        self.managed = load_perf_map(&self.config.perf_map_dir, self.pid);
        debug!("Refreshed JIT table: {} symbols", self.managed.len());
    }
}
