//! Resolver backed by the blazesym symbolization engine
//!
//! blazesym reads the process' memory map, ELF/DWARF data and perf map on
//! its own, so this backend only translates between its results and
//! [`Resolution`]. A whole stack goes to the engine in one call.

use blazesym::symbolize::{Input, Process, Source, Sym, Symbolized, Symbolizer};
use log::warn;
use std::path::Path;

use super::resolver::SymbolResolver;
use super::Resolution;
use crate::domain::Pid;

pub struct DelegatedResolver {
    pid: Pid,
    symbolizer: Symbolizer,
}

impl DelegatedResolver {
    #[must_use]
    pub fn new(pid: Pid) -> Self {
        Self { pid, symbolizer: Symbolizer::new() }
    }

    fn source(&self) -> Source<'static> {
        let mut process = Process::new(blazesym::Pid::from(self.pid.0));
        process.perf_map = true;
        Source::Process(process)
    }
}

fn from_sym(sym: &Sym<'_>) -> Resolution {
    let name = sym.name.to_string();
    match sym.code_info.as_ref() {
        Some(info) => {
            let file = Path::new(&*info.file)
                .file_name()
                .map_or_else(|| info.file.to_string_lossy(), |f| f.to_string_lossy())
                .into_owned();
            if file.is_empty() {
                Resolution::Named { name }
            } else {
                Resolution::Located { name, file, line: info.line }
            }
        }
        None => Resolution::Named { name },
    }
}

impl SymbolResolver for DelegatedResolver {
    fn resolve(&mut self, ip: u64) -> Resolution {
        self.resolve_batch(&[ip]).pop().unwrap_or(Resolution::Unresolved { addr: ip })
    }

    fn resolve_batch(&mut self, ips: &[u64]) -> Vec<Resolution> {
        let source = self.source();
        match self.symbolizer.symbolize(&source, Input::AbsAddr(ips)) {
            Ok(results) if results.len() == ips.len() => ips
                .iter()
                .zip(results)
                .map(|(&ip, result)| match result {
                    Symbolized::Sym(sym) => from_sym(&sym),
                    _ => Resolution::Unresolved { addr: ip },
                })
                .collect(),
            Ok(results) => {
                warn!("blazesym returned {} results for {} addresses", results.len(), ips.len());
                ips.iter().map(|&addr| Resolution::Unresolved { addr }).collect()
            }
            Err(e) => {
                warn!("blazesym failed for {}: {e}", self.pid);
                ips.iter().map(|&addr| Resolution::Unresolved { addr }).collect()
            }
        }
    }
}
