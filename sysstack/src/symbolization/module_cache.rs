//! Per-module ELF symbol tables, loaded on first use
//!
//! Each backing path seen in the memory map is opened at most once. Its
//! static (`.symtab`) and dynamic (`.dynsym`) tables are concatenated, static
//! first, so a static symbol wins over a dynamic one covering the same offset.
//! A module that fails to open or parse is remembered as such and never
//! retried.

use log::{debug, warn};
use object::{Object, ObjectSymbol};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::SymbolizeError;

/// One symbol table entry: `[value, value + size)` in file-relative terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSymbol {
    pub value: u64,
    pub size: u64,
    pub name: String,
}

impl NativeSymbol {
    #[must_use]
    pub fn covers(&self, offset: u64) -> bool {
        offset >= self.value && offset - self.value < self.size
    }
}

/// Symbols of one parsed binary, static entries before dynamic ones
#[derive(Debug, Clone, Default)]
pub struct ParsedModule {
    symbols: Vec<NativeSymbol>,
}

impl ParsedModule {
    #[must_use]
    pub fn from_symbols(symbols: Vec<NativeSymbol>) -> Self {
        Self { symbols }
    }

    /// Parse the symbol tables out of raw ELF bytes
    ///
    /// # Errors
    /// Returns an error if `data` is not an object file `object` understands
    pub fn parse(path: &Path, data: &[u8]) -> Result<Self, SymbolizeError> {
        let file = object::File::parse(data).map_err(|e| SymbolizeError::ModuleParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Zero-sized entries (sections, files, undefined imports) never cover an offset
        let symbols = file
            .symbols()
            .chain(file.dynamic_symbols())
            .filter(|sym| sym.size() > 0)
            .filter_map(|sym| {
                let name = sym.name().ok()?;
                Some(NativeSymbol { value: sym.address(), size: sym.size(), name: name.to_string() })
            })
            .collect();

        Ok(Self { symbols })
    }

    /// First symbol covering `offset`
    #[must_use]
    pub fn find(&self, offset: u64) -> Option<&NativeSymbol> {
        self.symbols.iter().find(|sym| sym.covers(offset))
    }

    #[must_use]
    pub fn symbols(&self) -> &[NativeSymbol] {
        &self.symbols
    }
}

/// Path-keyed cache of [`ParsedModule`]s, including failed loads
#[derive(Debug, Default)]
pub struct ModuleCache {
    modules: HashMap<PathBuf, Option<ParsedModule>>,
    parse_count: usize,
}

impl ModuleCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Symbols for the module at `path`, loading it on first request
    ///
    /// `None` means the module could not be opened or parsed; that outcome is
    /// cached as well.
    pub fn lookup(&mut self, path: &str) -> Option<&ParsedModule> {
        let key = Path::new(path);
        if !self.modules.contains_key(key) {
            self.parse_count += 1;
            let loaded = match load_module(key) {
                Ok(module) => {
                    debug!("Loaded {} symbols from {path}", module.symbols.len());
                    Some(module)
                }
                Err(e) => {
                    warn!("{e}");
                    None
                }
            };
            self.modules.insert(key.to_path_buf(), loaded);
        }
        self.modules.get(key).and_then(Option::as_ref)
    }

    /// Number of open-and-parse attempts made so far
    #[must_use]
    pub fn parse_count(&self) -> usize {
        self.parse_count
    }

    /// Number of distinct paths seen, successful or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

fn load_module(path: &Path) -> Result<ParsedModule, SymbolizeError> {
    let data = fs::read(path)
        .map_err(|source| SymbolizeError::ModuleRead { path: path.to_path_buf(), source })?;
    ParsedModule::parse(path, &data)
}
