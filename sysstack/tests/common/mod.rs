//! Fixtures shared by the integration tests

use object::write::{Object, Symbol, SymbolSection};
use object::{
    Architecture, BinaryFormat, Endianness, SectionKind, SymbolFlags, SymbolKind, SymbolScope,
};
use std::path::{Path, PathBuf};

/// Write an x86-64 ELF object named `name` into `dir` with one `.text`
/// section and the given `(name, value, size)` function symbols
pub fn write_elf(dir: &Path, name: &str, symbols: &[(&str, u64, u64)]) -> PathBuf {
    let mut obj = Object::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);
    let text = obj.add_section(Vec::new(), b".text".to_vec(), SectionKind::Text);
    obj.append_section_data(text, &[0x90; 0x100], 16);

    for &(sym_name, value, size) in symbols {
        obj.add_symbol(Symbol {
            name: sym_name.as_bytes().to_vec(),
            value,
            size,
            kind: SymbolKind::Text,
            scope: SymbolScope::Linkage,
            weak: false,
            section: SymbolSection::Section(text),
            flags: SymbolFlags::None,
        });
    }

    let path = dir.join(name);
    std::fs::write(&path, obj.write().unwrap()).unwrap();
    path
}
