mod common;

use std::fs;

use sysstack::domain::Pid;
use sysstack::symbolization::{
    parse_memory_maps, parse_perf_map, ElfResolver, MemoryRegion, Resolution, ResolverConfig,
    SymbolResolver,
};

fn libfoo_resolver(dir: &tempfile::TempDir) -> ElfResolver {
    let lib = common::write_elf(dir.path(), "libfoo.so", &[("_Z3fooi", 0x10, 0x20)]);
    let regions = vec![MemoryRegion {
        start: 0x40_0000,
        end: 0x40_1000,
        file_offset: 0,
        path: lib.to_str().unwrap().to_string(),
    }];
    ElfResolver::from_parts(Pid(1), regions, vec![], ResolverConfig::default())
}

#[test]
fn test_native_symbol_is_demangled_with_library_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut resolver = libfoo_resolver(&dir);

    let res = resolver.resolve(0x40_0015);
    assert_eq!(res, Resolution::Native { name: "foo".to_string(), module: "libfoo.so".to_string() });
    assert_eq!(res.to_string(), "[native] foo (libfoo.so)");
}

#[test]
fn test_gap_between_symbols_names_library_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut resolver = libfoo_resolver(&dir);

    assert_eq!(resolver.resolve(0x40_0050).to_string(), "0x400050 [libfoo.so]");
    assert_eq!(resolver.resolve(0x99_9999).to_string(), "0x999999 [unknown]");
}

#[test]
fn test_module_parsed_once_for_many_addresses() {
    let dir = tempfile::tempdir().unwrap();
    let mut resolver = libfoo_resolver(&dir);

    for ip in (0x40_0000..0x40_1000).step_by(0x10) {
        resolver.resolve(ip);
    }
    assert_eq!(resolver.modules().parse_count(), 1);
    assert_eq!(resolver.cached(), 0x100);
}

#[test]
fn test_batch_matches_single_with_repeats() {
    let dir = tempfile::tempdir().unwrap();
    let ips = [0x40_0015, 0x99_9999, 0x40_0015, 0x40_0050, 0x40_001f];

    let mut single = libfoo_resolver(&dir);
    let expected: Vec<Resolution> = ips.iter().map(|&ip| single.resolve(ip)).collect();

    let mut batched = libfoo_resolver(&dir);
    assert_eq!(batched.resolve_batch(&ips), expected);
    assert_eq!(batched.resolve_batch(&ips), expected);
}

#[test]
fn test_region_offset_shifts_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let lib = common::write_elf(dir.path(), "libbar.so", &[("bar_impl", 0x2010, 0x20)]);
    let maps = format!("7f0000001000-7f0000002000 r-xp 00002000 08:01 99 {}\n", lib.display());
    let regions = parse_memory_maps(&maps);
    assert_eq!(regions.len(), 1);

    let mut resolver = ElfResolver::from_parts(Pid(1), regions, vec![], ResolverConfig::default());
    // 0x7f0000001018 - 0x7f0000001000 + 0x2000 = 0x2018
    assert_eq!(resolver.resolve(0x7f00_0000_1018).to_string(), "[native] bar_impl (libbar.so)");
}

#[test]
fn test_jit_scenario_from_perf_map_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("perf-4242.map"), "3fbd8a1000 250 LazyCompile:*app.get\n").unwrap();
    let config = ResolverConfig { perf_map_dir: dir.path().to_path_buf() };

    let mut resolver = ElfResolver::from_parts(Pid(4242), vec![], vec![], config);
    resolver.refresh();

    assert_eq!(resolver.resolve(0x3f_bd8a_1100).to_string(), "[jit] LazyCompile:*app.get");
    assert_eq!(resolver.resolve(0x3f_bd8a_1250).to_string(), "0x3fbd8a1250 [unknown]");
}

#[test]
fn test_jit_takes_precedence_over_native() {
    let dir = tempfile::tempdir().unwrap();
    let mut resolver = libfoo_resolver(&dir);
    resolver.set_managed_symbols(parse_perf_map("400000 100 Builtin:Overlay\n"));

    assert_eq!(resolver.resolve(0x40_0015).to_string(), "[jit] Builtin:Overlay");
}
