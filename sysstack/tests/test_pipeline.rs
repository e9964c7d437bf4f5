mod common;

use chrono::{Local, TimeZone};
use std::collections::HashMap;

use sysstack::domain::{Pid, StackId};
use sysstack::profiling::{BootClock, EventPipeline, PipelineConfig};
use sysstack::symbolization::{parse_perf_map, ElfResolver, MemoryRegion, ResolverConfig};
use sysstack_common::{SyscallEvent, MAX_STACK_DEPTH};

#[test]
fn test_records_to_text() {
    let dir = tempfile::tempdir().unwrap();
    let lib = common::write_elf(dir.path(), "libfoo.so", &[("_Z3fooi", 0x10, 0x20)]);
    let regions = vec![MemoryRegion {
        start: 0x40_0000,
        end: 0x40_1000,
        file_offset: 0,
        path: lib.to_str().unwrap().to_string(),
    }];
    let managed = parse_perf_map("3fbd8a1000 250 LazyCompile:*app.get\n");
    let resolver = ElfResolver::from_parts(Pid(1), regions, managed, ResolverConfig::default());

    let mut frames = vec![0u64; MAX_STACK_DEPTH];
    frames[0] = 0x40_0015;
    frames[1] = 0x3f_bd8a_1100;
    frames[2] = 0x40_0050;
    frames[3] = 0x99_9999;
    let stacks = HashMap::from([(StackId(7), frames)]);

    let boot = Local.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
    let mut pipeline = EventPipeline::new(
        resolver,
        Vec::new(),
        BootClock::from_boot_time(boot),
        &PipelineConfig::default(),
    );

    let ok = SyscallEvent { timestamp_ns: 2_000_001_000, syscall_id: 257, stack_id: 7 };
    let failed = SyscallEvent { timestamp_ns: 3_000_000_000, syscall_id: 0, stack_id: -14 };
    pipeline.process_record(&ok.to_le_bytes(), &stacks).unwrap();
    pipeline.process_record(&[1, 2, 3], &stacks).unwrap();
    pipeline.process_record(&failed.to_le_bytes(), &stacks).unwrap();

    let stats = *pipeline.stats();
    let (resolver, out) = pipeline.into_parts();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "\n[10:00:02.000001] syscall=openat          id=257 stack_id=7\n\
         \x20     [ 0] [native] foo (libfoo.so)\n\
         \x20     [ 1] [jit] LazyCompile:*app.get\n\
         \x20     [ 2] 0x400050 [libfoo.so]\n\
         \x20     [ 3] 0x999999 [unknown]\n\
         \n[10:00:03.000000] syscall=read            id=0 stack_id=-14\n"
    );
    assert_eq!(stats.events, 2);
    assert_eq!(stats.decode_failures, 1);
    assert_eq!(stats.stack_misses, 1);
    assert_eq!(stats.frames, 4);
    assert_eq!(stats.symbolized, 2);
    assert_eq!(resolver.modules().parse_count(), 1);
}
