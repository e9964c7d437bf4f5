//! # sysstack - Main Entry Point
//!
//! Loads the probe, attaches it to the target process and prints one stack
//! per syscall until Ctrl+C, SIGTERM, `--duration` or the target exits.

use anyhow::{Context, Result};
use aya::maps::{RingBuf, StackTraceMap};
use clap::Parser;
use log::info;
use std::io::{self, BufWriter};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::signal::unix::{signal, SignalKind};

use sysstack::cli::Args;
use sysstack::domain::Pid;
use sysstack::preflight::run_preflight_checks;
use sysstack::process_lookup::find_process_by_name;
use sysstack::profiling::{
    attach_sys_enter, display_statistics, init_ebpf_logger, load_ebpf_program, set_target_pid,
    BootClock, EventPipeline,
};
use sysstack::symbolization::build_resolver;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_NOPERM: i32 = 77;

/// Sleep between ring buffer drains
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("permission denied")
        || msg.contains("operation not permitted")
        || msg.contains("requires root")
    {
        EXIT_NOPERM
    } else if msg.contains("missing required argument") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

/// Resolve the target PID from `--pid` or the positional process name
fn resolve_pid(args: &Args) -> Result<Pid> {
    if let Some(pid) = args.pid {
        return Ok(Pid(pid));
    }
    if let Some(ref name) = args.process {
        let found = find_process_by_name(name)?;
        info!("Matched {} ({})", found.pid, found.cmdline);
        return Ok(found.pid);
    }
    anyhow::bail!(
        "Missing required argument: PROCESS or --pid\n\n\
         Usage:\n  \
         sysstack server.js      Find the process by name or script\n  \
         sysstack --pid 1234     Explicit PID\n\n\
         Run 'sysstack --help' for more options"
    )
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;

    let pid = resolve_pid(&args)?;
    let resolver_config = args.resolver_config();
    run_preflight_checks(pid, &resolver_config.perf_map_dir, quiet)?;

    if !quiet {
        println!("sysstack v{}", env!("CARGO_PKG_VERSION"));
        println!("pid: {}", pid.0);
        println!("backend: {:?}", args.backend);
    }

    let mut bpf = load_ebpf_program()?;
    init_ebpf_logger(&mut bpf);
    set_target_pid(&mut bpf, pid)?;

    let mut ring_buf = RingBuf::try_from(bpf.take_map("EVENTS").context("EVENTS map not found")?)?;
    let stack_traces: StackTraceMap<_> = StackTraceMap::try_from(
        bpf.take_map("STACK_TRACES").context("STACK_TRACES map not found")?,
    )?;

    // Snapshot maps before attaching so the first events resolve
    let resolver = build_resolver(pid, args.backend, &resolver_config)?;
    let out = BufWriter::new(io::stdout().lock());
    let mut pipeline =
        EventPipeline::new(resolver, out, BootClock::now(), &args.pipeline_config());

    attach_sys_enter(&mut bpf)?;
    if !quiet {
        eprintln!("tracing syscalls of pid {} (Ctrl+C to stop)", pid.0);
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

    let started = Instant::now();
    let duration_limit = args.duration_limit();
    let proc_path = format!("/proc/{}", pid.0);
    let mut exit_reason = "interrupted";

    loop {
        if duration_limit.is_some_and(|limit| started.elapsed() >= limit) {
            exit_reason = "duration limit reached";
            break;
        }

        if !Path::new(&proc_path).exists() {
            exit_reason = "process exited";
            break;
        }

        while let Some(item) = ring_buf.next() {
            pipeline.process_record(&item, &stack_traces).context("Failed to write output")?;
        }
        pipeline.flush().context("Failed to write output")?;

        tokio::select! {
            () = tokio::time::sleep(POLL_INTERVAL) => {}
            _ = &mut ctrl_c => break,
            _ = sigterm.recv() => break,
        }
    }

    // Records already queued when the loop ended
    while let Some(item) = ring_buf.next() {
        pipeline.process_record(&item, &stack_traces).context("Failed to write output")?;
    }
    pipeline.flush().context("Failed to write output")?;

    if !quiet {
        eprintln!("\n{exit_reason}: {:.1}s", started.elapsed().as_secs_f64());
        display_statistics(pipeline.stats());
    }

    Ok(())
}
