//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::profiling::PipelineConfig;
use crate::symbolization::perf_map::DEFAULT_PERF_MAP_DIR;
use crate::symbolization::{Backend, ResolverConfig};

#[derive(Parser, Debug)]
#[command(
    name = "sysstack",
    about = "Print the user stack of every syscall a process makes",
    after_help = "\
EXAMPLES:
    sudo sysstack server.js                     Find the process by name or script
    sudo sysstack --pid 1234                    Explicit PID
    sudo sysstack --pid 1234 --backend delegated
                                                Symbolize with blazesym"
)]
pub struct Args {
    /// Process name or script to trace (auto-detects PID)
    #[arg(value_name = "PROCESS", conflicts_with = "pid")]
    pub process: Option<String>,

    /// Process ID to trace
    #[arg(short, long)]
    pub pid: Option<u32>,

    /// Symbolization backend
    #[arg(short, long, value_enum, default_value_t = Backend::SelfContained)]
    pub backend: Backend,

    /// Seconds between perf map reloads
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_secs: u64,

    /// Directory holding perf-<pid>.map files (self-contained backend only)
    #[arg(long, value_name = "DIR", default_value = DEFAULT_PERF_MAP_DIR)]
    pub perf_map_dir: PathBuf,

    /// Stop after N seconds (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub duration: u64,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig { perf_map_dir: self.perf_map_dir.clone() }
    }

    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig { refresh_interval: Duration::from_secs(self.refresh_secs) }
    }

    /// `None` when tracing until interrupted
    #[must_use]
    pub fn duration_limit(&self) -> Option<Duration> {
        (self.duration > 0).then(|| Duration::from_secs(self.duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["sysstack", "--pid", "42"]).unwrap();
        assert_eq!(args.pid, Some(42));
        assert_eq!(args.backend, Backend::SelfContained);
        assert_eq!(args.pipeline_config().refresh_interval, Duration::from_secs(5));
        assert_eq!(args.resolver_config().perf_map_dir, PathBuf::from("/tmp"));
        assert_eq!(args.duration_limit(), None);
    }

    #[test]
    fn test_backend_and_limits() {
        let args = Args::try_parse_from([
            "sysstack",
            "node",
            "--backend",
            "delegated",
            "--refresh-secs",
            "2",
            "--duration",
            "30",
        ])
        .unwrap();
        assert_eq!(args.process.as_deref(), Some("node"));
        assert_eq!(args.backend, Backend::Delegated);
        assert_eq!(args.pipeline_config().refresh_interval, Duration::from_secs(2));
        assert_eq!(args.duration_limit(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_rejects_zero_refresh_and_pid_with_name() {
        assert!(Args::try_parse_from(["sysstack", "--pid", "1", "--refresh-secs", "0"]).is_err());
        assert!(Args::try_parse_from(["sysstack", "node", "--pid", "1"]).is_err());
    }
}
