//! Find the target PID from a process name.
//!
//! Runtimes are often started through an interpreter (`node server.js`), so
//! besides the command name the match also looks at the program path and
//! the first non-flag argument of `/proc/<pid>/cmdline`.

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::domain::Pid;

/// A process matching a lookup pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessMatch {
    pub pid: Pid,
    /// Command name from `/proc/<pid>/stat`
    pub command: String,
    /// Arguments joined with spaces
    pub cmdline: String,
}

/// Find the single process whose name or arguments match `pattern`.
///
/// The calling process and its ancestors (`sudo`, the shell) are never
/// matched.
///
/// # Errors
/// - `/proc` is unreadable
/// - No process matches
/// - More than one process matches (ambiguous)
pub fn find_process_by_name(pattern: &str) -> Result<ProcessMatch> {
    let skipped = ancestry(std::process::id());
    let mut matches = Vec::new();

    for entry in fs::read_dir("/proc").context("Failed to read /proc")?.flatten() {
        let Ok(pid) = entry.file_name().to_string_lossy().parse::<u32>() else {
            continue;
        };
        if skipped.contains(&pid) {
            continue;
        }

        // Processes can exit between readdir and read
        let Ok(stat) = fs::read_to_string(format!("/proc/{pid}/stat")) else {
            continue;
        };
        let Some(command) = extract_comm(&stat) else {
            continue;
        };
        let cmdline = fs::read(format!("/proc/{pid}/cmdline"))
            .map(|raw| split_cmdline(&raw))
            .unwrap_or_default();

        // Kernel threads have an empty cmdline
        if cmdline.is_empty() {
            continue;
        }

        if is_match(&command, &cmdline, pattern) {
            matches.push(ProcessMatch { pid: Pid(pid), command, cmdline: cmdline.join(" ") });
        }
    }

    match matches.len() {
        0 => bail!(
            "No process matching '{pattern}' found.\n\
             Check running processes with: ps aux | grep {pattern}"
        ),
        1 => Ok(matches.remove(0)),
        _ => {
            let list: Vec<String> =
                matches.iter().map(|m| format!("  {} ({})", m.pid.0, m.cmdline)).collect();
            bail!(
                "Multiple processes match '{pattern}':\n{}\n\n\
                 Specify PID explicitly: sysstack --pid <PID>",
                list.join("\n")
            )
        }
    }
}

/// `pid` and every parent above it, up to init
fn ancestry(pid: u32) -> HashSet<u32> {
    let mut seen = HashSet::new();
    let mut current = pid;
    while current > 1 && seen.insert(current) {
        let Some(parent) = fs::read_to_string(format!("/proc/{current}/stat"))
            .ok()
            .and_then(|stat| parent_pid(&stat))
        else {
            break;
        };
        current = parent;
    }
    seen
}

/// Command name from a `/proc/<pid>/stat` line: "pid (comm) state ..."
fn extract_comm(stat_line: &str) -> Option<String> {
    let open = stat_line.find('(')?;
    let close = stat_line.rfind(')')?;
    (open < close).then(|| stat_line[open + 1..close].to_string())
}

/// Parent PID, the field after the state in a `/proc/<pid>/stat` line
fn parent_pid(stat_line: &str) -> Option<u32> {
    let close = stat_line.rfind(')')?;
    stat_line[close + 1..].split_whitespace().nth(1)?.parse().ok()
}

/// NUL-separated `/proc/<pid>/cmdline` bytes into arguments
fn split_cmdline(raw: &[u8]) -> Vec<String> {
    raw.split(|&b| b == 0)
        .filter(|arg| !arg.is_empty())
        .map(|arg| String::from_utf8_lossy(arg).into_owned())
        .collect()
}

fn basename(path: &str) -> &str {
    Path::new(path).file_name().and_then(|n| n.to_str()).unwrap_or(path)
}

/// Exact match on the command name, the program, or the script it runs
///
/// The script is the first argument after the program that is not a flag,
/// so `node --perf-basic-prof server.js` matches `server.js` while
/// `sudo ./sysstack server.js` does not.
fn is_match(command: &str, args: &[String], pattern: &str) -> bool {
    let wanted = basename(pattern);
    let program = args.first().map(|arg| basename(arg));
    let script = args.iter().skip(1).find(|arg| !arg.starts_with('-')).map(|arg| basename(arg));

    command == wanted || program == Some(wanted) || script == Some(wanted)
}
