//! Display names for x86_64 syscall numbers
//!
//! Covers the calls a typical server process makes; anything else is shown
//! as `syscall_<id>`.

use std::borrow::Cow;

use crate::domain::SyscallId;

/// `(number, name)`, sorted by number
static SYSCALL_NAMES: &[(u32, &str)] = &[
    (0, "read"),
    (1, "write"),
    (2, "open"),
    (3, "close"),
    (4, "stat"),
    (5, "fstat"),
    (6, "lstat"),
    (7, "poll"),
    (8, "lseek"),
    (9, "mmap"),
    (10, "mprotect"),
    (11, "munmap"),
    (12, "brk"),
    (13, "rt_sigaction"),
    (14, "rt_sigprocmask"),
    (16, "ioctl"),
    (17, "pread64"),
    (18, "pwrite64"),
    (19, "readv"),
    (20, "writev"),
    (21, "access"),
    (22, "pipe"),
    (23, "select"),
    (24, "sched_yield"),
    (28, "madvise"),
    (32, "dup"),
    (33, "dup2"),
    (35, "nanosleep"),
    (39, "getpid"),
    (41, "socket"),
    (42, "connect"),
    (43, "accept"),
    (44, "sendto"),
    (45, "recvfrom"),
    (46, "sendmsg"),
    (47, "recvmsg"),
    (48, "shutdown"),
    (49, "bind"),
    (50, "listen"),
    (51, "getsockname"),
    (52, "getpeername"),
    (54, "setsockopt"),
    (55, "getsockopt"),
    (56, "clone"),
    (57, "fork"),
    (59, "execve"),
    (60, "exit"),
    (61, "wait4"),
    (62, "kill"),
    (72, "fcntl"),
    (74, "fsync"),
    (77, "ftruncate"),
    (79, "getcwd"),
    (87, "unlink"),
    (89, "readlink"),
    (96, "gettimeofday"),
    (102, "getuid"),
    (186, "gettid"),
    (202, "futex"),
    (213, "epoll_create"),
    (217, "getdents64"),
    (228, "clock_gettime"),
    (230, "clock_nanosleep"),
    (231, "exit_group"),
    (232, "epoll_wait"),
    (233, "epoll_ctl"),
    (257, "openat"),
    (262, "newfstatat"),
    (270, "pselect6"),
    (271, "ppoll"),
    (281, "epoll_pwait"),
    (284, "eventfd"),
    (288, "accept4"),
    (290, "eventfd2"),
    (291, "epoll_create1"),
    (293, "pipe2"),
    (302, "prlimit64"),
    (318, "getrandom"),
    (332, "statx"),
    (334, "rseq"),
    (425, "io_uring_setup"),
    (426, "io_uring_enter"),
    (435, "clone3"),
];

/// Name for `id`, or `syscall_<id>` when it is not in the table
#[must_use]
pub fn syscall_name(id: SyscallId) -> Cow<'static, str> {
    SYSCALL_NAMES
        .binary_search_by_key(&id.0, |&(nr, _)| nr)
        .map_or_else(|_| Cow::Owned(format!("syscall_{}", id.0)), |i| Cow::Borrowed(SYSCALL_NAMES[i].1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        assert!(SYSCALL_NAMES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_known_names() {
        assert_eq!(syscall_name(SyscallId(0)), "read");
        assert_eq!(syscall_name(SyscallId(257)), "openat");
        assert_eq!(syscall_name(SyscallId(318)), "getrandom");
    }

    #[test]
    fn test_unknown_falls_back() {
        assert_eq!(syscall_name(SyscallId(9999)), "syscall_9999");
        assert_eq!(syscall_name(SyscallId(15)), "syscall_15");
    }
}
