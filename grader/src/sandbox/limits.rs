//! Best-effort CPU and memory ceilings for the child interpreter.

use std::process::Command;

use tracing::debug;

/// Whether rlimit-based ceilings can be applied on this host.
///
/// Probed once per run so callers can tell the learner when the ceilings
/// are absent instead of silently running without them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceLimiter {
    Available {
        max_memory_mb: u64,
        max_cpu_secs: u64,
    },
    Unsupported,
}

impl ResourceLimiter {
    pub fn probe(max_memory_mb: u64, max_cpu_secs: u64) -> ResourceLimiter {
        if cfg!(unix) {
            ResourceLimiter::Available {
                max_memory_mb,
                max_cpu_secs,
            }
        } else {
            ResourceLimiter::Unsupported
        }
    }

    /// Arrange for the limits to be set in the child after fork.
    ///
    /// Failures inside the child are ignored; the wall-clock timeout is the
    /// hard backstop and these ceilings only tighten it.
    pub fn apply(self, cmd: &mut Command) {
        match self {
            ResourceLimiter::Available {
                max_memory_mb,
                max_cpu_secs,
            } => {
                debug!(max_memory_mb, max_cpu_secs, "applying rlimits to child");
                apply_rlimits(cmd, max_memory_mb, max_cpu_secs);
            }
            ResourceLimiter::Unsupported => {}
        }
    }
}

#[cfg(unix)]
fn apply_rlimits(cmd: &mut Command, max_memory_mb: u64, max_cpu_secs: u64) {
    use std::os::unix::process::CommandExt;

    let memory_bytes = max_memory_mb.max(16) * 1024 * 1024;
    // SAFETY: setrlimit is async-signal-safe; nothing here allocates or
    // touches locks between fork and exec.
    unsafe {
        cmd.pre_exec(move || {
            let cpu = libc::rlimit {
                rlim_cur: max_cpu_secs as libc::rlim_t,
                rlim_max: (max_cpu_secs + 1) as libc::rlim_t,
            };
            libc::setrlimit(libc::RLIMIT_CPU, &cpu);

            let mem = libc::rlimit {
                rlim_cur: memory_bytes as libc::rlim_t,
                rlim_max: memory_bytes as libc::rlim_t,
            };
            if libc::setrlimit(libc::RLIMIT_AS, &mem) != 0 {
                libc::setrlimit(libc::RLIMIT_DATA, &mem);
            }
            Ok(())
        });
    }
}

#[cfg(not(unix))]
fn apply_rlimits(_cmd: &mut Command, _max_memory_mb: u64, _max_cpu_secs: u64) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_reflects_the_platform() {
        let limiter = ResourceLimiter::probe(128, 2);
        if cfg!(unix) {
            assert_eq!(
                limiter,
                ResourceLimiter::Available {
                    max_memory_mb: 128,
                    max_cpu_secs: 2
                }
            );
        } else {
            assert_eq!(limiter, ResourceLimiter::Unsupported);
        }
    }
}
