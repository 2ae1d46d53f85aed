// Copyright 2024-2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pinning of worker threads to CPUs.
//!
//! The platform-specific code is confined to the private `platform` module,
//! which exposes the same interface on every platform. Callers never need
//! conditional compilation: on platforms without affinity control, pinning is
//! a no-op.

use crate::macros::{log_debug, log_warn};

/// Policy to pin worker threads to CPUs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CpuPinningPolicy {
    /// Don't pin worker threads to CPUs, letting the OS scheduler migrate
    /// them.
    No,
    /// Pin each worker thread to the CPU with the same index as the worker, if
    /// CPU pinning is supported and implemented on this platform. Failures to
    /// pin a thread are logged, and the thread continues unpinned.
    IfSupported,
}

impl CpuPinningPolicy {
    /// Returns the policy corresponding to whether threads are allowed to
    /// migrate across CPUs.
    pub fn from_migration_allowed(migration_allowed: bool) -> Self {
        if migration_allowed {
            CpuPinningPolicy::No
        } else {
            CpuPinningPolicy::IfSupported
        }
    }

    /// Returns whether this policy lets threads migrate across CPUs.
    pub fn migration_allowed(self) -> bool {
        self == CpuPinningPolicy::No
    }
}

/// Whether pinning threads to CPUs is implemented on this platform.
pub const CPU_PINNING_SUPPORTED: bool = platform::SUPPORTED;

/// Outcome of [`pin_current_thread()`].
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PinOutcome {
    /// The policy doesn't require pinning.
    NotRequested,
    /// Pinning isn't implemented on this platform.
    Unsupported,
    /// The thread is now pinned.
    Pinned,
    /// The OS refused to pin the thread, which continues unpinned.
    Failed,
}

/// Pins the calling thread to the CPU with the given index, according to the
/// policy.
pub(crate) fn pin_current_thread(cpu: usize, policy: CpuPinningPolicy) -> PinOutcome {
    match policy {
        CpuPinningPolicy::No => PinOutcome::NotRequested,
        CpuPinningPolicy::IfSupported if !platform::SUPPORTED => PinOutcome::Unsupported,
        CpuPinningPolicy::IfSupported => match platform::set_current_thread_affinity(cpu) {
            Ok(()) => {
                log_debug!("Pinned thread #{cpu} to CPU #{cpu}");
                PinOutcome::Pinned
            }
            Err(_e) => {
                log_warn!("Failed to set CPU affinity for thread #{cpu}: {_e}");
                PinOutcome::Failed
            }
        },
    }
}

// Platforms that support `libc::sched_setaffinity()`.
#[cfg(all(
    not(miri),
    any(
        target_os = "android",
        target_os = "dragonfly",
        target_os = "freebsd",
        target_os = "linux"
    )
))]
mod platform {
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::unistd::Pid;

    pub(super) const SUPPORTED: bool = true;

    /// Restricts the calling thread to the given CPU.
    pub(super) fn set_current_thread_affinity(cpu: usize) -> nix::Result<()> {
        let mut cpu_set = CpuSet::new();
        cpu_set.set(cpu)?;
        // Process ID 0 designates the calling thread.
        sched_setaffinity(Pid::from_raw(0), &cpu_set)
    }
}

#[cfg(any(
    miri,
    not(any(
        target_os = "android",
        target_os = "dragonfly",
        target_os = "freebsd",
        target_os = "linux"
    ))
))]
mod platform {
    use std::convert::Infallible;

    pub(super) const SUPPORTED: bool = false;

    pub(super) fn set_current_thread_affinity(_cpu: usize) -> Result<(), Infallible> {
        Ok(())
    }
}
