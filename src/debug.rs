// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Debug-logging functionality.
//!
//! This module is still present when the `log` feature is disabled, but all
//! logging operations are redacted. A redacted statement evaluates its
//! arguments and immediately discards the result, so nothing is formatted
//! and no logger is linked in; the leftover expression is dead code for the
//! optimizer to strip.
//!
//! `bootgate` code *should not* call into the [`log`] crate directly outside
//! of this module. Note also that the validation orchestrator suppresses
//! diagnostics entirely for externally-staged images, independently of
//! whether the `log` feature is enabled.

/// Redactable version of [`log::trace!()`].
macro_rules! trace {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = log::trace!($($args)*);
        #[cfg(not(feature = "log"))]
        let _ = ($($args)*,);
    }
}

/// Redactable version of [`log::info!()`].
macro_rules! info {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = log::info!($($args)*);
        #[cfg(not(feature = "log"))]
        let _ = ($($args)*,);
    }
}

/// Redactable version of [`log::warn!()`].
macro_rules! warn {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = log::warn!($($args)*);
        #[cfg(not(feature = "log"))]
        let _ = ($($args)*,);
    }
}

/// Redactable version of [`log::error!()`].
macro_rules! error {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = log::error!($($args)*);
        #[cfg(not(feature = "log"))]
        let _ = ($($args)*,);
    }
}

/// Set up some life-before-main code that initializes a basic logger for the
/// test binary.
///
/// This needs to happen here, since the test binary's main() cannot be
/// overridden.
#[cfg(test)]
#[ctor::ctor]
fn init_test_logger() {
    env_logger::builder()
        .format(move |_, record| {
            let thread = std::thread::current();
            let name = thread.name().unwrap_or("<unknown>");
            for line in record.args().to_string().trim().lines() {
                // NOTE: we explicitly print to stderr, since this allows the
                // Rust test harness to suppress log statements originating from
                // passing tests.
                eprintln!(
                    "[{level}({thread}) {file}:{line}] {msg}",
                    level = record.level(),
                    thread = name,
                    file = record.file().unwrap_or("<unknown>"),
                    line = record.line().unwrap_or(0),
                    msg = line,
                )
            }
            Ok(())
        })
        .init();
}
