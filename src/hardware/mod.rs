// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Pluggable hardware functionality.
//!
//! This module provides the crate's view of the hardware it runs against:
//! the read-only [`flash::Image`] view over a candidate firmware image, and
//! the [`storage`] traits through which the monotonic anti-rollback counter
//! and the trusted-key list are persisted. Everything here is deliberately
//! narrow, so that the validation logic can be exercised against RAM-backed
//! fakes in tests.

pub mod flash;
pub mod storage;
