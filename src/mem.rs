// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Address-region arithmetic.
//!
//! These predicates are the only place in the crate where attacker-influenced
//! addresses are compared against each other, so they are deliberately total,
//! pure functions built from comparisons alone. No subtraction or addition is
//! performed here: a region whose `end` has been wrapped around by an
//! overflowing computation must not be able to flip a containment result.
//! Callers compute region ends with `checked_add` and fail closed on `None`.
//!
//! All regions are half-open: `[start, end)`.

/// Returns whether `addr` lies within the half-open region `[start, end)`.
///
/// A region with `start > end` is malformed and contains nothing.
#[inline]
pub fn within(addr: u32, start: u32, end: u32) -> bool {
    if start > end {
        return false;
    }
    addr >= start && addr < end
}

/// Returns whether `[inner_start, inner_end)` lies entirely within
/// `[start, end)`.
///
/// Both endpoints of the inner region must satisfy [`within`] against the
/// outer region; a malformed inner region (`inner_start > inner_end`)
/// contains nothing and is within nothing.
#[inline]
pub fn region_within(
    inner_start: u32,
    inner_end: u32,
    start: u32,
    end: u32,
) -> bool {
    if inner_start > inner_end {
        return false;
    }
    within(inner_start, start, end) && within(inner_end, start, end)
}
