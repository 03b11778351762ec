// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! On-flash firmware image formats.
//!
//! # Package layout
//!
//! A validatable firmware package is laid out as
//! `firmware | (padding) | validation info`:
//! - The firmware body contains the [`info::FwInfo`] metadata structure at a
//!   fixed offset from the image start. Embedding the metadata *inside* the
//!   firmware (rather than in front of it) keeps the vector table at the
//!   image base and lets the build attach the metadata at link time.
//! - The [`trailer::ValidationInfo`] block sits just past the end of the
//!   firmware body, possibly after a few bytes of alignment padding. It is
//!   not referenced from the metadata; it is located by a bounded scan, so
//!   it does not even have to be adjacent in every deployment.
//!
//! Integers are little-endian. Every structure begins with a fixed-width
//! magic sequence of [`MAGIC_LEN_WORDS`] words; the last two words are
//! shared across all structure types and the first word distinguishes the
//! type. Field offsets are bit-exact and pinned by assertions: any
//! reordering or added field is a breaking format change that requires a
//! distinct magic value.
//!
//! Everything read out of these structures is untrusted input until the
//! whole validation pipeline has passed.

use byteorder::LittleEndian;
use zerocopy::byteorder::U32;

pub mod info;
pub mod trailer;

pub use info::FwInfo;
pub use trailer::ValidationInfo;

/// The number of words in a structure's magic sequence.
pub const MAGIC_LEN_WORDS: usize = 3;

/// A little-endian word as it appears on flash.
pub(crate) type Le32 = U32<LittleEndian>;

/// The magic words shared by all structure types, occupying the second and
/// third magic slots.
pub(crate) const MAGIC_COMMON: [u32; 2] = [0x2855_67ad, 0x281e_e6de];

/// Word-wise magic comparison.
///
/// Deliberately word-granular rather than a byte memcmp, so the check is
/// branch-consistent across all supported alignments.
pub(crate) fn magic_matches(
    actual: &[Le32; MAGIC_LEN_WORDS],
    expected: &[u32; MAGIC_LEN_WORDS],
) -> bool {
    let mut ok = true;
    for (a, e) in actual.iter().zip(expected.iter()) {
        ok &= a.get() == *e;
    }
    ok
}
