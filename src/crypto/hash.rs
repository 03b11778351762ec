// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Hash-engine collaborator trait.
//!
//! Used both for the hash-only verification policy (checking an image
//! against the digest in its trailer) and, by implementations of
//! [`crate::crypto::sig::RootOfTrust`], for hashing public keys against the
//! provisioned trust anchors.

use static_assertions::assert_obj_safe;

/// The length of a digest, in bytes. Only SHA-256-sized digests are
/// supported.
pub const DIGEST_LEN: usize = 32;

/// A SHA-256 digest.
pub type Digest = [u8; DIGEST_LEN];

/// An error returned by a hashing operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Indicates that the computed digest did not match the expected one.
    Mismatch,

    /// Indicates an unspecified error inside the engine, including a failed
    /// initialization. Always a hard failure; never retried.
    Unspecified,
}

/// A hashing engine.
///
/// May internally drive a hardware accelerator to completion; all calls are
/// blocking and synchronous.
pub trait Engine {
    /// Initializes the engine. Must be called before any verification; a
    /// failure here aborts the validation that requested it.
    fn init(&mut self) -> Result<(), Error>;

    /// Hashes `data` and compares the result against `expected`.
    fn verify(&mut self, data: &[u8], expected: &Digest) -> Result<(), Error>;
}
assert_obj_safe!(Engine);

impl<E: Engine + ?Sized> Engine for &mut E {
    fn init(&mut self) -> Result<(), Error> {
        E::init(self)
    }

    fn verify(&mut self, data: &[u8], expected: &Digest) -> Result<(), Error> {
        E::verify(self, data, expected)
    }
}
