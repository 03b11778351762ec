// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Root-of-trust signature verification collaborator trait.
//!
//! A [`RootOfTrust`] verifies a firmware signature in two steps: it checks
//! the public key presented by the image against a *trusted hash* from the
//! provisioned key store, and only then verifies the signature over the
//! image bytes with that key. The two failure modes are distinct error
//! classes, because the multi-key verification loop treats them differently:
//! a hash mismatch means "wrong trust anchor, try the next key", while a bad
//! signature is a hard stop.

use static_assertions::assert_obj_safe;

use crate::crypto::hash;

/// The length of a raw public key, in bytes: an uncompressed P-256 point
/// without the SEC1 tag byte.
pub const PUBLIC_KEY_LEN: usize = 64;

/// The length of a signature, in bytes: a fixed-width P-256 `(r, s)` pair.
pub const SIGNATURE_LEN: usize = 64;

/// A raw public key, as embedded in an image trailer.
pub type PublicKey = [u8; PUBLIC_KEY_LEN];

/// A raw firmware signature, as embedded in an image trailer.
pub type Signature = [u8; SIGNATURE_LEN];

/// An error returned by a signature-verification operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Indicates that the presented public key does not hash to the trusted
    /// key hash it was checked against. The key list scan continues past
    /// this error.
    HashMismatch,

    /// Indicates that the signature did not verify under the presented key.
    SignatureInvalid,

    /// Indicates an unspecified error inside the verifier, including a
    /// failed initialization. Always a hard failure; never retried.
    Unspecified,
}

/// A root-of-trust signature verifier.
///
/// May internally drive a hardware accelerator to completion; all calls are
/// blocking and synchronous.
pub trait RootOfTrust {
    /// Initializes the verifier. Must be called before any verification; a
    /// failure here aborts the validation that requested it.
    fn init(&mut self) -> Result<(), Error>;

    /// Verifies `signature` over `message`.
    ///
    /// `public_key` is untrusted material from the image trailer; it must be
    /// checked against `key_hash`, the trust anchor read from the key store,
    /// before it is used for anything. Returns [`Error::HashMismatch`] if
    /// that check fails.
    fn verify(
        &mut self,
        public_key: &PublicKey,
        key_hash: &hash::Digest,
        signature: &Signature,
        message: &[u8],
    ) -> Result<(), Error>;

    /// Like [`RootOfTrust::verify`], but for an externally-staged image.
    ///
    /// Platforms whose trust-anchor policy differs for images read from a
    /// staging slot override this; by default the local policy applies.
    fn verify_external(
        &mut self,
        public_key: &PublicKey,
        key_hash: &hash::Digest,
        signature: &Signature,
        message: &[u8],
    ) -> Result<(), Error> {
        self.verify(public_key, key_hash, signature, message)
    }
}
assert_obj_safe!(RootOfTrust);

impl<R: RootOfTrust + ?Sized> RootOfTrust for &mut R {
    fn init(&mut self) -> Result<(), Error> {
        R::init(self)
    }

    fn verify(
        &mut self,
        public_key: &PublicKey,
        key_hash: &hash::Digest,
        signature: &Signature,
        message: &[u8],
    ) -> Result<(), Error> {
        R::verify(self, public_key, key_hash, signature, message)
    }

    fn verify_external(
        &mut self,
        public_key: &PublicKey,
        key_hash: &hash::Digest,
        signature: &Signature,
        message: &[u8],
    ) -> Result<(), Error> {
        R::verify_external(self, public_key, key_hash, signature, message)
    }
}
