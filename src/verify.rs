// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Image verification policies.
//!
//! The validation orchestrator is injected with exactly one [`Verifier`]:
//! either [`SignatureVerifier`], which scans the provisioned key list and
//! checks the trailer's signature against a trusted key, or
//! [`HashVerifier`], which checks the trailer's content hash. The two
//! correspond to the two build configurations of the engine; a given device
//! runs one or the other, never both.
//!
//! # Key rotation
//!
//! The signature policy implements key rotation with automatic revocation:
//! the *first* (lowest-index) trusted key that verifies the image wins, and
//! every key with a lower index than the winner is invalidated on the spot.
//! A device that has proven it trusts a later key never needs an earlier
//! one again, and shrinking the live key set shrinks future attack surface.
//! No state beyond the key list itself is needed to make this stick.

use static_assertions::assert_obj_safe;

use crate::crypto::hash;
use crate::crypto::sig;
use crate::crypto::sig::RootOfTrust;
use crate::hardware::storage::KeyStore;
use crate::hardware::storage::ReadError;
use crate::image::ValidationInfo;

/// A verification error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Indicates that the crypto collaborator failed to initialize.
    Init,

    /// Indicates that reading a key out of the key store failed outright.
    /// Unlike an invalidated key, this aborts the scan.
    KeyRead {
        /// The index of the unreadable key.
        index: usize,
    },

    /// Indicates that a key's stored material is unsupported or erased.
    /// Aborts the scan.
    UnsupportedKey {
        /// The index of the bad key.
        index: usize,
    },

    /// Indicates that no trusted key verified the image.
    NoTrustedKey,

    /// Indicates that a signature operation failed with a hard error.
    Signature(sig::Error),

    /// Indicates that the content hash did not check out.
    Hash(hash::Error),
}

impl From<sig::Error> for Error {
    fn from(e: sig::Error) -> Self {
        Self::Signature(e)
    }
}

impl From<hash::Error> for Error {
    fn from(e: hash::Error) -> Self {
        Self::Hash(e)
    }
}

/// A verification policy: the last stage of image validation.
///
/// `firmware` is the image's signed body; `info` is its located trailer.
/// `external` is true when the image was staged at an address other than the
/// one it will run from, which may route through a different trust-anchor
/// policy in the crypto collaborator.
pub trait Verifier {
    /// Verifies `firmware` against `info`.
    fn verify(
        &mut self,
        firmware: &[u8],
        info: &ValidationInfo,
        external: bool,
    ) -> Result<(), Error>;
}
assert_obj_safe!(Verifier);

/// The outcome of probing the image against a single trusted key.
///
/// The distinction between `TryNext` and `Abort` is the contract of the key
/// scan: only "this key is not the right trust anchor" continues the loop.
#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    /// The key verified the image.
    Accept,
    /// The key is not usable for this image (invalidated, or wrong trust
    /// anchor); move on to the next one.
    TryNext,
    /// Something went wrong that trying more keys cannot fix.
    Abort(Error),
}

/// The signature verification policy.
///
/// Iterates the trusted key list from index 0 upward, asking the
/// root-of-trust collaborator to verify the trailer's signature against
/// each live key hash in turn.
pub struct SignatureVerifier<R, K> {
    rot: R,
    keys: K,
}

impl<R: RootOfTrust, K: KeyStore> SignatureVerifier<R, K> {
    /// Creates a new `SignatureVerifier` from a root-of-trust collaborator
    /// and a provisioned key store.
    pub fn new(rot: R, keys: K) -> Self {
        Self { rot, keys }
    }

    fn probe_key(
        &mut self,
        index: usize,
        firmware: &[u8],
        info: &ValidationInfo,
        external: bool,
    ) -> KeyOutcome {
        let key_hash = match self.keys.key_hash(index) {
            Ok(hash) => hash,
            Err(ReadError::Invalidated) => {
                trace!("key {} has been invalidated; skipping", index);
                return KeyOutcome::TryNext;
            }
            Err(ReadError::Unsupported) => {
                return KeyOutcome::Abort(Error::UnsupportedKey { index });
            }
            Err(ReadError::Io) => {
                return KeyOutcome::Abort(Error::KeyRead { index });
            }
        };

        trace!("verifying signature against key {}", index);
        let result = if external {
            self.rot.verify_external(
                info.public_key(),
                &key_hash,
                info.signature(),
                firmware,
            )
        } else {
            self.rot.verify(
                info.public_key(),
                &key_hash,
                info.signature(),
                firmware,
            )
        };
        match result {
            Ok(()) => KeyOutcome::Accept,
            // Wrong trust anchor for this trailer; the next key may match.
            Err(sig::Error::HashMismatch) => KeyOutcome::TryNext,
            Err(e) => KeyOutcome::Abort(e.into()),
        }
    }
}

impl<R: RootOfTrust, K: KeyStore> Verifier for SignatureVerifier<R, K> {
    fn verify(
        &mut self,
        firmware: &[u8],
        info: &ValidationInfo,
        external: bool,
    ) -> Result<(), Error> {
        self.rot.init().map_err(|_| Error::Init)?;

        let mut accepted = None;
        for index in 0..self.keys.key_count() {
            match self.probe_key(index, firmware, info, external) {
                KeyOutcome::Accept => {
                    accepted = Some(index);
                    break;
                }
                KeyOutcome::TryNext => continue,
                KeyOutcome::Abort(e) => return Err(e),
            }
        }
        let accepted = accepted.ok_or(Error::NoTrustedKey)?;

        // Every key below the winner is superseded; retire it. A failed
        // invalidation does not change the verdict, but the key stays live
        // and we say so, rather than claiming a rotation that did not
        // durably happen.
        for index in 0..accepted {
            if self.keys.invalidate(index).is_err() {
                warn!("failed to invalidate superseded key {}", index);
            }
        }
        Ok(())
    }
}

/// The hash-only verification policy, for builds whose images carry no
/// signature.
pub struct HashVerifier<E> {
    engine: E,
}

impl<E: hash::Engine> HashVerifier<E> {
    /// Creates a new `HashVerifier` from a hash engine.
    pub fn new(engine: E) -> Self {
        Self { engine }
    }
}

impl<E: hash::Engine> Verifier for HashVerifier<E> {
    fn verify(
        &mut self,
        firmware: &[u8],
        info: &ValidationInfo,
        _external: bool,
    ) -> Result<(), Error> {
        self.engine.init().map_err(|_| Error::Init)?;
        self.engine.verify(firmware, info.hash())?;
        Ok(())
    }
}
