// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Implementations of the crypto collaborator traits based on `ring`.
//!
//! These are intended for hosted builds and tests; a real bootloader build
//! plugs in its hardware-accelerator drivers instead.

use ring::digest;
use ring::signature::UnparsedPublicKey;
use ring::signature::ECDSA_P256_SHA256_FIXED;

use crate::crypto::hash;
use crate::crypto::sig;

/// A `ring`-based [`hash::Engine`].
#[derive(Default)]
pub struct Sha256 {
    _priv: (),
}

impl Sha256 {
    /// Creates a new `Sha256`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl hash::Engine for Sha256 {
    fn init(&mut self) -> Result<(), hash::Error> {
        Ok(())
    }

    fn verify(
        &mut self,
        data: &[u8],
        expected: &hash::Digest,
    ) -> Result<(), hash::Error> {
        let actual = digest::digest(&digest::SHA256, data);
        if actual.as_ref() != expected {
            return Err(hash::Error::Mismatch);
        }
        Ok(())
    }
}

/// A `ring`-based [`sig::RootOfTrust`] for ECDSA-P256 signatures.
#[derive(Default)]
pub struct EcdsaP256 {
    _priv: (),
}

impl EcdsaP256 {
    /// Creates a new `EcdsaP256`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl sig::RootOfTrust for EcdsaP256 {
    fn init(&mut self) -> Result<(), sig::Error> {
        Ok(())
    }

    fn verify(
        &mut self,
        public_key: &sig::PublicKey,
        key_hash: &hash::Digest,
        signature: &sig::Signature,
        message: &[u8],
    ) -> Result<(), sig::Error> {
        let actual = digest::digest(&digest::SHA256, public_key);
        if actual.as_ref() != key_hash {
            return Err(sig::Error::HashMismatch);
        }

        // `ring` wants the SEC1 uncompressed-point encoding, which is the
        // raw key with a leading 0x04 tag.
        let mut sec1 = [0u8; sig::PUBLIC_KEY_LEN + 1];
        sec1[0] = 0x04;
        sec1[1..].copy_from_slice(public_key);

        UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, &sec1[..])
            .verify(message, signature)
            .map_err(|_| sig::Error::SignatureInvalid)
    }
}
