// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The validation-info trailer located past the end of a firmware body.

use core::mem;

use static_assertions::const_assert_eq;

use zerocopy::AsBytes;
use zerocopy::FromBytes;
use zerocopy::Unaligned;

use crate::crypto::hash;
use crate::crypto::sig;
use crate::hardware::flash::Image;
use crate::image::magic_matches;
use crate::image::Le32;
use crate::image::MAGIC_COMMON;
use crate::image::MAGIC_LEN_WORDS;

/// The magic sequence identifying a validation-info trailer.
pub const VALIDATION_INFO_MAGIC: [u32; MAGIC_LEN_WORDS] =
    [0x8651_8483, MAGIC_COMMON[0], MAGIC_COMMON[1]];

/// The byte offset of the `address` field within the trailer.
pub const ADDRESS_OFFSET: usize = 12;
/// The byte offset of the firmware hash within the trailer.
pub const HASH_OFFSET: usize = 16;
/// The byte offset of the public key within the trailer.
pub const PUBLIC_KEY_OFFSET: usize = HASH_OFFSET + hash::DIGEST_LEN;
/// The byte offset of the signature within the trailer.
pub const SIGNATURE_OFFSET: usize = PUBLIC_KEY_OFFSET + sig::PUBLIC_KEY_LEN;
/// The length of the trailer on flash, in bytes.
pub const TRAILER_LEN: usize = SIGNATURE_OFFSET + sig::SIGNATURE_LEN;

const_assert_eq!(ADDRESS_OFFSET, MAGIC_LEN_WORDS * 4);
const_assert_eq!(HASH_OFFSET, 16);
const_assert_eq!(PUBLIC_KEY_OFFSET, 48);
const_assert_eq!(SIGNATURE_OFFSET, 112);
const_assert_eq!(TRAILER_LEN, 176);

/// The raw bits of the trailer, as laid out on flash.
#[derive(FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub(crate) struct RawValidationInfo {
    pub magic: [Le32; MAGIC_LEN_WORDS],
    pub address: Le32,
    pub hash: [u8; hash::DIGEST_LEN],
    pub public_key: [u8; sig::PUBLIC_KEY_LEN],
    pub signature: [u8; sig::SIGNATURE_LEN],
}
const_assert_eq!(mem::size_of::<RawValidationInfo>(), TRAILER_LEN);

/// A located validation-info trailer: the hash, public key, and signature
/// that vouch for a firmware image.
///
/// This is a read-only view into the image; like everything else read from
/// flash, it is untrusted input until every check passes.
#[derive(Copy, Clone)]
pub struct ValidationInfo<'a> {
    raw: &'a RawValidationInfo,
}

impl<'a> ValidationInfo<'a> {
    /// The address of the firmware this trailer claims to validate.
    ///
    /// Must match the metadata's claimed address; a trailer copied from
    /// another image does not get to vouch for this one.
    pub fn address(&self) -> u32 {
        self.raw.address.get()
    }

    /// The expected hash of the firmware body.
    pub fn hash(&self) -> &'a hash::Digest {
        &self.raw.hash
    }

    /// The public key to verify the signature with, itself untrusted until
    /// checked against a provisioned key hash.
    pub fn public_key(&self) -> &'a sig::PublicKey {
        &self.raw.public_key
    }

    /// The signature over the firmware body.
    pub fn signature(&self) -> &'a sig::Signature {
        &self.raw.signature
    }
}

/// Locates a validation-info trailer by scanning `search_distance + 1`
/// consecutive byte offsets starting at the absolute address `start`.
///
/// The window is small and fixed, covering alignment padding only; this is
/// a bounded linear probe, not a search, precisely so that a missing
/// trailer cannot be turned into an arbitrary-read primitive. Returns the
/// first offset whose magic matches, or `None`.
pub fn find<'a>(
    image: &Image<'a>,
    start: u32,
    search_distance: u32,
) -> Option<ValidationInfo<'a>> {
    for i in 0..=search_distance {
        let addr = match start.checked_add(i) {
            Some(addr) => addr,
            None => return None,
        };
        let raw: &RawValidationInfo = match image.read_object(addr) {
            Ok(raw) => raw,
            Err(_) => continue,
        };
        if magic_matches(&raw.magic, &VALIDATION_INFO_MAGIC) {
            return Some(ValidationInfo { raw });
        }
    }
    None
}
