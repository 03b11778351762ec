// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The firmware metadata structure embedded in an image.

use core::mem;

use static_assertions::const_assert_eq;

use zerocopy::AsBytes;
use zerocopy::FromBytes;
use zerocopy::Unaligned;

use crate::hardware::flash::Image;
use crate::image::magic_matches;
use crate::image::Le32;
use crate::image::MAGIC_COMMON;
use crate::image::MAGIC_LEN_WORDS;

/// The magic sequence identifying a firmware metadata structure.
pub const FIRMWARE_INFO_MAGIC: [u32; MAGIC_LEN_WORDS] =
    [0x9102_5ae2, MAGIC_COMMON[0], MAGIC_COMMON[1]];

/// The value of the `valid` word for an image that has not been explicitly
/// invalidated in place.
pub const VALID_VALUE: u32 = 0x9102_ffff;

/// The length of the metadata structure on flash, in bytes.
pub const INFO_LEN: usize = 36;

/// The raw bits of the metadata structure, as laid out on flash.
#[derive(Copy, Clone, FromBytes, AsBytes, Unaligned)]
#[repr(C)]
pub(crate) struct RawFwInfo {
    pub magic: [Le32; MAGIC_LEN_WORDS],
    pub size: Le32,
    pub total_size: Le32,
    pub version: Le32,
    pub address: Le32,
    pub boot_address: Le32,
    pub valid: Le32,
}
const_assert_eq!(mem::size_of::<RawFwInfo>(), INFO_LEN);

/// Firmware metadata: an image's description of itself.
///
/// Every field is attacker-controlled until the validation orchestrator has
/// accepted the image; holders of a `FwInfo` outside of that pipeline must
/// treat it as a claim, not a fact.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FwInfo {
    /// The size of the firmware body, in bytes, excluding the validation
    /// trailer and any padding before it.
    pub size: u32,

    /// The size of the signed region, measured from this structure's
    /// location. At least `size` for any acceptable image.
    pub total_size: u32,

    /// The monotonically increasing version counter value this image claims.
    pub version: u32,

    /// The address this image claims to run at (its vector table).
    pub address: u32,

    /// The entry thunk for booting this image. The word following it is the
    /// reset handler.
    pub boot_address: u32,

    /// The validity sentinel; anything other than [`VALID_VALUE`] means the
    /// image was invalidated in place.
    pub valid: u32,
}

impl FwInfo {
    /// Locates the metadata structure inside `image`, at `info_offset` bytes
    /// past the image base.
    ///
    /// Returns `None` if the structure does not fit in the image or its
    /// magic does not match. The returned value is a plain decoded copy;
    /// nothing in the image is mutated, ever.
    pub fn find(image: &Image, info_offset: u32) -> Option<Self> {
        let addr = image.base().checked_add(info_offset)?;
        let raw: &RawFwInfo = image.read_object(addr).ok()?;
        if !magic_matches(&raw.magic, &FIRMWARE_INFO_MAGIC) {
            return None;
        }
        Some(Self {
            size: raw.size.get(),
            total_size: raw.total_size.get(),
            version: raw.version.get(),
            address: raw.address.get(),
            boot_address: raw.boot_address.get(),
            valid: raw.valid.get(),
        })
    }
}
