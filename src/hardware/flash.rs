// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Bounds-known views over flash-resident firmware images.
//!
//! A candidate image is a run of bytes that happens to live at some physical
//! address. This module wraps it in [`Image`], a read-only view that knows
//! its own base address and length; every access goes through a checked
//! accessor that rejects out-of-range reads rather than dereferencing an
//! attacker-controlled address. The validation pipeline never touches the
//! image any other way.

use core::convert::TryFrom;
use core::mem;

use byteorder::ByteOrder;
use byteorder::LittleEndian;

use zerocopy::FromBytes;
use zerocopy::LayoutVerified;
use zerocopy::Unaligned;

/// An [`Image`] access error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Indicates that an access fell outside of the image's address range,
    /// or that the requested range was not representable at all.
    OutOfRange,
}

/// A read-only, bounds-known view of a firmware image in flash.
///
/// Addresses passed to the accessors are *absolute*: the view translates
/// them against its base address and rejects anything that does not land
/// entirely inside the backing bytes.
#[derive(Copy, Clone, Debug)]
pub struct Image<'a> {
    base: u32,
    bytes: &'a [u8],
}

impl<'a> Image<'a> {
    /// Creates a new `Image` over `bytes`, as if it were resident at address
    /// `base`.
    ///
    /// Fails if the image would extend past the end of the 32-bit address
    /// space.
    pub fn new(base: u32, bytes: &'a [u8]) -> Result<Self, Error> {
        let len = u32::try_from(bytes.len()).map_err(|_| Error::OutOfRange)?;
        base.checked_add(len).ok_or(Error::OutOfRange)?;
        Ok(Self { base, bytes })
    }

    /// Returns the absolute address of the first byte of this image.
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Returns the length of this image, in bytes.
    pub fn len(&self) -> u32 {
        self.bytes.len() as u32
    }

    /// Returns whether this image is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the absolute address one past the last byte of this image.
    pub fn end(&self) -> u32 {
        // Cannot wrap, per the constructor check.
        self.base + self.len()
    }

    /// Reads `len` bytes starting at the absolute address `addr`.
    pub fn read(&self, addr: u32, len: u32) -> Result<&'a [u8], Error> {
        let offset = addr.checked_sub(self.base).ok_or(Error::OutOfRange)?;
        let end = offset.checked_add(len).ok_or(Error::OutOfRange)?;
        if end as usize > self.bytes.len() {
            return Err(Error::OutOfRange);
        }
        Ok(&self.bytes[offset as usize..end as usize])
    }

    /// Reads a little-endian word at the absolute address `addr`.
    pub fn read_u32(&self, addr: u32) -> Result<u32, Error> {
        let bytes = self.read(addr, mem::size_of::<u32>() as u32)?;
        Ok(LittleEndian::read_u32(bytes))
    }

    /// Reads a value of type `T` at the absolute address `addr`.
    ///
    /// `T` must be an unaligned zerocopy type, since images are scanned at
    /// byte granularity and no alignment can be assumed.
    pub fn read_object<T>(&self, addr: u32) -> Result<&'a T, Error>
    where
        T: FromBytes + Unaligned,
    {
        let bytes = self.read(addr, mem::size_of::<T>() as u32)?;
        let lv = LayoutVerified::<_, T>::new_unaligned(bytes)
            .ok_or(Error::OutOfRange)?;
        Ok(lv.into_ref())
    }
}
