// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Persistent trust-state storage.
//!
//! Two pieces of state survive across boots: the monotonic anti-rollback
//! counter, and the list of trusted public-key hashes. Both are owned by a
//! storage backend (typically a one-time-programmable flash page) that this
//! module models as narrow traits, so the validation logic never reaches for
//! ambient globals and can be tested against RAM-backed fakes.
//!
//! The counter is persisted as `(version << 1) | !slot`: the alternating
//! slot/parity scheme lets the backend detect and recover from an
//! interrupted write, since a torn write always leaves one slot readable.

use arrayvec::ArrayVec;
use static_assertions::assert_obj_safe;

use crate::crypto::hash;

/// The largest version number the monotonic counter can represent.
///
/// The top bit of the stored word is sacrificed to the slot-parity encoding.
pub const MAX_VERSION: u16 = 0x7fff;

/// A storage error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Indicates that the backend failed to read or write.
    Io,

    /// Indicates a write to a counter that was configured as disabled.
    Disabled,

    /// Indicates a version outside of `[0, MAX_VERSION]`.
    VersionRange,

    /// Indicates that a key store has no room for another key.
    Capacity,
}

/// An error produced by reading a single key out of a [`KeyStore`].
///
/// The distinction between the variants is load-bearing: an [`Invalidated`]
/// key is skipped during verification, while the other two abort it.
///
/// [`Invalidated`]: enum.ReadError.html#variant.Invalidated
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReadError {
    /// The key at this index has been invalidated. Not an error in itself;
    /// the verifier moves on to the next key.
    Invalidated,

    /// The key material at this index is unsupported or erased (for
    /// example, an all-`0xff` hash read back from blank flash).
    Unsupported,

    /// The backend failed to read the key at all.
    Io,
}

/// Raw storage for the monotonic counter word.
///
/// Implementations own the redundancy scheme (multiple hardware slots,
/// torn-write recovery); this trait only sees the single logical word that
/// survived.
pub trait CounterStorage {
    /// Reads the current raw counter word.
    fn read(&self) -> Result<u16, Error>;

    /// Durably writes a new raw counter word.
    fn write(&mut self, raw: u16) -> Result<(), Error>;
}
assert_obj_safe!(CounterStorage);

/// Which of the two alternating counter slots a value was written to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    /// Slot 0.
    Zero,
    /// Slot 1.
    One,
}

impl Slot {
    /// The parity bit stored alongside a version written to this slot.
    fn parity(self) -> u16 {
        match self {
            Self::Zero => 1,
            Self::One => 0,
        }
    }

    fn from_raw(raw: u16) -> Self {
        if raw & 1 == 1 {
            Self::Zero
        } else {
            Self::One
        }
    }
}

/// The monotonic anti-rollback counter.
///
/// The counter is either backed by a [`CounterStorage`], or explicitly
/// disabled via [`MonotonicCounter::disabled()`]. A disabled counter reads
/// as version 0 (always permit) and refuses writes; disablement is a
/// configuration choice made when the counter is constructed, never a
/// sentinel smuggled through the stored value.
///
/// A read failure on an *enabled* counter is surfaced as an error, and the
/// validation orchestrator fails closed on it: a device that cannot read its
/// own rollback state must not trust it.
pub struct MonotonicCounter<S> {
    storage: Option<S>,
}

impl<S: CounterStorage> MonotonicCounter<S> {
    /// Creates a counter backed by `storage`.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Some(storage),
        }
    }

    /// Creates a disabled counter, which always reads as version 0.
    pub fn disabled() -> Self {
        Self { storage: None }
    }

    /// Returns whether this counter is backed by real storage.
    pub fn is_enabled(&self) -> bool {
        self.storage.is_some()
    }

    /// Reads the current version, and the slot it was last written to.
    pub fn get(&self) -> Result<(u16, Slot), Error> {
        let raw = match &self.storage {
            Some(storage) => storage.read()?,
            None => 0,
        };
        Ok((raw >> 1, Slot::from_raw(raw)))
    }

    /// Durably writes `version` to `slot`.
    ///
    /// A failure here is fatal to the caller's trust in its own monotonic
    /// state; it is never papered over with the previous value.
    pub fn set(&mut self, version: u16, slot: Slot) -> Result<(), Error> {
        if version > MAX_VERSION {
            return Err(Error::VersionRange);
        }
        let storage = self.storage.as_mut().ok_or(Error::Disabled)?;
        storage.write((version << 1) | slot.parity())
    }
}

/// A RAM-backed [`CounterStorage`], for tests and hosted use.
#[derive(Default)]
pub struct RamCounter {
    word: u16,
}

impl RamCounter {
    /// Creates a new `RamCounter` holding a raw word of 0.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStorage for RamCounter {
    fn read(&self) -> Result<u16, Error> {
        Ok(self.word)
    }

    fn write(&mut self, raw: u16) -> Result<(), Error> {
        self.word = raw;
        Ok(())
    }
}

/// A hash of a trusted public key, as stored in the provisioned key list.
pub type KeyHash = hash::Digest;

/// The ordered list of trusted public-key hashes.
///
/// Keys are appended at provisioning time and individually invalidated
/// afterwards; invalidation is one-directional and persistent. A device
/// never re-trusts a revoked key.
pub trait KeyStore {
    /// Returns the number of provisioned keys, including invalidated ones.
    fn key_count(&self) -> usize;

    /// Reads the stored hash of the key at `index`.
    fn key_hash(&self, index: usize) -> Result<KeyHash, ReadError>;

    /// Permanently invalidates the key at `index`.
    fn invalidate(&mut self, index: usize) -> Result<(), Error>;
}
assert_obj_safe!(KeyStore);

impl<K: KeyStore + ?Sized> KeyStore for &mut K {
    fn key_count(&self) -> usize {
        K::key_count(self)
    }

    fn key_hash(&self, index: usize) -> Result<KeyHash, ReadError> {
        K::key_hash(self, index)
    }

    fn invalidate(&mut self, index: usize) -> Result<(), Error> {
        K::invalidate(self, index)
    }
}

/// A RAM-backed [`KeyStore`] with a fixed provisioning capacity, for tests
/// and hosted use.
///
/// Mirrors the behavior of an erasable flash backend: an invalidated key
/// reads as [`ReadError::Invalidated`], and a key whose stored hash is
/// all-`0xff` (i.e., blank flash) reads as [`ReadError::Unsupported`].
pub struct RamKeyStore<const N: usize> {
    keys: ArrayVec<KeySlot, N>,
}

struct KeySlot {
    hash: KeyHash,
    invalidated: bool,
}

impl<const N: usize> RamKeyStore<N> {
    /// Creates an empty `RamKeyStore`.
    pub fn new() -> Self {
        Self {
            keys: ArrayVec::new(),
        }
    }

    /// Appends `hash` to the list of trusted keys, returning its index.
    pub fn provision(&mut self, hash: KeyHash) -> Result<usize, Error> {
        self.keys
            .try_push(KeySlot {
                hash,
                invalidated: false,
            })
            .map_err(|_| Error::Capacity)?;
        Ok(self.keys.len() - 1)
    }

    /// Returns whether the key at `index` has been invalidated.
    pub fn is_invalidated(&self, index: usize) -> bool {
        self.keys.get(index).map_or(false, |k| k.invalidated)
    }
}

impl<const N: usize> Default for RamKeyStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> KeyStore for RamKeyStore<N> {
    fn key_count(&self) -> usize {
        self.keys.len()
    }

    fn key_hash(&self, index: usize) -> Result<KeyHash, ReadError> {
        let slot = self.keys.get(index).ok_or(ReadError::Io)?;
        if slot.invalidated {
            return Err(ReadError::Invalidated);
        }
        if slot.hash.iter().all(|&b| b == 0xff) {
            return Err(ReadError::Unsupported);
        }
        Ok(slot.hash)
    }

    fn invalidate(&mut self, index: usize) -> Result<(), Error> {
        let slot = self.keys.get_mut(index).ok_or(Error::Io)?;
        slot.invalidated = true;
        Ok(())
    }
}
