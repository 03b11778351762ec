// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! `bootgate` is the firmware-authenticity validation engine of an immutable
//! first-stage bootloader.
//!
//! Before a bootloader transfers execution to a second-stage image, it must
//! prove, using only untrusted bytes read from flash, that the image is
//! well-formed, belongs at the address it claims, has not been rolled back to
//! an older version, and carries a signature (or content hash) rooted in a
//! trusted key. `bootgate` implements exactly that decision; if any check
//! fails, the verdict is a plain `false` and the caller must not jump into
//! the image.
//!
//! The crate deliberately does not implement cryptographic primitives or
//! persistent storage. Those are *collaborators*, modeled as traits:
//! - [`crypto::sig::RootOfTrust`] and [`crypto::hash::Engine`] for the
//!   verification primitives (with `ring`-backed implementations behind the
//!   `ring` feature),
//! - [`hardware::storage::CounterStorage`] and [`hardware::storage::KeyStore`]
//!   for the monotonic anti-rollback counter and the trusted-key list.
//!
//! The image under consideration is never dereferenced through raw pointers;
//! it is wrapped in a bounds-known [`hardware::flash::Image`] view, and every
//! attacker-influenced offset goes through checked accessors. The top-level
//! entry points live on [`validate::Validator`].

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]
#![deny(warnings)]
#![deny(unused)]
#![deny(unsafe_code)]

#[macro_use]
mod debug;

pub mod crypto;
pub mod hardware;
pub mod image;
pub mod mem;
pub mod validate;
pub mod verify;
