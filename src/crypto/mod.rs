// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Cryptographic collaborator traits.
//!
//! The validation engine does not implement any cryptography of its own; it
//! consumes a hash engine and a root-of-trust signature verifier through the
//! traits in this module. A platform plugs in whatever it has, be it a
//! hardware accelerator driver or the `ring`-backed implementations provided
//! behind the `ring` feature.
//!
//! Exactly one of the two verification policies, signature
//! ([`sig::RootOfTrust`]) or content hash ([`hash::Engine`]), is selected
//! when the validation orchestrator is constructed; see
//! [`crate::verify`].

pub mod hash;
pub mod sig;

#[cfg(feature = "ring")]
pub mod ring;
