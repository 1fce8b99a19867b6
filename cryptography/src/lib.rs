// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Cryptographic primitives for publicly-verifiable distributed key
//! generation.
//!
//! This crate provides the arithmetic and channel layers the DKG protocol is
//! built on:
//!
//! - [`groups::schnorr`]: the order-`Q` subgroup of `Z_P*` for a safe prime
//!   `P = 2Q + 1`, with explicit-modulus big-integer arithmetic.
//! - [`pedersen`]: Pedersen commitments `G^a · H^b mod P` and the share
//!   verification predicate used by the verifiable secret sharing.
//! - [`polynomial`]: random polynomials over `Z_Q` evaluated at member
//!   indices.
//! - [`ephemeral`]: per-pair ephemeral ECDH key agreement and the
//!   authenticated symmetric channel derived from it.

/// Per-pair ephemeral key agreement and authenticated encryption.
pub mod ephemeral;
pub mod groups;
pub mod pedersen;
pub mod polynomial;
/// Utilities such as random number generation, serialization and errors.
pub mod utils;

#[cfg(feature = "test_helpers")]
pub mod testing;
