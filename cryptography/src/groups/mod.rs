// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Arithmetic group backends
//!
//! # [`schnorr`]
//!
//! The order-`Q` subgroup of `Z_P*` for a safe prime `P = 2Q + 1`, backed by
//! the [crypto-bigint](https://github.com/RustCrypto/crypto-bigint) crate.

pub mod schnorr;

pub use schnorr::SchnorrGroup;
