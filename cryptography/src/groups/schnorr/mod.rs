// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Safe-prime Schnorr group, backed by the [crypto-bigint](https://github.com/RustCrypto/crypto-bigint) crate

mod group;

pub use group::{index_pow, SchnorrGroup};
