// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Fixed protocol parameters for tests
//!
//! Known-good safe-prime pairs and deterministic Pedersen generators, shared
//! by this crate's tests and by downstream crates through the `test_helpers`
//! feature. The generator pair has a trivially known discrete-log relation,
//! which breaks the hiding property; never use these parameters outside
//! tests.

use crypto_bigint::BoxedUint;

use crate::groups::schnorr::SchnorrGroup;
use crate::pedersen::PedersenVss;

/// 65-bit safe prime `P = 2Q + 1` with 64-bit prime `Q`.
const P_SMALL_HEX: &str = "015c7bdb63fd69eb6f";
const Q_SMALL_HEX: &str = "ae3dedb1feb4f5b7";

/// 257-bit safe prime `P = 2Q + 1` with 256-bit prime `Q`, matching the
/// 32-byte scalar wire encoding.
const P_256_HEX: &str = "010740393b845cf895d3e952ac4211b238742c8a2df7dcf99cd69b2c7f5e3dab57";
const Q_256_HEX: &str = "83a01c9dc22e7c4ae9f4a9562108d91c3a164516fbee7cce6b4d963faf1ed5ab";

fn uint_from_hex(hex_str: &str) -> BoxedUint {
    let bytes = hex::decode(hex_str).expect("fixture hex is valid");
    let bits = u32::try_from(bytes.len() * 8)
        .expect("fixture length fits u32")
        .max(64)
        .div_ceil(64)
        * 64;
    BoxedUint::from_be_slice(&bytes, bits).expect("fixture fits its precision")
}

/// The small fixture group; fast enough for exhaustive protocol tests.
pub fn small_group() -> SchnorrGroup {
    SchnorrGroup::new(uint_from_hex(P_SMALL_HEX), uint_from_hex(Q_SMALL_HEX))
        .expect("fixture is a safe prime pair")
}

/// The 256-bit-order fixture group used by wire-format tests.
pub fn group_256() -> SchnorrGroup {
    SchnorrGroup::new(uint_from_hex(P_256_HEX), uint_from_hex(Q_256_HEX))
        .expect("fixture is a safe prime pair")
}

/// Deterministic Pedersen parameters over the small fixture group.
///
/// `G = 2², H = 3²`: both are quadratic residues and therefore generate the
/// order-`Q` subgroup.
pub fn small_pedersen() -> PedersenVss {
    PedersenVss::from_generators(
        small_group(),
        BoxedUint::from(4u64),
        BoxedUint::from(9u64),
    )
    .expect("fixture generators are subgroup members")
}

/// Deterministic Pedersen parameters over the 256-bit-order fixture group.
pub fn pedersen_256() -> PedersenVss {
    PedersenVss::from_generators(
        group_256(),
        BoxedUint::from(4u64),
        BoxedUint::from(9u64),
    )
    .expect("fixture generators are subgroup members")
}
