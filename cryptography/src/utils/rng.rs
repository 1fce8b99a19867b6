// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Random number generation

use rand::rngs::OsRng;

/**
 * Marker trait to require a cryptographically secure random number generator.
 */
pub trait CRng: rand::RngCore + rand::CryptoRng {}

impl<T: rand::RngCore + rand::CryptoRng> CRng for T {}

/**
 * Random number generation provider.
 *
 * Phase operations take their generator as an explicit parameter; drivers
 * that own no generator of their own, such as the protocol state machine,
 * obtain one through this trait.
 */
pub trait Rng: CRng {
    /// Returns an rng instance.
    fn rng() -> Self;
}

/**
 * Implements the random number generation provider with [`OsRng`].
 */
impl Rng for OsRng {
    fn rng() -> OsRng {
        rand::rngs::OsRng
    }
}
