// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Protocol configuration

use crypto_bigint::BoxedUint;
use cryptography::groups::schnorr::SchnorrGroup;
use cryptography::pedersen::PedersenVss;
use cryptography::utils::rng::CRng;

use crate::dkg::messages::SHARE_BYTES;
use crate::error::{Error, Result};

/**
 * Configuration data for one DKG protocol execution.
 *
 * Carries the safe-prime group and the Pedersen commitment parameters
 * `(G, H)`. Created once per run, immutable, and identical on every member;
 * all verification equations are evaluated against these values.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolConfig {
    vss: PedersenVss,
}

impl ProtocolConfig {
    /// Build a configuration around externally agreed Pedersen parameters.
    ///
    /// # Errors
    ///
    /// - `ConfigInvalid` if the subgroup order does not fit the fixed
    ///   share wire width.
    pub fn new(vss: PedersenVss) -> Result<Self> {
        if vss.group().order().bits() as usize > SHARE_BYTES * 8 {
            return Err(Error::ConfigInvalid(format!(
                "subgroup order exceeds the {SHARE_BYTES}-byte share encoding"
            )));
        }
        Ok(Self { vss })
    }

    /// Generate a configuration with fresh random Pedersen generators over
    /// the given group.
    ///
    /// # Errors
    ///
    /// - `ConfigInvalid` as for [`Self::new`].
    pub fn generate(group: SchnorrGroup, rng: &mut impl CRng) -> Result<Self> {
        Self::new(PedersenVss::generate(group, rng))
    }

    /// The underlying arithmetic group.
    pub fn group(&self) -> &SchnorrGroup {
        self.vss.group()
    }

    /// The Pedersen commitment scheme.
    pub fn vss(&self) -> &PedersenVss {
        &self.vss
    }

    /// The safe prime `P`.
    pub fn p(&self) -> &BoxedUint {
        self.vss.group().modulus()
    }

    /// The subgroup order `Q`.
    pub fn q(&self) -> &BoxedUint {
        self.vss.group().order()
    }
}
