// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Pedersen verifiable secret sharing commitments

use crypto_bigint::BoxedUint;

use crate::groups::schnorr::{index_pow, SchnorrGroup};
use crate::utils::error::Error;
use crate::utils::rng::CRng;

/**
 * Pedersen commitment scheme over a [`SchnorrGroup`].
 *
 * Carries two generators `G`, `H` of the order-`Q` subgroup. The commitment
 * to a pair of scalars `(a, b)` is `G^a · H^b mod P`: perfectly hiding as
 * long as `log_G H` is unknown, computationally binding under discrete-log
 * hardness.
 *
 * A dealer commits to the coefficients of two polynomials `f_a, f_b` and
 * distributes shares `(s_j, t_j) = (f_a(j), f_b(j))`. Any receiver `j` can
 * then check its shares against the published coefficient commitments with
 * [`verify_share`][`Self::verify_share`], and any third party can re-run the
 * same check during dispute resolution.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PedersenVss {
    group: SchnorrGroup,
    /// First generator of the order-`Q` subgroup.
    g: BoxedUint,
    /// Second generator, with `log_G H` unknown.
    h: BoxedUint,
}

impl PedersenVss {
    /// Generate scheme parameters with fresh random generators.
    ///
    /// Both generators are drawn as random squares, so neither discrete log
    /// relation is known to anyone.
    pub fn generate(group: SchnorrGroup, rng: &mut impl CRng) -> Self {
        let g = group.random_generator(rng);
        let h = group.random_generator(rng);
        Self { group, g, h }
    }

    /// Construct the scheme from externally agreed generators.
    ///
    /// # Errors
    ///
    /// - `InvalidGenerator` if either value is not a non-identity member of
    ///   the order-`Q` subgroup.
    pub fn from_generators(
        group: SchnorrGroup,
        g: BoxedUint,
        h: BoxedUint,
    ) -> Result<Self, Error> {
        if !group.contains_subgroup_element(&g) {
            return Err(Error::InvalidGenerator(
                "G is not an order-Q subgroup member".to_string(),
            ));
        }
        if !group.contains_subgroup_element(&h) {
            return Err(Error::InvalidGenerator(
                "H is not an order-Q subgroup member".to_string(),
            ));
        }
        let g = group.reduce_element(&g);
        let h = group.reduce_element(&h);
        Ok(Self { group, g, h })
    }

    /// The underlying arithmetic group.
    pub fn group(&self) -> &SchnorrGroup {
        &self.group
    }

    /// The generator `G`.
    pub fn g(&self) -> &BoxedUint {
        &self.g
    }

    /// The generator `H`.
    pub fn h(&self) -> &BoxedUint {
        &self.h
    }

    /// `C = G^a · H^b mod P`.
    pub fn commit(&self, a: &BoxedUint, b: &BoxedUint) -> BoxedUint {
        self.group
            .mul(&self.group.exp(&self.g, a), &self.group.exp(&self.h, b))
    }

    /// Check shares `(s, t)` for receiver `index` against coefficient
    /// commitments `C[0..=t]`:
    ///
    /// `G^s · H^t ≡ Π_k C[k]^(index^k) (mod P)`
    ///
    /// The exponents `index^k` are unreduced: an adversarial commitment may
    /// lie outside the order-`Q` subgroup, so reduction mod `Q` would change
    /// the verdict.
    pub fn verify_share(
        &self,
        commitments: &[BoxedUint],
        index: u32,
        share_s: &BoxedUint,
        share_t: &BoxedUint,
    ) -> bool {
        let mut product = self.group.one();
        for (k, commitment) in commitments.iter().enumerate() {
            let raised = self.group.exp(commitment, &index_pow(index, k));
            product = self.group.mul(&product, &raised);
        }
        self.commit(share_s, share_t) == product
    }
}
