// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Random polynomials over `Z_Q`

use crypto_bigint::BoxedUint;

use crate::groups::schnorr::SchnorrGroup;
use crate::utils::rng::CRng;

/**
 * A polynomial of degree `t` over `Z_Q`, as used for `(t, n)`-threshold
 * secret sharing.
 *
 * Holds `t + 1` coefficients `a_0, ..., a_t`, each uniform in `(0, Q)`. The
 * constant term `a_0` is the shared secret; shares are evaluations at the
 * receivers' indices.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial {
    coefficients: Vec<BoxedUint>,
}

impl Polynomial {
    /// Generate a random polynomial of the given degree.
    pub fn generate(degree: usize, group: &SchnorrGroup, rng: &mut impl CRng) -> Self {
        let coefficients = (0..=degree).map(|_| group.random_scalar(rng)).collect();
        Self { coefficients }
    }

    /// Construct a polynomial from explicit coefficients, low order first.
    ///
    /// # Panics
    ///
    /// Panics on an empty coefficient list.
    pub fn from_coefficients(coefficients: Vec<BoxedUint>) -> Self {
        assert!(!coefficients.is_empty(), "polynomial needs a constant term");
        Self { coefficients }
    }

    /// The polynomial degree, `coefficients - 1`.
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// All coefficients, low order first.
    pub fn coefficients(&self) -> &[BoxedUint] {
        &self.coefficients
    }

    /// The constant term `a_0`.
    pub fn constant_term(&self) -> &BoxedUint {
        &self.coefficients[0]
    }

    /// Evaluate at a member index: `f(j) = Σ a_k · j^k mod Q` (Horner form).
    pub fn evaluate_at(&self, index: u32, group: &SchnorrGroup) -> BoxedUint {
        let x = BoxedUint::from(u64::from(index));
        let mut acc = group.reduce_scalar(
            self.coefficients
                .last()
                .expect("polynomial needs a constant term"),
        );
        for coefficient in self.coefficients.iter().rev().skip(1) {
            acc = group.add_scalars(&group.mul_scalars(&acc, &x), coefficient);
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::schnorr::index_pow;
    use rand::rngs::OsRng;

    fn test_group() -> SchnorrGroup {
        let p = BoxedUint::from(0x15c7bdb63fd69eb6f_u128);
        let q = BoxedUint::from(0xae3dedb1feb4f5b7_u64);
        SchnorrGroup::new(p, q).unwrap()
    }

    #[test]
    fn test_generate_has_degree_plus_one_coefficients() {
        let group = test_group();
        let poly = Polynomial::generate(4, &group, &mut OsRng);
        assert_eq!(poly.degree(), 4);
        assert_eq!(poly.coefficients().len(), 5);
    }

    #[test]
    fn test_horner_matches_direct_sum() {
        let group = test_group();
        let poly = Polynomial::generate(3, &group, &mut OsRng);
        let index = 7u32;

        let mut direct = BoxedUint::zero_with_precision(64);
        for (k, coefficient) in poly.coefficients().iter().enumerate() {
            let term = group.mul_scalars(coefficient, &group.reduce_scalar(&index_pow(index, k)));
            direct = group.add_scalars(&direct, &term);
        }

        assert_eq!(poly.evaluate_at(index, &group), direct);
    }

    #[test]
    fn test_constant_polynomial() {
        let group = test_group();
        let secret = BoxedUint::from(42u64);
        let poly = Polynomial::from_coefficients(vec![secret.clone()]);
        assert_eq!(
            poly.evaluate_at(9, &group),
            group.reduce_scalar(&secret)
        );
    }

    #[test]
    fn test_evaluation_at_zero_is_constant_term() {
        let group = test_group();
        let poly = Polynomial::generate(2, &group, &mut OsRng);
        assert_eq!(
            poly.evaluate_at(0, &group),
            group.reduce_scalar(poly.constant_term())
        );
    }
}
