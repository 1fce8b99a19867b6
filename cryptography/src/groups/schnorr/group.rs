// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Explicit-modulus arithmetic in the order-`Q` subgroup of `Z_P*`

use std::cmp::Ordering;

use crypto_bigint::modular::{BoxedMontyForm, BoxedMontyParams};
use crypto_bigint::{BoxedUint, NonZero, Odd, RandomMod};

use crate::utils::error::Error;
use crate::utils::rng::CRng;

/**
 * The order-`Q` subgroup of `Z_P*` for a safe prime `P = 2Q + 1`.
 *
 * Group elements and scalars are plain [`BoxedUint`] values; every operation
 * is a method on the group value, which carries its moduli explicitly. There
 * is no ambient modulus context: element arithmetic reduces mod `P`, scalar
 * (exponent) arithmetic reduces mod `Q`.
 *
 * Values of any precision may enter an operation; they are brought to the
 * group's working precision and reduced. Exponents are the exception: they
 * pass through unreduced at whatever width they have, since a verifier may
 * raise an adversarial element of unknown order to `j^k`, which is only
 * equivalent to `j^k mod Q` for honest subgroup members.
 *
 * # Examples
 *
 * ```ignore
 * let group = SchnorrGroup::new(p, q)?;
 * let x = group.random_scalar(&mut rng);
 * let y = group.exp(&g, &x);
 * ```
 */
#[derive(Clone, Debug)]
pub struct SchnorrGroup {
    /// The prime modulus `P`.
    p: BoxedUint,
    /// The subgroup order `Q`, with `P = 2Q + 1`.
    q: BoxedUint,
    nz_p: NonZero<BoxedUint>,
    nz_q: NonZero<BoxedUint>,
    monty_p: BoxedMontyParams,
    monty_q: BoxedMontyParams,
    /// Working precision, in bits. All stored values share it.
    bits: u32,
}

impl PartialEq for SchnorrGroup {
    fn eq(&self, other: &Self) -> bool {
        self.p == other.p && self.q == other.q
    }
}

impl Eq for SchnorrGroup {}

impl SchnorrGroup {
    /// Construct the group from the safe prime `P` and subgroup order `Q`.
    ///
    /// # Errors
    ///
    /// - `InvalidGroupParameters` unless `P` and `Q` are odd, non-trivial
    ///   and satisfy `P = 2Q + 1`.
    pub fn new(p: BoxedUint, q: BoxedUint) -> Result<Self, Error> {
        let bits = p.bits_precision();

        let p_odd = Odd::new(p.clone()).into_option().ok_or_else(|| {
            Error::InvalidGroupParameters("P must be odd".to_string())
        })?;
        if q.bits() == 0 || q.bits() > bits {
            return Err(Error::InvalidGroupParameters(
                "Q must be non-zero and no wider than P".to_string(),
            ));
        }
        let q = at_precision(&q, bits);
        let q_odd = Odd::new(q.clone()).into_option().ok_or_else(|| {
            Error::InvalidGroupParameters("Q must be odd".to_string())
        })?;

        // P = 2Q + 1, computed one limb wider so the doubling cannot wrap.
        let wide = bits + 64;
        let q_wide = q.widen(wide);
        let two_q_plus_one = q_wide
            .wrapping_add(&q_wide)
            .wrapping_add(&BoxedUint::one_with_precision(wide));
        if two_q_plus_one != p.widen(wide) {
            return Err(Error::InvalidGroupParameters(
                "P must equal 2Q + 1".to_string(),
            ));
        }

        let nz_p = NonZero::new(p.clone())
            .into_option()
            .expect("odd P is non-zero");
        let nz_q = NonZero::new(q.clone())
            .into_option()
            .expect("odd Q is non-zero");
        let monty_p = BoxedMontyParams::new(p_odd);
        let monty_q = BoxedMontyParams::new(q_odd);

        Ok(Self {
            p,
            q,
            nz_p,
            nz_q,
            monty_p,
            monty_q,
            bits,
        })
    }

    /// The prime modulus `P`.
    pub fn modulus(&self) -> &BoxedUint {
        &self.p
    }

    /// The subgroup order `Q`.
    pub fn order(&self) -> &BoxedUint {
        &self.q
    }

    /// The working precision of the group, in bits.
    pub fn bits_precision(&self) -> u32 {
        self.bits
    }

    /// The multiplicative identity at the group's working precision.
    pub fn one(&self) -> BoxedUint {
        BoxedUint::one_with_precision(self.bits)
    }

    /// Reduce a value into `[0, P)` at the working precision.
    pub fn reduce_element(&self, value: &BoxedUint) -> BoxedUint {
        self.reduce(value, &self.nz_p)
    }

    /// Reduce a value into `[0, Q)` at the working precision.
    pub fn reduce_scalar(&self, value: &BoxedUint) -> BoxedUint {
        self.reduce(value, &self.nz_q)
    }

    /// `base^exponent mod P`.
    ///
    /// The exponent may be arbitrarily wide and is never reduced mod `Q`.
    pub fn exp(&self, base: &BoxedUint, exponent: &BoxedUint) -> BoxedUint {
        let base = self.reduce_element(base);
        BoxedMontyForm::new(base, self.monty_p.clone())
            .pow(exponent)
            .retrieve()
    }

    /// `a · b mod P`.
    pub fn mul(&self, a: &BoxedUint, b: &BoxedUint) -> BoxedUint {
        let a = BoxedMontyForm::new(self.reduce_element(a), self.monty_p.clone());
        let b = BoxedMontyForm::new(self.reduce_element(b), self.monty_p.clone());
        (&a * &b).retrieve()
    }

    /// `a + b mod Q`.
    pub fn add_scalars(&self, a: &BoxedUint, b: &BoxedUint) -> BoxedUint {
        self.reduce_scalar(a)
            .add_mod(&self.reduce_scalar(b), &self.q)
    }

    /// `a - b mod Q`. Negative differences wrap into `[0, Q)`.
    pub fn sub_scalars(&self, a: &BoxedUint, b: &BoxedUint) -> BoxedUint {
        self.reduce_scalar(a)
            .sub_mod(&self.reduce_scalar(b), &self.q)
    }

    /// `a · b mod Q`.
    pub fn mul_scalars(&self, a: &BoxedUint, b: &BoxedUint) -> BoxedUint {
        let a = BoxedMontyForm::new(self.reduce_scalar(a), self.monty_q.clone());
        let b = BoxedMontyForm::new(self.reduce_scalar(b), self.monty_q.clone());
        (&a * &b).retrieve()
    }

    /// Inverse mod the prime order `Q`, via Fermat's little theorem.
    ///
    /// Returns `None` for values congruent to zero.
    pub fn invert_scalar(&self, value: &BoxedUint) -> Option<BoxedUint> {
        let value = self.reduce_scalar(value);
        if bool::from(value.is_zero()) {
            return None;
        }
        let two = BoxedUint::from(2u64).widen(self.bits);
        let exponent = self.q.wrapping_sub(&two);
        Some(
            BoxedMontyForm::new(value, self.monty_q.clone())
                .pow(&exponent)
                .retrieve(),
        )
    }

    /// Uniform scalar in the open interval `(0, Q)`; zero is
    /// rejection-sampled away.
    pub fn random_scalar(&self, rng: &mut impl CRng) -> BoxedUint {
        loop {
            let candidate = BoxedUint::random_mod(rng, &self.nz_q);
            if !bool::from(candidate.is_zero()) {
                return candidate;
            }
        }
    }

    /// Uniform non-identity element of the order-`Q` subgroup.
    ///
    /// Squaring a random element of `Z_P*` lands in the subgroup of
    /// quadratic residues, which for a safe prime is exactly the order-`Q`
    /// subgroup; any non-identity member generates it.
    pub fn random_generator(&self, rng: &mut impl CRng) -> BoxedUint {
        loop {
            let r = BoxedUint::random_mod(rng, &self.nz_p);
            let candidate = self.mul(&r, &r);
            if !bool::from(candidate.is_zero()) && candidate != self.one() {
                return candidate;
            }
        }
    }

    /// Whether `value` is a non-identity member of the order-`Q` subgroup,
    /// i.e. `value^Q ≡ 1 (mod P)` and `value ≢ 0`.
    pub fn contains_subgroup_element(&self, value: &BoxedUint) -> bool {
        let value = self.reduce_element(value);
        !bool::from(value.is_zero()) && self.exp(&value, &self.q) == self.one()
    }

    fn reduce(&self, value: &BoxedUint, modulus: &NonZero<BoxedUint>) -> BoxedUint {
        if value.bits_precision() <= self.bits {
            let value = at_precision(value, self.bits);
            &value % modulus
        } else {
            let wide = NonZero::new(modulus.as_ref().widen(value.bits_precision()))
                .expect("widening preserves non-zero");
            let reduced = value % &wide;
            at_precision(&reduced, self.bits)
        }
    }
}

/// `index^exponent` as an unreduced arbitrary-precision integer.
///
/// Member indices enter verification equations as exponents `j^k`; the
/// result is used as an exponent and must not be reduced by any modulus.
pub fn index_pow(index: u32, exponent: usize) -> BoxedUint {
    let base = BoxedUint::from(u64::from(index));
    let mut result = BoxedUint::one_with_precision(64);
    for _ in 0..exponent {
        result = &result * &base;
    }
    result
}

/// Bring `value` to exactly `bits` of precision.
///
/// Truncating is only legal when the caller knows the value fits, which
/// holds everywhere this is used: shortened values are reduced
/// representatives below a modulus of `bits` precision.
fn at_precision(value: &BoxedUint, bits: u32) -> BoxedUint {
    match value.bits_precision().cmp(&bits) {
        Ordering::Less => value.widen(bits),
        Ordering::Equal => value.clone(),
        Ordering::Greater => value.shorten(bits),
    }
}
