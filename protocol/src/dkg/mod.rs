// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Distributed key generation per GJKR-99
//!
//! Gennaro R., Jarecki S., Krawczyk H., Rabin T. (1999) Secure Distributed
//! Key Generation for Discrete-Log Based Cryptosystems. EUROCRYPT '99.
//!
//! Twelve ordered phases driven by a deterministic per-member state machine:
//!
//! 1. Ephemeral key generation: a fresh ECDH keypair per other member.
//! 2. Symmetric key derivation over every pairwise channel.
//! 3. Shares and commitments: two random degree-`t` polynomials, encrypted
//!    pairwise shares, Pedersen commitments to the coefficients.
//! 4. Share verification and public accusation.
//! 5. Accusation resolution by the uninvolved members.
//! 6. Share combination into the master private key share `x_i`.
//! 7. Publication of public key share points `A_k = G^{a_k}`.
//! 8. Point verification and public accusation.
//! 9. Points accusation resolution.
//! 10. Revealed-share collection for misbehaving qualified members.
//! 11. Individual key reconstruction by Lagrange interpolation.
//! 12. Group public key combination.
//!
//! Phase functions live on the member role types in [`member`] and
//! [`phases`]; [`states`] wires them to the broadcast channel and block
//! clock.

pub mod config;
pub mod evidence;
pub mod group;
pub mod member;
pub mod messages;
pub mod phases;
pub mod result;
pub mod states;

#[cfg(test)]
mod integration_tests;

pub use config::ProtocolConfig;
pub use group::Group;
pub use member::{EphemeralKeyPairGeneratingMember, MemberId};
pub use result::{DkgResult, ThresholdSigner};
pub use states::{DkgPhase, DkgStateMachine, PhaseDurations};
