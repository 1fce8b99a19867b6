// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Error type for this library

use thiserror::Error;

/**
 * Error type for the cryptography crate.
 *
 * Covers parameter validation, encoding and the authenticated channel.
 * Protocol-level failures (accusations, disqualifications) live in the
 * protocol crate; everything here is either a configuration defect or an
 * operation on malformed data.
 */
#[derive(Error, Debug)]
pub enum Error {
    /// Occurs when [`SchnorrGroup`][`crate::groups::schnorr::SchnorrGroup`]
    /// parameters fail validation, e.g. `P ≠ 2Q + 1`.
    #[error("invalid group parameters: {0}")]
    InvalidGroupParameters(String),

    /// Occurs when a Pedersen generator is not a member of the order-`Q`
    /// subgroup.
    #[error("invalid generator: {0}")]
    InvalidGenerator(String),

    /// Occurs when authenticated decryption fails. Non-recoverable for the
    /// payload; attributable to whoever produced the ciphertext.
    #[error("authenticated decryption failed")]
    AuthenticationFailed,

    /// Occurs when the AEAD cipher rejects an encryption request.
    #[error("encryption failed")]
    EncryptionFailed,

    /// Occurs when a decrypted share payload has the wrong length.
    #[error("invalid plaintext length: expected {expected} bytes, got {actual}")]
    PlaintextLength { expected: usize, actual: usize },

    /// Occurs when parsing a non-canonical encoding of a big integer, point
    /// or scalar.
    #[error("non-canonical encoding: {0}")]
    NonCanonicalEncoding(String),
}
