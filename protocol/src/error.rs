// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Error type for this library

use thiserror::Error;

use crate::dkg::member::MemberId;

/**
 * Error type for the protocol crate.
 *
 * Three categories of failure exist in the protocol:
 *
 * 1. Local fatal: malformed configuration or a broken phase ordering. The
 *    local run aborts; peers record this member as inactive.
 * 2. Peer-attributable: invalid shares, failed decryption, missing paired
 *    messages. These never surface as errors; they convert into accusations
 *    and disqualifications inside the phase logic.
 * 3. Judicial: a dispute this member is not allowed to judge, or one it
 *    cannot judge for lack of evidence. Reported to the caller; other judges
 *    still rule.
 */
#[derive(Error, Debug)]
pub enum Error {
    /// The protocol configuration failed validation.
    #[error("invalid protocol configuration: {0}")]
    ConfigInvalid(String),

    /// No ephemeral key pair was generated for the given member. A Phase-2
    /// input referenced a channel this member never set up; protocol
    /// ordering violation, unrecoverable for that channel.
    #[error("ephemeral key pair does not exist for member {0}")]
    MissingEphemeralKeyPair(MemberId),

    /// No symmetric key established with the given member.
    #[error("no symmetric key for member {0}")]
    MissingSymmetricKey(MemberId),

    /// A commitments message arrived with no paired shares message from the
    /// same sender. One side of the pair is misbehaving; never dropped
    /// silently.
    #[error("cannot find shares message from member {0}")]
    MissingSharesMessage(MemberId),

    /// A shares message carries no entry addressed to the given receiver.
    #[error("shares message from member {sender} has no shares for member {receiver}")]
    SharesNotAddressedToMember { sender: MemberId, receiver: MemberId },

    /// The current member is a party to the dispute it was asked to judge.
    /// The accused cannot be a judge in its own case, and the accuser has
    /// already ruled by accusing.
    #[error("current member cannot be a part of a dispute")]
    SelfInDispute,

    /// The evidence log holds no broadcast needed to judge a dispute.
    #[error("no {phase} message recorded for member {member}")]
    MissingEvidence {
        phase: &'static str,
        member: MemberId,
    },

    /// Fewer revealed shares than the reconstruction threshold requires.
    #[error(
        "cannot reconstruct member {member}: {revealed} revealed shares, need at least {required}"
    )]
    InsufficientRevealedShares {
        member: MemberId,
        required: usize,
        revealed: usize,
    },

    /// A phase was driven out of order.
    #[error("phase ordering violation: {0}")]
    PhaseOrdering(&'static str),

    /// An error from the cryptography layer.
    #[error("cryptography error: {0}")]
    Cryptography(#[from] cryptography::utils::error::Error),
}

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, Error>;
