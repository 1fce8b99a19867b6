// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Broadcast messages exchanged during the DKG protocol
//!
//! One struct per phase broadcast, unified under the [`DkgMessage`] enum for
//! type-safe handling at the transport boundary. Large integers serialize as
//! canonical minimum-length big-endian bytes; curve points and scalars use
//! their standard 32-byte encodings.

use std::collections::BTreeMap;

use crypto_bigint::BoxedUint;
use cryptography::ephemeral::{
    EncryptedPayload, EphemeralPrivateKey, EphemeralPublicKey, SymmetricKey,
};
use cryptography::utils::rng::CRng;
use cryptography::utils::serialization::to_be_bytes_minimal;
use serde::{Deserialize, Serialize};

use crate::dkg::member::MemberId;
use crate::error::{Error, Result};

/// Fixed width of one share scalar on the wire, in bytes.
pub const SHARE_BYTES: usize = 32;

// --- Phase 1 ---

/// Broadcast in Phase 1: the sender's ephemeral public keys, one per other
/// group member, keyed by the intended receiver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EphemeralPublicKeyMessage {
    pub sender_id: MemberId,
    pub ephemeral_public_keys: BTreeMap<MemberId, EphemeralPublicKey>,
}

// --- Phase 3 ---

/// Broadcast in Phase 3: Pedersen commitments `C_k = G^{a_k} · H^{b_k}` to
/// the sender's polynomial coefficients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCommitmentsMessage {
    pub sender_id: MemberId,
    #[serde(with = "cryptography::utils::serialization::big_uint_vec")]
    pub commitments: Vec<BoxedUint>,
}

/// One receiver's sealed share pair inside a [`PeerSharesMessage`].
///
/// The AEAD plaintext is `s_ij || t_ij`, each a 32-byte big-endian scalar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedShares {
    pub payload: EncryptedPayload,
}

/// Broadcast in Phase 3: the sender's shares for every other member, each
/// pair sealed under the pairwise symmetric channel key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSharesMessage {
    pub sender_id: MemberId,
    pub shares: BTreeMap<MemberId, EncryptedShares>,
}

impl PeerSharesMessage {
    pub fn new(sender_id: MemberId) -> Self {
        Self {
            sender_id,
            shares: BTreeMap::new(),
        }
    }

    /// Seal shares `(s, t)` for the given receiver under the channel key.
    ///
    /// # Errors
    ///
    /// - `Cryptography` on cipher failure.
    pub fn add_shares(
        &mut self,
        receiver_id: MemberId,
        share_s: &BoxedUint,
        share_t: &BoxedUint,
        symmetric_key: &SymmetricKey,
        rng: &mut impl CRng,
    ) -> Result<()> {
        let mut plaintext = share_to_bytes(share_s).to_vec();
        plaintext.extend_from_slice(&share_to_bytes(share_t));
        let payload = symmetric_key.encrypt(&plaintext, rng)?;
        self.shares.insert(receiver_id, EncryptedShares { payload });
        Ok(())
    }

    /// Open the shares addressed to the given receiver.
    ///
    /// # Errors
    ///
    /// - `SharesNotAddressedToMember` if the message carries nothing for
    ///   the receiver.
    /// - `Cryptography` on MAC mismatch or a malformed plaintext.
    pub fn decrypt_shares(
        &self,
        receiver_id: MemberId,
        symmetric_key: &SymmetricKey,
    ) -> Result<(BoxedUint, BoxedUint)> {
        let sealed = self.shares.get(&receiver_id).ok_or(
            Error::SharesNotAddressedToMember {
                sender: self.sender_id,
                receiver: receiver_id,
            },
        )?;
        let plaintext = symmetric_key.decrypt(&sealed.payload)?;
        if plaintext.len() != 2 * SHARE_BYTES {
            return Err(Error::Cryptography(
                cryptography::utils::error::Error::PlaintextLength {
                    expected: 2 * SHARE_BYTES,
                    actual: plaintext.len(),
                },
            ));
        }
        let share_s = share_from_bytes(&plaintext[..SHARE_BYTES]);
        let share_t = share_from_bytes(&plaintext[SHARE_BYTES..]);
        Ok((share_s, share_t))
    }
}

fn share_to_bytes(value: &BoxedUint) -> [u8; SHARE_BYTES] {
    let minimal = to_be_bytes_minimal(value);
    let mut bytes = [0u8; SHARE_BYTES];
    // shares are reduced mod Q, and the config guarantees Q fits the width
    bytes[SHARE_BYTES - minimal.len()..].copy_from_slice(&minimal);
    bytes
}

fn share_from_bytes(bytes: &[u8]) -> BoxedUint {
    BoxedUint::from_be_slice(bytes, (SHARE_BYTES * 8) as u32)
        .expect("slice length matches the fixed share width")
}

// --- Phase 4 ---

/// Broadcast in Phase 4: for each accused member, the accuser's own
/// ephemeral private key for that channel. Revealing it lets any third
/// party recompute the symmetric key and audit the disputed ciphertext.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretSharesAccusationsMessage {
    pub sender_id: MemberId,
    pub accused_members_keys: BTreeMap<MemberId, EphemeralPrivateKey>,
}

// --- Phase 7 ---

/// Broadcast in Phase 7: public key share points `A_k = G^{a_k}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPublicKeySharePointsMessage {
    pub sender_id: MemberId,
    #[serde(with = "cryptography::utils::serialization::big_uint_vec")]
    pub public_key_share_points: Vec<BoxedUint>,
}

// --- Phase 8 ---

/// Broadcast in Phase 8: accusations against members whose share points
/// failed verification, in the same key-revealing format as Phase 4.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsAccusationsMessage {
    pub sender_id: MemberId,
    pub accused_members_keys: BTreeMap<MemberId, EphemeralPrivateKey>,
}

// --- Phase 10 ---

/// Broadcast in Phase 10: for each misbehaving qualified member `m`, the
/// share `s_mk` that `m` had privately sent to the broadcasting member `k`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedDisqualifiedSharesMessage {
    pub sender_id: MemberId,
    #[serde(with = "cryptography::utils::serialization::big_uint_map")]
    pub shares: BTreeMap<MemberId, BoxedUint>,
}

// --- Unified message enum ---

/// A single enum encapsulating every DKG broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DkgMessage {
    EphemeralPublicKey(EphemeralPublicKeyMessage),
    MemberCommitments(MemberCommitmentsMessage),
    PeerShares(PeerSharesMessage),
    SecretSharesAccusations(SecretSharesAccusationsMessage),
    MemberPublicKeySharePoints(MemberPublicKeySharePointsMessage),
    PointsAccusations(PointsAccusationsMessage),
    RevealedDisqualifiedShares(RevealedDisqualifiedSharesMessage),
}

impl DkgMessage {
    /// The authenticated sender of the message.
    pub fn sender_id(&self) -> MemberId {
        match self {
            DkgMessage::EphemeralPublicKey(m) => m.sender_id,
            DkgMessage::MemberCommitments(m) => m.sender_id,
            DkgMessage::PeerShares(m) => m.sender_id,
            DkgMessage::SecretSharesAccusations(m) => m.sender_id,
            DkgMessage::MemberPublicKeySharePoints(m) => m.sender_id,
            DkgMessage::PointsAccusations(m) => m.sender_id,
            DkgMessage::RevealedDisqualifiedShares(m) => m.sender_id,
        }
    }

    /// The protocol phase that produces this message type.
    pub fn phase(&self) -> u8 {
        match self {
            DkgMessage::EphemeralPublicKey(_) => 1,
            DkgMessage::MemberCommitments(_) | DkgMessage::PeerShares(_) => 3,
            DkgMessage::SecretSharesAccusations(_) => 4,
            DkgMessage::MemberPublicKeySharePoints(_) => 7,
            DkgMessage::PointsAccusations(_) => 8,
            DkgMessage::RevealedDisqualifiedShares(_) => 10,
        }
    }
}

// --- Wire envelope ---

/// Length of the canonical header encoding in bytes.
pub const HEADER_BYTES: usize = 37;

/// The wire header carried ahead of every broadcast body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub sender_id: MemberId,
    /// The DKG run this message belongs to.
    pub request_id: [u8; 32],
    pub phase: u8,
}

impl MessageHeader {
    /// Canonical encoding: sender id as 4 big-endian bytes, then the
    /// 32-byte request id, then the phase byte.
    pub fn to_bytes(&self) -> [u8; HEADER_BYTES] {
        let mut bytes = [0u8; HEADER_BYTES];
        bytes[..4].copy_from_slice(&self.sender_id.0.to_be_bytes());
        bytes[4..36].copy_from_slice(&self.request_id);
        bytes[36] = self.phase;
        bytes
    }

    /// Parse the canonical encoding.
    ///
    /// # Errors
    ///
    /// - `Cryptography(NonCanonicalEncoding)` on a wrong-length input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; HEADER_BYTES] = bytes.try_into().map_err(|_| {
            Error::Cryptography(cryptography::utils::error::Error::NonCanonicalEncoding(
                format!("message header must be {HEADER_BYTES} bytes"),
            ))
        })?;
        let sender = u32::from_be_bytes(
            bytes[..4].try_into().expect("slice length is 4"),
        );
        let mut request_id = [0u8; 32];
        request_id.copy_from_slice(&bytes[4..36]);
        Ok(Self {
            sender_id: MemberId(sender),
            request_id,
            phase: bytes[36],
        })
    }
}

/// A header plus a typed body, as handed to the transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub header: MessageHeader,
    pub message: DkgMessage,
}

impl Envelope {
    /// Wrap a message, deriving the header from its type and sender.
    pub fn new(request_id: [u8; 32], message: DkgMessage) -> Self {
        Self {
            header: MessageHeader {
                sender_id: message.sender_id(),
                request_id,
                phase: message.phase(),
            },
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptography::ephemeral::EphemeralKeyPair;
    use cryptography::testing;
    use rand::rngs::OsRng;

    #[test]
    fn test_shares_round_trip_through_channel() {
        let mut rng = OsRng;
        let group = testing::small_group();
        let pair_a = EphemeralKeyPair::generate(&mut rng);
        let pair_b = EphemeralKeyPair::generate(&mut rng);
        let key = pair_a.private_key().ecdh(pair_b.public_key());

        let share_s = group.random_scalar(&mut rng);
        let share_t = group.random_scalar(&mut rng);

        let mut message = PeerSharesMessage::new(MemberId(1));
        message
            .add_shares(MemberId(2), &share_s, &share_t, &key, &mut rng)
            .unwrap();

        let receiver_key = pair_b.private_key().ecdh(pair_a.public_key());
        let (got_s, got_t) = message.decrypt_shares(MemberId(2), &receiver_key).unwrap();
        assert_eq!(group.reduce_scalar(&got_s), group.reduce_scalar(&share_s));
        assert_eq!(group.reduce_scalar(&got_t), group.reduce_scalar(&share_t));
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let mut rng = OsRng;
        let group = testing::small_group();
        let key = SymmetricKey::from_bytes([1u8; 32]);
        let wrong = SymmetricKey::from_bytes([2u8; 32]);

        let mut message = PeerSharesMessage::new(MemberId(1));
        message
            .add_shares(
                MemberId(2),
                &group.random_scalar(&mut rng),
                &group.random_scalar(&mut rng),
                &key,
                &mut rng,
            )
            .unwrap();

        assert!(message.decrypt_shares(MemberId(2), &wrong).is_err());
    }

    #[test]
    fn test_missing_receiver_entry_is_reported() {
        let message = PeerSharesMessage::new(MemberId(1));
        let key = SymmetricKey::from_bytes([1u8; 32]);
        assert!(matches!(
            message.decrypt_shares(MemberId(3), &key),
            Err(Error::SharesNotAddressedToMember { .. })
        ));
    }

    #[test]
    fn test_header_round_trip() {
        let header = MessageHeader {
            sender_id: MemberId(0x01020304),
            request_id: [0xab; 32],
            phase: 7,
        };
        let bytes = header.to_bytes();
        assert_eq!(MessageHeader::from_bytes(&bytes).unwrap(), header);
        assert!(MessageHeader::from_bytes(&bytes[..36]).is_err());
    }

    #[test]
    fn test_message_serde_round_trip() {
        let mut rng = OsRng;
        let pair = EphemeralKeyPair::generate(&mut rng);
        let mut keys = BTreeMap::new();
        keys.insert(MemberId(2), pair.public_key().clone());
        let message = DkgMessage::EphemeralPublicKey(EphemeralPublicKeyMessage {
            sender_id: MemberId(1),
            ephemeral_public_keys: keys,
        });

        let encoded = serde_json::to_vec(&Envelope::new([3; 32], message.clone())).unwrap();
        let decoded: Envelope = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded.message, message);
        assert_eq!(decoded.header.phase, 1);
        assert_eq!(decoded.header.sender_id, MemberId(1));
    }

    #[test]
    fn test_commitments_message_serde_round_trip() {
        let group = testing::small_group();
        let mut rng = OsRng;
        let message = MemberCommitmentsMessage {
            sender_id: MemberId(4),
            commitments: (0..3).map(|_| group.random_scalar(&mut rng)).collect(),
        };
        let encoded = serde_json::to_string(&message).unwrap();
        let decoded: MemberCommitmentsMessage = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.sender_id, message.sender_id);
        // decoded values come back at minimal precision; compare canonically
        let canonical: Vec<Vec<u8>> = message.commitments.iter().map(to_be_bytes_minimal).collect();
        let decoded_canonical: Vec<Vec<u8>> =
            decoded.commitments.iter().map(to_be_bytes_minimal).collect();
        assert_eq!(decoded_canonical, canonical);
    }
}
