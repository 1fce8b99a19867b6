// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Ephemeral ECDH key agreement and the authenticated symmetric channel
//!
//! For every ordered pair of protocol members `(i, j)`, member `i` generates
//! a fresh Ristretto keypair, broadcasts the public half and derives a
//! symmetric key by ECDH against `j`'s corresponding public half. Private
//! shares sent over that channel are sealed with ChaCha20-Poly1305.
//!
//! Keypairs are single-use by construction: an accuser reveals its private
//! half during dispute resolution, making the channel auditable by any third
//! party, and public from that moment on. Never reuse a keypair across runs.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Sha3_256};

use crate::utils::error::Error;
use crate::utils::rng::CRng;

/// Domain separation label for the ECDH key derivation.
const KDF_LABEL: &[u8] = b"dkg-ephemeral-channel-v1";

/// ChaCha20-Poly1305 nonce length in bytes.
pub const NONCE_LENGTH: usize = 12;

/**
 * An ephemeral ECDH keypair for one ordered member pair.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EphemeralKeyPair {
    private_key: EphemeralPrivateKey,
    public_key: EphemeralPublicKey,
}

impl EphemeralKeyPair {
    /// Generate a fresh keypair.
    pub fn generate(rng: &mut impl CRng) -> Self {
        let private_key = EphemeralPrivateKey(Scalar::random(rng));
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }

    pub fn private_key(&self) -> &EphemeralPrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &EphemeralPublicKey {
        &self.public_key
    }
}

/**
 * The private half of an ephemeral keypair.
 *
 * Secret until its owner becomes an accuser, at which point it is broadcast
 * so that any third party can recompute the disputed symmetric key.
 */
#[derive(Clone, PartialEq, Eq)]
pub struct EphemeralPrivateKey(Scalar);

impl std::fmt::Debug for EphemeralPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EphemeralPrivateKey(..)")
    }
}

impl EphemeralPrivateKey {
    /// Recompute the matching public half.
    ///
    /// Dispute judges use this to check a revealed private key against the
    /// accuser's Phase-1 broadcast.
    pub fn public_key(&self) -> EphemeralPublicKey {
        EphemeralPublicKey(RistrettoPoint::mul_base(&self.0))
    }

    /// Derive the shared symmetric key with the peer's public half.
    ///
    /// Both endpoints arrive at the same key by DH symmetry.
    pub fn ecdh(&self, public_key: &EphemeralPublicKey) -> SymmetricKey {
        let shared = &public_key.0 * &self.0;
        let mut hasher = Sha3_256::new();
        hasher.update(KDF_LABEL);
        hasher.update(shared.compress().as_bytes());
        SymmetricKey(hasher.finalize().into())
    }

    /// Canonical 32-byte encoding.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Parse the canonical encoding.
    ///
    /// # Errors
    ///
    /// - `NonCanonicalEncoding` for scalars outside the canonical range.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, Error> {
        Option::from(Scalar::from_canonical_bytes(bytes))
            .map(Self)
            .ok_or_else(|| {
                Error::NonCanonicalEncoding("ephemeral private key scalar".to_string())
            })
    }
}

impl Serialize for EphemeralPrivateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_bytes().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EphemeralPrivateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = <[u8; 32]>::deserialize(deserializer)?;
        Self::from_bytes(bytes).map_err(serde::de::Error::custom)
    }
}

/**
 * The public half of an ephemeral keypair, broadcast in Phase 1.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EphemeralPublicKey(RistrettoPoint);

impl EphemeralPublicKey {
    /// Standard compressed 32-byte encoding.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }

    /// Parse the compressed encoding.
    ///
    /// # Errors
    ///
    /// - `NonCanonicalEncoding` if the bytes are not a valid compressed
    ///   Ristretto point.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, Error> {
        CompressedRistretto(bytes)
            .decompress()
            .map(Self)
            .ok_or_else(|| {
                Error::NonCanonicalEncoding("ephemeral public key point".to_string())
            })
    }
}

impl Serialize for EphemeralPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_bytes().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EphemeralPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = <[u8; 32]>::deserialize(deserializer)?;
        Self::from_bytes(bytes).map_err(serde::de::Error::custom)
    }
}

/**
 * A 32-byte symmetric channel key derived via ECDH.
 */
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey([u8; 32]);

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Seal a plaintext with ChaCha20-Poly1305 under a fresh random nonce.
    ///
    /// # Errors
    ///
    /// - `EncryptionFailed` on cipher failure.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        rng: &mut impl CRng,
    ) -> Result<EncryptedPayload, Error> {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.0));
        let mut nonce = [0u8; NONCE_LENGTH];
        rng.fill_bytes(&mut nonce);
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| Error::EncryptionFailed)?;
        Ok(EncryptedPayload { nonce, ciphertext })
    }

    /// Open a sealed payload.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed` on MAC mismatch. Non-recoverable; the
    ///   payload author misbehaved.
    pub fn decrypt(&self, payload: &EncryptedPayload) -> Result<Vec<u8>, Error> {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.0));
        cipher
            .decrypt(Nonce::from_slice(&payload.nonce), payload.ciphertext.as_ref())
            .map_err(|_| Error::AuthenticationFailed)
    }
}

/**
 * A sealed payload: `{ nonce, ciphertext, tag }`, with the 16-byte Poly1305
 * tag appended to the ciphertext.
 */
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub nonce: [u8; NONCE_LENGTH],
    pub ciphertext: Vec<u8>,
}
