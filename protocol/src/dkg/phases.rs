// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! The twelve protocol phases
//!
//! Each phase is an operation on the matching member role type from
//! [`member`][`crate::dkg::member`]: it consumes the previous phase's
//! inbound broadcasts and produces this phase's outbound broadcast, mutating
//! the member's accumulated state. Dispute verdicts read only the evidence
//! log and the revealed ephemeral key, so every honest judge rules
//! identically.

use std::collections::BTreeMap;

use crypto_bigint::BoxedUint;
use cryptography::ephemeral::{EphemeralKeyPair, EphemeralPrivateKey, SymmetricKey};
use cryptography::groups::schnorr::{index_pow, SchnorrGroup};
use cryptography::polynomial::Polynomial;
use cryptography::utils::rng::CRng;
use tracing::{debug, warn};

use crate::dkg::config::ProtocolConfig;
use crate::dkg::evidence::EvidenceLog;
use crate::dkg::member::{
    CommittedSecrets, CommitmentsVerifyingMember, CombiningMember, CommittingMember,
    DisqualifiedShares, EphemeralKeyPairGeneratingMember, MemberId, PointsJustifyingMember,
    ReconstructingMember, RevealingMember, SharesJustifyingMember, SharingMember,
    SymmetricKeyGeneratingMember,
};
use crate::dkg::messages::{
    EphemeralPublicKeyMessage, MemberCommitmentsMessage, MemberPublicKeySharePointsMessage,
    PeerSharesMessage, PointsAccusationsMessage, SecretSharesAccusationsMessage,
};
use crate::dkg::result::DkgResult;
use crate::error::{Error, Result};

impl EphemeralKeyPairGeneratingMember {
    /// Phase 1: generate an ephemeral ECDH keypair for every other group
    /// member and publish the public halves.
    pub fn generate_ephemeral_key_pairs(
        &mut self,
        rng: &mut impl CRng,
    ) -> Result<EphemeralPublicKeyMessage> {
        let mut ephemeral_public_keys = BTreeMap::new();

        for member_id in self.core.group.other_member_ids(self.core.id) {
            let key_pair = EphemeralKeyPair::generate(rng);
            ephemeral_public_keys.insert(member_id, key_pair.public_key().clone());
            self.ephemeral_key_pairs.insert(member_id, key_pair);
        }

        let message = EphemeralPublicKeyMessage {
            sender_id: self.core.id,
            ephemeral_public_keys,
        };
        // own broadcasts enter the log too: a dispute naming this member is
        // judged against the same record everywhere
        self.core.evidence_log.record_ephemeral(&message);
        Ok(message)
    }
}

impl SymmetricKeyGeneratingMember {
    /// Phase 2: derive a symmetric channel key for each sender of a Phase-1
    /// broadcast, by ECDH between our private half for that sender and the
    /// public half it addressed to us.
    ///
    /// # Errors
    ///
    /// - `MissingEphemeralKeyPair` if a sender is not one we generated a
    ///   pair for; protocol ordering violation.
    pub fn generate_symmetric_keys(
        &mut self,
        messages: &[EphemeralPublicKeyMessage],
    ) -> Result<()> {
        for message in messages {
            self.core.evidence_log.record_ephemeral(message);

            let other_member = message.sender_id;
            let key_pair = self
                .ephemeral_key_pairs
                .get(&other_member)
                .ok_or(Error::MissingEphemeralKeyPair(other_member))?;

            let Some(public_key_for_us) = message.ephemeral_public_keys.get(&self.core.id)
            else {
                warn!(
                    member = %self.core.id,
                    peer = %other_member,
                    "no ephemeral public key addressed to us; peer goes inactive"
                );
                self.core.group.mark_inactive(other_member);
                continue;
            };

            let symmetric_key = key_pair.private_key().ecdh(public_key_for_us);
            self.symmetric_keys.insert(other_member, symmetric_key);
        }
        Ok(())
    }
}

impl CommittingMember {
    /// Phase 3: draw the two sharing polynomials, seal a share pair for
    /// every other eligible member under the pairwise channel, and commit
    /// to the coefficients.
    ///
    /// # Errors
    ///
    /// - `MissingSymmetricKey` if any eligible receiver has no established
    ///   channel.
    pub fn calculate_members_shares_and_commitments(
        &mut self,
        rng: &mut impl CRng,
    ) -> Result<(PeerSharesMessage, MemberCommitmentsMessage)> {
        let polynomial_degree = self.core.group.dishonest_threshold();
        let arithmetic = self.core.config.group();

        let coefficients_a = Polynomial::generate(polynomial_degree, arithmetic, rng);
        let coefficients_b = Polynomial::generate(polynomial_degree, arithmetic, rng);

        let self_share_s = coefficients_a.evaluate_at(self.core.id.0, arithmetic);
        let self_share_t = coefficients_b.evaluate_at(self.core.id.0, arithmetic);

        let mut shares_message = PeerSharesMessage::new(self.core.id);
        for receiver_id in self.core.group.other_member_ids(self.core.id) {
            if !self.core.group.is_eligible(receiver_id) {
                continue;
            }
            let share_s = coefficients_a.evaluate_at(receiver_id.0, arithmetic);
            let share_t = coefficients_b.evaluate_at(receiver_id.0, arithmetic);
            let symmetric_key = self
                .symmetric_keys
                .get(&receiver_id)
                .ok_or(Error::MissingSymmetricKey(receiver_id))?;
            shares_message.add_shares(receiver_id, &share_s, &share_t, symmetric_key, rng)?;
        }

        let vss = self.core.config.vss();
        let commitments: Vec<BoxedUint> = coefficients_a
            .coefficients()
            .iter()
            .zip(coefficients_b.coefficients())
            .map(|(a, b)| vss.commit(a, b))
            .collect();

        let commitments_message = MemberCommitmentsMessage {
            sender_id: self.core.id,
            commitments: commitments.clone(),
        };
        self.core.evidence_log.record_shares(&shares_message);
        self.committed = Some(CommittedSecrets {
            coefficients_a,
            coefficients_b,
            self_share_s,
            self_share_t,
            commitments,
        });

        Ok((shares_message, commitments_message))
    }
}

impl CommitmentsVerifyingMember {
    /// Phase 4: pair each commitments broadcast with the same sender's
    /// shares broadcast, open our share pair and verify it against the
    /// commitments. Any failure, whether bad decryption, a missing entry or
    /// failed verification, turns into an accusation that reveals our
    /// ephemeral private key for the accused channel.
    ///
    /// # Errors
    ///
    /// - `MissingSharesMessage` when commitments arrive with no paired
    ///   shares message; one side is misbehaving, nothing is dropped
    ///   silently.
    /// - `MissingSymmetricKey` when no channel exists with a sender.
    pub fn verify_received_shares_and_commitments(
        &mut self,
        shares_messages: &[PeerSharesMessage],
        commitments_messages: &[MemberCommitmentsMessage],
    ) -> Result<SecretSharesAccusationsMessage> {
        for message in shares_messages {
            self.core.evidence_log.record_shares(message);
        }

        let mut accused_members_keys = BTreeMap::new();
        for commitments_message in commitments_messages {
            let sender_id = commitments_message.sender_id;
            let Some(shares_message) =
                shares_messages.iter().find(|m| m.sender_id == sender_id)
            else {
                return Err(Error::MissingSharesMessage(sender_id));
            };

            self.received_peer_commitments
                .insert(sender_id, commitments_message.commitments.clone());

            let symmetric_key = self
                .symmetric_keys
                .get(&sender_id)
                .ok_or(Error::MissingSymmetricKey(sender_id))?;

            let decrypted = shares_message.decrypt_shares(self.core.id, symmetric_key);
            let valid = match &decrypted {
                Ok((share_s, share_t)) => self.core.config.vss().verify_share(
                    &commitments_message.commitments,
                    self.core.id.0,
                    share_s,
                    share_t,
                ),
                Err(_) => false,
            };

            match (valid, decrypted) {
                (true, Ok((share_s, share_t))) => {
                    self.received_valid_shares_s.insert(sender_id, share_s);
                    self.received_valid_shares_t.insert(sender_id, share_t);
                    self.received_valid_peer_commitments
                        .insert(sender_id, commitments_message.commitments.clone());
                }
                _ => {
                    warn!(
                        member = %self.core.id,
                        accused = %sender_id,
                        "shares failed verification; accusing"
                    );
                    let key_pair = self
                        .ephemeral_key_pairs
                        .get(&sender_id)
                        .ok_or(Error::MissingEphemeralKeyPair(sender_id))?;
                    accused_members_keys.insert(sender_id, key_pair.private_key().clone());
                }
            }
        }

        Ok(SecretSharesAccusationsMessage {
            sender_id: self.core.id,
            accused_members_keys,
        })
    }
}

impl SharesJustifyingMember {
    /// Phase 5: rule on every share accusation and disqualify the lying
    /// side.
    ///
    /// Verdicts depend only on the evidence log and the revealed keys, so
    /// any deterministic enumeration of the accusation set yields the same
    /// disqualifications on every honest member; the parties to a dispute
    /// apply the same public verdict the uninvolved judges reach, which is
    /// what keeps the qualified set identical group-wide.
    ///
    /// # Errors
    ///
    /// - `MissingEvidence` if the log cannot support a verdict.
    pub fn resolve_secret_shares_accusations(
        &mut self,
        messages: &[SecretSharesAccusationsMessage],
    ) -> Result<Vec<MemberId>> {
        let mut disqualified_members = Vec::new();
        for message in messages {
            let accuser_id = message.sender_id;
            for (accused_id, revealed_key) in &message.accused_members_keys {
                let verdict = self.rule_share_dispute(accuser_id, *accused_id, revealed_key)?;
                warn!(
                    judge = %self.core.id,
                    accuser = %accuser_id,
                    accused = %accused_id,
                    disqualified = %verdict,
                    "share dispute resolved"
                );
                if !disqualified_members.contains(&verdict) {
                    disqualified_members.push(verdict);
                }
                self.core.group.disqualify(verdict);
            }
        }
        Ok(disqualified_members)
    }

    /// Judge a single dispute as an uninvolved third party.
    ///
    /// # Errors
    ///
    /// - `SelfInDispute` if this member is the accuser or the accused; the
    ///   accused cannot be a judge in its own case, and the accuser already
    ///   ruled by accusing.
    /// - `MissingEvidence` as for
    ///   [`Self::resolve_secret_shares_accusations`].
    pub fn judge_share_dispute(
        &self,
        accuser_id: MemberId,
        accused_id: MemberId,
        revealed_key: &EphemeralPrivateKey,
    ) -> Result<MemberId> {
        if self.core.id == accuser_id || self.core.id == accused_id {
            return Err(Error::SelfInDispute);
        }
        self.rule_share_dispute(accuser_id, accused_id, revealed_key)
    }

    /// Compute the public verdict on a dispute: accuser `α` revealed its
    /// ephemeral private key for accused `β`. Recover the symmetric channel
    /// key, open the shares `β` sealed for `α` in Phase 3, and re-run the
    /// Phase-4 check. Valid shares convict the accuser; invalid shares
    /// convict the accused.
    ///
    /// A revealed key that does not match the accuser's own Phase-1
    /// broadcast convicts the accuser outright; a sealed payload the
    /// validated channel key cannot open convicts the accused.
    fn rule_share_dispute(
        &self,
        accuser_id: MemberId,
        accused_id: MemberId,
        revealed_key: &EphemeralPrivateKey,
    ) -> Result<MemberId> {
        if !revealed_key_matches_broadcast(
            &self.core.evidence_log,
            accuser_id,
            accused_id,
            revealed_key,
        )? {
            return Ok(accuser_id);
        }

        let symmetric_key = recover_symmetric_key(
            &self.core.evidence_log,
            accused_id,
            accuser_id,
            revealed_key,
        )?;
        let (share_s, share_t) = match recover_shares(
            &self.core.evidence_log,
            accused_id,
            accuser_id,
            &symmetric_key,
        ) {
            Ok(shares) => shares,
            Err(error @ Error::MissingEvidence { .. }) => return Err(error),
            Err(_) => return Ok(accused_id),
        };

        let commitments = if accused_id == self.core.id {
            &self.committed.commitments
        } else {
            self.received_peer_commitments
                .get(&accused_id)
                .ok_or(Error::MissingEvidence {
                    phase: "commitments",
                    member: accused_id,
                })?
        };

        if self
            .core
            .config
            .vss()
            .verify_share(commitments, accuser_id.0, &share_s, &share_t)
        {
            Ok(accuser_id)
        } else {
            Ok(accused_id)
        }
    }
}

impl SharingMember {
    /// Phase 7: publish the public key share points `A_k = G^{a_k} mod P`.
    pub fn calculate_public_key_share_points(&mut self) -> MemberPublicKeySharePointsMessage {
        let arithmetic = self.core.config.group();
        let g = self.core.config.vss().g();
        let points: Vec<BoxedUint> = self
            .committed
            .coefficients_a
            .coefficients()
            .iter()
            .map(|a| arithmetic.exp(g, a))
            .collect();

        self.public_key_share_points = Some(points.clone());
        let message = MemberPublicKeySharePointsMessage {
            sender_id: self.core.id,
            public_key_share_points: points,
        };
        self.core.evidence_log.record_points(&message);
        message
    }

    /// Phase 8: check each qualified sender's points against the share it
    /// sent us, `Π A_jk^(i^k) ≡ G^{s_ji} (mod P)`, and accuse on
    /// failure, revealing our ephemeral private key for that channel.
    ///
    /// # Errors
    ///
    /// - `MissingEphemeralKeyPair` if an accusation cannot reveal its key;
    ///   protocol ordering violation.
    pub fn verify_public_key_share_points(
        &mut self,
        messages: &[MemberPublicKeySharePointsMessage],
    ) -> Result<PointsAccusationsMessage> {
        let mut accused_members_keys = BTreeMap::new();
        for message in messages {
            self.core.evidence_log.record_points(message);

            let sender_id = message.sender_id;
            if sender_id == self.core.id || !self.qualified_members.contains(&sender_id) {
                continue;
            }
            let Some(share_s) = self.received_valid_shares_s.get(&sender_id) else {
                continue;
            };

            self.received_peer_points
                .insert(sender_id, message.public_key_share_points.clone());

            if is_share_valid_against_points(
                &self.core.config,
                self.core.id,
                share_s,
                &message.public_key_share_points,
            ) {
                self.received_valid_peer_points
                    .insert(sender_id, message.public_key_share_points.clone());
            } else {
                warn!(
                    member = %self.core.id,
                    accused = %sender_id,
                    "share points failed verification; accusing"
                );
                let key_pair = self
                    .ephemeral_key_pairs
                    .get(&sender_id)
                    .ok_or(Error::MissingEphemeralKeyPair(sender_id))?;
                accused_members_keys.insert(sender_id, key_pair.private_key().clone());
            }
        }

        Ok(PointsAccusationsMessage {
            sender_id: self.core.id,
            accused_members_keys,
        })
    }
}

impl PointsJustifyingMember {
    /// Phase 9: rule on every points accusation, symmetrically to Phase 5
    /// with the point-validity check in place of the commitment check.
    ///
    /// # Errors
    ///
    /// - `MissingEvidence` as in Phase 5.
    pub fn resolve_public_key_share_points_accusations(
        &mut self,
        messages: &[PointsAccusationsMessage],
    ) -> Result<Vec<MemberId>> {
        let mut disqualified_members = Vec::new();
        for message in messages {
            let accuser_id = message.sender_id;
            for (accused_id, revealed_key) in &message.accused_members_keys {
                let verdict = self.rule_points_dispute(accuser_id, *accused_id, revealed_key)?;
                warn!(
                    judge = %self.core.id,
                    accuser = %accuser_id,
                    accused = %accused_id,
                    disqualified = %verdict,
                    "points dispute resolved"
                );
                if !disqualified_members.contains(&verdict) {
                    disqualified_members.push(verdict);
                }
                self.core.group.disqualify(verdict);
            }
        }
        Ok(disqualified_members)
    }

    /// Judge a single points dispute as an uninvolved third party.
    ///
    /// # Errors
    ///
    /// - `SelfInDispute` if this member is the accuser or the accused.
    /// - `MissingEvidence` as in Phase 5.
    pub fn judge_points_dispute(
        &self,
        accuser_id: MemberId,
        accused_id: MemberId,
        revealed_key: &EphemeralPrivateKey,
    ) -> Result<MemberId> {
        if self.core.id == accuser_id || self.core.id == accused_id {
            return Err(Error::SelfInDispute);
        }
        self.rule_points_dispute(accuser_id, accused_id, revealed_key)
    }

    /// Compute the public verdict on a points dispute. Only the `s` share
    /// is needed.
    fn rule_points_dispute(
        &self,
        accuser_id: MemberId,
        accused_id: MemberId,
        revealed_key: &EphemeralPrivateKey,
    ) -> Result<MemberId> {
        if !revealed_key_matches_broadcast(
            &self.core.evidence_log,
            accuser_id,
            accused_id,
            revealed_key,
        )? {
            return Ok(accuser_id);
        }

        let symmetric_key = recover_symmetric_key(
            &self.core.evidence_log,
            accused_id,
            accuser_id,
            revealed_key,
        )?;
        let (share_s, _share_t) = match recover_shares(
            &self.core.evidence_log,
            accused_id,
            accuser_id,
            &symmetric_key,
        ) {
            Ok(shares) => shares,
            Err(error @ Error::MissingEvidence { .. }) => return Err(error),
            Err(_) => return Ok(accused_id),
        };

        let points = if accused_id == self.core.id {
            &self.public_key_share_points
        } else {
            self.received_peer_points
                .get(&accused_id)
                .ok_or(Error::MissingEvidence {
                    phase: "share points",
                    member: accused_id,
                })?
        };

        if is_share_valid_against_points(&self.core.config, accuser_id, &share_s, points) {
            Ok(accuser_id)
        } else {
            Ok(accused_id)
        }
    }
}

impl RevealingMember {
    /// Phase 10: expose the shares received from every misbehaving
    /// qualified member, so the group can reconstruct their contributions.
    pub fn reveal_misbehaved_members_shares(&self) -> crate::dkg::messages::RevealedDisqualifiedSharesMessage {
        let mut shares = BTreeMap::new();
        for member_id in self.misbehaved_members() {
            if let Some(share_s) = self.received_valid_shares_s.get(&member_id) {
                shares.insert(member_id, share_s.clone());
            }
        }
        crate::dkg::messages::RevealedDisqualifiedSharesMessage {
            sender_id: self.core.id,
            shares,
        }
    }
}

impl ReconstructingMember {
    /// Phase 11: reconstruct each misbehaving member's individual private
    /// key `z_m = Σ_k s_mk · λ_k mod Q` by Lagrange interpolation over
    /// exactly the peers present in the reveal set.
    ///
    /// # Errors
    ///
    /// - `InsufficientRevealedShares` when a reveal set cannot meet the
    ///   `t + 1` reconstruction threshold; proceeding would yield a wrong
    ///   key, so the run fails loudly instead.
    pub fn reconstruct_individual_private_keys(
        &mut self,
        revealed_disqualified_shares: &[DisqualifiedShares],
    ) -> Result<()> {
        let threshold = self.core.group.dishonest_threshold();
        let arithmetic = self.core.config.group();

        for disqualified_shares in revealed_disqualified_shares {
            let member_id = disqualified_shares.disqualified_member_id;
            let peer_ids: Vec<MemberId> =
                disqualified_shares.peer_shares_s.keys().copied().collect();
            if peer_ids.len() <= threshold {
                return Err(Error::InsufficientRevealedShares {
                    member: member_id,
                    required: threshold + 1,
                    revealed: peer_ids.len(),
                });
            }

            let mut individual_private_key = BoxedUint::zero_with_precision(64);
            for (peer_id, peer_share_s) in &disqualified_shares.peer_shares_s {
                let lagrange = lagrange_coefficient(arithmetic, *peer_id, &peer_ids);
                individual_private_key = arithmetic.add_scalars(
                    &individual_private_key,
                    &arithmetic.mul_scalars(peer_share_s, &lagrange),
                );
            }

            debug!(member = %self.core.id, reconstructed = %member_id, "individual key reconstructed");
            self.reconstructed_individual_private_keys
                .insert(member_id, individual_private_key);
        }
        Ok(())
    }

    /// Phase 11, second half: `y_m = G^{z_m} mod P` for every reconstructed
    /// private key.
    pub fn reconstruct_individual_public_keys(&mut self) {
        let arithmetic = self.core.config.group();
        let g = self.core.config.vss().g();
        for (member_id, private_key) in &self.reconstructed_individual_private_keys {
            self.reconstructed_individual_public_keys
                .insert(*member_id, arithmetic.exp(g, private_key));
        }
    }
}

impl CombiningMember {
    /// Phase 12: combine the group public key
    /// `Y = A_i0 · Π A_j0 · Π y_m (mod P)` over own, eligible qualified
    /// peers' and reconstructed individual public keys. The group is
    /// abelian, so any multiplication order produces the same `Y`.
    pub fn combine_group_public_key(&mut self) {
        let arithmetic = self.core.config.group();
        let mut group_public_key = self.public_key_share_points[0].clone();

        for member_id in &self.qualified_members {
            if *member_id == self.core.id || !self.core.group.is_eligible(*member_id) {
                continue;
            }
            if let Some(points) = self.received_valid_peer_points.get(member_id) {
                if let Some(individual_public_key) = points.first() {
                    group_public_key = arithmetic.mul(&group_public_key, individual_public_key);
                }
            }
        }

        for individual_public_key in self.reconstructed_individual_public_keys.values() {
            group_public_key = arithmetic.mul(&group_public_key, individual_public_key);
        }

        self.group_public_key = Some(group_public_key);
    }

    /// Terminate, handing off the result the signing subsystem consumes.
    ///
    /// # Errors
    ///
    /// - `PhaseOrdering` if the group public key was never combined. No
    ///   partial result is ever emitted.
    pub fn finalize(self) -> Result<DkgResult> {
        let group_public_key = self.group_public_key.ok_or(Error::PhaseOrdering(
            "group public key must be combined before finalization",
        ))?;
        debug!(member = %self.core.id, "dkg terminated");
        Ok(DkgResult::new(
            self.core.id,
            group_public_key,
            self.master_private_key_share,
            self.qualified_members,
            &self.core.group,
        ))
    }
}

/// Whether a revealed private key matches the public half the accuser
/// broadcast for the accused's channel in Phase 1.
fn revealed_key_matches_broadcast(
    evidence_log: &EvidenceLog,
    accuser_id: MemberId,
    accused_id: MemberId,
    revealed_key: &EphemeralPrivateKey,
) -> Result<bool> {
    let message =
        evidence_log
            .ephemeral_message(accuser_id)
            .ok_or(Error::MissingEvidence {
                phase: "ephemeral public key",
                member: accuser_id,
            })?;
    Ok(message
        .ephemeral_public_keys
        .get(&accused_id)
        .map(|published| revealed_key.public_key() == *published)
        .unwrap_or(false))
}

/// Recover the symmetric key between `sender` and `receiver` from the
/// receiver's revealed private key and the sender's Phase-1 broadcast.
fn recover_symmetric_key(
    evidence_log: &EvidenceLog,
    sender_id: MemberId,
    receiver_id: MemberId,
    receiver_private_key: &EphemeralPrivateKey,
) -> Result<SymmetricKey> {
    let message = evidence_log
        .ephemeral_message(sender_id)
        .ok_or(Error::MissingEvidence {
            phase: "ephemeral public key",
            member: sender_id,
        })?;
    let sender_public_key = message
        .ephemeral_public_keys
        .get(&receiver_id)
        .ok_or(Error::MissingEvidence {
            phase: "ephemeral public key",
            member: sender_id,
        })?;
    Ok(receiver_private_key.ecdh(sender_public_key))
}

/// Recover the shares `sender` sealed for `receiver` in Phase 3.
fn recover_shares(
    evidence_log: &EvidenceLog,
    sender_id: MemberId,
    receiver_id: MemberId,
    symmetric_key: &SymmetricKey,
) -> Result<(BoxedUint, BoxedUint)> {
    let message = evidence_log
        .shares_message(sender_id)
        .ok_or(Error::MissingEvidence {
            phase: "peer shares",
            member: sender_id,
        })?;
    message.decrypt_shares(receiver_id, symmetric_key)
}

/// Whether a share is consistent with the sender's published share
/// points: `Π A_jk^(i^k) ≡ G^{s_ji} (mod P)`.
/// the sender's published share points.
fn is_share_valid_against_points(
    config: &ProtocolConfig,
    member_id: MemberId,
    share_s: &BoxedUint,
    points: &[BoxedUint],
) -> bool {
    let arithmetic = config.group();
    let mut product = arithmetic.one();
    for (k, point) in points.iter().enumerate() {
        product = arithmetic.mul(&product, &arithmetic.exp(point, &index_pow(member_id.0, k)));
    }
    arithmetic.exp(config.vss().g(), share_s) == product
}

/// Lagrange coefficient `λ_k = Π_l l · (l − k)^{-1} mod Q` over the peer
/// IDs present in a reveal set. Differences wrap mod `Q` before inversion.
pub(crate) fn lagrange_coefficient(
    arithmetic: &SchnorrGroup,
    member_id: MemberId,
    peer_ids: &[MemberId],
) -> BoxedUint {
    let member_scalar = BoxedUint::from(u64::from(member_id.0));
    let mut coefficient = arithmetic.one();

    for other_id in peer_ids {
        if *other_id == member_id {
            continue;
        }
        let other_scalar = BoxedUint::from(u64::from(other_id.0));
        let difference = arithmetic.sub_scalars(&other_scalar, &member_scalar);
        let inverse = arithmetic
            .invert_scalar(&difference)
            .expect("distinct member indices are invertible mod Q");
        coefficient = arithmetic.mul_scalars(
            &coefficient,
            &arithmetic.mul_scalars(&other_scalar, &inverse),
        );
    }

    coefficient
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptography::testing;
    use rand::rngs::OsRng;

    #[test]
    fn test_lagrange_interpolation_recovers_constant_term() {
        let arithmetic = testing::small_group();
        let mut rng = OsRng;
        let polynomial = Polynomial::generate(2, &arithmetic, &mut rng);

        let peer_ids: Vec<MemberId> = [2u32, 4, 5, 7].iter().copied().map(MemberId).collect();
        let mut interpolated = BoxedUint::zero_with_precision(64);
        for peer_id in &peer_ids {
            let share = polynomial.evaluate_at(peer_id.0, &arithmetic);
            let lagrange = lagrange_coefficient(&arithmetic, *peer_id, &peer_ids);
            interpolated = arithmetic
                .add_scalars(&interpolated, &arithmetic.mul_scalars(&share, &lagrange));
        }

        assert_eq!(
            interpolated,
            arithmetic.reduce_scalar(polynomial.constant_term())
        );
    }

    #[test]
    fn test_share_validates_against_honest_points() {
        let config = crate::dkg::config::ProtocolConfig::new(testing::small_pedersen()).unwrap();
        let arithmetic = config.group();
        let mut rng = OsRng;
        let polynomial = Polynomial::generate(2, arithmetic, &mut rng);

        let points: Vec<BoxedUint> = polynomial
            .coefficients()
            .iter()
            .map(|a| arithmetic.exp(config.vss().g(), a))
            .collect();

        let member_id = MemberId(3);
        let share = polynomial.evaluate_at(member_id.0, arithmetic);
        assert!(is_share_valid_against_points(&config, member_id, &share, &points));

        let tampered = arithmetic.add_scalars(&share, &arithmetic.one());
        assert!(!is_share_valid_against_points(&config, member_id, &tampered, &points));
    }
}
