// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Member role types
//!
//! A member's role evolves as protocol state accumulates: ephemeral keys,
//! then symmetric channels, then committed shares, and so on until the
//! group public key is combined. Each role is its own type carrying exactly
//! the state its phase needs, and roles convert linearly: a phase operation
//! simply does not exist on a type that has not earned it, so the share
//! points of Phase 7 cannot be published before Phase 6 produced `x_i`.
//!
//! Phase operations themselves live in [`phases`][`crate::dkg::phases`].

use std::collections::BTreeMap;
use std::fmt;

use crypto_bigint::BoxedUint;
use cryptography::ephemeral::{EphemeralKeyPair, SymmetricKey};
use cryptography::polynomial::Polynomial;
use serde::{Deserialize, Serialize};

use crate::dkg::config::ProtocolConfig;
use crate::dkg::evidence::EvidenceLog;
use crate::dkg::group::Group;
use crate::error::{Error, Result};

/**
 * A group member's identifier: a positive integer, unique within the group
 * and stable across all twelve phases. Doubles as the evaluation point of
 * the sharing polynomials.
 */
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MemberId(pub u32);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State shared by every member role: identity, group bookkeeping, the run
/// configuration and the evidence log.
#[derive(Clone, Debug)]
pub(crate) struct MemberCore {
    pub(crate) id: MemberId,
    pub(crate) group: Group,
    pub(crate) config: ProtocolConfig,
    pub(crate) evidence_log: EvidenceLog,
}

/// The secrets a member commits to in Phase 3.
#[derive(Clone, Debug)]
pub(crate) struct CommittedSecrets {
    /// Coefficients of `f_a`; `a_0` is this member's contribution `z_i`.
    pub(crate) coefficients_a: Polynomial,
    /// Coefficients of the hiding polynomial `f_b`.
    pub(crate) coefficients_b: Polynomial,
    /// `f_a(self)`, kept in the clear.
    pub(crate) self_share_s: BoxedUint,
    /// `f_b(self)`, kept in the clear.
    pub(crate) self_share_t: BoxedUint,
    /// `C_k = G^{a_k} · H^{b_k} mod P`.
    pub(crate) commitments: Vec<BoxedUint>,
}

// --- Phase 1 ---

/// A member generating ephemeral keypairs for each other group member.
#[derive(Clone)]
pub struct EphemeralKeyPairGeneratingMember {
    pub(crate) core: MemberCore,
    pub(crate) ephemeral_key_pairs: BTreeMap<MemberId, EphemeralKeyPair>,
}

impl EphemeralKeyPairGeneratingMember {
    /// Enter the protocol as the given member of the declared group.
    ///
    /// # Errors
    ///
    /// - `ConfigInvalid` if the member list does not validate or does not
    ///   contain this member.
    pub fn new(
        id: MemberId,
        dishonest_threshold: usize,
        member_ids: Vec<MemberId>,
        config: ProtocolConfig,
    ) -> Result<Self> {
        let group = Group::new(dishonest_threshold, member_ids)?;
        if !group.contains(id) {
            return Err(Error::ConfigInvalid(format!(
                "member {id} is not part of the declared group"
            )));
        }
        Ok(Self {
            core: MemberCore {
                id,
                group,
                config,
                evidence_log: EvidenceLog::new(),
            },
            ephemeral_key_pairs: BTreeMap::new(),
        })
    }

    pub fn into_symmetric_key_generating(self) -> SymmetricKeyGeneratingMember {
        SymmetricKeyGeneratingMember {
            core: self.core,
            ephemeral_key_pairs: self.ephemeral_key_pairs,
            symmetric_keys: BTreeMap::new(),
        }
    }
}

// --- Phase 2 ---

/// A member deriving symmetric channel keys via ECDH.
#[derive(Clone)]
pub struct SymmetricKeyGeneratingMember {
    pub(crate) core: MemberCore,
    pub(crate) ephemeral_key_pairs: BTreeMap<MemberId, EphemeralKeyPair>,
    pub(crate) symmetric_keys: BTreeMap<MemberId, SymmetricKey>,
}

impl SymmetricKeyGeneratingMember {
    pub fn into_committing(self) -> CommittingMember {
        CommittingMember {
            core: self.core,
            ephemeral_key_pairs: self.ephemeral_key_pairs,
            symmetric_keys: self.symmetric_keys,
            committed: None,
        }
    }
}

// --- Phase 3 ---

/// A member drawing its sharing polynomials and committing to them.
#[derive(Clone)]
pub struct CommittingMember {
    pub(crate) core: MemberCore,
    pub(crate) ephemeral_key_pairs: BTreeMap<MemberId, EphemeralKeyPair>,
    pub(crate) symmetric_keys: BTreeMap<MemberId, SymmetricKey>,
    pub(crate) committed: Option<CommittedSecrets>,
}

impl CommittingMember {
    /// # Errors
    ///
    /// - `PhaseOrdering` if shares and commitments were never calculated.
    pub fn into_commitments_verifying(self) -> Result<CommitmentsVerifyingMember> {
        let committed = self.committed.ok_or(Error::PhaseOrdering(
            "shares and commitments must be calculated before verification",
        ))?;
        Ok(CommitmentsVerifyingMember {
            core: self.core,
            ephemeral_key_pairs: self.ephemeral_key_pairs,
            symmetric_keys: self.symmetric_keys,
            committed,
            received_valid_shares_s: BTreeMap::new(),
            received_valid_shares_t: BTreeMap::new(),
            received_peer_commitments: BTreeMap::new(),
            received_valid_peer_commitments: BTreeMap::new(),
        })
    }
}

// --- Phase 4 ---

/// A member verifying received shares against received commitments.
#[derive(Clone)]
pub struct CommitmentsVerifyingMember {
    pub(crate) core: MemberCore,
    pub(crate) ephemeral_key_pairs: BTreeMap<MemberId, EphemeralKeyPair>,
    pub(crate) symmetric_keys: BTreeMap<MemberId, SymmetricKey>,
    pub(crate) committed: CommittedSecrets,
    /// `s_ji` that verified, keyed by sender `j`.
    pub(crate) received_valid_shares_s: BTreeMap<MemberId, BoxedUint>,
    /// `t_ji` that verified, keyed by sender `j`.
    pub(crate) received_valid_shares_t: BTreeMap<MemberId, BoxedUint>,
    /// Every paired sender's commitments, verdict notwithstanding; dispute
    /// judging must see what the wire carried.
    pub(crate) received_peer_commitments: BTreeMap<MemberId, Vec<BoxedUint>>,
    /// Commitments whose shares verified.
    pub(crate) received_valid_peer_commitments: BTreeMap<MemberId, Vec<BoxedUint>>,
}

impl CommitmentsVerifyingMember {
    pub fn into_shares_justifying(self) -> SharesJustifyingMember {
        SharesJustifyingMember {
            core: self.core,
            ephemeral_key_pairs: self.ephemeral_key_pairs,
            symmetric_keys: self.symmetric_keys,
            committed: self.committed,
            received_valid_shares_s: self.received_valid_shares_s,
            received_valid_shares_t: self.received_valid_shares_t,
            received_peer_commitments: self.received_peer_commitments,
            received_valid_peer_commitments: self.received_valid_peer_commitments,
        }
    }
}

// --- Phase 5 ---

/// A member judging share accusations it is not a party to.
#[derive(Clone)]
pub struct SharesJustifyingMember {
    pub(crate) core: MemberCore,
    pub(crate) ephemeral_key_pairs: BTreeMap<MemberId, EphemeralKeyPair>,
    pub(crate) symmetric_keys: BTreeMap<MemberId, SymmetricKey>,
    pub(crate) committed: CommittedSecrets,
    pub(crate) received_valid_shares_s: BTreeMap<MemberId, BoxedUint>,
    pub(crate) received_valid_shares_t: BTreeMap<MemberId, BoxedUint>,
    pub(crate) received_peer_commitments: BTreeMap<MemberId, Vec<BoxedUint>>,
    pub(crate) received_valid_peer_commitments: BTreeMap<MemberId, Vec<BoxedUint>>,
}

impl SharesJustifyingMember {
    pub fn into_qualified(self) -> QualifiedMember {
        QualifiedMember {
            core: self.core,
            ephemeral_key_pairs: self.ephemeral_key_pairs,
            committed: self.committed,
            received_valid_shares_s: self.received_valid_shares_s,
            received_valid_shares_t: self.received_valid_shares_t,
        }
    }
}

// --- Phase 6 ---

/// A member that survived the share accusations and may combine its master
/// private key share.
#[derive(Clone)]
pub struct QualifiedMember {
    pub(crate) core: MemberCore,
    pub(crate) ephemeral_key_pairs: BTreeMap<MemberId, EphemeralKeyPair>,
    pub(crate) committed: CommittedSecrets,
    pub(crate) received_valid_shares_s: BTreeMap<MemberId, BoxedUint>,
    pub(crate) received_valid_shares_t: BTreeMap<MemberId, BoxedUint>,
}

impl QualifiedMember {
    /// Combine shares into the master private key share:
    /// `x_i = s_ii + Σ_j s_ji mod Q` and `x'_i = t_ii + Σ_j t_ji mod Q`,
    /// summed over the eligible contributors. The contributor set is frozen
    /// here as the qualified set the rest of the protocol works against.
    ///
    /// The sums run over a `BTreeMap`, so the result is independent of
    /// message arrival order.
    pub fn combine_member_shares(self) -> SharingMember {
        let arithmetic = self.core.config.group();
        let mut combined_s = arithmetic.reduce_scalar(&self.committed.self_share_s);
        let mut combined_t = arithmetic.reduce_scalar(&self.committed.self_share_t);
        let mut qualified_members = vec![self.core.id];

        for (sender_id, share) in &self.received_valid_shares_s {
            if self.core.group.is_eligible(*sender_id) {
                qualified_members.push(*sender_id);
                combined_s = arithmetic.add_scalars(&combined_s, share);
            }
        }
        for (sender_id, share) in &self.received_valid_shares_t {
            if self.core.group.is_eligible(*sender_id) {
                combined_t = arithmetic.add_scalars(&combined_t, share);
            }
        }
        qualified_members.sort_unstable();

        SharingMember {
            core: self.core,
            ephemeral_key_pairs: self.ephemeral_key_pairs,
            committed: self.committed,
            received_valid_shares_s: self.received_valid_shares_s,
            master_private_key_share: combined_s,
            share_t: combined_t,
            qualified_members,
            public_key_share_points: None,
            received_peer_points: BTreeMap::new(),
            received_valid_peer_points: BTreeMap::new(),
        }
    }
}

// --- Phases 7 and 8 ---

/// A member publishing and verifying public key share points.
#[derive(Clone)]
pub struct SharingMember {
    pub(crate) core: MemberCore,
    pub(crate) ephemeral_key_pairs: BTreeMap<MemberId, EphemeralKeyPair>,
    pub(crate) committed: CommittedSecrets,
    pub(crate) received_valid_shares_s: BTreeMap<MemberId, BoxedUint>,
    /// `x_i`, this member's share of the group private key.
    pub(crate) master_private_key_share: BoxedUint,
    /// `x'_i`, the matching share of the hiding polynomial sum.
    pub(crate) share_t: BoxedUint,
    /// Members whose contributions entered `x_i`, the local member included.
    pub(crate) qualified_members: Vec<MemberId>,
    /// `A_k = G^{a_k} mod P`, once calculated.
    pub(crate) public_key_share_points: Option<Vec<BoxedUint>>,
    /// Every qualified sender's points, verdict notwithstanding.
    pub(crate) received_peer_points: BTreeMap<MemberId, Vec<BoxedUint>>,
    /// Points that verified against the sender's share.
    pub(crate) received_valid_peer_points: BTreeMap<MemberId, Vec<BoxedUint>>,
}

impl SharingMember {
    /// This member's share of the group private key, available once
    /// Phase 6 combined it.
    pub fn master_private_key_share(&self) -> &BoxedUint {
        &self.master_private_key_share
    }

    /// # Errors
    ///
    /// - `PhaseOrdering` if share points were never calculated.
    pub fn into_points_justifying(self) -> Result<PointsJustifyingMember> {
        let public_key_share_points = self.public_key_share_points.ok_or(
            Error::PhaseOrdering("share points must be calculated before justification"),
        )?;
        Ok(PointsJustifyingMember {
            core: self.core,
            received_valid_shares_s: self.received_valid_shares_s,
            master_private_key_share: self.master_private_key_share,
            qualified_members: self.qualified_members,
            public_key_share_points,
            received_peer_points: self.received_peer_points,
            received_valid_peer_points: self.received_valid_peer_points,
        })
    }
}

// --- Phase 9 ---

/// A member judging share-point accusations it is not a party to.
#[derive(Clone)]
pub struct PointsJustifyingMember {
    pub(crate) core: MemberCore,
    pub(crate) received_valid_shares_s: BTreeMap<MemberId, BoxedUint>,
    pub(crate) master_private_key_share: BoxedUint,
    pub(crate) qualified_members: Vec<MemberId>,
    pub(crate) public_key_share_points: Vec<BoxedUint>,
    pub(crate) received_peer_points: BTreeMap<MemberId, Vec<BoxedUint>>,
    pub(crate) received_valid_peer_points: BTreeMap<MemberId, Vec<BoxedUint>>,
}

impl PointsJustifyingMember {
    pub fn into_revealing(self) -> RevealingMember {
        RevealingMember {
            core: self.core,
            received_valid_shares_s: self.received_valid_shares_s,
            master_private_key_share: self.master_private_key_share,
            qualified_members: self.qualified_members,
            public_key_share_points: self.public_key_share_points,
            received_valid_peer_points: self.received_valid_peer_points,
        }
    }
}

// --- Phase 10 ---

/// A member exposing the shares it received from misbehaving qualified
/// members.
#[derive(Clone)]
pub struct RevealingMember {
    pub(crate) core: MemberCore,
    pub(crate) received_valid_shares_s: BTreeMap<MemberId, BoxedUint>,
    pub(crate) master_private_key_share: BoxedUint,
    pub(crate) qualified_members: Vec<MemberId>,
    pub(crate) public_key_share_points: Vec<BoxedUint>,
    pub(crate) received_valid_peer_points: BTreeMap<MemberId, Vec<BoxedUint>>,
}

impl RevealingMember {
    /// Qualified members whose contribution must be reconstructed in the
    /// open: those that lost eligibility after qualification or never
    /// published valid share points.
    pub fn misbehaved_members(&self) -> Vec<MemberId> {
        self.qualified_members
            .iter()
            .copied()
            .filter(|member_id| {
                *member_id != self.core.id
                    && (!self.core.group.is_eligible(*member_id)
                        || !self.received_valid_peer_points.contains_key(member_id))
            })
            .collect()
    }

    pub fn into_reconstructing(self) -> ReconstructingMember {
        ReconstructingMember {
            core: self.core,
            received_valid_shares_s: self.received_valid_shares_s,
            master_private_key_share: self.master_private_key_share,
            qualified_members: self.qualified_members,
            public_key_share_points: self.public_key_share_points,
            received_valid_peer_points: self.received_valid_peer_points,
            reconstructed_individual_private_keys: BTreeMap::new(),
            reconstructed_individual_public_keys: BTreeMap::new(),
        }
    }
}

// --- Phase 11 ---

/// A member reconstructing the individual keys of misbehaving members.
#[derive(Clone)]
pub struct ReconstructingMember {
    pub(crate) core: MemberCore,
    pub(crate) received_valid_shares_s: BTreeMap<MemberId, BoxedUint>,
    pub(crate) master_private_key_share: BoxedUint,
    pub(crate) qualified_members: Vec<MemberId>,
    pub(crate) public_key_share_points: Vec<BoxedUint>,
    pub(crate) received_valid_peer_points: BTreeMap<MemberId, Vec<BoxedUint>>,
    /// `z_m`, keyed by the reconstructed member `m`.
    pub(crate) reconstructed_individual_private_keys: BTreeMap<MemberId, BoxedUint>,
    /// `y_m = G^{z_m} mod P`, keyed by the reconstructed member `m`.
    pub(crate) reconstructed_individual_public_keys: BTreeMap<MemberId, BoxedUint>,
}

impl ReconstructingMember {
    pub fn into_combining(self) -> CombiningMember {
        CombiningMember {
            core: self.core,
            master_private_key_share: self.master_private_key_share,
            qualified_members: self.qualified_members,
            public_key_share_points: self.public_key_share_points,
            received_valid_peer_points: self.received_valid_peer_points,
            reconstructed_individual_public_keys: self.reconstructed_individual_public_keys,
            group_public_key: None,
        }
    }
}

// --- Phase 12 ---

/// A member combining the group public key.
#[derive(Clone)]
pub struct CombiningMember {
    pub(crate) core: MemberCore,
    pub(crate) master_private_key_share: BoxedUint,
    pub(crate) qualified_members: Vec<MemberId>,
    pub(crate) public_key_share_points: Vec<BoxedUint>,
    pub(crate) received_valid_peer_points: BTreeMap<MemberId, Vec<BoxedUint>>,
    pub(crate) reconstructed_individual_public_keys: BTreeMap<MemberId, BoxedUint>,
    pub(crate) group_public_key: Option<BoxedUint>,
}

/// Shares revealed for one misbehaving member `m`: `s_mk` keyed by the peer
/// `k` that received and re-exposed the share.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisqualifiedShares {
    pub disqualified_member_id: MemberId,
    pub peer_shares_s: BTreeMap<MemberId, BoxedUint>,
}

macro_rules! impl_member_accessors {
    ($($member:ty),* $(,)?) => {
        $(
            impl $member {
                /// This member's identifier.
                pub fn member_id(&self) -> MemberId {
                    self.core.id
                }

                /// The group bookkeeping as this member sees it.
                pub fn group(&self) -> &Group {
                    &self.core.group
                }

                /// The evidence log accumulated so far.
                pub fn evidence_log(&self) -> &EvidenceLog {
                    &self.core.evidence_log
                }
            }
        )*
    };
}

impl_member_accessors!(
    EphemeralKeyPairGeneratingMember,
    SymmetricKeyGeneratingMember,
    CommittingMember,
    CommitmentsVerifyingMember,
    SharesJustifyingMember,
    QualifiedMember,
    SharingMember,
    PointsJustifyingMember,
    RevealingMember,
    ReconstructingMember,
    CombiningMember,
);
