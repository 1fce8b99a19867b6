// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Terminal protocol output
//!
//! Either Phase 12 completes and produces a [`DkgResult`], or the local
//! member terminates without a group key; no partial result exists. The
//! result is the handoff boundary to the threshold-signing subsystem, which
//! consumes the group public key bytes and this member's secret share.

use std::collections::BTreeSet;

use crypto_bigint::BoxedUint;
use cryptography::utils::serialization::to_be_bytes_minimal;

use crate::dkg::group::Group;
use crate::dkg::member::MemberId;

/**
 * The terminal output of one member's DKG run.
 *
 * Every honest member of the same run terminates with the same group public
 * key and the same membership verdicts; only the secret share differs.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DkgResult {
    member_id: MemberId,
    group_public_key: BoxedUint,
    secret_key_share: BoxedUint,
    qualified_members: Vec<MemberId>,
    disqualified_members: BTreeSet<MemberId>,
    inactive_members: BTreeSet<MemberId>,
}

impl DkgResult {
    pub(crate) fn new(
        member_id: MemberId,
        group_public_key: BoxedUint,
        secret_key_share: BoxedUint,
        qualified_members: Vec<MemberId>,
        group: &Group,
    ) -> Self {
        Self {
            member_id,
            group_public_key,
            secret_key_share,
            qualified_members,
            disqualified_members: group.disqualified_members().clone(),
            inactive_members: group.inactive_members().clone(),
        }
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    /// The group public key `Y = G^x mod P`.
    pub fn group_public_key(&self) -> &BoxedUint {
        &self.group_public_key
    }

    /// Canonical minimum-length big-endian encoding of `Y`.
    pub fn group_public_key_bytes(&self) -> Vec<u8> {
        to_be_bytes_minimal(&self.group_public_key)
    }

    /// This member's share `x_i` of the group private key.
    pub fn secret_key_share(&self) -> &BoxedUint {
        &self.secret_key_share
    }

    /// Members whose contributions entered the group key.
    pub fn qualified_members(&self) -> &[MemberId] {
        &self.qualified_members
    }

    pub fn disqualified_members(&self) -> &BTreeSet<MemberId> {
        &self.disqualified_members
    }

    pub fn inactive_members(&self) -> &BTreeSet<MemberId> {
        &self.inactive_members
    }

    /// Hand off to the signing subsystem.
    pub fn into_signer(self) -> ThresholdSigner {
        ThresholdSigner {
            member_id: self.member_id,
            group_public_key: self.group_public_key,
            secret_key_share: self.secret_key_share,
        }
    }
}

/**
 * The credentials the threshold-signing subsystem needs from a completed
 * DKG: the member identity, the group public key and this member's secret
 * share.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThresholdSigner {
    member_id: MemberId,
    group_public_key: BoxedUint,
    secret_key_share: BoxedUint,
}

impl ThresholdSigner {
    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn group_public_key(&self) -> &BoxedUint {
        &self.group_public_key
    }

    /// Canonical minimum-length big-endian encoding of the group public
    /// key.
    pub fn group_public_key_bytes(&self) -> Vec<u8> {
        to_be_bytes_minimal(&self.group_public_key)
    }

    /// The secret share used to compute signature shares. Never broadcast.
    pub fn secret_key_share(&self) -> &BoxedUint {
        &self.secret_key_share
    }
}
