// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Protocol member group bookkeeping

use std::collections::BTreeSet;

use crate::dkg::member::MemberId;
use crate::error::{Error, Result};

/**
 * The protocol's member group.
 *
 * Declared up front with the full member list and the dishonest threshold
 * `t`. During execution only the two exclusion sets grow: members caught
 * misbehaving are disqualified, members that miss a broadcast window go
 * inactive. Neither set ever shrinks, and a member in either set no longer
 * counts as eligible.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    /// The number of members in the complete group.
    group_size: usize,
    /// The maximum number of group members who could be dishonest for the
    /// generated key to remain uncompromised.
    dishonest_threshold: usize,
    /// IDs of all members of the group, the local member's included.
    member_ids: Vec<MemberId>,
    /// IDs of members disqualified during protocol execution.
    disqualified_member_ids: BTreeSet<MemberId>,
    /// IDs of members that went inactive during protocol execution.
    inactive_member_ids: BTreeSet<MemberId>,
}

impl Group {
    /// Create a group over the declared member list.
    ///
    /// # Errors
    ///
    /// - `ConfigInvalid` for zero or duplicate IDs, or a threshold the
    ///   group size cannot support.
    pub fn new(dishonest_threshold: usize, member_ids: Vec<MemberId>) -> Result<Self> {
        let group_size = member_ids.len();
        if member_ids.iter().any(|id| id.0 == 0) {
            return Err(Error::ConfigInvalid(
                "member IDs must be positive".to_string(),
            ));
        }
        let unique: BTreeSet<MemberId> = member_ids.iter().copied().collect();
        if unique.len() != group_size {
            return Err(Error::ConfigInvalid(
                "member IDs must be unique".to_string(),
            ));
        }
        if group_size == 0 || dishonest_threshold >= group_size {
            return Err(Error::ConfigInvalid(format!(
                "group of size {group_size} cannot tolerate {dishonest_threshold} dishonest members"
            )));
        }
        Ok(Self {
            group_size,
            dishonest_threshold,
            member_ids,
            disqualified_member_ids: BTreeSet::new(),
            inactive_member_ids: BTreeSet::new(),
        })
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    pub fn dishonest_threshold(&self) -> usize {
        self.dishonest_threshold
    }

    /// IDs of all group members, in declaration order.
    pub fn member_ids(&self) -> &[MemberId] {
        &self.member_ids
    }

    /// IDs of all group members except the given one.
    pub fn other_member_ids(&self, member_id: MemberId) -> Vec<MemberId> {
        self.member_ids
            .iter()
            .copied()
            .filter(|id| *id != member_id)
            .collect()
    }

    pub fn contains(&self, member_id: MemberId) -> bool {
        self.member_ids.contains(&member_id)
    }

    /// Mark a member as disqualified. Monotone: never undone.
    pub fn disqualify(&mut self, member_id: MemberId) {
        if self.contains(member_id) {
            self.disqualified_member_ids.insert(member_id);
        }
    }

    /// Mark a member as inactive. Monotone: never undone, and earlier
    /// contributions of the member stand.
    pub fn mark_inactive(&mut self, member_id: MemberId) {
        if self.contains(member_id) {
            self.inactive_member_ids.insert(member_id);
        }
    }

    /// Members disqualified during protocol execution.
    pub fn disqualified_members(&self) -> &BTreeSet<MemberId> {
        &self.disqualified_member_ids
    }

    /// Members that went inactive during protocol execution.
    pub fn inactive_members(&self) -> &BTreeSet<MemberId> {
        &self.inactive_member_ids
    }

    /// Whether a member is neither disqualified nor inactive.
    pub fn is_eligible(&self, member_id: MemberId) -> bool {
        self.contains(member_id)
            && !self.disqualified_member_ids.contains(&member_id)
            && !self.inactive_member_ids.contains(&member_id)
    }

    /// All currently eligible members, in declaration order.
    pub fn eligible_members(&self) -> Vec<MemberId> {
        self.member_ids
            .iter()
            .copied()
            .filter(|id| self.is_eligible(*id))
            .collect()
    }
}
