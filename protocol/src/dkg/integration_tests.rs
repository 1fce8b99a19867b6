// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! End-to-end protocol scenarios
//!
//! Drives full member sets through the twelve phases at the member API
//! level, with explicit control over message delivery so single members can
//! misbehave: invalid shares, inconsistent share points, false accusations,
//! withheld broadcasts and forged key reveals.

use std::collections::BTreeMap;

use crypto_bigint::BoxedUint;
use cryptography::ephemeral::EphemeralKeyPair;
use cryptography::groups::schnorr::SchnorrGroup;
use cryptography::testing;
use rand::rngs::OsRng;

use crate::dkg::config::ProtocolConfig;
use crate::dkg::member::{
    CommittingMember, DisqualifiedShares, EphemeralKeyPairGeneratingMember, MemberId,
    PointsJustifyingMember, QualifiedMember, RevealingMember, SharesJustifyingMember,
    SharingMember,
};
use crate::dkg::messages::{
    EphemeralPublicKeyMessage, MemberCommitmentsMessage, MemberPublicKeySharePointsMessage,
    PeerSharesMessage, PointsAccusationsMessage, SecretSharesAccusationsMessage,
};
use crate::dkg::phases::lagrange_coefficient;
use crate::dkg::result::DkgResult;
use crate::error::{Error, Result};

fn test_config() -> ProtocolConfig {
    ProtocolConfig::new(testing::small_pedersen()).unwrap()
}

/// Run phases 1 and 2 for a fresh group.
fn start_members(member_count: u32, threshold: usize) -> Vec<CommittingMember> {
    let config = test_config();
    let member_ids: Vec<MemberId> = (1..=member_count).map(MemberId).collect();
    let mut rng = OsRng;

    let mut generating: Vec<EphemeralKeyPairGeneratingMember> = member_ids
        .iter()
        .map(|id| {
            EphemeralKeyPairGeneratingMember::new(*id, threshold, member_ids.clone(), config.clone())
                .unwrap()
        })
        .collect();

    let messages: Vec<EphemeralPublicKeyMessage> = generating
        .iter_mut()
        .map(|member| member.generate_ephemeral_key_pairs(&mut rng).unwrap())
        .collect();

    generating
        .into_iter()
        .map(|member| {
            let mut member = member.into_symmetric_key_generating();
            let inbound: Vec<EphemeralPublicKeyMessage> = messages
                .iter()
                .filter(|m| m.sender_id != member.member_id())
                .cloned()
                .collect();
            member.generate_symmetric_keys(&inbound).unwrap();
            member.into_committing()
        })
        .collect()
}

fn run_phase_3(
    members: &mut [CommittingMember],
) -> (Vec<PeerSharesMessage>, Vec<MemberCommitmentsMessage>) {
    let mut rng = OsRng;
    let mut shares_messages = Vec::new();
    let mut commitments_messages = Vec::new();
    for member in members.iter_mut() {
        let (shares, commitments) = member
            .calculate_members_shares_and_commitments(&mut rng)
            .unwrap();
        shares_messages.push(shares);
        commitments_messages.push(commitments);
    }
    (shares_messages, commitments_messages)
}

/// Each member's secret contribution `z_i`, captured after Phase 3.
fn secret_contributions(members: &[CommittingMember]) -> BTreeMap<MemberId, BoxedUint> {
    members
        .iter()
        .map(|member| {
            (
                member.member_id(),
                member
                    .committed
                    .as_ref()
                    .unwrap()
                    .coefficients_a
                    .constant_term()
                    .clone(),
            )
        })
        .collect()
}

fn run_phase_4(
    members: Vec<CommittingMember>,
    shares_messages: &[PeerSharesMessage],
    commitments_messages: &[MemberCommitmentsMessage],
) -> (Vec<SharesJustifyingMember>, Vec<SecretSharesAccusationsMessage>) {
    let mut justifying = Vec::new();
    let mut accusations = Vec::new();
    for member in members {
        let mut member = member.into_commitments_verifying().unwrap();
        let inbound_shares: Vec<PeerSharesMessage> = shares_messages
            .iter()
            .filter(|m| m.sender_id != member.member_id())
            .cloned()
            .collect();
        let inbound_commitments: Vec<MemberCommitmentsMessage> = commitments_messages
            .iter()
            .filter(|m| m.sender_id != member.member_id())
            .cloned()
            .collect();
        let accusation = member
            .verify_received_shares_and_commitments(&inbound_shares, &inbound_commitments)
            .unwrap();
        accusations.push(accusation);
        justifying.push(member.into_shares_justifying());
    }
    (justifying, accusations)
}

fn run_phase_5(
    members: Vec<SharesJustifyingMember>,
    accusations: &[SecretSharesAccusationsMessage],
) -> Vec<QualifiedMember> {
    let live: Vec<SecretSharesAccusationsMessage> = accusations
        .iter()
        .filter(|m| !m.accused_members_keys.is_empty())
        .cloned()
        .collect();
    members
        .into_iter()
        .map(|mut member| {
            member.resolve_secret_shares_accusations(&live).unwrap();
            member.into_qualified()
        })
        .collect()
}

fn run_phases_6_7(
    members: Vec<QualifiedMember>,
) -> (Vec<SharingMember>, Vec<MemberPublicKeySharePointsMessage>) {
    let mut sharing = Vec::new();
    let mut points_messages = Vec::new();
    for member in members {
        let mut member = member.combine_member_shares();
        points_messages.push(member.calculate_public_key_share_points());
        sharing.push(member);
    }
    (sharing, points_messages)
}

fn run_phase_8(
    members: Vec<SharingMember>,
    points_messages: &[MemberPublicKeySharePointsMessage],
) -> (Vec<PointsJustifyingMember>, Vec<PointsAccusationsMessage>) {
    let mut justifying = Vec::new();
    let mut accusations = Vec::new();
    for member in members {
        let mut member = member;
        let inbound: Vec<MemberPublicKeySharePointsMessage> = points_messages
            .iter()
            .filter(|m| m.sender_id != member.member_id())
            .cloned()
            .collect();
        let accusation = member.verify_public_key_share_points(&inbound).unwrap();
        accusations.push(accusation);
        justifying.push(member.into_points_justifying().unwrap());
    }
    (justifying, accusations)
}

fn run_phase_9(
    members: Vec<PointsJustifyingMember>,
    accusations: &[PointsAccusationsMessage],
) -> Vec<RevealingMember> {
    let live: Vec<PointsAccusationsMessage> = accusations
        .iter()
        .filter(|m| !m.accused_members_keys.is_empty())
        .cloned()
        .collect();
    members
        .into_iter()
        .map(|mut member| {
            member
                .resolve_public_key_share_points_accusations(&live)
                .unwrap();
            member.into_revealing()
        })
        .collect()
}

/// Phases 10 through 12: reveal, reconstruct, combine. Members whose
/// reconstruction cannot reach quorum terminate with an error.
fn run_phases_10_to_12(members: Vec<RevealingMember>) -> Vec<Result<DkgResult>> {
    let reveal_messages: Vec<_> = members
        .iter()
        .map(RevealingMember::reveal_misbehaved_members_shares)
        .collect();

    members
        .into_iter()
        .map(|member| {
            let misbehaved = member.misbehaved_members();
            let mut reveal_sets: BTreeMap<MemberId, BTreeMap<MemberId, BoxedUint>> =
                BTreeMap::new();
            for message in &reveal_messages {
                if message.sender_id != member.member_id()
                    && !member.group().is_eligible(message.sender_id)
                {
                    continue;
                }
                for (disqualified_id, share) in &message.shares {
                    if misbehaved.contains(disqualified_id) {
                        reveal_sets
                            .entry(*disqualified_id)
                            .or_default()
                            .insert(message.sender_id, share.clone());
                    }
                }
            }
            let revealed: Vec<DisqualifiedShares> = misbehaved
                .iter()
                .map(|disqualified_id| DisqualifiedShares {
                    disqualified_member_id: *disqualified_id,
                    peer_shares_s: reveal_sets.remove(disqualified_id).unwrap_or_default(),
                })
                .collect();

            let mut member = member.into_reconstructing();
            member.reconstruct_individual_private_keys(&revealed)?;
            member.reconstruct_individual_public_keys();
            let mut member = member.into_combining();
            member.combine_group_public_key();
            member.finalize()
        })
        .collect()
}

/// Drive phases 4 through 12 with the given Phase-3 broadcasts.
fn run_from_phase_4(
    members: Vec<CommittingMember>,
    shares_messages: &[PeerSharesMessage],
    commitments_messages: &[MemberCommitmentsMessage],
) -> Vec<Result<DkgResult>> {
    let (members, accusations) = run_phase_4(members, shares_messages, commitments_messages);
    let members = run_phase_5(members, &accusations);
    let (members, points_messages) = run_phases_6_7(members);
    let (members, points_accusations) = run_phase_8(members, &points_messages);
    let members = run_phase_9(members, &points_accusations);
    run_phases_10_to_12(members)
}

/// `Π G^{z_j} mod P` over the given contributors.
fn expected_group_key(
    config: &ProtocolConfig,
    contributions: &BTreeMap<MemberId, BoxedUint>,
    contributors: &[u32],
) -> BoxedUint {
    let arithmetic = config.group();
    let g = config.vss().g();
    contributors.iter().fold(arithmetic.one(), |acc, id| {
        let z = contributions.get(&MemberId(*id)).unwrap();
        arithmetic.mul(&acc, &arithmetic.exp(g, z))
    })
}

/// Lagrange-interpolate secret shares at zero.
fn interpolate_at_zero(
    arithmetic: &SchnorrGroup,
    shares: &[(MemberId, BoxedUint)],
) -> BoxedUint {
    let ids: Vec<MemberId> = shares.iter().map(|(id, _)| *id).collect();
    shares
        .iter()
        .fold(BoxedUint::zero_with_precision(64), |acc, (id, share)| {
            let lagrange = lagrange_coefficient(arithmetic, *id, &ids);
            arithmetic.add_scalars(&acc, &arithmetic.mul_scalars(share, &lagrange))
        })
}

#[test]
fn test_happy_path_all_honest() {
    let config = test_config();
    let mut members = start_members(5, 2);
    let (shares_messages, commitments_messages) = run_phase_3(&mut members);
    let contributions = secret_contributions(&members);

    let results: Vec<DkgResult> =
        run_from_phase_4(members, &shares_messages, &commitments_messages)
            .into_iter()
            .map(Result::unwrap)
            .collect();

    let expected = expected_group_key(&config, &contributions, &[1, 2, 3, 4, 5]);
    for result in &results {
        assert_eq!(result.group_public_key(), &expected);
        assert!(result.disqualified_members().is_empty());
        assert!(result.inactive_members().is_empty());
        assert_eq!(result.qualified_members().len(), 5);
    }

    // any t + 1 shares interpolate to the same secret x with G^x = Y
    let arithmetic = config.group();
    for subset in [[1u32, 2, 3], [2, 4, 5], [1, 3, 5]] {
        let shares: Vec<(MemberId, BoxedUint)> = subset
            .iter()
            .map(|id| {
                let result = &results[(*id - 1) as usize];
                (result.member_id(), result.secret_key_share().clone())
            })
            .collect();
        let secret = interpolate_at_zero(arithmetic, &shares);
        assert_eq!(arithmetic.exp(config.vss().g(), &secret), expected);
    }
}

#[test]
fn test_invalid_shares_disqualify_the_sender() {
    let config = test_config();
    let mut members = start_members(5, 2);
    let (mut shares_messages, commitments_messages) = run_phase_3(&mut members);
    let contributions = secret_contributions(&members);

    // member 3 sends member 1 a properly sealed but wrong share
    let channel_key = members[2]
        .symmetric_keys
        .get(&MemberId(1))
        .unwrap()
        .clone();
    let (share_s, share_t) = shares_messages[2]
        .decrypt_shares(MemberId(1), &channel_key)
        .unwrap();
    let bad_share = config.group().add_scalars(&share_s, &config.group().one());
    shares_messages[2]
        .add_shares(MemberId(1), &bad_share, &share_t, &channel_key, &mut OsRng)
        .unwrap();

    let results = run_from_phase_4(members, &shares_messages, &commitments_messages);

    let expected = expected_group_key(&config, &contributions, &[1, 2, 4, 5]);
    for index in [0usize, 1, 3, 4] {
        let result = results[index].as_ref().unwrap();
        assert_eq!(result.group_public_key(), &expected);
        assert_eq!(
            result.disqualified_members().iter().copied().collect::<Vec<_>>(),
            vec![MemberId(3)]
        );
        assert!(!result.qualified_members().contains(&MemberId(3)));
    }
    // the cheater's own evidence log holds its original honest broadcast,
    // so its local run diverges; the honest majority's key stands
    let cheater = results[2].as_ref().unwrap();
    assert_ne!(cheater.group_public_key(), &expected);
}

#[test]
fn test_inconsistent_points_are_reconstructed() {
    let config = test_config();
    let mut members = start_members(5, 2);
    let (shares_messages, commitments_messages) = run_phase_3(&mut members);
    let contributions = secret_contributions(&members);

    let (members, accusations) = run_phase_4(members, &shares_messages, &commitments_messages);
    assert!(accusations.iter().all(|m| m.accused_members_keys.is_empty()));
    let members = run_phase_5(members, &accusations);
    let (members, mut points_messages) = run_phases_6_7(members);

    // member 2 publishes A_2[0] scaled by G: shares stay valid, points lie
    let arithmetic = config.group();
    points_messages[1].public_key_share_points[0] = arithmetic.mul(
        &points_messages[1].public_key_share_points[0],
        config.vss().g(),
    );

    let (members, points_accusations) = run_phase_8(members, &points_messages);
    let accusers: Vec<MemberId> = points_accusations
        .iter()
        .filter(|m| m.accused_members_keys.contains_key(&MemberId(2)))
        .map(|m| m.sender_id)
        .collect();
    assert_eq!(accusers.len(), 4);

    let members = run_phase_9(members, &points_accusations);
    let results = run_phases_10_to_12(members);

    // the true z_2 enters Y through reconstruction
    let expected = expected_group_key(&config, &contributions, &[1, 2, 3, 4, 5]);
    for index in [0usize, 2, 3, 4] {
        let result = results[index].as_ref().unwrap();
        assert_eq!(result.group_public_key(), &expected);
        assert_eq!(
            result.disqualified_members().iter().copied().collect::<Vec<_>>(),
            vec![MemberId(2)]
        );
        assert!(result.qualified_members().contains(&MemberId(2)));
    }
    assert!(results[1].is_err());
}

#[test]
fn test_false_accusation_disqualifies_the_accuser() {
    let config = test_config();
    let mut members = start_members(4, 1);
    let (shares_messages, commitments_messages) = run_phase_3(&mut members);
    let contributions = secret_contributions(&members);

    let (members, mut accusations) =
        run_phase_4(members, &shares_messages, &commitments_messages);
    assert!(accusations.iter().all(|m| m.accused_members_keys.is_empty()));

    // member 1 falsely accuses member 2, revealing its genuine channel key
    let revealed = members[0]
        .ephemeral_key_pairs
        .get(&MemberId(2))
        .unwrap()
        .private_key()
        .clone();
    accusations[0]
        .accused_members_keys
        .insert(MemberId(2), revealed);

    let members = run_phase_5(members, &accusations);
    let (members, points_messages) = run_phases_6_7(members);
    let (members, points_accusations) = run_phase_8(members, &points_messages);
    let members = run_phase_9(members, &points_accusations);
    let results = run_phases_10_to_12(members);

    let expected = expected_group_key(&config, &contributions, &[2, 3, 4]);
    for index in [1usize, 2, 3] {
        let result = results[index].as_ref().unwrap();
        assert_eq!(result.group_public_key(), &expected);
        assert_eq!(
            result.disqualified_members().iter().copied().collect::<Vec<_>>(),
            vec![MemberId(1)]
        );
        assert_eq!(
            result.qualified_members(),
            &[MemberId(2), MemberId(3), MemberId(4)]
        );
    }
}

#[test]
fn test_forged_key_reveal_disqualifies_the_accuser() {
    let mut members = start_members(4, 1);
    let (shares_messages, commitments_messages) = run_phase_3(&mut members);
    let contributions = secret_contributions(&members);
    let config = test_config();

    let (members, mut accusations) =
        run_phase_4(members, &shares_messages, &commitments_messages);

    // member 1 accuses member 2 with a key that never matched its Phase-1
    // broadcast
    let forged = EphemeralKeyPair::generate(&mut OsRng).private_key().clone();
    accusations[0].accused_members_keys.insert(MemberId(2), forged);

    let members = run_phase_5(members, &accusations);
    let (members, points_messages) = run_phases_6_7(members);
    let (members, points_accusations) = run_phase_8(members, &points_messages);
    let members = run_phase_9(members, &points_accusations);
    let results = run_phases_10_to_12(members);

    let expected = expected_group_key(&config, &contributions, &[2, 3, 4]);
    for index in [1usize, 2, 3] {
        let result = results[index].as_ref().unwrap();
        assert_eq!(result.group_public_key(), &expected);
        assert_eq!(
            result.disqualified_members().iter().copied().collect::<Vec<_>>(),
            vec![MemberId(1)]
        );
    }
}

#[test]
fn test_missing_sender_goes_inactive_not_disqualified() {
    let config = test_config();
    let mut members = start_members(4, 1);
    let (mut shares_messages, mut commitments_messages) = run_phase_3(&mut members);
    let contributions = secret_contributions(&members);

    // member 4 never broadcasts in Phase 3; the others close the window
    // and mark it inactive
    shares_messages.truncate(3);
    commitments_messages.truncate(3);
    members.truncate(3);
    for member in members.iter_mut() {
        member.core.group.mark_inactive(MemberId(4));
    }

    let results: Vec<DkgResult> =
        run_from_phase_4(members, &shares_messages, &commitments_messages)
            .into_iter()
            .map(Result::unwrap)
            .collect();

    // the remaining qualified count (3) still exceeds t + 1 = 2, so the
    // run is valid over the active members only
    let expected = expected_group_key(&config, &contributions, &[1, 2, 3]);
    for result in &results {
        assert_eq!(result.group_public_key(), &expected);
        assert!(result.disqualified_members().is_empty());
        assert_eq!(
            result.inactive_members().iter().copied().collect::<Vec<_>>(),
            vec![MemberId(4)]
        );
        assert_eq!(
            result.qualified_members(),
            &[MemberId(1), MemberId(2), MemberId(3)]
        );
    }
}

#[test]
fn test_judge_cannot_rule_its_own_dispute() {
    let mut members = start_members(4, 1);
    let (shares_messages, commitments_messages) = run_phase_3(&mut members);
    let (members, _accusations) =
        run_phase_4(members, &shares_messages, &commitments_messages);

    // member 3 as accuser and as accused, replayed against its own state
    let judge = &members[2];
    let key = judge
        .ephemeral_key_pairs
        .get(&MemberId(2))
        .unwrap()
        .private_key()
        .clone();

    assert!(matches!(
        judge.judge_share_dispute(MemberId(3), MemberId(2), &key),
        Err(Error::SelfInDispute)
    ));
    assert!(matches!(
        judge.judge_share_dispute(MemberId(1), MemberId(3), &key),
        Err(Error::SelfInDispute)
    ));

    // state intact: the member still resolves the empty set and advances
    let mut judge = members.into_iter().nth(2).unwrap();
    assert!(judge.resolve_secret_shares_accusations(&[]).unwrap().is_empty());
    let _ = judge.into_qualified();
}

#[test]
fn test_combination_is_order_independent() {
    let mut members = start_members(4, 1);
    let (shares_messages, commitments_messages) = run_phase_3(&mut members);

    // a twin of member 1 processes every broadcast in reverse arrival order
    let twin = members[0].clone();

    let (members, accusations) = run_phase_4(members, &shares_messages, &commitments_messages);

    let mut twin = twin.into_commitments_verifying().unwrap();
    let reversed_shares: Vec<PeerSharesMessage> = shares_messages
        .iter()
        .filter(|m| m.sender_id != twin.member_id())
        .rev()
        .cloned()
        .collect();
    let reversed_commitments: Vec<MemberCommitmentsMessage> = commitments_messages
        .iter()
        .filter(|m| m.sender_id != twin.member_id())
        .rev()
        .cloned()
        .collect();
    let twin_accusation = twin
        .verify_received_shares_and_commitments(&reversed_shares, &reversed_commitments)
        .unwrap();
    assert!(twin_accusation.accused_members_keys.is_empty());

    let members = run_phase_5(members, &accusations);
    let mut twin = twin.into_shares_justifying();
    twin.resolve_secret_shares_accusations(&[]).unwrap();
    let twin = twin.into_qualified();

    let (members, points_messages) = run_phases_6_7(members);
    let mut twin = twin.combine_member_shares();
    let _ = twin.calculate_public_key_share_points();

    let (members, points_accusations) = run_phase_8(members, &points_messages);
    let reversed_points: Vec<MemberPublicKeySharePointsMessage> = points_messages
        .iter()
        .filter(|m| m.sender_id != twin.member_id())
        .rev()
        .cloned()
        .collect();
    let twin_points_accusation = twin.verify_public_key_share_points(&reversed_points).unwrap();
    assert!(twin_points_accusation.accused_members_keys.is_empty());

    let members = run_phase_9(members, &points_accusations);
    let mut twin = twin.into_points_justifying().unwrap();
    twin.resolve_public_key_share_points_accusations(&[]).unwrap();
    let twin = twin.into_revealing();

    let forward = run_phases_10_to_12(members);
    let twin_results = run_phases_10_to_12(vec![twin]);

    let reference = forward[0].as_ref().unwrap();
    let twin_result = twin_results[0].as_ref().unwrap();
    assert_eq!(reference.group_public_key(), twin_result.group_public_key());
    assert_eq!(reference.secret_key_share(), twin_result.secret_key_share());
    assert_eq!(reference.qualified_members(), twin_result.qualified_members());
}
