// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! DKG state machine
//!
//! Twelve linearly-ordered states drive the member through the protocol:
//!
//! `EphemeralKeyGenerating → SymmetricKeyGenerating → Committing →
//! CommitmentsVerifying → SharesJustifying → Qualified → Sharing →
//! PointsJustifying → Revealing → Reconstructing → Combining → Terminated`
//!
//! Messaging states broadcast at `initiate`, then passively receive until
//! the externally supplied block counter reports the active window has
//! elapsed; silent states only compute. Scheduling is single-threaded
//! cooperative: nothing preempts a state between `initiate` and its
//! transition. Members that fail to broadcast inside a messaging window are
//! marked inactive, never retroactively disqualified.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crypto_bigint::BoxedUint;
use cryptography::utils::rng::Rng;
use rand::rngs::OsRng;
use tracing::{debug, warn};

use crate::dkg::member::{
    CombiningMember, CommitmentsVerifyingMember, CommittingMember, DisqualifiedShares,
    EphemeralKeyPairGeneratingMember, MemberId, PointsJustifyingMember, QualifiedMember,
    ReconstructingMember, RevealingMember, SharesJustifyingMember, SharingMember,
    SymmetricKeyGeneratingMember,
};
use crate::dkg::messages::{
    DkgMessage, EphemeralPublicKeyMessage, MemberCommitmentsMessage,
    MemberPublicKeySharePointsMessage, PeerSharesMessage, PointsAccusationsMessage,
    RevealedDisqualifiedSharesMessage, SecretSharesAccusationsMessage,
};
use crate::dkg::result::DkgResult;
use crate::error::{Error, Result};
use crate::net::{BlockCounter, BroadcastChannel};

/// Default delay before a messaging state broadcasts, in blocks.
pub const MESSAGING_STATE_DELAY_BLOCKS: u64 = 1;
/// Default receive window of a messaging state, in blocks.
pub const MESSAGING_STATE_ACTIVE_BLOCKS: u64 = 3;
/// Default delay of a computation-only state, in blocks.
pub const SILENT_STATE_DELAY_BLOCKS: u64 = 0;
/// Default active window of a computation-only state, in blocks.
pub const SILENT_STATE_ACTIVE_BLOCKS: u64 = 0;

/// Whether a state exchanges messages or only computes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateTiming {
    Messaging,
    Silent,
}

/**
 * Phase window lengths, measured in blocks.
 *
 * Exact durations are deployment parameters, not protocol constants; the
 * defaults suit a chain that mines roughly as fast as members compute.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseDurations {
    pub messaging_delay_blocks: u64,
    pub messaging_active_blocks: u64,
    pub silent_delay_blocks: u64,
    pub silent_active_blocks: u64,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            messaging_delay_blocks: MESSAGING_STATE_DELAY_BLOCKS,
            messaging_active_blocks: MESSAGING_STATE_ACTIVE_BLOCKS,
            silent_delay_blocks: SILENT_STATE_DELAY_BLOCKS,
            silent_active_blocks: SILENT_STATE_ACTIVE_BLOCKS,
        }
    }
}

impl PhaseDurations {
    fn delay_blocks(&self, timing: StateTiming) -> u64 {
        match timing {
            StateTiming::Messaging => self.messaging_delay_blocks,
            StateTiming::Silent => self.silent_delay_blocks,
        }
    }

    fn active_blocks(&self, timing: StateTiming) -> u64 {
        match timing {
            StateTiming::Messaging => self.messaging_active_blocks,
            StateTiming::Silent => self.silent_active_blocks,
        }
    }
}

/// The protocol state a member is currently in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DkgPhase {
    EphemeralKeyGenerating,
    SymmetricKeyGenerating,
    Committing,
    CommitmentsVerifying,
    SharesJustifying,
    Qualified,
    Sharing,
    PointsJustifying,
    Revealing,
    Reconstructing,
    Combining,
    Terminated,
}

impl fmt::Display for DkgPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The outcome of a state transition.
pub(crate) enum Transition {
    Continue(Box<dyn DkgState>),
    Final(DkgResult),
}

/// One DKG protocol state.
pub(crate) trait DkgState {
    fn phase(&self) -> DkgPhase;
    fn timing(&self) -> StateTiming;
    /// Perform this state's broadcast, if any.
    fn initiate(&mut self, channel: &mut dyn BroadcastChannel) -> Result<()>;
    /// Accept one inbound broadcast; messages of foreign type or phase are
    /// ignored, duplicates resolve first-wins.
    fn receive(&mut self, message: DkgMessage) -> Result<()>;
    /// Close the phase and produce the next state.
    fn next(self: Box<Self>) -> Result<Transition>;
}

fn accepts_peer_message(
    member_id: MemberId,
    group: &crate::dkg::group::Group,
    sender_id: MemberId,
) -> bool {
    sender_id != member_id && group.contains(sender_id)
}

// --- Phase 1 ---

struct EphemeralKeyGeneratingState {
    member: EphemeralKeyPairGeneratingMember,
    outbound: EphemeralPublicKeyMessage,
    received: Vec<EphemeralPublicKeyMessage>,
}

impl DkgState for EphemeralKeyGeneratingState {
    fn phase(&self) -> DkgPhase {
        DkgPhase::EphemeralKeyGenerating
    }

    fn timing(&self) -> StateTiming {
        StateTiming::Messaging
    }

    fn initiate(&mut self, channel: &mut dyn BroadcastChannel) -> Result<()> {
        channel.send(DkgMessage::EphemeralPublicKey(self.outbound.clone()))
    }

    fn receive(&mut self, message: DkgMessage) -> Result<()> {
        if let DkgMessage::EphemeralPublicKey(inbound) = message {
            if accepts_peer_message(self.member.member_id(), self.member.group(), inbound.sender_id)
                && !self.received.iter().any(|m| m.sender_id == inbound.sender_id)
            {
                self.received.push(inbound);
            }
        }
        Ok(())
    }

    fn next(self: Box<Self>) -> Result<Transition> {
        let this = *self;
        Ok(Transition::Continue(Box::new(SymmetricKeyGeneratingState {
            member: this.member.into_symmetric_key_generating(),
            previous_phase_messages: this.received,
        })))
    }
}

// --- Phase 2 ---

struct SymmetricKeyGeneratingState {
    member: SymmetricKeyGeneratingMember,
    previous_phase_messages: Vec<EphemeralPublicKeyMessage>,
}

impl DkgState for SymmetricKeyGeneratingState {
    fn phase(&self) -> DkgPhase {
        DkgPhase::SymmetricKeyGenerating
    }

    fn timing(&self) -> StateTiming {
        StateTiming::Silent
    }

    fn initiate(&mut self, _channel: &mut dyn BroadcastChannel) -> Result<()> {
        Ok(())
    }

    fn receive(&mut self, _message: DkgMessage) -> Result<()> {
        Ok(())
    }

    fn next(self: Box<Self>) -> Result<Transition> {
        let mut this = *self;

        mark_missing_senders_inactive(
            &mut this.member.core.group,
            this.member.core.id,
            this.previous_phase_messages.iter().map(|m| m.sender_id),
        );
        this.member.generate_symmetric_keys(&this.previous_phase_messages)?;

        let mut member = this.member.into_committing();
        let (outbound_shares, outbound_commitments) =
            member.calculate_members_shares_and_commitments(&mut OsRng::rng())?;

        Ok(Transition::Continue(Box::new(CommittingState {
            member,
            outbound_shares,
            outbound_commitments,
            received_shares: Vec::new(),
            received_commitments: Vec::new(),
        })))
    }
}

// --- Phase 3 ---

struct CommittingState {
    member: CommittingMember,
    outbound_shares: PeerSharesMessage,
    outbound_commitments: MemberCommitmentsMessage,
    received_shares: Vec<PeerSharesMessage>,
    received_commitments: Vec<MemberCommitmentsMessage>,
}

impl DkgState for CommittingState {
    fn phase(&self) -> DkgPhase {
        DkgPhase::Committing
    }

    fn timing(&self) -> StateTiming {
        StateTiming::Messaging
    }

    fn initiate(&mut self, channel: &mut dyn BroadcastChannel) -> Result<()> {
        channel.send(DkgMessage::PeerShares(self.outbound_shares.clone()))?;
        channel.send(DkgMessage::MemberCommitments(
            self.outbound_commitments.clone(),
        ))
    }

    fn receive(&mut self, message: DkgMessage) -> Result<()> {
        let member_id = self.member.member_id();
        match message {
            DkgMessage::PeerShares(inbound) => {
                if accepts_peer_message(member_id, self.member.group(), inbound.sender_id)
                    && !self
                        .received_shares
                        .iter()
                        .any(|m| m.sender_id == inbound.sender_id)
                {
                    self.received_shares.push(inbound);
                }
            }
            DkgMessage::MemberCommitments(inbound) => {
                if accepts_peer_message(member_id, self.member.group(), inbound.sender_id)
                    && !self
                        .received_commitments
                        .iter()
                        .any(|m| m.sender_id == inbound.sender_id)
                {
                    self.received_commitments.push(inbound);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn next(self: Box<Self>) -> Result<Transition> {
        let this = *self;
        let mut member = this.member;

        // a member that sent neither message this window goes inactive
        let senders: BTreeSet<MemberId> = this
            .received_shares
            .iter()
            .map(|m| m.sender_id)
            .chain(this.received_commitments.iter().map(|m| m.sender_id))
            .collect();
        mark_missing_senders_inactive(
            &mut member.core.group,
            member.core.id,
            senders.iter().copied(),
        );

        let shares: Vec<PeerSharesMessage> = this
            .received_shares
            .into_iter()
            .filter(|m| member.core.group.is_eligible(m.sender_id))
            .collect();
        let commitments: Vec<MemberCommitmentsMessage> = this
            .received_commitments
            .into_iter()
            .filter(|m| member.core.group.is_eligible(m.sender_id))
            .collect();

        let mut member = member.into_commitments_verifying()?;
        let outbound = member.verify_received_shares_and_commitments(&shares, &commitments)?;

        Ok(Transition::Continue(Box::new(CommitmentsVerifyingState {
            member,
            outbound,
            received: Vec::new(),
        })))
    }
}

// --- Phase 4 ---

struct CommitmentsVerifyingState {
    member: CommitmentsVerifyingMember,
    outbound: SecretSharesAccusationsMessage,
    received: Vec<SecretSharesAccusationsMessage>,
}

impl DkgState for CommitmentsVerifyingState {
    fn phase(&self) -> DkgPhase {
        DkgPhase::CommitmentsVerifying
    }

    fn timing(&self) -> StateTiming {
        StateTiming::Messaging
    }

    fn initiate(&mut self, channel: &mut dyn BroadcastChannel) -> Result<()> {
        channel.send(DkgMessage::SecretSharesAccusations(self.outbound.clone()))
    }

    fn receive(&mut self, message: DkgMessage) -> Result<()> {
        if let DkgMessage::SecretSharesAccusations(inbound) = message {
            if accepts_peer_message(self.member.member_id(), self.member.group(), inbound.sender_id)
                && !self.received.iter().any(|m| m.sender_id == inbound.sender_id)
            {
                self.received.push(inbound);
            }
        }
        Ok(())
    }

    fn next(self: Box<Self>) -> Result<Transition> {
        let this = *self;
        let member = this.member.into_shares_justifying();

        // own accusations are ruled on alongside everyone else's; verdicts
        // are a deterministic function of the shared evidence log
        let accusations: Vec<SecretSharesAccusationsMessage> =
            std::iter::once(this.outbound)
                .chain(this.received)
                .filter(|message| !message.accused_members_keys.is_empty())
                .collect();

        Ok(Transition::Continue(Box::new(SharesJustifyingState {
            member,
            accusations,
        })))
    }
}

// --- Phase 5 ---

struct SharesJustifyingState {
    member: SharesJustifyingMember,
    accusations: Vec<SecretSharesAccusationsMessage>,
}

impl DkgState for SharesJustifyingState {
    fn phase(&self) -> DkgPhase {
        DkgPhase::SharesJustifying
    }

    fn timing(&self) -> StateTiming {
        StateTiming::Silent
    }

    fn initiate(&mut self, _channel: &mut dyn BroadcastChannel) -> Result<()> {
        Ok(())
    }

    fn receive(&mut self, _message: DkgMessage) -> Result<()> {
        Ok(())
    }

    fn next(self: Box<Self>) -> Result<Transition> {
        let mut this = *self;
        this.member
            .resolve_secret_shares_accusations(&this.accusations)?;
        Ok(Transition::Continue(Box::new(QualifiedState {
            member: this.member.into_qualified(),
        })))
    }
}

// --- Phase 6 ---

struct QualifiedState {
    member: QualifiedMember,
}

impl DkgState for QualifiedState {
    fn phase(&self) -> DkgPhase {
        DkgPhase::Qualified
    }

    fn timing(&self) -> StateTiming {
        StateTiming::Silent
    }

    fn initiate(&mut self, _channel: &mut dyn BroadcastChannel) -> Result<()> {
        Ok(())
    }

    fn receive(&mut self, _message: DkgMessage) -> Result<()> {
        Ok(())
    }

    fn next(self: Box<Self>) -> Result<Transition> {
        let mut member = self.member.combine_member_shares();
        let outbound = member.calculate_public_key_share_points();
        Ok(Transition::Continue(Box::new(SharingState {
            member,
            outbound,
            received: Vec::new(),
        })))
    }
}

// --- Phases 7 and 8 ---

struct SharingState {
    member: SharingMember,
    outbound: MemberPublicKeySharePointsMessage,
    received: Vec<MemberPublicKeySharePointsMessage>,
}

impl DkgState for SharingState {
    fn phase(&self) -> DkgPhase {
        DkgPhase::Sharing
    }

    fn timing(&self) -> StateTiming {
        StateTiming::Messaging
    }

    fn initiate(&mut self, channel: &mut dyn BroadcastChannel) -> Result<()> {
        channel.send(DkgMessage::MemberPublicKeySharePoints(self.outbound.clone()))
    }

    fn receive(&mut self, message: DkgMessage) -> Result<()> {
        if let DkgMessage::MemberPublicKeySharePoints(inbound) = message {
            if accepts_peer_message(self.member.member_id(), self.member.group(), inbound.sender_id)
                && !self.received.iter().any(|m| m.sender_id == inbound.sender_id)
            {
                self.received.push(inbound);
            }
        }
        Ok(())
    }

    fn next(self: Box<Self>) -> Result<Transition> {
        let this = *self;
        let mut member = this.member;

        mark_missing_senders_inactive(
            &mut member.core.group,
            member.core.id,
            this.received.iter().map(|m| m.sender_id),
        );

        let outbound = member.verify_public_key_share_points(&this.received)?;
        let member = member.into_points_justifying()?;

        Ok(Transition::Continue(Box::new(PointsJustifyingState {
            member,
            outbound,
            received: Vec::new(),
        })))
    }
}

// --- Phases 8 and 9 ---

struct PointsJustifyingState {
    member: PointsJustifyingMember,
    outbound: PointsAccusationsMessage,
    received: Vec<PointsAccusationsMessage>,
}

impl DkgState for PointsJustifyingState {
    fn phase(&self) -> DkgPhase {
        DkgPhase::PointsJustifying
    }

    fn timing(&self) -> StateTiming {
        StateTiming::Messaging
    }

    fn initiate(&mut self, channel: &mut dyn BroadcastChannel) -> Result<()> {
        channel.send(DkgMessage::PointsAccusations(self.outbound.clone()))
    }

    fn receive(&mut self, message: DkgMessage) -> Result<()> {
        if let DkgMessage::PointsAccusations(inbound) = message {
            if accepts_peer_message(self.member.member_id(), self.member.group(), inbound.sender_id)
                && !self.received.iter().any(|m| m.sender_id == inbound.sender_id)
            {
                self.received.push(inbound);
            }
        }
        Ok(())
    }

    fn next(self: Box<Self>) -> Result<Transition> {
        let mut this = *self;

        let accusations: Vec<PointsAccusationsMessage> = std::iter::once(this.outbound)
            .chain(this.received)
            .filter(|message| !message.accused_members_keys.is_empty())
            .collect();

        this.member
            .resolve_public_key_share_points_accusations(&accusations)?;

        let member = this.member.into_revealing();
        let outbound = member.reveal_misbehaved_members_shares();

        Ok(Transition::Continue(Box::new(RevealingState {
            member,
            outbound,
            received: Vec::new(),
        })))
    }
}

// --- Phase 10 ---

struct RevealingState {
    member: RevealingMember,
    outbound: RevealedDisqualifiedSharesMessage,
    received: Vec<RevealedDisqualifiedSharesMessage>,
}

impl DkgState for RevealingState {
    fn phase(&self) -> DkgPhase {
        DkgPhase::Revealing
    }

    fn timing(&self) -> StateTiming {
        StateTiming::Messaging
    }

    fn initiate(&mut self, channel: &mut dyn BroadcastChannel) -> Result<()> {
        channel.send(DkgMessage::RevealedDisqualifiedShares(self.outbound.clone()))
    }

    fn receive(&mut self, message: DkgMessage) -> Result<()> {
        if let DkgMessage::RevealedDisqualifiedShares(inbound) = message {
            if accepts_peer_message(self.member.member_id(), self.member.group(), inbound.sender_id)
                && !self.received.iter().any(|m| m.sender_id == inbound.sender_id)
            {
                self.received.push(inbound);
            }
        }
        Ok(())
    }

    fn next(self: Box<Self>) -> Result<Transition> {
        let this = *self;
        let misbehaved = this.member.misbehaved_members();

        let mut reveal_sets: BTreeMap<MemberId, BTreeMap<MemberId, BoxedUint>> = BTreeMap::new();
        for (disqualified_id, share) in &this.outbound.shares {
            reveal_sets
                .entry(*disqualified_id)
                .or_default()
                .insert(this.member.member_id(), share.clone());
        }
        for message in &this.received {
            if !this.member.group().is_eligible(message.sender_id) {
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

        Ok(Transition::Continue(Box::new(ReconstructingState {
            member: this.member.into_reconstructing(),
            revealed,
        })))
    }
}

// --- Phase 11 ---

struct ReconstructingState {
    member: ReconstructingMember,
    revealed: Vec<DisqualifiedShares>,
}

impl DkgState for ReconstructingState {
    fn phase(&self) -> DkgPhase {
        DkgPhase::Reconstructing
    }

    fn timing(&self) -> StateTiming {
        StateTiming::Silent
    }

    fn initiate(&mut self, _channel: &mut dyn BroadcastChannel) -> Result<()> {
        Ok(())
    }

    fn receive(&mut self, _message: DkgMessage) -> Result<()> {
        Ok(())
    }

    fn next(self: Box<Self>) -> Result<Transition> {
        let mut this = *self;
        this.member
            .reconstruct_individual_private_keys(&this.revealed)?;
        this.member.reconstruct_individual_public_keys();
        Ok(Transition::Continue(Box::new(CombiningState {
            member: this.member.into_combining(),
        })))
    }
}

// --- Phase 12 ---

struct CombiningState {
    member: CombiningMember,
}

impl DkgState for CombiningState {
    fn phase(&self) -> DkgPhase {
        DkgPhase::Combining
    }

    fn timing(&self) -> StateTiming {
        StateTiming::Silent
    }

    fn initiate(&mut self, _channel: &mut dyn BroadcastChannel) -> Result<()> {
        Ok(())
    }

    fn receive(&mut self, _message: DkgMessage) -> Result<()> {
        Ok(())
    }

    fn next(self: Box<Self>) -> Result<Transition> {
        let mut this = *self;
        this.member.combine_group_public_key();
        Ok(Transition::Final(this.member.finalize()?))
    }
}

/// Mark every eligible peer that missed this window's broadcast inactive.
fn mark_missing_senders_inactive(
    group: &mut crate::dkg::group::Group,
    member_id: MemberId,
    senders: impl Iterator<Item = MemberId>,
) {
    let senders: BTreeSet<MemberId> = senders.collect();
    for other_id in group.other_member_ids(member_id) {
        if group.is_eligible(other_id) && !senders.contains(&other_id) {
            warn!(member = %member_id, peer = %other_id, "no broadcast inside the active window; peer goes inactive");
            group.mark_inactive(other_id);
        }
    }
}

/**
 * Drives one member through the twelve protocol states against a broadcast
 * channel and a block clock.
 *
 * [`step`][`Self::step`] runs one full phase window (delay, broadcast,
 * passive receive until the window closes, transition) and
 * [`execute`][`Self::execute`] runs windows to termination. The granular
 * [`initiate`][`Self::initiate`] / [`drain`][`Self::drain`] /
 * [`advance`][`Self::advance`] calls let a simulation drive several members
 * in lock-step on one thread.
 */
pub struct DkgStateMachine<C: BroadcastChannel, B: BlockCounter> {
    channel: C,
    block_counter: B,
    durations: PhaseDurations,
    state: Option<Box<dyn DkgState>>,
}

impl<C: BroadcastChannel, B: BlockCounter> DkgStateMachine<C, B> {
    /// Enter the protocol: Phase 1 keys are generated here, ready to be
    /// broadcast by the first `initiate`.
    pub fn new(
        member: EphemeralKeyPairGeneratingMember,
        channel: C,
        block_counter: B,
    ) -> Result<Self> {
        Self::with_durations(member, channel, block_counter, PhaseDurations::default())
    }

    pub fn with_durations(
        mut member: EphemeralKeyPairGeneratingMember,
        channel: C,
        block_counter: B,
        durations: PhaseDurations,
    ) -> Result<Self> {
        let outbound = member.generate_ephemeral_key_pairs(&mut OsRng::rng())?;
        Ok(Self {
            channel,
            block_counter,
            durations,
            state: Some(Box::new(EphemeralKeyGeneratingState {
                member,
                outbound,
                received: Vec::new(),
            })),
        })
    }

    /// The state the machine currently sits in.
    pub fn phase(&self) -> DkgPhase {
        self.state
            .as_ref()
            .map_or(DkgPhase::Terminated, |state| state.phase())
    }

    /// Broadcast the current state's outbound message, if any.
    pub fn initiate(&mut self) -> Result<()> {
        let state = self
            .state
            .as_mut()
            .ok_or(Error::PhaseOrdering("state machine already terminated"))?;
        state.initiate(&mut self.channel)
    }

    /// Deliver every queued inbound message to the current state. Silent
    /// states leave the queue untouched for the next messaging window.
    pub fn drain(&mut self) -> Result<()> {
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };
        if state.timing() == StateTiming::Silent {
            return Ok(());
        }
        while let Some(message) = self.channel.try_receive() {
            state.receive(message)?;
        }
        Ok(())
    }

    /// Close the current phase and transition. Returns the terminal result
    /// once the final state completes.
    pub fn advance(&mut self) -> Result<Option<DkgResult>> {
        let state = self
            .state
            .take()
            .ok_or(Error::PhaseOrdering("state machine already terminated"))?;
        match state.next()? {
            Transition::Continue(next) => {
                debug!(phase = %next.phase(), "phase transition");
                self.state = Some(next);
                Ok(None)
            }
            Transition::Final(result) => Ok(Some(result)),
        }
    }

    /// Run one full phase window against the block clock.
    pub fn step(&mut self) -> Result<Option<DkgResult>> {
        let timing = self
            .state
            .as_ref()
            .ok_or(Error::PhaseOrdering("state machine already terminated"))?
            .timing();

        let height = self.block_counter.block_height();
        self.block_counter
            .wait_for_block(height + self.durations.delay_blocks(timing))?;

        self.initiate()?;

        let window_end =
            self.block_counter.block_height() + self.durations.active_blocks(timing);
        loop {
            self.drain()?;
            let height = self.block_counter.block_height();
            if height >= window_end {
                break;
            }
            self.block_counter.wait_for_block(height + 1)?;
        }

        self.advance()
    }

    /// Run phase windows to termination.
    pub fn execute(&mut self) -> Result<DkgResult> {
        loop {
            if let Some(result) = self.step()? {
                return Ok(result);
            }
        }
    }
}
