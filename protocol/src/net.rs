// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Broadcast transport and clock interfaces
//!
//! The state machine consumes two external collaborators: a named broadcast
//! channel with sender-authenticated delivery, and a coarse block clock that
//! delimits phase windows. Both are traits here; real deployments provide
//! networked implementations, while [`local`] provides the in-memory pair
//! used by tests and simulations.

use crate::dkg::messages::DkgMessage;
use crate::error::Result;

/**
 * A named broadcast channel.
 *
 * Delivery is sender-authenticated by the transport: a message claiming
 * `sender_id = i` is guaranteed to originate from member `i`. The core only
 * needs fire-and-forget sends and a non-blocking receive drain.
 */
pub trait BroadcastChannel {
    /// Broadcast a message to every group member, including the sender.
    fn send(&mut self, message: DkgMessage) -> Result<()>;

    /// Pop the next pending inbound message, if any.
    fn try_receive(&mut self) -> Option<DkgMessage>;
}

/**
 * A coarse-grained clock measured in transport-level ticks (blocks).
 */
pub trait BlockCounter {
    /// The current block height.
    fn block_height(&self) -> u64;

    /// Block until the chain reaches the given height.
    fn wait_for_block(&mut self, height: u64) -> Result<()>;
}

/// In-memory transport and clock for tests and local simulation.
pub mod local {
    use std::cell::{Cell, RefCell};
    use std::collections::{HashMap, VecDeque};
    use std::rc::Rc;

    use crate::dkg::member::MemberId;
    use crate::dkg::messages::DkgMessage;
    use crate::error::Result;

    use super::{BlockCounter, BroadcastChannel};

    type Queues = Rc<RefCell<HashMap<MemberId, VecDeque<DkgMessage>>>>;

    /**
     * An in-memory broadcast network.
     *
     * Every registered member gets its own inbound queue; a send fans the
     * message out to all queues, the sender's included, mirroring how a real
     * broadcast channel behaves.
     */
    #[derive(Clone, Default)]
    pub struct LocalNetwork {
        queues: Queues,
    }

    impl LocalNetwork {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a member and return its channel endpoint.
        pub fn channel(&self, member_id: MemberId) -> LocalChannel {
            self.queues
                .borrow_mut()
                .entry(member_id)
                .or_default();
            LocalChannel {
                member_id,
                queues: Rc::clone(&self.queues),
            }
        }
    }

    /// One member's endpoint on a [`LocalNetwork`].
    #[derive(Clone)]
    pub struct LocalChannel {
        member_id: MemberId,
        queues: Queues,
    }

    impl BroadcastChannel for LocalChannel {
        fn send(&mut self, message: DkgMessage) -> Result<()> {
            for queue in self.queues.borrow_mut().values_mut() {
                queue.push_back(message.clone());
            }
            Ok(())
        }

        fn try_receive(&mut self) -> Option<DkgMessage> {
            self.queues
                .borrow_mut()
                .get_mut(&self.member_id)
                .and_then(VecDeque::pop_front)
        }
    }

    /**
     * A block counter whose chain mines instantly: waiting for a height
     * just advances to it.
     */
    #[derive(Clone, Default)]
    pub struct LocalBlockCounter {
        height: Rc<Cell<u64>>,
    }

    impl LocalBlockCounter {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl BlockCounter for LocalBlockCounter {
        fn block_height(&self) -> u64 {
            self.height.get()
        }

        fn wait_for_block(&mut self, height: u64) -> Result<()> {
            if height > self.height.get() {
                self.height.set(height);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::local::{LocalBlockCounter, LocalNetwork};
    use super::{BlockCounter, BroadcastChannel};
    use crate::dkg::member::MemberId;
    use crate::dkg::messages::{DkgMessage, EphemeralPublicKeyMessage};
    use std::collections::BTreeMap;

    fn test_message(sender: u32) -> DkgMessage {
        DkgMessage::EphemeralPublicKey(EphemeralPublicKeyMessage {
            sender_id: MemberId(sender),
            ephemeral_public_keys: BTreeMap::new(),
        })
    }

    #[test]
    fn test_broadcast_reaches_every_member() {
        let network = LocalNetwork::new();
        let mut alpha = network.channel(MemberId(1));
        let mut beta = network.channel(MemberId(2));

        alpha.send(test_message(1)).unwrap();

        assert_eq!(alpha.try_receive(), Some(test_message(1)));
        assert_eq!(beta.try_receive(), Some(test_message(1)));
        assert_eq!(beta.try_receive(), None);
    }

    #[test]
    fn test_messages_arrive_in_order() {
        let network = LocalNetwork::new();
        let mut alpha = network.channel(MemberId(1));
        let mut beta = network.channel(MemberId(2));

        beta.send(test_message(2)).unwrap();
        alpha.send(test_message(1)).unwrap();

        assert_eq!(alpha.try_receive(), Some(test_message(2)));
        assert_eq!(alpha.try_receive(), Some(test_message(1)));
    }

    #[test]
    fn test_local_block_counter_advances() {
        let mut counter = LocalBlockCounter::new();
        assert_eq!(counter.block_height(), 0);
        counter.wait_for_block(5).unwrap();
        assert_eq!(counter.block_height(), 5);
        counter.wait_for_block(3).unwrap();
        assert_eq!(counter.block_height(), 5);
    }
}
