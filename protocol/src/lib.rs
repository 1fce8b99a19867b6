// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Publicly-verifiable distributed key generation
//!
//! Implements the Gennaro-Jarecki-Krawczyk-Rabin (GJKR-99) protocol: a fixed
//! group of `n` members jointly computes a group public key `Y` such that
//! each member holds one share `x_i` of an unknown secret `x`, any `t + 1`
//! shares reconstruct `x`, and `t` or fewer reveal nothing. Misbehaving
//! members are detected through a public accusation subprotocol, disqualified
//! by unanimous deterministic verdicts, and their contributions reconstructed
//! in the open so the group key stays well-defined.
//!
//! The protocol logic lives in [`dkg`]; the [`net`] module defines the
//! broadcast-transport and clock interfaces the state machine consumes,
//! together with a local in-memory implementation.

pub mod dkg;
pub mod error;
pub mod net;
