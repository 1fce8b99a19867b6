// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Free & Fair
// See LICENSE.md for details

//! Utilities: errors, random number generation and canonical serialization.

pub mod error;
pub mod rng;
pub mod serialization;
