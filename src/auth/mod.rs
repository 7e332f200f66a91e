// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Access Control
//!
//! Identity is a wallet address *claimed* by the client. There is no
//! signature or on-chain verification.
//!
//! ## Carriers
//!
//! - `Authorization: Bearer 0x…` and `X-Wallet-Address: 0x…`, read by the
//!   resource handlers through [`ClaimedWallet`] / [`RequireWallet`]
//! - the `wallet-address` cookie, read by the [`gate`] middleware
//!
//! ## Gate Flow
//!
//! 1. Public route → allow
//! 2. Not a protected route → allow
//! 3. No wallet cookie → redirect `no-wallet`
//! 4. Address not whitelisted → redirect `not-whitelisted`
//! 5. Otherwise → allow

pub mod gate;
pub mod identity;

pub use gate::{whitelist_gate, DenyReason, GateConfig, GateDecision};
pub use identity::{claimed_address, gate_address, ClaimedWallet, RequireWallet};
