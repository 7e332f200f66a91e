// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Estate Admin Server - Tokenized Real-Estate Administration API
//!
//! Wallet-gated REST service managing platform users and tokenized property
//! listings, persisted to flat JSON files or an embedded redb database.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Claimed wallet identity and the whitelist gate
//! - `config` - Environment configuration
//! - `query` - Filtering, search and pagination over stored collections
//! - `storage` - Pluggable resource stores (JSON files or redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod state;
pub mod storage;
