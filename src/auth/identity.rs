// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claimed wallet identity.
//!
//! The address is taken from the request as-is. Nothing here proves the
//! caller controls the wallet.
//!
//! ```rust,ignore
//! async fn create(ClaimedWallet(owner): ClaimedWallet) -> impl IntoResponse {
//!     // owner: Option<WalletAddress>
//! }
//! ```

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};

use cookie::{time::Duration, Cookie, CookieBuilder, SameSite};

use crate::{error::ApiError, models::WalletAddress};

/// Cookie written on wallet connect and read by the whitelist gate.
pub const WALLET_COOKIE: &str = "wallet-address";

/// Header carrying a claimed address when no bearer credential is sent.
pub const WALLET_HEADER: &str = "x-wallet-address";

/// Lifetime of the wallet cookie (24 hours).
pub const WALLET_COOKIE_MAX_AGE: i64 = 86_400;

const WALLET_NOT_PROVIDED: &str = "Wallet address not provided. Please include address in \
     Authorization header or X-Wallet-Address header.";

fn hex_claim(value: &str) -> Option<WalletAddress> {
    let value = value.trim();
    value.starts_with("0x").then(|| WalletAddress::from(value))
}

/// Address claimed by request headers.
///
/// `Authorization: Bearer 0x…` wins over `X-Wallet-Address: 0x…`; values not
/// starting with `0x` are ignored.
pub fn claimed_address(headers: &HeaderMap) -> Option<WalletAddress> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(hex_claim);
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get(WALLET_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(hex_claim)
}

/// Address stored in the wallet cookie, used by the gate.
///
/// Values are percent-decoded and stripped of surrounding quotes.
pub fn gate_address(headers: &HeaderMap) -> Option<WalletAddress> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|raw| Cookie::split_parse_encoded(raw))
        .filter_map(Result::ok)
        .filter(|cookie| cookie.name() == WALLET_COOKIE)
        .map(|cookie| cookie.value_trimmed().trim().to_string())
        .find(|value| !value.is_empty())
        .map(WalletAddress::from)
}

fn wallet_cookie(value: String) -> CookieBuilder<'static> {
    Cookie::build((WALLET_COOKIE, value))
        .path("/")
        .same_site(SameSite::Strict)
}

/// `Set-Cookie` value storing a connected wallet.
pub fn wallet_cookie_header(address: &WalletAddress) -> String {
    wallet_cookie(address.as_str().to_string())
        .max_age(Duration::seconds(WALLET_COOKIE_MAX_AGE))
        .build()
        .encoded()
        .to_string()
}

/// `Set-Cookie` value clearing the wallet cookie.
pub fn clear_wallet_cookie_header() -> String {
    wallet_cookie(String::new())
        .removal()
        .build()
        .encoded()
        .to_string()
}

/// Optional claimed wallet; never rejects.
#[derive(Debug, Clone)]
pub struct ClaimedWallet(pub Option<WalletAddress>);

impl ClaimedWallet {
    /// Turn a missing claim into an authentication error.
    pub fn require(self) -> Result<WalletAddress, ApiError> {
        self.0
            .ok_or_else(|| ApiError::unauthenticated(WALLET_NOT_PROVIDED))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClaimedWallet {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClaimedWallet(claimed_address(&parts.headers)))
    }
}

/// Claimed wallet that must be present.
#[derive(Debug, Clone)]
pub struct RequireWallet(pub WalletAddress);

impl<S: Send + Sync> FromRequestParts<S> for RequireWallet {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        ClaimedWallet(claimed_address(&parts.headers))
            .require()
            .map(RequireWallet)
    }
}
