// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Whitelist gate middleware.
//!
//! Every request passes through [`whitelist_gate`]. Public routes and routes
//! outside the protected set are allowed without looking at identity; a
//! protected route needs a whitelisted address in the wallet cookie,
//! otherwise the caller is redirected (`303 See Other`) to the access-denied
//! path with a `reason` query parameter.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/users", get(page))
//!     .layer(axum::middleware::from_fn_with_state(gate.clone(), whitelist_gate));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::identity::gate_address;
use crate::models::WalletAddress;

/// Addresses allowed onto protected routes when none are configured.
pub const DEFAULT_WHITELIST: &[&str] = &[
    "0xad95fbf311a6ee0221a4bade4ae7defd8ce98ebb",
    "0x1234567890123456789012345678901234567890",
];

pub const DEFAULT_PROTECTED_ROUTES: &[&str] = &["/users", "/listing", "/profile", "/tokenize"];

pub const DEFAULT_PUBLIC_ROUTES: &[&str] = &["/", "/access-denied"];

pub const DEFAULT_ACCESS_DENIED_PATH: &str = "/access-denied";

/// Why a protected request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoWallet,
    NotWhitelisted,
}

impl DenyReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoWallet => "no-wallet",
            Self::NotWhitelisted => "not-whitelisted",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "no-wallet" => Some(Self::NoWallet),
            "not-whitelisted" => Some(Self::NotWhitelisted),
            _ => None,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::NoWallet => "Connect a wallet to access this page",
            Self::NotWhitelisted => "This wallet is not authorized to access this page",
        }
    }
}

/// Outcome of the gate for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(DenyReason),
}

/// Immutable gate configuration, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Lowercased whitelist.
    pub whitelist: Vec<String>,
    pub protected_routes: Vec<String>,
    pub public_routes: Vec<String>,
    pub access_denied_path: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_WHITELIST.iter().map(|s| s.to_string()).collect(),
            DEFAULT_PROTECTED_ROUTES.iter().map(|s| s.to_string()).collect(),
            DEFAULT_PUBLIC_ROUTES.iter().map(|s| s.to_string()).collect(),
            DEFAULT_ACCESS_DENIED_PATH.to_string(),
        )
    }
}

impl GateConfig {
    pub fn new(
        whitelist: Vec<String>,
        protected_routes: Vec<String>,
        public_routes: Vec<String>,
        access_denied_path: String,
    ) -> Self {
        Self {
            whitelist: whitelist.iter().map(|a| a.trim().to_lowercase()).collect(),
            protected_routes,
            public_routes,
            access_denied_path,
        }
    }

    pub fn is_whitelisted(&self, address: &WalletAddress) -> bool {
        let address = address.normalized();
        self.whitelist.iter().any(|allowed| allowed == address.as_str())
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_routes.iter().any(|route| route_matches(route, path))
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_routes.iter().any(|route| route_matches(route, path))
    }

    /// Decide for `path`; `identity` is only consulted on protected routes.
    pub fn evaluate(
        &self,
        path: &str,
        identity: impl FnOnce() -> Option<WalletAddress>,
    ) -> GateDecision {
        if self.is_public(path) || !self.is_protected(path) {
            return GateDecision::Allow;
        }

        match identity() {
            None => GateDecision::Redirect(DenyReason::NoWallet),
            Some(address) if !self.is_whitelisted(&address) => {
                GateDecision::Redirect(DenyReason::NotWhitelisted)
            }
            Some(_) => GateDecision::Allow,
        }
    }

    /// `Location` for a denied request, e.g. `/access-denied?reason=no-wallet`.
    pub fn redirect_target(&self, reason: DenyReason) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("reason", reason.as_str())
            .finish();
        format!("{}?{query}", self.access_denied_path)
    }
}

/// Boundary-aware prefix match. `/` only matches the root itself.
pub fn route_matches(route: &str, path: &str) -> bool {
    if path == route {
        return true;
    }
    let prefix = route.trim_end_matches('/');
    !prefix.is_empty()
        && path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Router layer enforcing [`GateConfig`].
pub async fn whitelist_gate(
    State(gate): State<Arc<GateConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let decision = gate.evaluate(&path, || gate_address(request.headers()));
    match decision {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Redirect(reason) => {
            tracing::debug!(path = %path, reason = reason.as_str(), "Gate redirect");
            Redirect::to(&gate.redirect_target(reason)).into_response()
        }
    }
}
