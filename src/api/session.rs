// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet connect/disconnect and the gate's redirect target.
//!
//! Connecting stores the claimed address in the `wallet-address` cookie that
//! the whitelist gate reads on later navigations.

use axum::{
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::extract::{ApiJson, ApiQuery};
use crate::{
    auth::{
        identity::{clear_wallet_cookie_header, wallet_cookie_header},
        DenyReason,
    },
    error::ApiError,
    models::{ApiResponse, WalletAddress},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConnectWalletRequest {
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccessDeniedParams {
    /// `no-wallet` or `not-whitelisted`.
    pub reason: Option<String>,
}

/// Body of `GET /access-denied`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessDeniedResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[utoipa::path(
    post,
    path = "/session/wallet",
    tag = "Session",
    request_body = ConnectWalletRequest,
    responses(
        (status = 200, description = "Wallet cookie set", body = ApiResponse<WalletAddress>),
        (status = 400, description = "Address missing or not 0x-prefixed")
    )
)]
pub async fn connect_wallet(
    ApiJson(request): ApiJson<ConnectWalletRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let address = request
        .address
        .as_deref()
        .map(str::trim)
        .map(WalletAddress::from)
        .filter(WalletAddress::has_hex_prefix)
        .ok_or_else(|| ApiError::validation("Valid wallet address is required"))?;

    tracing::debug!(wallet = %address, "Wallet connected");
    Ok((
        AppendHeaders([(SET_COOKIE, wallet_cookie_header(&address))]),
        Json(ApiResponse::ok(address)),
    ))
}

#[utoipa::path(
    delete,
    path = "/session/wallet",
    tag = "Session",
    responses((status = 200, description = "Wallet cookie cleared"))
)]
pub async fn disconnect_wallet() -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, clear_wallet_cookie_header())]),
        Json(ApiResponse::done()),
    )
}

#[utoipa::path(
    get,
    path = "/access-denied",
    tag = "Session",
    params(AccessDeniedParams),
    responses((status = 403, description = "Why the gate turned the request away", body = AccessDeniedResponse))
)]
pub async fn access_denied(
    ApiQuery(params): ApiQuery<AccessDeniedParams>,
) -> (StatusCode, Json<AccessDeniedResponse>) {
    let reason = params.reason.as_deref().and_then(DenyReason::parse);
    let body = AccessDeniedResponse {
        success: false,
        error: reason
            .map(DenyReason::message)
            .unwrap_or("Access denied")
            .to_string(),
        reason: reason.map(|reason| reason.as_str().to_string()),
    };
    (StatusCode::FORBIDDEN, Json(body))
}

#[cfg(test)]
mod tests {
    use crate::api::{router, tests::send, tests::send_raw};
    use crate::state::AppState;
    use axum::http::{header::SET_COOKIE, Method, StatusCode};
    use cookie::{time::Duration, Cookie, SameSite};
    use serde_json::json;

    #[tokio::test]
    async fn connect_sets_wallet_cookie() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let response = send_raw(
            &app,
            Method::POST,
            "/session/wallet",
            &[],
            Some(json!({"address": "0xAbC"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let header = response.headers()[SET_COOKIE].to_str().unwrap();
        let cookie = Cookie::parse(header).unwrap();
        assert_eq!(cookie.name(), "wallet-address");
        assert_eq!(cookie.value(), "0xAbC");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(86_400)));
    }

    #[tokio::test]
    async fn connected_cookie_passes_the_gate() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let response = send_raw(
            &app,
            Method::POST,
            "/session/wallet",
            &[],
            Some(json!({"address": "0xAD95FBF311A6EE0221A4BADE4AE7DEFD8CE98EBB"})),
        )
        .await;
        let header = response.headers()[SET_COOKIE].to_str().unwrap();
        let pair = Cookie::parse(header).unwrap().stripped().to_string();

        let (status, _) = send(&app, Method::GET, "/users", &[("cookie", pair.as_str())], None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn connect_rejects_non_hex_address() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let (status, body) = send(
            &app,
            Method::POST,
            "/session/wallet",
            &[],
            Some(json!({"address": "abc"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn disconnect_clears_cookie() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let response = send_raw(&app, Method::DELETE, "/session/wallet", &[], None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("wallet-address=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn access_denied_echoes_reason() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let (status, body) =
            send(&app, Method::GET, "/access-denied?reason=not-whitelisted", &[], None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
        assert_eq!(body["reason"], "not-whitelisted");
        assert_eq!(
            body["error"],
            "This wallet is not authorized to access this page"
        );

        let (_, body) = send(&app, Method::GET, "/access-denied", &[], None).await;
        assert_eq!(body, json!({"success": false, "error": "Access denied"}));
    }
}
