// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User administration endpoints.
//!
//! The wallet address is the user's identity key: registration rejects a
//! second account for the same address regardless of letter case.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::{
    error::ApiError,
    models::{
        blank_as_none, ApiResponse, CreateUserRequest, KycStatus, UpdateUserRequest, User,
        UserRole, UserStatus, WalletAddress,
    },
    query::{self, ExactMatch, ListRequest, StoreQuery, Window},
    state::AppState,
    storage::{ResourceStore, StoreError, StoreResult},
};

/// Filters accepted by `GET /api/users`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserListParams {
    /// Case-insensitive substring of display name, email, wallet address or location.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>)]
    pub status: Option<UserStatus>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>)]
    pub role: Option<UserRole>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>)]
    pub kyc_status: Option<KycStatus>,
    /// Page size; absent means every remaining item.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<usize>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub offset: Option<usize>,
}

impl UserListParams {
    fn into_request(self) -> ListRequest {
        let mut request = ListRequest::new(Window::new(self.limit, self.offset))
            .search(self.search.as_deref());
        if let Some(status) = self.status {
            request = request.exact("status", status.as_str());
        }
        if let Some(role) = self.role {
            request = request.exact("role", role.as_str());
        }
        if let Some(kyc) = self.kyc_status {
            request = request.exact("kyc_status", kyc.as_str());
        }
        request
    }
}

/// Look a user up by (case-insensitive) wallet address.
fn find_by_address(
    store: &dyn ResourceStore<User>,
    address: &WalletAddress,
) -> StoreResult<Option<User>> {
    let page = store.list(&StoreQuery {
        conditions: vec![ExactMatch::new(
            "wallet_address",
            address.normalized().as_str(),
        )],
        window: Window::new(Some(1), None),
    })?;
    Ok(page.items.into_iter().next())
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    params(UserListParams),
    responses(
        (status = 200, description = "Filtered, paginated users", body = ApiResponse<Vec<User>>),
        (status = 400, description = "Invalid filter value")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserListParams>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let page = query::execute(state.users.as_ref(), &params.into_request())?;
    Ok(Json(ApiResponse::page(page.items, page.total)))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<User>),
        (status = 400, description = "Missing or malformed wallet address"),
        (status = 409, description = "Wallet address already registered")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let address = request
        .wallet_address
        .as_deref()
        .map(str::trim)
        .map(WalletAddress::from)
        .filter(WalletAddress::has_hex_prefix)
        .ok_or_else(|| ApiError::validation("Valid wallet address is required"))?
        .normalized();

    if find_by_address(state.users.as_ref(), &address)?.is_some() {
        tracing::info!(wallet = %address, "Rejected duplicate user registration");
        return Err(ApiError::conflict(
            "User with this wallet address already exists",
        ));
    }

    let user = User::register(Uuid::new_v4().to_string(), &address, request, Utc::now());
    let stored = state.users.insert(&user)?;

    tracing::info!(user_id = %stored.id, wallet = %stored.wallet_address, "User registered");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(stored))))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User id or 0x wallet address")),
    responses(
        (status = 200, description = "User found", body = ApiResponse<User>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let address = WalletAddress::from(id.as_str());
    let user = if address.has_hex_prefix() {
        find_by_address(state.users.as_ref(), &address)?
    } else {
        state.users.get(&id)?
    };

    user.map(|user| Json(ApiResponse::ok(user)))
        .ok_or_else(|| StoreError::not_found::<User>(&id).into())
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<User>),
        (status = 400, description = "Invalid update"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let updated = state.users.update(&id, &patch)?;
    tracing::info!(user_id = %id, "User updated");
    Ok(Json(ApiResponse::ok(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.users.delete(&id)?;
    tracing::info!(user_id = %id, "User deleted");
    Ok(Json(ApiResponse::done()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{router, tests::send};
    use axum::http::Method;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn create_applies_defaults_and_lowercases_address() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/users",
            &[],
            Some(json!({"walletAddress": "0xAbCdEf"})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let user = &body["data"];
        assert_eq!(body["success"], true);
        assert_eq!(user["walletAddress"], "0xabcdef");
        assert_eq!(user["status"], "pending");
        assert_eq!(user["role"], "user");
        assert_eq!(user["kycStatus"], "pending");
        assert_eq!(user["displayName"], "Unknown User");
        assert_eq!(user["totalInvestments"], "0.0");
        assert_eq!(user["propertiesOwned"], 0);
        assert_eq!(
            user["notifications"],
            json!({"email": true, "sms": false, "push": true})
        );
    }

    #[tokio::test]
    async fn create_requires_hex_address() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        for payload in [json!({}), json!({"walletAddress": "abc"})] {
            let (status, body) =
                send(&app, Method::POST, "/api/users", &[], Some(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Valid wallet address is required");
        }
    }

    #[tokio::test]
    async fn addresses_differing_only_in_case_conflict() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let (first, _) = send(
            &app,
            Method::POST,
            "/api/users",
            &[],
            Some(json!({"walletAddress": "0xABC"})),
        )
        .await;
        assert_eq!(first, StatusCode::CREATED);

        let (second, body) = send(
            &app,
            Method::POST,
            "/api/users",
            &[],
            Some(json!({"walletAddress": "0xabc"})),
        )
        .await;
        assert_eq!(second, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "User with this wallet address already exists");
    }

    #[tokio::test]
    async fn list_filters_searches_and_paginates() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        for (address, name) in [("0x01", "Alice"), ("0x02", "Bob"), ("0x03", "Alicia")] {
            send(
                &app,
                Method::POST,
                "/api/users",
                &[],
                Some(json!({"walletAddress": address, "displayName": name})),
            )
            .await;
        }

        let (status, body) = send(&app, Method::GET, "/api/users?search=ALI", &[], None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);

        let (_, body) = send(&app, Method::GET, "/api/users?limit=2&offset=2", &[], None).await;
        assert_eq!(body["total"], 3);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (_, body) = send(&app, Method::GET, "/api/users?status=active", &[], None).await;
        assert_eq!(body, json!({"success": true, "data": [], "total": 0}));

        let (status, _) = send(&app, Method::GET, "/api/users?status=bogus", &[], None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_update_and_delete_by_id() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let (_, created) = send(
            &app,
            Method::POST,
            "/api/users",
            &[],
            Some(json!({"walletAddress": "0xFeed"})),
        )
        .await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (status, by_address) = send(&app, Method::GET, "/api/users/0xFEED", &[], None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_address["data"]["id"], id.as_str());

        let (status, updated) = send(
            &app,
            Method::PATCH,
            &format!("/api/users/{id}"),
            &[],
            Some(json!({"status": "active", "notifications": {"sms": true}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["status"], "active");
        assert_eq!(
            updated["data"]["notifications"],
            json!({"email": true, "sms": true, "push": true})
        );

        let (status, _) = send(&app, Method::DELETE, &format!("/api/users/{id}"), &[], None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body): (StatusCode, Value) =
            send(&app, Method::DELETE, &format!("/api/users/{id}"), &[], None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"success": false, "error": "User not found"}));
    }
}
