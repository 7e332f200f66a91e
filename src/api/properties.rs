// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tokenized property endpoints.
//!
//! Listing defaults to active properties; `status=all` lifts the filter.
//! Creation records the caller's claimed wallet as the owner.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;
use uuid::Uuid;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::{
    auth::ClaimedWallet,
    error::ApiError,
    models::{
        blank_as_none,
        property::{parse_price, ValidatedListing},
        ApiResponse, CreatePropertyRequest, Property, PropertyStatus, PropertyType,
        UpdatePropertyRequest,
    },
    query::{self, ListRequest, Window},
    state::AppState,
    storage::StoreError,
};

/// Status value that disables the status filter.
const ALL_STATUSES: &str = "all";

/// Filters accepted by `GET /api/properties`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PropertyListParams {
    /// Case-insensitive substring of title, description or location.
    #[serde(default)]
    pub search: Option<String>,
    /// `active` (default), `pending`, `sold`, `draft` or `all`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>)]
    pub property_type: Option<PropertyType>,
    /// Case-insensitive substring of the location.
    #[serde(default)]
    pub location: Option<String>,
    /// Comma-separated tags; any match is enough.
    #[serde(default)]
    pub tags: Option<String>,
    /// Page size; absent means every remaining item.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<usize>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub offset: Option<usize>,
}

impl PropertyListParams {
    fn into_request(self) -> Result<ListRequest, ApiError> {
        let mut request = ListRequest::new(Window::new(self.limit, self.offset))
            .search(self.search.as_deref())
            .location(self.location.as_deref())
            .tags(self.tags.as_deref());

        match self.status.as_deref().map(str::trim) {
            None | Some("") => {
                request = request.exact("status", PropertyStatus::Active.as_str());
            }
            Some(ALL_STATUSES) => {}
            Some(raw) => {
                let status: PropertyStatus = raw.parse().map_err(ApiError::validation)?;
                request = request.exact("status", status.as_str());
            }
        }
        if let Some(property_type) = self.property_type {
            request = request.exact("property_type", property_type.as_str());
        }
        Ok(request)
    }
}

/// Check the required listing fields in order; the first failure wins.
fn validate_listing(request: &CreatePropertyRequest) -> Result<ValidatedListing, ApiError> {
    let title = request
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .ok_or_else(|| ApiError::validation("Property title is required"))?;

    let location = request
        .location
        .as_deref()
        .map(str::trim)
        .filter(|location| !location.is_empty())
        .ok_or_else(|| ApiError::validation("Property location is required"))?;

    let price = match &request.price {
        Some(Value::String(raw)) => Some(raw.trim().to_string()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    }
    .filter(|raw| parse_price(raw).is_some())
    .ok_or_else(|| ApiError::validation("Valid property price is required"))?;

    let shares = match &request.shares {
        Some(Value::Number(number)) => number.as_u64(),
        Some(Value::String(raw)) => raw.trim().parse::<u64>().ok(),
        _ => None,
    }
    .filter(|shares| *shares > 0)
    .ok_or_else(|| ApiError::validation("Valid number of shares is required"))?;

    Ok(ValidatedListing {
        title: title.to_string(),
        location: location.to_string(),
        price,
        shares,
    })
}

#[utoipa::path(
    get,
    path = "/api/properties",
    tag = "Properties",
    params(PropertyListParams),
    responses(
        (status = 200, description = "Filtered, paginated properties", body = ApiResponse<Vec<Property>>),
        (status = 400, description = "Invalid filter value")
    )
)]
pub async fn list_properties(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PropertyListParams>,
) -> Result<Json<ApiResponse<Vec<Property>>>, ApiError> {
    let request = params.into_request()?;
    let page = query::execute(state.properties.as_ref(), &request)?;
    Ok(Json(ApiResponse::page(page.items, page.total)))
}

#[utoipa::path(
    post,
    path = "/api/properties",
    tag = "Properties",
    request_body = CreatePropertyRequest,
    params(
        ("X-Wallet-Address" = Option<String>, Header, description = "Claimed owner address (or Authorization: Bearer 0x…)")
    ),
    responses(
        (status = 201, description = "Property listed", body = ApiResponse<Property>),
        (status = 400, description = "Missing or invalid field"),
        (status = 401, description = "No wallet address claimed")
    )
)]
pub async fn create_property(
    State(state): State<AppState>,
    claimed: ClaimedWallet,
    ApiJson(request): ApiJson<CreatePropertyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Property>>), ApiError> {
    let listing = validate_listing(&request)?;
    let owner = claimed.require()?;

    let property = Property::list(
        Uuid::new_v4().to_string(),
        &owner,
        listing,
        request,
        Utc::now(),
    );
    let stored = state.properties.insert(&property)?;

    tracing::info!(
        property_id = %stored.id,
        owner = %stored.owner_address,
        shares = stored.shares,
        "Property listed"
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(stored))))
}

#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(("id" = String, Path, description = "Property id")),
    responses(
        (status = 200, description = "Property found", body = ApiResponse<Property>),
        (status = 404, description = "Property not found")
    )
)]
pub async fn get_property(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<ApiResponse<Property>>, ApiError> {
    state
        .properties
        .get(&id)?
        .map(|property| Json(ApiResponse::ok(property)))
        .ok_or_else(|| StoreError::not_found::<Property>(&id).into())
}

#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(("id" = String, Path, description = "Property id")),
    request_body = UpdatePropertyRequest,
    responses(
        (status = 200, description = "Property updated", body = ApiResponse<Property>),
        (status = 400, description = "Update violates a listing invariant"),
        (status = 404, description = "Property not found")
    )
)]
pub async fn update_property(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<UpdatePropertyRequest>,
) -> Result<Json<ApiResponse<Property>>, ApiError> {
    let updated = state.properties.update(&id, &patch)?;
    tracing::info!(property_id = %id, "Property updated");
    Ok(Json(ApiResponse::ok(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(("id" = String, Path, description = "Property id")),
    responses(
        (status = 200, description = "Property deleted"),
        (status = 404, description = "Property not found")
    )
)]
pub async fn delete_property(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.properties.delete(&id)?;
    tracing::info!(property_id = %id, "Property deleted");
    Ok(Json(ApiResponse::done()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{router, tests::send};
    use axum::{http::Method, Router};
    use serde_json::json;

    const OWNER: (&str, &str) = ("x-wallet-address", "0xABC");

    async fn create(app: &Router, payload: Value) -> (StatusCode, Value) {
        send(app, Method::POST, "/api/properties", &[OWNER], Some(payload)).await
    }

    #[tokio::test]
    async fn create_sets_owner_and_share_defaults() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let (status, body) = create(
            &app,
            json!({"title": "A", "location": "X", "price": "100", "shares": 10}),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        let data = &body["data"];
        assert_eq!(data["ownerAddress"], "0xabc");
        assert_eq!(data["availableShares"], 10);
        assert_eq!(data["shares"], 10);
        assert_eq!(data["status"], "active");
        assert_eq!(data["roi"], "0");
    }

    #[tokio::test]
    async fn create_validates_fields_in_order() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let cases = [
            (json!({"location": "X", "price": "1", "shares": 1}), "Property title is required"),
            (json!({"title": " ", "price": "1", "shares": 1}), "Property title is required"),
            (json!({"title": "A", "price": "1", "shares": 1}), "Property location is required"),
            (json!({"title": "A", "location": "X", "price": "0", "shares": 1}), "Valid property price is required"),
            (json!({"title": "A", "location": "X", "price": "abc", "shares": 1}), "Valid property price is required"),
            (json!({"title": "A", "location": "X", "price": "5", "shares": 0}), "Valid number of shares is required"),
            (json!({"title": "A", "location": "X", "price": "5", "shares": -2}), "Valid number of shares is required"),
        ];

        for (payload, expected) in cases {
            let (status, body) = create(&app, payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], expected);
        }
    }

    #[tokio::test]
    async fn create_without_claimed_wallet_is_unauthenticated() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/properties",
            &[],
            Some(json!({"title": "A", "location": "X", "price": "100", "shares": 10})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/properties",
            &[("authorization", "Bearer 0xDEF")],
            Some(json!({"title": "A", "location": "X", "price": 100, "shares": 10})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["ownerAddress"], "0xdef");
    }

    #[tokio::test]
    async fn listing_defaults_to_active_and_filters_after_retrieval() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        for (title, city, tags) in [
            ("Harbor Loft", "Lisbon", vec!["Waterfront", "Pool"]),
            ("City Office", "Porto", vec!["Downtown"]),
            ("Garden House", "Lisbon", vec!["Garden"]),
        ] {
            let (status, _) = create(
                &app,
                json!({"title": title, "location": city, "price": "10", "shares": 5, "tags": tags}),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, body) = send(&app, Method::GET, "/api/properties", &[], None).await;
        assert_eq!(body["total"], 3);
        assert_eq!(body["data"][0]["title"], "Garden House");

        let (_, body) = send(&app, Method::GET, "/api/properties?status=sold", &[], None).await;
        assert_eq!(body, json!({"success": true, "data": [], "total": 0}));

        let (_, body) =
            send(&app, Method::GET, "/api/properties?location=lis&limit=1", &[], None).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (_, body) =
            send(&app, Method::GET, "/api/properties?tags=pool,garden", &[], None).await;
        assert_eq!(body["total"], 2);

        let (_, body) = send(&app, Method::GET, "/api/properties?search=office", &[], None).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["location"], "Porto");

        let (status, _) =
            send(&app, Method::GET, "/api/properties?status=unknown", &[], None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn status_all_lifts_default_filter() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let (_, created) = create(
            &app,
            json!({"title": "A", "location": "X", "price": "100", "shares": 10}),
        )
        .await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/api/properties/{id}"),
            &[],
            Some(json!({"status": "sold"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, active) = send(&app, Method::GET, "/api/properties", &[], None).await;
        assert_eq!(active["total"], 0);
        let (_, all) = send(&app, Method::GET, "/api/properties?status=all", &[], None).await;
        assert_eq!(all["total"], 1);
    }

    #[tokio::test]
    async fn update_enforces_share_invariants() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let (_, created) = create(
            &app,
            json!({"title": "A", "location": "X", "price": "100", "shares": 10}),
        )
        .await;
        let uri = format!("/api/properties/{}", created["data"]["id"].as_str().unwrap());

        let (status, body) =
            send(&app, Method::PATCH, &uri, &[], Some(json!({"availableShares": 11}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) =
            send(&app, Method::PATCH, &uri, &[], Some(json!({"shares": 4}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["availableShares"], 4);

        let (status, body) = send(&app, Method::GET, &uri, &[], None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["shares"], 4);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        for method in [Method::GET, Method::DELETE] {
            let (status, body) = send(&app, method, "/api/properties/nope", &[], None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, json!({"success": false, "error": "Property not found"}));
        }

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/properties/nope",
            &[],
            Some(json!({"title": "B"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
