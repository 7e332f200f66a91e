// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::whitelist_gate,
    error::ApiError,
    models::{
        Coordinates, CoordinatesPatch, CreatePropertyRequest, CreateUserRequest,
        KycStatus, NotificationPreferences, NotificationPreferencesPatch, Property,
        PropertyStatus, PropertyType, SocialLinks, SocialLinksPatch, UpdatePropertyRequest,
        UpdateUserRequest, User, UserRole, UserStatus, WalletAddress,
    },
    state::AppState,
};

pub mod extract;
pub mod health;
pub mod properties;
pub mod session;
pub mod users;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/properties",
            get(properties::list_properties).post(properties::create_property),
        )
        .route(
            "/properties/{id}",
            get(properties::get_property)
                .put(properties::update_property)
                .patch(properties::update_property)
                .delete(properties::delete_property),
        );

    let gate = state.gate.clone();

    Router::new()
        .nest("/api", api_routes)
        .route(
            "/session/wallet",
            post(session::connect_wallet).delete(session::disconnect_wallet),
        )
        .route("/access-denied", get(session::access_denied))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .fallback(not_found)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(gate, whitelist_gate))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        properties::list_properties,
        properties::create_property,
        properties::get_property,
        properties::update_property,
        properties::delete_property,
        session::connect_wallet,
        session::disconnect_wallet,
        session::access_denied,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            User,
            UserStatus,
            UserRole,
            KycStatus,
            SocialLinks,
            SocialLinksPatch,
            NotificationPreferences,
            NotificationPreferencesPatch,
            CreateUserRequest,
            UpdateUserRequest,
            Property,
            PropertyStatus,
            PropertyType,
            Coordinates,
            CoordinatesPatch,
            CreatePropertyRequest,
            UpdatePropertyRequest,
            WalletAddress,
            session::ConnectWalletRequest,
            session::AccessDeniedResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Users", description = "Platform user administration"),
        (name = "Properties", description = "Tokenized property listings"),
        (name = "Session", description = "Wallet cookie and access-denied target"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
