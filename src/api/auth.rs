//! Registration and login endpoints

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::user::{LoginRequest, RegisterRequest},
};

/// Session token response
#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    /// Bearer token (HS256 JWT)
    pub token: String,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email is already registered")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    WithRejection(Json(request), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    let token = state.services.users.register(request).await?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, AppError>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .services
        .users
        .authenticate(&request.email, &request.password)
        .await?;
    Ok(Json(TokenResponse { token }))
}
