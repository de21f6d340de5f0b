//! User account endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{DeleteAccountRequest, UserProfile},
};

use super::AuthenticatedUser;

/// Generic status message
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Get a user's public profile
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserProfile),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<UserProfile>> {
    let profile = state.services.users.get_profile(user_id).await?;
    Ok(Json(profile))
}

/// Delete the caller's own account, returning every borrowed book first
#[utoipa::path(
    delete,
    path = "/myaccount/users/{user_id}/delete",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i32, Path, description = "User ID, must be the caller")
    ),
    request_body = DeleteAccountRequest,
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Invalid password"),
        (status = 403, description = "Not the caller's account"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Failed to delete user")
    )
)]
pub async fn delete_account(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
    body: Result<Json<DeleteAccountRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    // Ownership is checked before the body is parsed
    claims.require_self(user_id, "delete account")?;
    let Json(request) = body?;

    state
        .services
        .users
        .delete_account(&claims, user_id, &request.password)
        .await?;

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}
