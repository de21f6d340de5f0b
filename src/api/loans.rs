//! Borrow and return endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::borrowing::{BorrowRequest, Borrowing, ReturnRequest},
};

use super::AuthenticatedUser;

/// Borrow response
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    /// Status message
    pub message: String,
    /// One borrowing per requested book
    pub borrowings: Vec<Borrowing>,
}

/// Return response
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Status message
    pub message: String,
    /// Number of borrowings closed
    pub returned: u64,
}

/// Borrow books for the authenticated user
#[utoipa::path(
    post,
    path = "/myaccount/users/{user_id}/borrow",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i32, Path, description = "User ID, must be the caller")
    ),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Books borrowed", body = BorrowResponse),
        (status = 400, description = "Empty request, book not available or borrowing limit exceeded"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the caller's account"),
        (status = 404, description = "User or book not found")
    )
)]
pub async fn borrow_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
    WithRejection(Json(request), _): WithRejection<Json<BorrowRequest>, AppError>,
) -> AppResult<(StatusCode, Json<BorrowResponse>)> {
    let borrowings = state
        .services
        .loans
        .borrow_books(&claims, user_id, request.book_ids)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BorrowResponse {
            message: "Books borrowed successfully".to_string(),
            borrowings,
        }),
    ))
}

/// Return books held by the authenticated user
#[utoipa::path(
    post,
    path = "/myaccount/users/{user_id}/return",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i32, Path, description = "User ID, must be the caller")
    ),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Books returned", body = ReturnResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the caller's account")
    )
)]
pub async fn return_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
    WithRejection(Json(request), _): WithRejection<Json<ReturnRequest>, AppError>,
) -> AppResult<Json<ReturnResponse>> {
    let returned = state
        .services
        .loans
        .return_books(&claims, user_id, request.book_ids)
        .await?;

    Ok(Json(ReturnResponse {
        message: "Books returned successfully".to_string(),
        returned,
    }))
}
