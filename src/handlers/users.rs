use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;

use crate::db::models::{UserCredentials, UserWithoutPassword};
use crate::{QuillError, router::QuillState};

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// GET /api/users/{username}
pub async fn get_user(
    State(state): State<QuillState>,
    Path(username): Path<String>,
) -> Result<Json<UserWithoutPassword>, QuillError> {
    Ok(Json(state.users.get_user_by_username(username).await?))
}

/// POST /api/register
pub async fn register(
    State(state): State<QuillState>,
    Json(credentials): Json<UserCredentials>,
) -> Result<impl IntoResponse, QuillError> {
    state.users.register(credentials).await?;
    Ok(StatusCode::CREATED)
}

/// POST /api/login
pub async fn login(
    State(state): State<QuillState>,
    Json(credentials): Json<UserCredentials>,
) -> Result<Json<LoginResponse>, QuillError> {
    let token = state.users.login(credentials).await?;
    Ok(Json(LoginResponse { token }))
}
