use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractor::CurrentUser,
    error::ApiError,
    response::ApiSuccess,
    state::AppState,
};

use super::{
    dto::{PublicUser, UpdateProfileRequest},
    repo,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/profile", get(get_profile).patch(update_profile))
}

#[instrument(skip(state))]
async fn list_users(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let users = repo::list_all(&state.db).await?;
    let users: Vec<PublicUser> = users.into_iter().map(PublicUser::from).collect();
    Ok(ApiSuccess::new(users))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn get_profile(CurrentUser(user): CurrentUser) -> impl axum::response::IntoResponse {
    ApiSuccess::new(PublicUser::from(user))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    if payload.name.is_empty() {
        return Err(ApiError::validation("name", "name cannot be empty"));
    }
    if payload.gender.is_empty() {
        return Err(ApiError::validation("gender", "gender cannot be empty"));
    }

    let updated = repo::update_profile(
        &state.db,
        user.id,
        &payload.name,
        &payload.gender,
        payload.avatar.as_deref(),
    )
    .await?
    .ok_or(ApiError::Unauthenticated)?;

    Ok(ApiSuccess::new(PublicUser::from(updated)))
}
