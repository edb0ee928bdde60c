use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use tracing::instrument;

use crate::{error::ApiError, response::ApiSuccess, state::AppState};

use super::{
    dto::{AuthData, SignInRequest, SignUpRequest, UpdatePasswordRequest},
    extractor::CurrentUser,
    service,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign_up", post(sign_up))
        .route("/sign_in", post(sign_in))
        .route("/updatePassword", post(update_password))
}

#[instrument(skip(state, payload))]
async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, token) = service::sign_up(&state, payload).await?;
    Ok(ApiSuccess::created(AuthData {
        name: user.name,
        token,
    }))
}

#[instrument(skip(state, payload))]
async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, token) = service::sign_in(&state, payload).await?;
    Ok(ApiSuccess::new(AuthData {
        name: user.name,
        token,
    }))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn update_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, token) = service::change_password(&state, &user, payload).await?;
    Ok(ApiSuccess::new(AuthData {
        name: user.name,
        token,
    }))
}
