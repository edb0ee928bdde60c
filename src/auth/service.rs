use axum::extract::FromRef;
use tracing::{info, warn};

use crate::{
    error::ApiError,
    state::AppState,
    users::{dto::PublicUser, repo, repo_types::User},
};

use super::{
    dto::{SignInRequest, SignUpRequest, UpdatePasswordRequest},
    password::{self, PasswordError},
    token::JwtKeys,
    validate,
};

/// Register a new account and start a session for it.
pub async fn sign_up(
    state: &AppState,
    mut req: SignUpRequest,
) -> Result<(PublicUser, String), ApiError> {
    req.email = req.email.trim().to_lowercase();

    if req.name.is_empty() || req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::validation(
            "body",
            "name, email and password are required",
        ));
    }
    if !validate::is_alphanumeric(&req.name) {
        return Err(ApiError::validation(
            "name",
            "name may only contain letters and digits",
        ));
    }
    if !validate::is_valid_email(&req.email) {
        return Err(ApiError::validation("email", "email format is invalid"));
    }
    let policy = &state.config.password;
    if !validate::password_in_policy(&req.password, policy) {
        return Err(ApiError::validation(
            "password",
            format!(
                "password must be between {} and {} characters",
                policy.min_len, policy.max_len
            ),
        ));
    }

    // Pre-check for a friendlier error; the unique index on email is what
    // actually closes the race.
    if repo::email_taken(&state.db, &req.email).await? {
        warn!(email = %req.email, "sign-up with registered email");
        return Err(ApiError::Conflict("email already registered".into()));
    }

    let hash = hash_on_worker(req.password.clone()).await?;

    let user = match repo::create(&state.db, &req.name, &req.email, &hash).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %req.email, "sign-up lost creation race");
            return Err(ApiError::Conflict("email already registered".into()));
        }
        Err(e) => return Err(e.into()),
    };

    let token = issue_token(state, &user)?;
    info!(user_id = %user.id, "user registered");
    Ok((PublicUser::from(user), token))
}

/// Authenticate an existing account. Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn sign_in(
    state: &AppState,
    mut req: SignInRequest,
) -> Result<(PublicUser, String), ApiError> {
    req.email = req.email.trim().to_lowercase();

    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::validation(
            "body",
            "email and password are required",
        ));
    }

    let creds = match repo::find_credentials_by_email(&state.db, &req.email).await? {
        Some(creds) => creds,
        None => {
            warn!(email = %req.email, "sign-in with unknown email");
            return Err(ApiError::AuthFailed);
        }
    };

    let hash = creds.password_hash.clone();
    let password = req.password.clone();
    let ok = verify_on_worker(password, hash).await?;
    if !ok {
        warn!(user_id = %creds.id, "sign-in with wrong password");
        return Err(ApiError::AuthFailed);
    }

    let user = repo::find_by_id(&state.db, creds.id)
        .await?
        .ok_or(ApiError::AuthFailed)?;
    let token = issue_token(state, &user)?;

    info!(user_id = %user.id, "user signed in");
    Ok((PublicUser::from(user), token))
}

/// Re-hash and persist a new password, then issue a token carrying the bumped
/// epoch. Every token issued before this call is now stale.
pub async fn change_password(
    state: &AppState,
    user: &User,
    req: UpdatePasswordRequest,
) -> Result<(PublicUser, String), ApiError> {
    let policy = &state.config.password;
    if !validate::password_in_policy(&req.password, policy) {
        return Err(ApiError::validation(
            "password",
            format!(
                "password must be between {} and {} characters",
                policy.min_len, policy.max_len
            ),
        ));
    }
    if req.password != req.confirmed_password {
        return Err(ApiError::validation(
            "confirmedPassword",
            "passwords do not match",
        ));
    }

    let hash = hash_on_worker(req.password.clone()).await?;

    let updated = repo::update_password(&state.db, user.id, &hash)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    let token = issue_token(state, &updated)?;
    info!(user_id = %updated.id, "password changed");
    Ok((PublicUser::from(updated), token))
}

fn issue_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    let keys = JwtKeys::from_ref(state);
    keys.sign(user.id, user.token_epoch)
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

// Argon2 is deliberately expensive; keep it off the async workers.
async fn hash_on_worker(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?
        .map_err(ApiError::from)
}

async fn verify_on_worker(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::Empty => ApiError::validation("password", "password cannot be empty"),
            PasswordError::Hash(_) => ApiError::Internal(anyhow::Error::new(e)),
        }
    }
}
