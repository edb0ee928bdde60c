use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::{error::ApiError, state::AppState, users::repo, users::repo_types::User};

use super::token::JwtKeys;

/// Authenticated request identity. Resolving this extractor verifies the
/// bearer token, loads the user it names and checks the token epoch; handlers
/// taking it never run for unauthenticated requests.
pub struct CurrentUser(pub User);

/// A token minted before the most recent password change carries an older
/// epoch than the record and must be rejected.
fn epoch_is_stale(record: i64, claimed: i64) -> bool {
    record != claimed
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthenticated)?;

        let keys = JwtKeys::from_ref(state);
        // The client gets the same generic 401 for malformed, forged and
        // expired tokens; the distinction only reaches the logs.
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            ApiError::Unauthenticated
        })?;

        let user = repo::find_by_id(&state.db, claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token subject no longer exists");
                ApiError::Unauthenticated
            })?;

        if epoch_is_stale(user.token_epoch, claims.epoch) {
            warn!(user_id = %user.id, "token epoch is stale");
            return Err(ApiError::Unauthenticated);
        }

        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use axum::{body::Body, http::Request, http::StatusCode, routing::get, Router};
    use http_body_util::BodyExt;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::auth::token::Claims;

    fn protected_app_with(state: AppState, hit: Arc<AtomicBool>) -> Router {
        Router::new()
            .route(
                "/protected",
                get(move |CurrentUser(_): CurrentUser| {
                    let hit = hit.clone();
                    async move {
                        hit.store(true, Ordering::SeqCst);
                        "ok"
                    }
                }),
            )
            .with_state(state)
    }

    fn protected_app(hit: Arc<AtomicBool>) -> Router {
        protected_app_with(AppState::fake(), hit)
    }

    #[test]
    fn epoch_staleness() {
        assert!(!epoch_is_stale(0, 0));
        assert!(!epoch_is_stale(3, 3));
        assert!(epoch_is_stale(1, 0));
        assert!(epoch_is_stale(0, 1));
    }

    async fn request_with_auth(app: Router, auth: Option<&str>) -> axum::response::Response {
        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        app.oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn missing_header_is_401_and_handler_never_runs() {
        let hit = Arc::new(AtomicBool::new(false));
        let resp = request_with_auth(protected_app(hit.clone()), None).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(!hit.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn garbage_token_is_401_and_handler_never_runs() {
        let hit = Arc::new(AtomicBool::new(false));
        let resp = request_with_auth(protected_app(hit.clone()), Some("Bearer garbage")).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(!hit.load(Ordering::SeqCst));

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_401() {
        let hit = Arc::new(AtomicBool::new(false));
        let resp = request_with_auth(protected_app(hit.clone()), Some("Basic abc")).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(!hit.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn expired_token_is_401_with_generic_message() {
        // Signed with the fake state's secret but already expired; rejected
        // before any database access.
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: (now - 7200) as usize,
            exp: (now - 3600) as usize,
            epoch: 0,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let hit = Arc::new(AtomicBool::new(false));
        let resp = request_with_auth(
            protected_app(hit.clone()),
            Some(&format!("Bearer {token}")),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(!hit.load(Ordering::SeqCst));

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        // No hint of why the token failed.
        assert_eq!(json["message"], "authentication required");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn password_change_invalidates_earlier_tokens(db: sqlx::PgPool) {
        let state = AppState::with_db(db.clone());
        let user = repo::create(&db, "alice1", "a@x.com", "hash-before-change")
            .await
            .unwrap();
        let token = JwtKeys::from_ref(&state)
            .sign(user.id, user.token_epoch)
            .expect("sign");
        let auth = format!("Bearer {token}");

        let hit = Arc::new(AtomicBool::new(false));
        let resp = request_with_auth(
            protected_app_with(state.clone(), hit.clone()),
            Some(&auth),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(hit.load(Ordering::SeqCst));

        // Changing the password bumps the epoch; the old token now carries a
        // stale one.
        repo::update_password(&db, user.id, "hash-after-change")
            .await
            .unwrap()
            .expect("user exists");

        hit.store(false, Ordering::SeqCst);
        let resp = request_with_auth(protected_app_with(state, hit.clone()), Some(&auth)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(!hit.load(Ordering::SeqCst));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn token_for_deleted_user_is_rejected(db: sqlx::PgPool) {
        let state = AppState::with_db(db.clone());
        let user = repo::create(&db, "bob1", "b@x.com", "some-hash").await.unwrap();
        let token = JwtKeys::from_ref(&state)
            .sign(user.id, user.token_epoch)
            .expect("sign");
        let auth = format!("Bearer {token}");

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(&db)
            .await
            .unwrap();

        let hit = Arc::new(AtomicBool::new(false));
        let resp = request_with_auth(protected_app_with(state, hit.clone()), Some(&auth)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(!hit.load(Ordering::SeqCst));
    }
}
