use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Credentials, User};

// Default projection; the hash is only read by `find_credentials_by_email`.
const USER_COLUMNS: &str = "id, name, email, gender, avatar, token_epoch, created_at";

pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(db).await
}

pub async fn email_taken(db: &PgPool, email: &str) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(db)
        .await
}

pub async fn find_credentials_by_email(
    db: &PgPool,
    email: &str,
) -> sqlx::Result<Option<Credentials>> {
    sqlx::query_as::<_, Credentials>("SELECT id, password_hash FROM users WHERE email = $1")
    .bind(email)
    .fetch_optional(db)
    .await
}

pub async fn create(
    db: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> sqlx::Result<User> {
    let sql = format!(
        "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) \
         RETURNING {USER_COLUMNS}"
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
}

pub async fn list_all(db: &PgPool) -> sqlx::Result<Vec<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
    sqlx::query_as::<_, User>(&sql).fetch_all(db).await
}

pub async fn update_profile(
    db: &PgPool,
    id: Uuid,
    name: &str,
    gender: &str,
    avatar: Option<&str>,
) -> sqlx::Result<Option<User>> {
    let sql = format!(
        "UPDATE users SET name = $2, gender = $3, avatar = COALESCE($4, avatar) \
         WHERE id = $1 RETURNING {USER_COLUMNS}"
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .bind(name)
        .bind(gender)
        .bind(avatar)
        .fetch_optional(db)
        .await
}

/// Replace the stored hash and bump the token epoch, invalidating every
/// previously issued token for this user.
pub async fn update_password(
    db: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> sqlx::Result<Option<User>> {
    let sql = format!(
        "UPDATE users SET password_hash = $2, token_epoch = token_epoch + 1 \
         WHERE id = $1 RETURNING {USER_COLUMNS}"
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .bind(password_hash)
        .fetch_optional(db)
        .await
}
