use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Post, PostWithAuthor};

const LIST_DESC: &str = "SELECT p.id, p.user_id, u.name AS author, p.content, p.photo, p.created_at \
     FROM posts p JOIN users u ON u.id = p.user_id \
     WHERE ($1::text IS NULL OR p.content ILIKE '%' || $1 || '%') \
     ORDER BY p.created_at DESC";

const LIST_ASC: &str = "SELECT p.id, p.user_id, u.name AS author, p.content, p.photo, p.created_at \
     FROM posts p JOIN users u ON u.id = p.user_id \
     WHERE ($1::text IS NULL OR p.content ILIKE '%' || $1 || '%') \
     ORDER BY p.created_at ASC";

pub async fn list(
    db: &PgPool,
    keyword: Option<&str>,
    newest_first: bool,
) -> sqlx::Result<Vec<PostWithAuthor>> {
    let sql = if newest_first { LIST_DESC } else { LIST_ASC };
    sqlx::query_as::<_, PostWithAuthor>(sql)
        .bind(keyword)
        .fetch_all(db)
        .await
}

pub async fn find_with_author(db: &PgPool, id: Uuid) -> sqlx::Result<Option<PostWithAuthor>> {
    sqlx::query_as::<_, PostWithAuthor>(
        "SELECT p.id, p.user_id, u.name AS author, p.content, p.photo, p.created_at \
         FROM posts p JOIN users u ON u.id = p.user_id \
         WHERE p.id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    content: &str,
    photo: Option<&str>,
) -> sqlx::Result<Post> {
    sqlx::query_as::<_, Post>(
        "INSERT INTO posts (user_id, content, photo) VALUES ($1, $2, $3) \
         RETURNING id, user_id, content, photo, created_at",
    )
    .bind(user_id)
    .bind(content)
    .bind(photo)
    .fetch_one(db)
    .await
}

pub async fn update_content(db: &PgPool, id: Uuid, content: &str) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>(
        "UPDATE posts SET content = $2 WHERE id = $1 \
         RETURNING id, user_id, content, photo, created_at",
    )
    .bind(id)
    .bind(content)
    .fetch_optional(db)
    .await
}
