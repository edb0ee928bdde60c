use serde::Deserialize;

/// Query string of `GET /posts`.
#[derive(Debug, Default, Deserialize)]
pub struct PostQuery {
    pub keyword: Option<String>,
    /// `asc` for oldest-first; anything else (or absent) is newest-first.
    pub sort: Option<String>,
}

impl PostQuery {
    pub fn newest_first(&self) -> bool {
        !matches!(self.sort.as_deref(), Some("asc"))
    }
}

/// Body of `POST /posts`.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub content: String,
    pub photo: Option<String>,
}

/// Body of `PATCH /posts/:id`.
#[derive(Debug, Deserialize)]
pub struct EditPostRequest {
    #[serde(default)]
    pub content: String,
}
