use serde::{Deserialize, Serialize};

use crate::posts::repo::Post;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub category: Option<String>,
}

/// Only supplied fields are applied; everything else is left as stored.
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub category: Option<String>,
    pub published: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

#[derive(Debug, Serialize)]
pub struct PostsPage {
    pub posts: Vec<Post>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}

/// `ceil(total / limit)` in integer arithmetic; 0 pages for 0 rows.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}
