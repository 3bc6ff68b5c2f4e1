use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Set once at creation; sole authority for ownership checks.
    pub author: Uuid,
    pub category: Option<String>,
    pub slug: String,
    pub published: bool,
    pub views: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

const POST_COLUMNS: &str =
    "id, title, content, author, category, slug, published, views, created_at, updated_at";

impl Post {
    pub async fn create(
        db: &PgPool,
        title: &str,
        content: &str,
        author: Uuid,
        category: Option<&str>,
        slug: &str,
    ) -> anyhow::Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (title, content, author, category, slug)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(title)
        .bind(content)
        .bind(author)
        .bind(category)
        .bind(slug)
        .fetch_one(db)
        .await?;
        Ok(post)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(post)
    }

    /// Single-row atomic read-and-bump: every successful fetch counts the
    /// view exactly once, concurrent readers included.
    pub async fn fetch_and_count_view(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET views = views + 1
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(post)
    }

    pub async fn list(
        db: &PgPool,
        category: Option<&str>,
        published: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::boolean IS NULL OR published = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        ))
        .bind(category)
        .bind(published)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn count(
        db: &PgPool,
        category: Option<&str>,
        published: Option<bool>,
    ) -> anyhow::Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM posts
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::boolean IS NULL OR published = $2)
            "#,
        )
        .bind(category)
        .bind(published)
        .fetch_one(db)
        .await?;
        Ok(total)
    }

    /// Persist the mutable fields of an already-loaded post. The slug is
    /// deliberately left untouched: it is derived once at creation.
    pub async fn save(&self, db: &PgPool) -> anyhow::Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET title = $2, content = $3, category = $4, published = $5, updated_at = now()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(self.id)
        .bind(&self.title)
        .bind(&self.content)
        .bind(&self.category)
        .bind(self.published)
        .fetch_one(db)
        .await?;
        Ok(post)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
