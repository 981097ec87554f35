//! Postgres post repository implementation.

use crate::{traits::PostRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chronicle_core::{ChronicleResult, Post, PostId, PostPatch};
use chrono::{DateTime, Utc};
use shaku::Component;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Postgres post repository implementation.
#[derive(Component, Clone)]
#[shaku(interface = PostRepository)]
pub struct PgPostRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgPostRepository {
    /// Creates a new Postgres post repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a post.
#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    content: String,
    author: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: PostId::from_uuid(row.id),
            title: row.title,
            content: row.content,
            author: row.author,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create(&self, post: &Post) -> ChronicleResult<Post> {
        debug!("Inserting post: {}", post.id);

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, title, content, author, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, content, author, created_at, updated_at
            "#,
        )
        .bind(post.id.into_inner())
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(self.pool.inner())
        .await?;

        Ok(row.into())
    }

    async fn find_all(&self) -> ChronicleResult<Vec<Post>> {
        debug!("Finding all posts");

        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, content, author, created_at, updated_at
            FROM posts
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_by_id(&self, id: PostId) -> ChronicleResult<Option<Post>> {
        debug!("Finding post by id: {}", id);

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, content, author, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(Post::from))
    }

    async fn replace(&self, id: PostId, patch: &PostPatch) -> ChronicleResult<Option<Post>> {
        debug!("Replacing post: {}", id);

        // Single statement so find-and-replace is atomic; absent patch
        // fields fall through to the current column values.
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                author = COALESCE($4, author),
                updated_at = $5
            WHERE id = $1
            RETURNING id, title, content, author, created_at, updated_at
            "#,
        )
        .bind(id.into_inner())
        .bind(patch.title.as_deref())
        .bind(patch.content.as_deref())
        .bind(patch.author.as_deref())
        .bind(Utc::now())
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(Post::from))
    }

    async fn remove(&self, id: PostId) -> ChronicleResult<Option<Post>> {
        debug!("Removing post: {}", id);

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            DELETE FROM posts
            WHERE id = $1
            RETURNING id, title, content, author, created_at, updated_at
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(Post::from))
    }
}
