//! Post service trait definition.

use crate::dto::{CreatePostRequest, PostResponse, UpdatePostRequest};
use async_trait::async_trait;
use chronicle_core::{ChronicleResult, Interface, PostId};

/// Post service trait.
///
/// Each operation keeps the cache consistent with the store: reads populate
/// cache entries lazily, writes evict the entries they make stale.
#[async_trait]
pub trait PostService: Interface + Send + Sync {
    /// Creates a new post and invalidates the collection cache key.
    async fn create_post(&self, request: CreatePostRequest) -> ChronicleResult<PostResponse>;

    /// Lists all posts, serving from the collection cache entry when present.
    async fn list_posts(&self) -> ChronicleResult<Vec<PostResponse>>;

    /// Gets a post by ID, serving from its cache entry when present.
    async fn get_post(&self, id: PostId) -> ChronicleResult<PostResponse>;

    /// Applies a partial update to a post and evicts its stale cache entries.
    async fn update_post(
        &self,
        id: PostId,
        request: UpdatePostRequest,
    ) -> ChronicleResult<PostResponse>;

    /// Deletes a post and evicts its stale cache entries.
    async fn delete_post(&self, id: PostId) -> ChronicleResult<()>;
}
