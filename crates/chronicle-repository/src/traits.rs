//! Repository trait definitions.

use async_trait::async_trait;
use chronicle_core::{ChronicleResult, Interface, Post, PostId, PostPatch};

/// Post repository trait: the document store contract.
///
/// `replace` and `remove` are atomic find-and-modify operations; both
/// return `None` when no record matched the identifier.
#[async_trait]
pub trait PostRepository: Interface + Send + Sync {
    /// Persists a new post and returns the stored record.
    async fn create(&self, post: &Post) -> ChronicleResult<Post>;

    /// Returns all posts.
    async fn find_all(&self) -> ChronicleResult<Vec<Post>>;

    /// Finds a post by ID.
    async fn find_by_id(&self, id: PostId) -> ChronicleResult<Option<Post>>;

    /// Atomically applies a patch to the matching post and returns the new
    /// value, or `None` if no post matched.
    async fn replace(&self, id: PostId, patch: &PostPatch) -> ChronicleResult<Option<Post>>;

    /// Atomically removes the matching post and returns the removed value,
    /// or `None` if no post matched.
    async fn remove(&self, id: PostId) -> ChronicleResult<Option<Post>>;
}
