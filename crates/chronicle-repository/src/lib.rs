//! # Chronicle Repository
//!
//! Document store adapter for Chronicle:
//!
//! ```text
//! Service
//!   ↓  Arc<dyn PostRepository>   (store interface)
//! PgPostRepository               (Postgres / SQLx)
//!   ↓
//! Postgres
//! ```
//!
//! The store owns persistence semantics: identifier uniqueness through the
//! primary key, and atomic find-and-replace / find-and-remove through
//! single `RETURNING` statements.

pub mod pool;
pub mod postgres;
pub mod traits;

pub use pool::*;
pub use postgres::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chronicle_core::{ChronicleResult, Post, PostId, PostPatch};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory repository used to pin down the store contract.
    struct InMemoryPostRepository {
        posts: Mutex<HashMap<PostId, Post>>,
    }

    impl InMemoryPostRepository {
        fn new() -> Self {
            Self {
                posts: Mutex::new(HashMap::new()),
            }
        }

        fn with_posts(posts: Vec<Post>) -> Self {
            let repo = Self::new();
            for post in posts {
                repo.posts.lock().unwrap().insert(post.id, post);
            }
            repo
        }
    }

    #[async_trait]
    impl PostRepository for InMemoryPostRepository {
        async fn create(&self, post: &Post) -> ChronicleResult<Post> {
            self.posts.lock().unwrap().insert(post.id, post.clone());
            Ok(post.clone())
        }

        async fn find_all(&self) -> ChronicleResult<Vec<Post>> {
            let mut posts: Vec<Post> = self.posts.lock().unwrap().values().cloned().collect();
            posts.sort_by_key(|p| p.created_at);
            Ok(posts)
        }

        async fn find_by_id(&self, id: PostId) -> ChronicleResult<Option<Post>> {
            Ok(self.posts.lock().unwrap().get(&id).cloned())
        }

        async fn replace(&self, id: PostId, patch: &PostPatch) -> ChronicleResult<Option<Post>> {
            let mut posts = self.posts.lock().unwrap();
            match posts.get_mut(&id) {
                Some(post) => {
                    post.apply_patch(patch);
                    Ok(Some(post.clone()))
                }
                None => Ok(None),
            }
        }

        async fn remove(&self, id: PostId) -> ChronicleResult<Option<Post>> {
            Ok(self.posts.lock().unwrap().remove(&id))
        }
    }

    fn create_test_post(title: &str) -> Post {
        Post::new(
            title.to_string(),
            format!("{} content", title),
            "tester".to_string(),
        )
    }

    #[tokio::test]
    async fn test_create_and_find_by_id() {
        let repo = InMemoryPostRepository::new();
        let post = create_test_post("hello");
        let post_id = post.id;

        repo.create(&post).await.unwrap();

        let found = repo.find_by_id(post_id).await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().title, "hello");
    }

    #[tokio::test]
    async fn test_find_by_id_not_found() {
        let repo = InMemoryPostRepository::new();
        let result = repo.find_by_id(PostId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_find_all_empty() {
        let repo = InMemoryPostRepository::new();
        let posts = repo.find_all().await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_find_all_returns_every_post() {
        let posts = vec![
            create_test_post("one"),
            create_test_post("two"),
            create_test_post("three"),
        ];
        let repo = InMemoryPostRepository::with_posts(posts);

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_replace_applies_partial_patch() {
        let post = create_test_post("original");
        let post_id = post.id;
        let repo = InMemoryPostRepository::with_posts(vec![post]);

        let patch = PostPatch {
            title: Some("patched".to_string()),
            ..PostPatch::default()
        };
        let updated = repo.replace(post_id, &patch).await.unwrap().unwrap();

        assert_eq!(updated.title, "patched");
        assert_eq!(updated.content, "original content");

        let found = repo.find_by_id(post_id).await.unwrap().unwrap();
        assert_eq!(found.title, "patched");
    }

    #[tokio::test]
    async fn test_replace_missing_returns_none() {
        let repo = InMemoryPostRepository::new();
        let patch = PostPatch {
            title: Some("patched".to_string()),
            ..PostPatch::default()
        };
        let result = repo.replace(PostId::new(), &patch).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_remove_returns_removed_post() {
        let post = create_test_post("doomed");
        let post_id = post.id;
        let repo = InMemoryPostRepository::with_posts(vec![post]);

        let removed = repo.remove(post_id).await.unwrap();
        assert!(removed.is_some());
        assert_eq!(removed.unwrap().title, "doomed");

        assert!(repo.find_by_id(post_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_twice_returns_none_second_time() {
        let post = create_test_post("once");
        let post_id = post.id;
        let repo = InMemoryPostRepository::with_posts(vec![post]);

        assert!(repo.remove(post_id).await.unwrap().is_some());
        assert!(repo.remove(post_id).await.unwrap().is_none());
    }
}
