//! Cache key generators for consistent key naming.

use chronicle_core::PostId;

/// Cache key for the full post collection.
pub const POSTS_COLLECTION: &str = "posts";

/// Generate a cache key for a post by ID.
#[must_use]
pub fn post_by_id(id: PostId) -> String {
    format!("post:{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_key() {
        assert_eq!(POSTS_COLLECTION, "posts");
    }

    #[test]
    fn test_post_by_id_key() {
        let id = PostId::new();
        let key = post_by_id(id);
        assert_eq!(key, format!("post:{}", id));
        assert!(key.starts_with("post:"));
    }
}
