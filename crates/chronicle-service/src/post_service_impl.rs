//! Post service implementations.

use crate::cache::{cache_keys, CacheExt, CacheInterface, DEFAULT_TTL};
use crate::dto::{CreatePostRequest, PostResponse, UpdatePostRequest};
use crate::post_service::PostService;
use async_trait::async_trait;
use chronicle_core::{ChronicleError, ChronicleResult, Post, PostId, ValidateExt};
use chronicle_repository::PostRepository;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Generic post service implementation.
///
/// Adapters are injected at construction time so tests can substitute fakes.
pub struct PostServiceImpl<R: PostRepository + ?Sized> {
    post_repository: Arc<R>,
    cache: Arc<dyn CacheInterface>,
}

impl<R: PostRepository + ?Sized> PostServiceImpl<R> {
    /// Creates a new post service.
    pub fn new(post_repository: Arc<R>, cache: Arc<dyn CacheInterface>) -> Self {
        Self {
            post_repository,
            cache,
        }
    }

    /// Cache reads are best-effort: a failure degrades to a store read.
    async fn cache_get<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        match self.cache.get::<T>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    "Cache read failed for key '{}', falling back to store: {}",
                    key, e
                );
                None
            }
        }
    }

    async fn invalidate_collection(&self) {
        if let Err(e) = self.cache.delete(cache_keys::POSTS_COLLECTION).await {
            warn!("Failed to invalidate collection cache: {}", e);
        }
    }

    async fn invalidate_post(&self, id: PostId) {
        if let Err(e) = self.cache.delete(&cache_keys::post_by_id(id)).await {
            warn!("Failed to invalidate cache for post {}: {}", id, e);
        }
        self.invalidate_collection().await;
    }
}

#[async_trait]
impl<R: PostRepository + ?Sized + 'static> PostService for PostServiceImpl<R> {
    async fn create_post(&self, request: CreatePostRequest) -> ChronicleResult<PostResponse> {
        debug!("Creating post: {}", request.title);

        request.validate_request()?;

        let post = Post::new(request.title, request.content, request.author);
        let created = self.post_repository.create(&post).await?;

        // The next listing must reflect the new post.
        self.invalidate_collection().await;

        info!("Post created: {}", created.id);
        Ok(PostResponse::from(created))
    }

    async fn list_posts(&self) -> ChronicleResult<Vec<PostResponse>> {
        debug!("Listing posts");

        if let Some(cached) = self
            .cache_get::<Vec<PostResponse>>(cache_keys::POSTS_COLLECTION)
            .await
        {
            debug!("Cache hit for post collection");
            return Ok(cached);
        }

        let posts = self.post_repository.find_all().await?;
        let response: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();

        let _ = self
            .cache
            .set(cache_keys::POSTS_COLLECTION, &response, DEFAULT_TTL)
            .await;

        Ok(response)
    }

    async fn get_post(&self, id: PostId) -> ChronicleResult<PostResponse> {
        debug!("Getting post: {}", id);

        let cache_key = cache_keys::post_by_id(id);

        if let Some(cached) = self.cache_get::<PostResponse>(&cache_key).await {
            debug!("Cache hit for post: {}", id);
            return Ok(cached);
        }

        let post = self
            .post_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ChronicleError::not_found("Post", id))?;

        let response = PostResponse::from(post);
        let _ = self.cache.set(&cache_key, &response, DEFAULT_TTL).await;

        Ok(response)
    }

    async fn update_post(
        &self,
        id: PostId,
        request: UpdatePostRequest,
    ) -> ChronicleResult<PostResponse> {
        debug!("Updating post: {}", id);

        request.validate_request()?;

        let patch = request.into_patch();
        if patch.is_empty() {
            return Err(ChronicleError::validation(
                "At least one field must be provided",
            ));
        }

        let updated = self
            .post_repository
            .replace(id, &patch)
            .await?
            .ok_or_else(|| ChronicleError::not_found("Post", id))?;

        // Evict rather than overwrite so a concurrent reader cannot pin a
        // stale value into the cache.
        self.invalidate_post(id).await;

        info!("Post updated: {}", id);
        Ok(PostResponse::from(updated))
    }

    async fn delete_post(&self, id: PostId) -> ChronicleResult<()> {
        debug!("Deleting post: {}", id);

        let removed = self.post_repository.remove(id).await?;
        if removed.is_none() {
            return Err(ChronicleError::not_found("Post", id));
        }

        self.invalidate_post(id).await;

        info!("Post deleted: {}", id);
        Ok(())
    }
}

impl<R: PostRepository + ?Sized> std::fmt::Debug for PostServiceImpl<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostServiceImpl").finish_non_exhaustive()
    }
}

/// Concrete post service component for Shaku DI.
///
/// This component uses dependency injection to receive its dependencies,
/// providing compile-time verified DI through Shaku.
#[derive(Component)]
#[shaku(interface = PostService)]
pub struct PostServiceComponent {
    #[shaku(inject)]
    post_repository: Arc<dyn PostRepository>,
    #[shaku(inject)]
    cache: Arc<dyn CacheInterface>,
}

impl PostServiceComponent {
    /// Builds the orchestration service from the injected adapters.
    fn service(&self) -> PostServiceImpl<dyn PostRepository> {
        PostServiceImpl::new(Arc::clone(&self.post_repository), Arc::clone(&self.cache))
    }
}

#[async_trait]
impl PostService for PostServiceComponent {
    async fn create_post(&self, request: CreatePostRequest) -> ChronicleResult<PostResponse> {
        self.service().create_post(request).await
    }

    async fn list_posts(&self) -> ChronicleResult<Vec<PostResponse>> {
        self.service().list_posts().await
    }

    async fn get_post(&self, id: PostId) -> ChronicleResult<PostResponse> {
        self.service().get_post(id).await
    }

    async fn update_post(
        &self,
        id: PostId,
        request: UpdatePostRequest,
    ) -> ChronicleResult<PostResponse> {
        self.service().update_post(id, request).await
    }

    async fn delete_post(&self, id: PostId) -> ChronicleResult<()> {
        self.service().delete_post(id).await
    }
}

impl std::fmt::Debug for PostServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostServiceComponent").finish_non_exhaustive()
    }
}
