//! Application state for Axum handlers.

use chronicle_service::PostService;
use shaku::HasComponent;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub post_service: Arc<dyn PostService>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(post_service: Arc<dyn PostService>) -> Self {
        Self { post_service }
    }

    /// Creates application state by resolving services from a DI module.
    pub fn from_module<M>(module: &M) -> Self
    where
        M: HasComponent<dyn PostService>,
    {
        Self {
            post_service: module.resolve(),
        }
    }
}
