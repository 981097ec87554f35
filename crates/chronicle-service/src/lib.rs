//! # Chronicle Service
//!
//! Business logic service layer for Chronicle.
//! Orchestrates the document store and the cache for each post operation.

pub mod cache;
pub mod dto;
pub mod post_service;
pub mod post_service_impl;

pub use cache::*;
pub use dto::*;
pub use post_service::*;
pub use post_service_impl::*;
