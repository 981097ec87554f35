//! Postgres repository implementations.

mod post_repository;

pub use post_repository::*;
