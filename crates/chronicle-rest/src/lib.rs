//! # Chronicle REST
//!
//! REST API layer using Axum for Chronicle.
//! Provides HTTP endpoints for post management and health checks.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
