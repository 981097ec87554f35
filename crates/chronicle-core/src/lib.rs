//! # Chronicle Core
//!
//! Core types, traits, and error definitions for Chronicle.
//! This crate provides the foundational abstractions used across all layers
//! of the service: the error taxonomy, typed identifiers, the `Post` domain
//! entity, and validation helpers.

pub mod domain;
pub mod error;
pub mod id;
pub mod result;
pub mod traits;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use result::*;
pub use traits::*;
pub use validation::*;

// Re-export shaku for dependency injection
pub use shaku::Interface;
