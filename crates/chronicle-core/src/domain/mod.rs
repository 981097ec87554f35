//! Domain entities for Chronicle.

pub mod entities;

pub use entities::*;
