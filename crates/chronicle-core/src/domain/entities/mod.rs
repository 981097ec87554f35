//! Entity definitions.

pub mod post;

pub use post::*;
