//! Result type aliases for Chronicle.

use crate::ChronicleError;

/// A specialized `Result` type for Chronicle operations.
pub type ChronicleResult<T> = Result<T, ChronicleError>;
