//! # Chronicle Server Library
//!
//! Core library for the Chronicle server application.
//!
//! This module provides dependency injection configuration and
//! server startup utilities.

pub mod di;
pub mod startup;
