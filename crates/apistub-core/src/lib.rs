//! Core infrastructure for apistub.
//!
//! This crate provides the language-agnostic pieces of public API extraction:
//! - Descriptor types handed over by the reflection layer
//! - Type expressions and their rendering
//! - The token stream sink (`ApiView`)
//! - Declaration nodes (class, value container, variable, key, function, module)
//! - Error types and error codes
//! - JSON output types for CLI responses

pub mod descriptor;
pub mod error;
pub mod nodes;
pub mod output;
pub mod tokens;
pub mod types;
