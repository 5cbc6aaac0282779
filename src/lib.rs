//! apistub: public API surface extraction
//!
//! Turns reflected module descriptors into a deterministic, diffable token
//! stream suitable for API review.

// Core infrastructure - re-exported from apistub-core
pub use apistub_core::descriptor;
pub use apistub_core::error;
pub use apistub_core::nodes;
pub use apistub_core::output;
pub use apistub_core::tokens;
pub use apistub_core::types;

// Configuration resolution
pub mod config;

// Front door
pub mod cli;
