//! Shared types for the point-of-sale commit system.

pub mod types;

pub use types::DocumentId;
