//! Unified error types for the stronghelp library.
//!
//! Archive loading, page lookup and rendering all report through [`Error`];
//! the lower layers keep their own narrower error types and convert on the way up.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
